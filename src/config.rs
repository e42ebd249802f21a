use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use anyhow::{anyhow, Context};

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database: DatabaseSettings,
    /// Cookies are marked `Secure` only in production.
    pub production: bool,
}

#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_seconds: u64,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed_var("PORT", 3000)?,
            database: DatabaseSettings {
                url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
                max_connections: parsed_var("DB_MAX_CONNECTIONS", 10)?,
                acquire_timeout_seconds: parsed_var("DB_ACQUIRE_TIMEOUT", 10)?,
            },
            production: is_production(
                env::var("APP_ENV").ok().as_deref(),
                env::var("NODE_ENV").ok().as_deref(),
            ),
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}

fn parsed_var<T: FromStr>(key: &str, default: T) -> anyhow::Result<T> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| anyhow!("{} must be a valid number, got `{}`", key, raw)),
        Err(_) => Ok(default),
    }
}

fn is_production(app_env: Option<&str>, node_env: Option<&str>) -> bool {
    app_env.or(node_env) == Some("production")
}
