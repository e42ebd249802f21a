use std::sync::Arc;

use collegeportal_server::auth::CookiePolicy;
use collegeportal_server::config::Settings;
use collegeportal_server::store::{self, PgRegistry};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::from_env()?;
    let pool = store::connect(&settings.database).await?;
    let app = collegeportal_server::app(
        Arc::new(PgRegistry::new(pool)),
        CookiePolicy {
            secure: settings.production,
        },
    );

    let addr = settings.addr()?;
    log::info!(
        "Starting College Portal HTTP Server on http://{} (production = {})",
        addr,
        settings.production
    );
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
