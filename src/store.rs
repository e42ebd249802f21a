use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres};

use crate::config::DatabaseSettings;
use crate::models::{
    CollegeCredentials, CollegeData, LiveToken, RecentRegistration, StudentRow, TokenOwner,
    TokenUsage,
};
use crate::Error;

pub type SharedRegistry = Arc<dyn Registry>;

/// Hands out one lease per request.
#[async_trait]
pub trait Registry: Send + Sync {
    async fn lease(&self) -> Result<Box<dyn Lease>, Error>;
}

/// A checked-out connection. Dropping it returns the connection to the pool,
/// so every exit path of a handler releases it.
#[async_trait]
pub trait Lease: Send {
    async fn active_college(&mut self, college_id: i64) -> Result<Option<CollegeData>, Error>;

    async fn active_student_count(&mut self, college_id: i64) -> Result<i64, Error>;

    /// Newest first.
    async fn recent_registrations(
        &mut self,
        college_id: i64,
        limit: i64,
    ) -> Result<Vec<RecentRegistration>, Error>;

    async fn token_usage(&mut self, college_id: i64) -> Result<Option<TokenUsage>, Error>;

    async fn college_by_email(&mut self, email: &str)
        -> Result<Option<CollegeCredentials>, Error>;

    /// Active token whose college is active as well.
    async fn live_token(&mut self, token: &str) -> Result<Option<LiveToken>, Error>;

    /// Active token regardless of its college's state.
    async fn token_owner(&mut self, token: &str) -> Result<Option<TokenOwner>, Error>;

    async fn active_student(&mut self, student_id: &str) -> Result<Option<StudentRow>, Error>;
}

pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    log::info!(
        "Connecting to PostgreSQL (max_connections = {})",
        settings.max_connections
    );
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_seconds))
        .connect(&settings.url)
        .await?;
    Ok(pool)
}

#[derive(Debug, Clone)]
pub struct PgRegistry {
    pool: PgPool,
}

impl PgRegistry {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Registry for PgRegistry {
    async fn lease(&self) -> Result<Box<dyn Lease>, Error> {
        let conn = self.pool.acquire().await.map_err(Error::from)?;
        Ok(Box::new(PgLease { conn }))
    }
}

/// Released by `PoolConnection`'s own `Drop`, which hands the connection back to the pool.
pub struct PgLease {
    conn: PoolConnection<Postgres>,
}

#[async_trait]
impl Lease for PgLease {
    async fn active_college(&mut self, college_id: i64) -> Result<Option<CollegeData>, Error> {
        sqlx::query_as::<_, CollegeData>(
            "SELECT id, college_name, college_token, programs, created_at \
             FROM colleges WHERE id = $1 AND is_active = TRUE",
        )
        .bind(college_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn active_student_count(&mut self, college_id: i64) -> Result<i64, Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM students WHERE college_id = $1 AND is_active = TRUE",
        )
        .bind(college_id)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn recent_registrations(
        &mut self,
        college_id: i64,
        limit: i64,
    ) -> Result<Vec<RecentRegistration>, Error> {
        sqlx::query_as::<_, RecentRegistration>(
            "SELECT first_name, last_name, program, created_at \
             FROM students WHERE college_id = $1 AND is_active = TRUE \
             ORDER BY created_at DESC LIMIT $2",
        )
        .bind(college_id)
        .bind(limit)
        .fetch_all(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn token_usage(&mut self, college_id: i64) -> Result<Option<TokenUsage>, Error> {
        sqlx::query_as::<_, TokenUsage>(
            "SELECT usage_count, max_usage, is_active FROM college_tokens \
             WHERE college_id = $1 LIMIT 1",
        )
        .bind(college_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn college_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<CollegeCredentials>, Error> {
        sqlx::query_as::<_, CollegeCredentials>(
            "SELECT id, college_name, email, password_hash, college_token, is_active \
             FROM colleges WHERE email = $1 LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn live_token(&mut self, token: &str) -> Result<Option<LiveToken>, Error> {
        sqlx::query_as::<_, LiveToken>(
            "SELECT c.id, c.college_name, c.college_type, c.city, c.state, c.country, \
                    ct.usage_count, ct.max_usage, ct.is_active, ct.expires_at \
             FROM colleges c JOIN college_tokens ct ON c.id = ct.college_id \
             WHERE ct.token = $1 AND ct.is_active = TRUE AND c.is_active = TRUE \
             LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn token_owner(&mut self, token: &str) -> Result<Option<TokenOwner>, Error> {
        sqlx::query_as::<_, TokenOwner>(
            "SELECT c.id, c.college_name \
             FROM colleges c JOIN college_tokens ct ON c.id = ct.college_id \
             WHERE ct.token = $1 AND ct.is_active = TRUE \
             LIMIT 1",
        )
        .bind(token)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }

    async fn active_student(&mut self, student_id: &str) -> Result<Option<StudentRow>, Error> {
        sqlx::query_as::<_, StudentRow>(
            "SELECT s.student_id, s.first_name, s.last_name, s.email, s.phone, s.college, \
                    s.program, s.current_year, s.current_semester, s.current_gpa, \
                    s.academic_interests, s.career_quiz_answers, s.technical_skills, \
                    s.soft_skills, s.language_skills, s.primary_goal, s.secondary_goal, \
                    s.timeline, s.location_preference, s.industry_focus, \
                    c.college_name, c.college_type, c.city, c.state, c.country \
             FROM students s JOIN colleges c ON s.college_id = c.id \
             WHERE s.student_id = $1 AND s.is_active = TRUE \
             LIMIT 1",
        )
        .bind(student_id)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(Error::from)
    }
}
