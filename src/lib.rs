pub mod assemble;
pub mod auth;
pub mod college;
pub mod config;
pub mod err;
pub mod models;
pub mod store;
pub mod student;

use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Serialize;

pub use crate::err::{Error, Success};
use crate::auth::CookiePolicy;
use crate::store::SharedRegistry;

pub type Payload<T> = Result<Json<T>, Error>;

pub fn proceeds<V>(value: V) -> Payload<V>
where
    V: Serialize,
{
    Ok(Json(value))
}

pub fn app(registry: SharedRegistry, cookies: CookiePolicy) -> Router {
    Router::new()
        .route("/api/admin/college-data", get(college::college_snapshot))
        .route("/api/auth/login-college", post(auth::login_college))
        .route("/api/auth/validate-token", get(auth::validate_token))
        .route("/api/student/data", get(student::student_data))
        .fallback(err::handler404)
        .layer(Extension(registry))
        .layer(Extension(cookies))
}
