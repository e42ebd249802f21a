//! In-memory registry that answers the same lookups as the Postgres one and
//! counts how many leases were checked out and returned.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use collegeportal_server::auth::CookiePolicy;
use collegeportal_server::models::{
    CollegeCredentials, CollegeData, LiveToken, RecentRegistration, StudentRow, TokenOwner,
    TokenUsage,
};
use collegeportal_server::store::{Lease, Registry};
use collegeportal_server::Error;

pub const PASSWORD: &str = "correct horse";

#[derive(Debug, Clone)]
pub struct College {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub token: String,
    pub is_active: bool,
    pub programs: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Student {
    pub college_id: i64,
    pub is_active: bool,
    pub row: StudentRow,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub college_id: i64,
    pub token: String,
    pub usage_count: i32,
    pub max_usage: i32,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct Fixture {
    pub colleges: Vec<College>,
    pub students: Vec<Student>,
    pub tokens: Vec<Token>,
}

pub fn day(n: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 15, 0).unwrap() + Duration::days(n as i64)
}

pub fn college(id: i64, is_active: bool) -> College {
    College {
        id,
        name: format!("College {}", id),
        email: format!("admin{}@college.edu", id),
        password_hash: bcrypt::hash(PASSWORD, 4).unwrap(),
        token: format!("tok-{}", id),
        is_active,
        programs: Some(r#"["Computer Science","Biology"]"#.to_string()),
        created_at: day(0),
    }
}

pub fn token(college_id: i64, usage_count: i32, max_usage: i32) -> Token {
    Token {
        college_id,
        token: format!("tok-{}", college_id),
        usage_count,
        max_usage,
        is_active: true,
        expires_at: None,
    }
}

pub fn student(college_id: i64, n: u32, is_active: bool) -> Student {
    Student {
        college_id,
        is_active,
        created_at: day(n),
        row: StudentRow {
            student_id: format!("STU-{}-{}", college_id, n),
            first_name: format!("First{}", n),
            last_name: format!("Last{}", n),
            email: Some(format!("s{}@mail.test", n)),
            program: Some("Computer Science".to_string()),
            current_gpa: Some(3.4),
            college_name: format!("College {}", college_id),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            country: Some("USA".to_string()),
            ..StudentRow::default()
        },
    }
}

struct Shared {
    fixture: Fixture,
    leased: AtomicUsize,
    released: AtomicUsize,
    failing: AtomicBool,
}

#[derive(Clone)]
pub struct MemoryRegistry {
    shared: Arc<Shared>,
}

impl MemoryRegistry {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            shared: Arc::new(Shared {
                fixture,
                leased: AtomicUsize::new(0),
                released: AtomicUsize::new(0),
                failing: AtomicBool::new(false),
            }),
        }
    }

    /// Every lookup on a lease fails with a database error from now on.
    pub fn fail_queries(&self) {
        self.shared.failing.store(true, Ordering::SeqCst);
    }

    pub fn leased(&self) -> usize {
        self.shared.leased.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.shared.released.load(Ordering::SeqCst)
    }

    pub fn app(&self, secure: bool) -> Router {
        collegeportal_server::app(Arc::new(self.clone()), CookiePolicy { secure })
    }
}

#[async_trait]
impl Registry for MemoryRegistry {
    async fn lease(&self) -> Result<Box<dyn Lease>, Error> {
        self.shared.leased.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryLease {
            shared: self.shared.clone(),
        }))
    }
}

struct MemoryLease {
    shared: Arc<Shared>,
}

impl Drop for MemoryLease {
    fn drop(&mut self) {
        self.shared.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl MemoryLease {
    fn data(&self) -> Result<&Fixture, Error> {
        if self.shared.failing.load(Ordering::SeqCst) {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(&self.shared.fixture)
    }

    fn college(&self, id: i64) -> Result<Option<&College>, Error> {
        Ok(self.data()?.colleges.iter().find(|c| c.id == id))
    }
}

#[async_trait]
impl Lease for MemoryLease {
    async fn active_college(&mut self, college_id: i64) -> Result<Option<CollegeData>, Error> {
        Ok(self
            .college(college_id)?
            .filter(|c| c.is_active)
            .map(|c| CollegeData {
                id: c.id,
                college_name: c.name.clone(),
                college_token: c.token.clone(),
                programs: c.programs.clone(),
                created_at: c.created_at,
            }))
    }

    async fn active_student_count(&mut self, college_id: i64) -> Result<i64, Error> {
        let count = self
            .data()?
            .students
            .iter()
            .filter(|s| s.college_id == college_id && s.is_active)
            .count();
        Ok(count as i64)
    }

    async fn recent_registrations(
        &mut self,
        college_id: i64,
        limit: i64,
    ) -> Result<Vec<RecentRegistration>, Error> {
        let mut rows: Vec<&Student> = self
            .data()?
            .students
            .iter()
            .filter(|s| s.college_id == college_id && s.is_active)
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows
            .into_iter()
            .take(limit as usize)
            .map(|s| RecentRegistration {
                first_name: s.row.first_name.clone(),
                last_name: s.row.last_name.clone(),
                program: s.row.program.clone(),
                created_at: s.created_at,
            })
            .collect())
    }

    async fn token_usage(&mut self, college_id: i64) -> Result<Option<TokenUsage>, Error> {
        Ok(self
            .data()?
            .tokens
            .iter()
            .find(|t| t.college_id == college_id)
            .map(|t| TokenUsage {
                usage_count: t.usage_count,
                max_usage: t.max_usage,
                is_active: t.is_active,
            }))
    }

    async fn college_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<CollegeCredentials>, Error> {
        Ok(self
            .data()?
            .colleges
            .iter()
            .find(|c| c.email == email)
            .map(|c| CollegeCredentials {
                id: c.id,
                college_name: c.name.clone(),
                email: c.email.clone(),
                password_hash: c.password_hash.clone(),
                college_token: c.token.clone(),
                is_active: c.is_active,
            }))
    }

    async fn live_token(&mut self, token: &str) -> Result<Option<LiveToken>, Error> {
        let data = self.data()?;
        Ok(data
            .tokens
            .iter()
            .filter(|t| t.token == token && t.is_active)
            .find_map(|t| {
                let c = data
                    .colleges
                    .iter()
                    .find(|c| c.id == t.college_id && c.is_active)?;
                Some(LiveToken {
                    id: c.id,
                    college_name: c.name.clone(),
                    college_type: Some("University".to_string()),
                    city: Some("Austin".to_string()),
                    state: Some("TX".to_string()),
                    country: Some("USA".to_string()),
                    usage_count: t.usage_count,
                    max_usage: t.max_usage,
                    is_active: t.is_active,
                    expires_at: t.expires_at,
                })
            }))
    }

    async fn token_owner(&mut self, token: &str) -> Result<Option<TokenOwner>, Error> {
        let data = self.data()?;
        Ok(data
            .tokens
            .iter()
            .filter(|t| t.token == token && t.is_active)
            .find_map(|t| {
                let c = data.colleges.iter().find(|c| c.id == t.college_id)?;
                Some(TokenOwner {
                    id: c.id,
                    college_name: c.name.clone(),
                })
            }))
    }

    async fn active_student(&mut self, student_id: &str) -> Result<Option<StudentRow>, Error> {
        let data = self.data()?;
        Ok(data
            .students
            .iter()
            .find(|s| s.row.student_id == student_id && s.is_active)
            .filter(|s| data.colleges.iter().any(|c| c.id == s.college_id))
            .map(|s| s.row.clone()))
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn send(app: Router, req: Request<Body>) -> Response<Body> {
    app.oneshot(req).await.unwrap()
}

pub async fn json_of(resp: Response<Body>) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

pub async fn call(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    json_of(send(app, req).await).await
}
