use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `colleges` row as read for the admin snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CollegeData {
    pub id: i64,
    pub college_name: String,
    pub college_token: String,
    pub programs: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// `colleges` row as read for login. Never serialized.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CollegeCredentials {
    pub id: i64,
    pub college_name: String,
    pub email: String,
    pub password_hash: String,
    pub college_token: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecentRegistration {
    pub first_name: String,
    pub last_name: String,
    pub program: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Absent rows read as zero usage on an inactive token.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenUsage {
    pub usage_count: i32,
    pub max_usage: i32,
    pub is_active: bool,
}

/// Token joined with an active owning college.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LiveToken {
    pub id: i64,
    pub college_name: String,
    pub college_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub usage_count: i32,
    pub max_usage: i32,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Owning college of an active token, with no further checks applied.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenOwner {
    pub id: i64,
    pub college_name: String,
}

/// Active student joined with its college; structured fields still text-encoded.
#[derive(Debug, Clone, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct StudentRow {
    pub student_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub college: Option<String>,
    pub program: Option<String>,
    pub current_year: Option<String>,
    pub current_semester: Option<String>,
    pub current_gpa: Option<f64>,
    pub academic_interests: Option<String>,
    pub career_quiz_answers: Option<String>,
    pub technical_skills: Option<String>,
    pub soft_skills: Option<String>,
    pub language_skills: Option<String>,
    pub primary_goal: Option<String>,
    pub secondary_goal: Option<String>,
    pub timeline: Option<String>,
    pub location_preference: Option<String>,
    pub industry_focus: Option<String>,
    pub college_name: String,
    pub college_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}
