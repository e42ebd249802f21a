//! Shapes typed rows into the JSON documents the endpoints return.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::models::{CollegeData, RecentRegistration, StudentRow, TokenUsage};
use crate::Error;

/// Decodes a JSON array stored as text. Null or empty text is an empty list.
pub fn decode_list(raw: Option<&str>) -> Result<Vec<Value>, Error> {
    match raw {
        Some(text) if !text.is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Vec::new()),
    }
}

/// Decodes a JSON object stored as text. Null or empty text is an empty map.
pub fn decode_map(raw: Option<&str>) -> Result<Map<String, Value>, Error> {
    match raw {
        Some(text) if !text.is_empty() => Ok(serde_json::from_str(text)?),
        _ => Ok(Map::new()),
    }
}

/// `YYYY-MM-DD`, the part of the ISO-8601 UTC form before the `T`.
pub fn calendar_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d").to_string()
}

/// ISO-8601 UTC with milliseconds, e.g. `2024-01-01T09:15:00.000Z`.
pub fn iso_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

pub fn full_name(first: &str, last: &str) -> String {
    format!("{} {}", first, last)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollegeSnapshot {
    pub college: SnapshotCollege,
    pub recent_registrations: Vec<Registration>,
    pub token_usage: UsageReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCollege {
    pub id: i64,
    pub name: String,
    pub token: String,
    pub total_students: i64,
    pub active_students: i64,
    pub programs: Vec<Value>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub program: Option<String>,
    pub date: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub usage_count: i32,
    pub max_usage: i32,
    pub remaining: i32,
    pub is_active: bool,
}

impl From<&RecentRegistration> for Registration {
    fn from(row: &RecentRegistration) -> Self {
        Self {
            name: full_name(&row.first_name, &row.last_name),
            program: row.program.clone(),
            date: calendar_date(&row.created_at),
        }
    }
}

impl From<TokenUsage> for UsageReport {
    fn from(usage: TokenUsage) -> Self {
        Self {
            usage_count: usage.usage_count,
            max_usage: usage.max_usage,
            remaining: usage.max_usage.saturating_sub(usage.usage_count),
            is_active: usage.is_active,
        }
    }
}

pub fn snapshot(
    college: CollegeData,
    total_students: i64,
    recent: &[RecentRegistration],
    usage: Option<TokenUsage>,
) -> Result<CollegeSnapshot, Error> {
    Ok(CollegeSnapshot {
        college: SnapshotCollege {
            id: college.id,
            name: college.college_name,
            token: college.college_token,
            total_students,
            // every counted student is active already
            active_students: total_students,
            programs: decode_list(college.programs.as_deref())?,
            created_at: iso_timestamp(&college.created_at),
        },
        recent_registrations: recent.iter().map(Registration::from).collect(),
        token_usage: usage.unwrap_or_default().into(),
    })
}

/// Student record with its text-encoded profile fields decoded.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRecord {
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
    pub academic_interests: Vec<Value>,
    pub career_quiz_answers: Map<String, Value>,
    pub technical_skills: Map<String, Value>,
    pub soft_skills: Map<String, Value>,
    pub language_skills: Map<String, Value>,
    pub primary_goal: Option<String>,
    pub secondary_goal: Option<String>,
    pub timeline: Option<String>,
    pub location_preference: Option<String>,
    pub industry_focus: Vec<Value>,
    pub college_name: String,
    pub college_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl TryFrom<StudentRow> for StudentRecord {
    type Error = Error;

    fn try_from(row: StudentRow) -> Result<Self, Error> {
        Ok(Self {
            academic_interests: decode_list(row.academic_interests.as_deref())?,
            career_quiz_answers: decode_map(row.career_quiz_answers.as_deref())?,
            technical_skills: decode_map(row.technical_skills.as_deref())?,
            soft_skills: decode_map(row.soft_skills.as_deref())?,
            language_skills: decode_map(row.language_skills.as_deref())?,
            industry_focus: decode_list(row.industry_focus.as_deref())?,
            student_id: row.student_id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            phone: row.phone,
            college: row.college,
            program: row.program,
            current_year: row.current_year,
            current_semester: row.current_semester,
            current_gpa: row.current_gpa,
            primary_goal: row.primary_goal,
            secondary_goal: row.secondary_goal,
            timeline: row.timeline,
            location_preference: row.location_preference,
            college_name: row.college_name,
            college_type: row.college_type,
            city: row.city,
            state: row.state,
            country: row.country,
        })
    }
}
