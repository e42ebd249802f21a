use axum::body::Bytes;
use axum::extract::Query;
use axum::{Extension, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LiveToken, TokenOwner};
use crate::store::SharedRegistry;
use crate::{proceeds, Error, Payload, Success};

const BAD_CREDENTIALS: &str = "Invalid email or password";

/// Checks a plaintext password against a stored bcrypt hash.
/// A mismatch is `Ok(false)`; only a malformed hash is an error.
pub fn verify_password(plaintext: &str, stored_hash: &str) -> Result<bool, Error> {
    bcrypt::verify(plaintext, stored_hash).map_err(Error::from)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(TokenSummary),
    NotFound,
    UsageExceeded,
    Expired,
}

impl TokenVerdict {
    pub fn into_result(self) -> Result<TokenSummary, Error> {
        match self {
            TokenVerdict::Valid(summary) => Ok(summary),
            TokenVerdict::NotFound => Err(Error::not_found("Invalid or expired token")),
            TokenVerdict::UsageExceeded => Err(Error::rejected("Token usage limit exceeded")),
            TokenVerdict::Expired => Err(Error::rejected("Token has expired")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub college_type: Option<String>,
    pub location: String,
    pub usage_count: i32,
    pub max_usage: i32,
}

/// Full check used by token validation: the lookup already requires an active
/// token and an active college, then usage is checked before expiry.
pub struct TokenFullValidationPolicy;

impl TokenFullValidationPolicy {
    pub fn classify(row: Option<LiveToken>, now: DateTime<Utc>) -> TokenVerdict {
        let row = match row {
            Some(row) => row,
            None => return TokenVerdict::NotFound,
        };
        if row.usage_count >= row.max_usage {
            return TokenVerdict::UsageExceeded;
        }
        if let Some(expires_at) = row.expires_at {
            if expires_at < now {
                return TokenVerdict::Expired;
            }
        }
        TokenVerdict::Valid(TokenSummary {
            location: format!(
                "{}, {}, {}",
                row.city.unwrap_or_default(),
                row.state.unwrap_or_default(),
                row.country.unwrap_or_default()
            ),
            id: row.id,
            name: row.college_name,
            college_type: row.college_type,
            usage_count: row.usage_count,
            max_usage: row.max_usage,
        })
    }
}

/// Weaker check used by the student data endpoint: an active token with an
/// owning college is enough. Usage, expiry and college state are not looked at.
pub struct TokenExistencePolicy;

impl TokenExistencePolicy {
    pub fn admit(row: Option<TokenOwner>) -> Result<TokenOwner, Error> {
        row.ok_or_else(|| Error::unauthorized("Invalid token"))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
}

impl CookiePolicy {
    fn build(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .build()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginCollege {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggedInCollege {
    college: CollegeIdentity,
}

#[derive(Debug, Clone, Serialize)]
pub struct CollegeIdentity {
    id: i64,
    name: String,
    email: String,
    token: String,
}

#[derive(Debug, Clone, Serialize)]
struct CollegeCookie<'a> {
    #[serde(flatten)]
    identity: &'a CollegeIdentity,
    #[serde(rename = "type")]
    kind: &'static str,
}

fn required(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

pub async fn login_college(
    Extension(registry): Extension<SharedRegistry>,
    Extension(cookies): Extension<CookiePolicy>,
    body: Bytes,
) -> Result<(CookieJar, Json<Success<LoggedInCollege>>), Error> {
    let missing = || Error::invalid("Email and password are required");
    // body is JSON regardless of Content-Type
    let login: LoginCollege = serde_json::from_slice(&body).map_err(|_| missing())?;
    let (email, password) = match (required(login.email), required(login.password)) {
        (Some(email), Some(password)) => (email, password),
        _ => return Err(missing()),
    };

    let mut lease = registry.lease().await?;
    let college = match lease.college_by_email(&email).await? {
        Some(college) => college,
        None => {
            log::warn!("Login rejected: unknown college email");
            return Err(Error::unauthorized(BAD_CREDENTIALS));
        }
    };
    if !college.is_active {
        log::warn!("Login rejected: college {} is inactive", college.id);
        return Err(Error::unauthorized("College account is inactive"));
    }
    if !verify_password(&password, &college.password_hash)? {
        log::warn!("Login rejected: bad password for college {}", college.id);
        return Err(Error::unauthorized(BAD_CREDENTIALS));
    }
    drop(lease);

    let identity = CollegeIdentity {
        id: college.id,
        name: college.college_name,
        email: college.email,
        token: college.college_token,
    };
    let blob = serde_json::to_string(&CollegeCookie {
        identity: &identity,
        kind: "college",
    })?;
    let jar = CookieJar::new()
        .add(cookies.build("collegeData", blob))
        .add(cookies.build("authToken", identity.token.clone()));

    log::info!("College {} logged in", identity.id);
    Ok((jar, Json(Success::of(LoggedInCollege { college: identity }))))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateToken {
    token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidatedToken {
    valid: bool,
    college: TokenSummary,
}

pub async fn validate_token(
    Extension(registry): Extension<SharedRegistry>,
    Query(query): Query<ValidateToken>,
) -> Payload<ValidatedToken> {
    let token = required(query.token).ok_or_else(|| Error::invalid("Token is required"))?;

    let row = {
        let mut lease = registry.lease().await?;
        lease.live_token(&token).await?
    };

    let college = TokenFullValidationPolicy::classify(row, Utc::now()).into_result()?;
    log::debug!("Token accepted for college {}", college.id);
    proceeds(ValidatedToken {
        valid: true,
        college,
    })
}
