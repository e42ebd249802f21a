use axum::extract::Query;
use axum::Extension;
use serde::{Deserialize, Serialize};

use crate::assemble::StudentRecord;
use crate::auth::TokenExistencePolicy;
use crate::store::SharedRegistry;
use crate::{proceeds, Error, Payload, Success};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    student_id: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StudentData {
    student: StudentRecord,
}

pub async fn student_data(
    Extension(registry): Extension<SharedRegistry>,
    Query(query): Query<StudentQuery>,
) -> Payload<Success<StudentData>> {
    let present = |v: Option<String>| v.filter(|v| !v.is_empty());
    let (student_id, token) = match (present(query.student_id), present(query.token)) {
        (Some(student_id), Some(token)) => (student_id, token),
        _ => return Err(Error::invalid("Student ID and token are required")),
    };

    let mut lease = registry.lease().await?;
    let owner = TokenExistencePolicy::admit(lease.token_owner(&token).await?)?;
    log::debug!("Token of college {} reads student {}", owner.id, student_id);

    let row = lease
        .active_student(&student_id)
        .await?
        .ok_or_else(|| Error::not_found("Student not found"))?;
    drop(lease);

    proceeds(Success::of(StudentData {
        student: StudentRecord::try_from(row)?,
    }))
}
