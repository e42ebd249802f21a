use axum::extract::Query;
use axum::Extension;
use serde::Deserialize;

use crate::assemble::{self, CollegeSnapshot};
use crate::store::SharedRegistry;
use crate::{proceeds, Error, Payload};

const RECENT_REGISTRATIONS: i64 = 5;

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotQuery {
    #[serde(rename = "collegeId")]
    college_id: Option<String>,
}

/// Admin view of one active college: counts, newest students and token usage.
pub async fn college_snapshot(
    Extension(registry): Extension<SharedRegistry>,
    Query(query): Query<SnapshotQuery>,
) -> Payload<CollegeSnapshot> {
    let raw_id = query
        .college_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::invalid("College ID is required"))?;
    let not_found = || Error::not_found("College not found");
    // a non-numeric id cannot match any row
    let college_id: i64 = raw_id.trim().parse().map_err(|_| not_found())?;

    let mut lease = registry.lease().await?;
    let college = lease.active_college(college_id).await?.ok_or_else(not_found)?;
    let total_students = lease.active_student_count(college_id).await?;
    let recent = lease
        .recent_registrations(college_id, RECENT_REGISTRATIONS)
        .await?;
    let usage = lease.token_usage(college_id).await?;
    drop(lease);

    log::debug!(
        "Snapshot for college {}: {} students, {} recent",
        college_id,
        total_students,
        recent.len()
    );
    proceeds(assemble::snapshot(college, total_students, &recent, usage)?)
}
