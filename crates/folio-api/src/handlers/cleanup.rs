use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::IntoResponse;
use folio_services::cleanup::DeleteFailure;
use folio_services::ReconcileReport;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct CleanupRequest {
    /// Minimum age of an unreferenced file before it is deleted; defaults to the
    /// after-edit floor
    pub max_age_minutes: Option<u64>,
    /// Report what would be deleted without deleting anything
    pub dry_run: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CleanupResponse {
    pub dry_run: bool,
    pub max_age_minutes: u64,
    pub scanned: usize,
    pub referenced: usize,
    pub orphaned: usize,
    pub eligible: usize,
    pub deleted_count: usize,
    /// Paths that would be deleted (dry run only)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub eligible_paths: Vec<String>,
    #[schema(value_type = Vec<Object>)]
    pub errors: Vec<DeleteFailure>,
}

impl CleanupResponse {
    fn from_report(report: ReconcileReport, max_age_minutes: u64) -> Self {
        Self {
            dry_run: false,
            max_age_minutes,
            scanned: report.scanned,
            referenced: report.referenced,
            orphaned: report.orphaned,
            eligible: report.eligible,
            deleted_count: report.deleted_count,
            eligible_paths: Vec::new(),
            errors: report.errors,
        }
    }
}

/// Delete unreferenced files from the bucket
///
/// Files younger than the age floor are kept so uploads from an editing session
/// that has not saved yet survive.
#[utoipa::path(
    post,
    path = "/api/admin/cleanup",
    tag = "cleanup",
    request_body = CleanupRequest,
    responses(
        (status = 200, description = "Cleanup report", body = CleanupResponse),
        (status = 500, description = "Index build failed; nothing deleted", body = ErrorResponse),
        (status = 502, description = "Bucket listing failed; nothing deleted", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, request), fields(operation = "admin_cleanup"))]
pub async fn run_cleanup(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CleanupRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let max_age_minutes = request
        .max_age_minutes
        .unwrap_or(state.cleanup.policy.after_edit.as_secs() / 60);
    let max_age = Duration::from_secs(max_age_minutes.saturating_mul(60));

    if request.dry_run {
        let scan = state.cleanup.reconciler.find_orphans(max_age).await?;
        let eligible_paths: Vec<String> = scan.eligible.into_iter().map(|o| o.path).collect();
        return Ok(ApiResponse::ok(CleanupResponse {
            dry_run: true,
            max_age_minutes,
            scanned: scan.scanned,
            referenced: scan.referenced,
            orphaned: scan.orphaned,
            eligible: eligible_paths.len(),
            deleted_count: 0,
            eligible_paths,
            errors: Vec::new(),
        }));
    }

    let report = state.cleanup.reconciler.reconcile(max_age).await?;
    Ok(ApiResponse::ok(CleanupResponse::from_report(
        report,
        max_age_minutes,
    )))
}
