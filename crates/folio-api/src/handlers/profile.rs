use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use folio_core::models::{Profile, ProfileInput};

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/config",
    tag = "profile",
    responses(
        (status = 200, description = "Profile and theme settings", body = Profile),
        (status = 404, description = "Profile not configured yet", body = ErrorResponse)
    )
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(ApiResponse::ok(state.profile.get().await?))
}

/// Create or update the profile
///
/// A replaced photo is deleted from storage after the save.
#[utoipa::path(
    put,
    path = "/api/config",
    tag = "profile",
    request_body = ProfileInput,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "upsert_profile"))]
pub async fn upsert_profile(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<ProfileInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(ApiResponse::ok(state.profile.upsert(input).await?))
}
