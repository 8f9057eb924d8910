use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use folio_core::models::{CreateTagRequest, Tag, TagUsage, UpdateTagRequest};
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

/// Tag names for the gallery menu (cached)
#[utoipa::path(
    get,
    path = "/api/tags",
    tag = "tags",
    responses((status = 200, description = "Tag names", body = [String]))
)]
pub async fn list_tag_names(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ApiResponse::ok(state.tags.tag_names().await)
}

#[utoipa::path(
    get,
    path = "/api/admin/tags",
    tag = "tags",
    responses((status = 200, description = "All tags", body = [Tag]))
)]
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(ApiResponse::ok(state.tags.list_all().await?))
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = Tag),
        (status = 409, description = "Tag already exists", body = ErrorResponse)
    )
)]
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTagRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tag = state.tags.create(request).await?;
    Ok(ApiResponse::created(tag))
}

#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = Tag),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 409, description = "Name taken by another tag", body = ErrorResponse)
    )
)]
pub async fn update_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTagRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let tag = state.tags.update(id, request).await?;
    Ok(ApiResponse::ok(tag))
}

#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 409, description = "Tag still used by works", body = ErrorResponse)
    )
)]
pub async fn delete_tag(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    state.tags.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/admin/tags/usage/{name}",
    tag = "tags",
    params(("name" = String, Path, description = "Tag name")),
    responses((status = 200, description = "Number of works using the tag", body = TagUsage))
)]
pub async fn tag_usage(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(ApiResponse::ok(state.tags.usage(&name).await?))
}
