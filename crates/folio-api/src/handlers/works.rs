use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use folio_core::models::{Work, WorkInput};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListWorksQuery {
    /// Every work, newest first, including hidden ones
    #[serde(default)]
    pub all: bool,
}

/// List works
///
/// Without `all`, returns the gallery: hidden works omitted, favourites first,
/// each group in random order.
#[utoipa::path(
    get,
    path = "/api/works",
    tag = "works",
    params(ListWorksQuery),
    responses(
        (status = 200, description = "Works", body = [Work]),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_works(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListWorksQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let works = if query.all {
        state.works.list_all().await?
    } else {
        state.works.list_gallery().await?
    };
    Ok(ApiResponse::ok(works))
}

#[utoipa::path(
    get,
    path = "/api/works/{id}",
    tag = "works",
    params(("id" = Uuid, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Work", body = Work),
        (status = 404, description = "Work not found", body = ErrorResponse)
    )
)]
pub async fn get_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let work = state.works.get(id).await?;
    Ok(ApiResponse::ok(work))
}

#[utoipa::path(
    get,
    path = "/api/tags/{tag}/works",
    tag = "works",
    params(("tag" = String, Path, description = "Tag name")),
    responses((status = 200, description = "Works carrying the tag", body = [Work]))
)]
pub async fn list_works_by_tag(
    State(state): State<Arc<AppState>>,
    Path(tag): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let works = state.works.list_by_tag(&tag).await?;
    Ok(ApiResponse::ok(works))
}

#[utoipa::path(
    post,
    path = "/api/works",
    tag = "works",
    request_body = WorkInput,
    responses(
        (status = 201, description = "Work created", body = Work),
        (status = 400, description = "Invalid input", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "create_work"))]
pub async fn create_work(
    State(state): State<Arc<AppState>>,
    ValidatedJson(input): ValidatedJson<WorkInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let work = state.works.create(input).await?;
    Ok(ApiResponse::created(work))
}

/// Replace a work
///
/// Images dropped from the list are deleted from storage once the work is saved,
/// unless another record still uses them.
#[utoipa::path(
    put,
    path = "/api/works/{id}",
    tag = "works",
    params(("id" = Uuid, Path, description = "Work ID")),
    request_body = WorkInput,
    responses(
        (status = 200, description = "Work updated", body = Work),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "Work not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, input), fields(operation = "update_work", work.id = %id))]
pub async fn update_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(input): ValidatedJson<WorkInput>,
) -> Result<impl IntoResponse, HttpAppError> {
    let work = state.works.update(id, input).await?;
    Ok(ApiResponse::ok(work))
}

#[utoipa::path(
    delete,
    path = "/api/works/{id}",
    tag = "works",
    params(("id" = Uuid, Path, description = "Work ID")),
    responses(
        (status = 200, description = "Work deleted; returns the deleted record", body = Work),
        (status = 404, description = "Work not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "delete_work", work.id = %id))]
pub async fn delete_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let work = state.works.delete(id).await?;
    Ok(ApiResponse::ok(work))
}
