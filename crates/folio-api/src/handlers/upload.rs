use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use folio_core::validation::blank_to_none;
use folio_core::AppError;
use folio_services::{CandidateFile, PendingFileStager};
use folio_storage::parse_public_url;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    /// Bucket-relative object path
    pub path: String,
    pub public_url: String,
}

/// Upload one or more files
///
/// Multipart fields: `file` (repeatable) and optional `folder`. The batch is
/// validated as a whole; nothing is uploaded when any file is refused. Returned
/// URLs are not referenced by any record until a work or the profile saves them.
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Files uploaded", body = [UploadedFile]),
        (status = 400, description = "Missing file, too many files, or type not allowed", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Upload to storage failed", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, multipart), fields(operation = "upload"))]
pub async fn upload_files(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let mut files = Vec::new();
    let mut folder = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                files.push(CandidateFile::new(name, content_type, data));
            }
            Some("folder") => {
                folder = blank_to_none(Some(field.text().await?));
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(AppError::BadRequest("No file uploaded".to_string()).into());
    }

    let uploads = &state.uploads;
    let folder = folder.unwrap_or_else(|| uploads.default_folder.clone());
    let mut stager = PendingFileStager::new(
        uploads.validator.clone(),
        uploads.max_files,
        folder,
        Vec::new(),
    );

    let report = stager.add_files(files)?;
    if let Some(rejected) = report.rejected.into_iter().next() {
        tracing::debug!(file = %rejected.name, reason = %rejected.reason, "Upload refused");
        return Err(rejected.reason.into());
    }

    let urls = stager.commit(&uploads.committer).await?;
    let uploaded: Vec<UploadedFile> = urls
        .into_iter()
        .map(|url| UploadedFile {
            path: parse_public_url(&url).map(|o| o.path).unwrap_or_default(),
            public_url: url,
        })
        .collect();

    tracing::info!(count = uploaded.len(), folder = %stager.folder(), "Files uploaded");
    Ok(ApiResponse::ok(uploaded))
}
