//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Service and storage
//! errors convert into `AppError` first so every failure renders the same way
//! (status, body, logging).

use axum::{
    extract::multipart::MultipartError,
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use folio_core::{AppError, ErrorMetadata, LogLevel};
use folio_services::{CleanupError, CommitError, StagingError, StorageError, ValidationError};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper so `AppError` (defined in folio-core) can implement `IntoResponse`
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::AlreadyExists(path) => {
                AppError::Conflict(format!("Object already exists: {}", path))
            }
            StorageError::NotFound(path) => AppError::NotFound(format!("File not found: {}", path)),
            StorageError::InvalidKey(reason) => AppError::InvalidInput(reason),
            other => AppError::Storage(other.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app_error = match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ValidationError::InvalidContentType { .. } => AppError::InvalidInput(err.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<StagingError> for HttpAppError {
    fn from(err: StagingError) -> Self {
        HttpAppError(AppError::BadRequest(err.to_string()))
    }
}

impl From<CommitError> for HttpAppError {
    fn from(err: CommitError) -> Self {
        let reasons: Vec<String> = err
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.name, f.error))
            .collect();
        HttpAppError(AppError::UploadFailed(format!(
            "{} ({})",
            err,
            reasons.join("; ")
        )))
    }
}

impl From<CleanupError> for HttpAppError {
    fn from(err: CleanupError) -> Self {
        let app_error = match &err {
            CleanupError::InvalidUrl(_) => AppError::InvalidInput(err.to_string()),
            CleanupError::ForeignBucket { .. } => AppError::BadRequest(err.to_string()),
            CleanupError::Listing(_)
            | CleanupError::Delete(_)
            | CleanupError::DeleteRejected { .. } => AppError::Storage(err.to_string()),
            CleanupError::IndexBuild(_) | CleanupError::ReferenceCheck(_) => {
                AppError::Internal(err.to_string())
            }
        };
        HttpAppError(app_error)
    }
}

impl From<MultipartError> for HttpAppError {
    fn from(err: MultipartError) -> Self {
        HttpAppError(AppError::BadRequest(format!(
            "Invalid multipart body: {}",
            err.body_text()
        )))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed bodies with an `ErrorResponse`
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let hide_details = is_production_env() || app_error.is_sensitive();
        let body = ErrorResponse {
            success: false,
            error: app_error.client_message(),
            details: (!hide_details).then(|| app_error.detailed_message()),
            error_type: (!hide_details).then(|| app_error.error_type().to_string()),
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_map_to_client_errors() {
        let too_large = HttpAppError::from(ValidationError::FileTooLarge { size: 11, max: 10 });
        assert_eq!(too_large.0.http_status_code(), 413);

        let bad_type = HttpAppError::from(ValidationError::InvalidContentType {
            content_type: "text/plain".to_string(),
            allowed: vec!["image/png".to_string()],
        });
        assert_eq!(bad_type.0.http_status_code(), 400);
    }

    #[test]
    fn test_storage_conflict_maps_to_409() {
        let err = HttpAppError::from(StorageError::AlreadyExists("uploads/a.png".to_string()));
        assert_eq!(err.0.http_status_code(), 409);
    }

    #[test]
    fn test_cleanup_foreign_bucket_is_bad_request() {
        let err = HttpAppError::from(CleanupError::ForeignBucket {
            found: "other".to_string(),
            expected: "portfolio-iuri".to_string(),
        });
        assert_eq!(err.0.http_status_code(), 400);
    }
}
