use folio_core::AppError;
use folio_storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum CleanupError {
    /// The database could not be read; never treated as "nothing is referenced".
    #[error("Failed to build referenced-file index: {0}")]
    IndexBuild(#[source] AppError),

    #[error("Failed to check references: {0}")]
    ReferenceCheck(#[source] AppError),

    #[error("Failed to list bucket: {0}")]
    Listing(#[source] StorageError),

    #[error("Failed to delete object: {0}")]
    Delete(#[source] StorageError),

    #[error("Storage refused to delete {path}: {reason}")]
    DeleteRejected { path: String, reason: String },

    #[error("Not a public object URL: {0}")]
    InvalidUrl(String),

    #[error("URL points at bucket {found}, expected {expected}")]
    ForeignBucket { found: String, expected: String },
}
