//! Storage abstraction trait
//!
//! This module defines the Storage trait that all object store backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Listing failed: {0}")]
    ListFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid object path: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// One entry of a single-level listing.
///
/// Entries with `size` set are files; entries without size metadata are folders
/// that can be listed further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size: Option<u64>,
}

impl ListEntry {
    pub fn is_file(&self) -> bool {
        self.size.is_some()
    }
}

/// A file in the bucket, addressed by its full path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageObject {
    pub path: String,
    pub created_at: Option<DateTime<Utc>>,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoveFailure {
    pub path: String,
    pub reason: String,
}

/// Result of a batch removal. Paths that did not exist appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoveOutcome {
    pub removed: Vec<String>,
    pub failed: Vec<RemoveFailure>,
}

/// Storage abstraction trait
///
/// All backends (Supabase Storage, local filesystem) implement this trait so the
/// upload and cleanup services never depend on a specific backend.
///
/// Paths are bucket-relative (`trabalhos/1717171717171-k3j2h1.png`) and must not
/// contain `..` or start with `/`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a new object and return its public URL.
    ///
    /// Never overwrites: an existing object at `path` yields `AlreadyExists`.
    async fn upload(&self, path: &str, content_type: &str, data: Vec<u8>) -> StorageResult<String>;

    /// Public URL for an object path (no I/O).
    fn public_url(&self, path: &str) -> String;

    /// List one level under `prefix` ("" for the bucket root), sorted by name.
    async fn list(&self, prefix: &str, limit: usize, offset: usize)
        -> StorageResult<Vec<ListEntry>>;

    /// Metadata of a single object, `None` when it does not exist.
    async fn stat(&self, path: &str) -> StorageResult<Option<StorageObject>>;

    /// Remove a batch of objects.
    ///
    /// A transport-level failure fails the whole call; per-object failures are
    /// reported in the outcome.
    async fn remove(&self, paths: &[String]) -> StorageResult<RemoveOutcome>;

    /// Bucket this backend writes to
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
