//! Folio Services Layer
//!
//! Business services for the portfolio: the staged upload pipeline (validation,
//! pending-file staging, concurrent commit), orphan reconciliation and safe deletes
//! against the object store, and the content services (works, profile, tags) that
//! trigger cleanup after they write. Thin HTTP handling stays in folio-api.

pub mod cache;
pub mod cleanup;
pub mod content;
pub mod upload;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use cache::{InMemoryTagCache, TagCache};
pub use cleanup::{
    CleanupError, CleanupScheduler, OrphanReconciler, ReconcileReport, ReferencedFileIndex,
    ReferencedPaths, SafeDeleteOutcome, SafeDeleter, ScanningIndex, SweepPolicy, SweepReason,
};
pub use content::{ProfileService, TagService, WorkService};
pub use folio_storage::{
    create_storage, LocalStorage, Storage, StorageBackend, StorageError, StorageResult,
    SupabaseStorage,
};
pub use upload::{
    merge_urls, CandidateFile, CommitError, CommittedFile, FileValidator, PendingFileStager,
    StagingError, StorageUploadTarget, UploadCommitter, UploadError, UploadTarget,
    ValidationError,
};
