//! Staged upload pipeline
//!
//! Files are validated when selected, held locally by the stager while the user
//! edits, and only uploaded when the owning record is saved.

pub mod committer;
pub mod stager;
pub mod validator;

pub use committer::{
    merge_urls, CommitError, CommittedFile, FileUploadFailure, StorageUploadTarget,
    UploadCommitter, UploadError, UploadTarget,
};
pub use stager::{
    AddReport, CandidateFile, PendingFile, PendingFileStager, PreviewHandle, PreviewPool,
    RejectedFile, StagingError,
};
pub use validator::{FileValidator, ValidationError};
