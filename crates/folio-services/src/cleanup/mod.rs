//! Orphan file cleanup
//!
//! The object store keeps no reference counts, so liveness is rebuilt from the
//! database of record: every URL in a work's image list or the profile photo is a
//! live reference, and anything else in the bucket older than an age floor is an
//! orphan.

pub mod error;
pub mod index;
pub mod reconciler;
pub mod safe_delete;
pub mod scheduler;

pub use error::CleanupError;
pub use index::{paths_from_urls, ReferencedFileIndex, ReferencedPaths, ScanningIndex};
pub use reconciler::{DeleteFailure, OrphanReconciler, OrphanScan, ReconcileReport};
pub use safe_delete::{SafeDeleteOutcome, SafeDeleter};
pub use scheduler::{CleanupScheduler, SweepPolicy, SweepReason};
