use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use folio_storage::{list_all_objects, Storage, StorageObject};
use serde::Serialize;

use super::error::CleanupError;
use super::index::ReferencedFileIndex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteFailure {
    pub path: String,
    pub reason: String,
}

/// Result of the scan phase, before anything is deleted
#[derive(Debug, Clone, Default)]
pub struct OrphanScan {
    /// Files found in the bucket
    pub scanned: usize,
    /// Distinct paths referenced by the database
    pub referenced: usize,
    /// Files not referenced, regardless of age
    pub orphaned: usize,
    /// Unreferenced files older than the age floor
    pub eligible: Vec<StorageObject>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub scanned: usize,
    pub referenced: usize,
    pub orphaned: usize,
    pub eligible: usize,
    pub deleted_count: usize,
    pub errors: Vec<DeleteFailure>,
}

/// Deletes bucket objects no record points at
#[derive(Clone)]
pub struct OrphanReconciler {
    storage: Arc<dyn Storage>,
    index: Arc<dyn ReferencedFileIndex>,
}

impl OrphanReconciler {
    pub fn new(storage: Arc<dyn Storage>, index: Arc<dyn ReferencedFileIndex>) -> Self {
        Self { storage, index }
    }

    /// List the bucket, diff it against the index, and keep orphans older than
    /// `max_age`. Nothing is deleted.
    ///
    /// Objects whose creation time cannot be determined are treated as young.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "find_orphans"))]
    pub async fn find_orphans(&self, max_age: Duration) -> Result<OrphanScan, CleanupError> {
        let objects = list_all_objects(self.storage.as_ref())
            .await
            .map_err(CleanupError::Listing)?;
        let referenced = self.index.build_index().await?;

        let scanned = objects.len();
        let orphans: Vec<StorageObject> = objects
            .into_iter()
            .filter(|object| !referenced.contains(&object.path))
            .collect();
        let orphaned = orphans.len();

        let cutoff = cutoff_for(Utc::now(), max_age);
        let mut eligible = Vec::new();
        for object in orphans {
            if self.is_older_than(&object, cutoff).await {
                eligible.push(object);
            }
        }

        tracing::info!(
            scanned,
            referenced = referenced.len(),
            orphaned,
            eligible = eligible.len(),
            max_age_secs = max_age.as_secs(),
            "Orphan scan complete"
        );

        Ok(OrphanScan {
            scanned,
            referenced: referenced.len(),
            orphaned,
            eligible,
        })
    }

    /// Delete every unreferenced object older than `max_age` in one batch.
    ///
    /// Listing or index failures abort before any deletion. Per-object delete
    /// failures are collected in the report.
    #[tracing::instrument(skip(self), fields(cleanup.operation = "reconcile"))]
    pub async fn reconcile(&self, max_age: Duration) -> Result<ReconcileReport, CleanupError> {
        let scan = self.find_orphans(max_age).await?;

        let mut report = ReconcileReport {
            scanned: scan.scanned,
            referenced: scan.referenced,
            orphaned: scan.orphaned,
            eligible: scan.eligible.len(),
            deleted_count: 0,
            errors: Vec::new(),
        };

        if scan.eligible.is_empty() {
            return Ok(report);
        }

        let paths: Vec<String> = scan.eligible.into_iter().map(|o| o.path).collect();
        for path in &paths {
            tracing::info!(path = %path, "Deleting orphaned file");
        }

        match self.storage.remove(&paths).await {
            Ok(outcome) => {
                report.deleted_count = outcome.removed.len();
                report.errors = outcome
                    .failed
                    .into_iter()
                    .map(|failure| {
                        tracing::error!(path = %failure.path, error = %failure.reason, "Failed to delete orphaned file");
                        DeleteFailure {
                            path: failure.path,
                            reason: failure.reason,
                        }
                    })
                    .collect();
            }
            Err(e) => {
                tracing::error!(error = %e, count = paths.len(), "Batch delete of orphaned files failed");
                let reason = e.to_string();
                report.errors = paths
                    .into_iter()
                    .map(|path| DeleteFailure {
                        path,
                        reason: reason.clone(),
                    })
                    .collect();
            }
        }

        tracing::info!(
            scanned = report.scanned,
            orphaned = report.orphaned,
            deleted = report.deleted_count,
            errors = report.errors.len(),
            "Orphan cleanup completed"
        );

        Ok(report)
    }

    async fn is_older_than(&self, object: &StorageObject, cutoff: Option<DateTime<Utc>>) -> bool {
        let Some(cutoff) = cutoff else {
            return false;
        };

        let created_at = match object.created_at {
            Some(created_at) => Some(created_at),
            None => match self.storage.stat(&object.path).await {
                Ok(stat) => stat.and_then(|s| s.created_at),
                Err(e) => {
                    tracing::warn!(path = %object.path, error = %e, "Could not stat object; keeping it");
                    None
                }
            },
        };

        match created_at {
            Some(created_at) => created_at < cutoff,
            None => {
                tracing::debug!(path = %object.path, "Object age unknown; keeping it");
                false
            }
        }
    }
}

fn cutoff_for(now: DateTime<Utc>, max_age: Duration) -> Option<DateTime<Utc>> {
    let age = TimeDelta::from_std(max_age).ok()?;
    now.checked_sub_signed(age)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::index::ScanningIndex;
    use crate::test_helpers::{work_fixture, MockProfileStore, MockStorage, MockWorkStore};

    const MINUTE: Duration = Duration::from_secs(60);

    fn setup() -> (Arc<MockStorage>, Arc<MockWorkStore>, OrphanReconciler) {
        let storage = Arc::new(MockStorage::new());
        let works = Arc::new(MockWorkStore::new());
        let profile = Arc::new(MockProfileStore::new());
        let index = Arc::new(ScanningIndex::new(works.clone(), profile));
        let reconciler = OrphanReconciler::new(storage.clone(), index);
        (storage, works, reconciler)
    }

    fn minutes_ago(minutes: i64) -> Option<DateTime<Utc>> {
        Some(Utc::now() - TimeDelta::minutes(minutes))
    }

    #[tokio::test]
    async fn test_deletes_only_old_unreferenced_objects() {
        let (storage, works, reconciler) = setup();
        storage.insert_object("trabalhos/x.png", minutes_ago(60));
        storage.insert_object("trabalhos/y.png", minutes_ago(60));
        storage.insert_object("trabalhos/z.png", minutes_ago(1));
        works.insert(work_fixture("w", &[&storage.public_url("trabalhos/x.png")]));

        let report = reconciler.reconcile(30 * MINUTE).await.unwrap();

        assert_eq!(report.scanned, 3);
        assert_eq!(report.orphaned, 2);
        assert_eq!(report.deleted_count, 1);
        assert!(report.errors.is_empty());
        assert!(storage.has_object("trabalhos/x.png"));
        assert!(!storage.has_object("trabalhos/y.png"));
        assert!(storage.has_object("trabalhos/z.png"));
    }

    #[tokio::test]
    async fn test_index_failure_aborts_without_deleting() {
        let (storage, works, reconciler) = setup();
        storage.insert_object("trabalhos/y.png", minutes_ago(60));
        works.set_failing(true);

        let result = reconciler.reconcile(MINUTE).await;

        assert!(matches!(result, Err(CleanupError::IndexBuild(_))));
        assert!(storage.has_object("trabalhos/y.png"));
        assert_eq!(storage.remove_calls(), 0);
    }

    #[tokio::test]
    async fn test_listing_failure_aborts() {
        let (storage, _works, reconciler) = setup();
        storage.insert_object("trabalhos/y.png", minutes_ago(60));
        storage.set_listing_fails(true);

        let result = reconciler.reconcile(MINUTE).await;
        assert!(matches!(result, Err(CleanupError::Listing(_))));
        assert_eq!(storage.remove_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_listing_timestamp_falls_back_to_stat() {
        let (storage, _works, reconciler) = setup();
        storage.insert_object_unlisted_timestamp("uploads/old.png", minutes_ago(90));
        storage.insert_object_unlisted_timestamp("uploads/unknown.png", None);

        let report = reconciler.reconcile(30 * MINUTE).await.unwrap();

        assert_eq!(report.deleted_count, 1);
        assert!(!storage.has_object("uploads/old.png"));
        assert!(storage.has_object("uploads/unknown.png"));
    }

    #[tokio::test]
    async fn test_per_object_failures_are_reported() {
        let (storage, _works, reconciler) = setup();
        storage.insert_object("uploads/a.png", minutes_ago(60));
        storage.insert_object("uploads/b.png", minutes_ago(60));
        storage.fail_removal_of("uploads/b.png");

        let report = reconciler.reconcile(MINUTE).await.unwrap();

        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "uploads/b.png");
    }

    #[tokio::test]
    async fn test_find_orphans_is_dry_run() {
        let (storage, _works, reconciler) = setup();
        storage.insert_object("uploads/a.png", minutes_ago(60));

        let scan = reconciler.find_orphans(MINUTE).await.unwrap();

        assert_eq!(scan.eligible.len(), 1);
        assert!(storage.has_object("uploads/a.png"));
        assert_eq!(storage.remove_calls(), 0);
    }

    #[tokio::test]
    async fn test_folder_placeholders_are_not_swept() {
        let (storage, _works, reconciler) = setup();
        storage.insert_object("trabalhos/.emptyFolderPlaceholder", minutes_ago(600));
        storage.insert_object("trabalhos/old.png", minutes_ago(600));

        let report = reconciler.reconcile(MINUTE).await.unwrap();

        assert_eq!(report.scanned, 1);
        assert_eq!(report.deleted_count, 1);
        assert!(storage.has_object("trabalhos/.emptyFolderPlaceholder"));
    }

    #[tokio::test]
    async fn test_empty_bucket() {
        let (storage, _works, reconciler) = setup();
        let report = reconciler.reconcile(MINUTE).await.unwrap();
        assert_eq!(report.scanned, 0);
        assert_eq!(report.deleted_count, 0);
        assert_eq!(storage.remove_calls(), 0);
    }

    #[test]
    fn test_cutoff_overflow_keeps_everything() {
        assert!(cutoff_for(Utc::now(), Duration::from_secs(u64::MAX)).is_none());
        let now = Utc::now();
        assert_eq!(
            cutoff_for(now, Duration::from_secs(60)),
            Some(now - TimeDelta::seconds(60))
        );
    }
}
