use std::sync::Arc;
use std::time::Duration;

use folio_core::CleanupConfig;
use tokio::task::JoinHandle;

use super::reconciler::OrphanReconciler;

/// What kind of write just happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepReason {
    /// A work or the profile was created or updated
    AfterEdit,
    /// A work was deleted
    AfterDelete,
}

impl SweepReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SweepReason::AfterEdit => "after_edit",
            SweepReason::AfterDelete => "after_delete",
        }
    }
}

/// Age floors for sweeps triggered by writes.
///
/// The floor protects files uploaded by a session that has not committed its
/// record yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepPolicy {
    pub enabled: bool,
    pub after_edit: Duration,
    pub after_delete: Duration,
}

impl SweepPolicy {
    pub fn from_config(config: &CleanupConfig) -> Self {
        Self {
            enabled: config.enabled,
            after_edit: Duration::from_secs(config.edit_age_minutes.saturating_mul(60)),
            after_delete: Duration::from_secs(config.delete_age_minutes.saturating_mul(60)),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn age_for(&self, reason: SweepReason) -> Duration {
        match reason {
            SweepReason::AfterEdit => self.after_edit,
            SweepReason::AfterDelete => self.after_delete,
        }
    }
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            after_edit: Duration::from_secs(30 * 60),
            after_delete: Duration::from_secs(5 * 60),
        }
    }
}

/// Runs orphan sweeps in the background after writes
#[derive(Clone)]
pub struct CleanupScheduler {
    reconciler: Arc<OrphanReconciler>,
    policy: SweepPolicy,
}

impl CleanupScheduler {
    pub fn new(reconciler: Arc<OrphanReconciler>, policy: SweepPolicy) -> Self {
        Self { reconciler, policy }
    }

    pub fn policy(&self) -> &SweepPolicy {
        &self.policy
    }

    /// Spawn a sweep for `reason`. The caller never waits on it and never sees
    /// its errors; `None` when sweeps are disabled.
    pub fn trigger(&self, reason: SweepReason) -> Option<JoinHandle<()>> {
        if !self.policy.enabled {
            tracing::debug!(reason = reason.as_str(), "Orphan sweep disabled; skipping");
            return None;
        }

        let reconciler = self.reconciler.clone();
        let max_age = self.policy.age_for(reason);

        Some(tokio::spawn(async move {
            tracing::info!(
                reason = reason.as_str(),
                max_age_secs = max_age.as_secs(),
                "Starting orphan sweep"
            );

            match reconciler.reconcile(max_age).await {
                Ok(report) => {
                    if !report.errors.is_empty() {
                        tracing::warn!(
                            errors = report.errors.len(),
                            "Orphan sweep finished with delete errors"
                        );
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, reason = reason.as_str(), "Orphan sweep failed");
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleanup::index::ScanningIndex;
    use crate::test_helpers::{MockProfileStore, MockStorage, MockWorkStore};
    use chrono::{TimeDelta, Utc};

    fn scheduler(
        storage: Arc<MockStorage>,
        works: Arc<MockWorkStore>,
        policy: SweepPolicy,
    ) -> CleanupScheduler {
        let index = Arc::new(ScanningIndex::new(works, Arc::new(MockProfileStore::new())));
        let reconciler = Arc::new(OrphanReconciler::new(storage, index));
        CleanupScheduler::new(reconciler, policy)
    }

    #[test]
    fn test_policy_from_config() {
        let policy = SweepPolicy::from_config(&CleanupConfig {
            enabled: true,
            edit_age_minutes: 45,
            delete_age_minutes: 2,
        });
        assert_eq!(policy.age_for(SweepReason::AfterEdit), Duration::from_secs(45 * 60));
        assert_eq!(policy.age_for(SweepReason::AfterDelete), Duration::from_secs(120));
    }

    #[test]
    fn test_policy_from_huge_ages_saturates() {
        let policy = SweepPolicy::from_config(&CleanupConfig {
            enabled: true,
            edit_age_minutes: u64::MAX,
            delete_age_minutes: u64::MAX,
        });
        assert_eq!(policy.after_edit, Duration::from_secs(u64::MAX));
        assert_eq!(policy.after_delete, Duration::from_secs(u64::MAX));
    }

    #[test]
    fn test_default_floors() {
        let policy = SweepPolicy::default();
        assert!(policy.enabled);
        assert_eq!(policy.after_edit, Duration::from_secs(1800));
        assert_eq!(policy.after_delete, Duration::from_secs(300));
    }

    #[tokio::test]
    async fn test_trigger_uses_floor_for_reason() {
        let storage = Arc::new(MockStorage::new());
        storage.insert_object("uploads/ten.png", Some(Utc::now() - TimeDelta::minutes(10)));
        let sched = scheduler(storage.clone(), Arc::new(MockWorkStore::new()), SweepPolicy::default());

        // Ten minutes old: younger than the edit floor, older than the delete floor.
        sched.trigger(SweepReason::AfterEdit).unwrap().await.unwrap();
        assert!(storage.has_object("uploads/ten.png"));

        sched.trigger(SweepReason::AfterDelete).unwrap().await.unwrap();
        assert!(!storage.has_object("uploads/ten.png"));
    }

    #[tokio::test]
    async fn test_trigger_swallows_errors() {
        let storage = Arc::new(MockStorage::new());
        let works = Arc::new(MockWorkStore::new());
        works.set_failing(true);
        let sched = scheduler(storage, works, SweepPolicy::default());

        let handle = sched.trigger(SweepReason::AfterDelete).unwrap();
        assert!(handle.await.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_policy_spawns_nothing() {
        let sched = scheduler(
            Arc::new(MockStorage::new()),
            Arc::new(MockWorkStore::new()),
            SweepPolicy::disabled(),
        );
        assert!(sched.trigger(SweepReason::AfterEdit).is_none());
    }
}
