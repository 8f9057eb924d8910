//! Test helpers for service unit and integration tests
//!
//! In-memory doubles for the object store and the database stores, plus fixtures
//! and a context that wires services the way the API does. No Postgres or network
//! access is needed.

pub mod fixtures;
pub mod mock_storage;
pub mod mock_stores;

pub use fixtures::*;
pub use mock_storage::{MockStorage, MOCK_BASE_URL, MOCK_BUCKET};
pub use mock_stores::{MockProfileStore, MockTagStore, MockWorkStore};

use std::sync::Arc;

use crate::cache::InMemoryTagCache;
use crate::cleanup::{CleanupScheduler, OrphanReconciler, SafeDeleter, ScanningIndex, SweepPolicy};
use crate::content::{ProfileService, TagService, WorkService};

/// Mocks plus factories for fully wired services.
///
/// Sweeps are disabled by default so tests stay deterministic; use
/// [`TestContext::with_sweep_policy`] to exercise them.
pub struct TestContext {
    pub storage: Arc<MockStorage>,
    pub works: Arc<MockWorkStore>,
    pub profile: Arc<MockProfileStore>,
    pub tags: Arc<MockTagStore>,
    pub cache: Arc<InMemoryTagCache>,
    pub policy: SweepPolicy,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(MockStorage::new()),
            works: Arc::new(MockWorkStore::new()),
            profile: Arc::new(MockProfileStore::new()),
            tags: Arc::new(MockTagStore::new()),
            cache: Arc::new(InMemoryTagCache::default()),
            policy: SweepPolicy::disabled(),
        }
    }

    pub fn with_sweep_policy(mut self, policy: SweepPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn reconciler(&self) -> Arc<OrphanReconciler> {
        let index = Arc::new(ScanningIndex::new(self.works.clone(), self.profile.clone()));
        Arc::new(OrphanReconciler::new(self.storage.clone(), index))
    }

    pub fn scheduler(&self) -> CleanupScheduler {
        CleanupScheduler::new(self.reconciler(), self.policy)
    }

    pub fn deleter(&self) -> SafeDeleter {
        SafeDeleter::new(self.works.clone(), self.profile.clone(), self.storage.clone())
    }

    pub fn work_service(&self) -> WorkService {
        WorkService::new(self.works.clone(), self.deleter(), self.scheduler())
    }

    pub fn profile_service(&self) -> ProfileService {
        ProfileService::new(self.profile.clone(), self.deleter(), self.scheduler())
    }

    pub fn tag_service(&self) -> TagService {
        TagService::new(self.tags.clone(), self.works.clone(), self.cache.clone())
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
