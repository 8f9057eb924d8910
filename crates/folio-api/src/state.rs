//! Application state shared by all handlers.
//!
//! Built from the store traits and a storage backend, so the same wiring serves
//! Postgres in production and the in-memory doubles in tests.

use std::sync::Arc;
use std::time::Duration;

use folio_core::Config;
use folio_db::{ProfileStore, TagStore, WorkStore};
use folio_services::{
    CleanupScheduler, FileValidator, InMemoryTagCache, OrphanReconciler, ProfileService,
    ReferencedFileIndex, SafeDeleter, ScanningIndex, Storage, SweepPolicy, TagService,
    UploadCommitter, WorkService,
};
use sqlx::PgPool;

/// Everything the upload endpoint needs
#[derive(Clone)]
pub struct UploadState {
    pub storage: Arc<dyn Storage>,
    pub committer: UploadCommitter,
    pub validator: FileValidator,
    pub max_files: usize,
    pub default_folder: String,
}

/// Orphan reconciliation for the admin endpoint
#[derive(Clone)]
pub struct CleanupState {
    pub reconciler: Arc<OrphanReconciler>,
    pub index: Arc<dyn ReferencedFileIndex>,
    pub policy: SweepPolicy,
}

#[derive(Clone)]
pub struct AppState {
    pub works: WorkService,
    pub profile: ProfileService,
    pub tags: TagService,
    pub uploads: UploadState,
    pub cleanup: CleanupState,
    /// Present when backed by Postgres; used by the health check
    pub pool: Option<PgPool>,
}

impl AppState {
    pub fn new(
        config: &Config,
        works: Arc<dyn WorkStore>,
        profile: Arc<dyn ProfileStore>,
        tags: Arc<dyn TagStore>,
        storage: Arc<dyn Storage>,
        pool: Option<PgPool>,
    ) -> Self {
        let index: Arc<dyn ReferencedFileIndex> =
            Arc::new(ScanningIndex::new(works.clone(), profile.clone()));
        let reconciler = Arc::new(OrphanReconciler::new(storage.clone(), index.clone()));
        let policy = SweepPolicy::from_config(&config.cleanup);
        let scheduler = CleanupScheduler::new(reconciler.clone(), policy);
        let deleter = SafeDeleter::new(works.clone(), profile.clone(), storage.clone());
        let cache = Arc::new(InMemoryTagCache::new(Duration::from_secs(
            config.tag_cache_ttl_secs,
        )));

        Self {
            works: WorkService::new(works.clone(), deleter.clone(), scheduler.clone()),
            profile: ProfileService::new(profile, deleter, scheduler),
            tags: TagService::new(tags, works, cache),
            uploads: UploadState {
                committer: UploadCommitter::for_storage(storage.clone()),
                storage,
                validator: FileValidator::from_config(&config.upload),
                max_files: config.upload.max_files,
                default_folder: config.upload.default_folder.clone(),
            },
            cleanup: CleanupState {
                reconciler,
                index,
                policy,
            },
            pool,
        }
    }
}
