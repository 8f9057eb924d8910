//! Repository and service wiring

use std::sync::Arc;

use folio_core::Config;
use folio_db::{
    ProfileRepository, ProfileStore, TagRepository, TagStore, WorkRepository, WorkStore,
};
use folio_services::Storage;
use sqlx::PgPool;

use crate::state::AppState;

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let works: Arc<dyn WorkStore> = Arc::new(WorkRepository::new(pool.clone()));
    let profile: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(pool.clone()));
    let tags: Arc<dyn TagStore> = Arc::new(TagRepository::new(pool.clone()));

    let state = AppState::new(config, works, profile, tags, storage, Some(pool));
    tracing::info!(
        cleanup_enabled = state.cleanup.policy.enabled,
        edit_floor_secs = state.cleanup.policy.after_edit.as_secs(),
        delete_floor_secs = state.cleanup.policy.after_delete.as_secs(),
        "Services initialized"
    );

    Arc::new(state)
}
