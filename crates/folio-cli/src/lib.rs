//! Maintenance commands for the portfolio bucket.
//!
//! `folio-sweep sweep` deletes files no work or profile references; `index` prints
//! the referenced paths. Both read the same configuration as the API.

use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use folio_core::Config;
use folio_db::{ProfileRepository, ProfileStore, WorkRepository, WorkStore};
use folio_services::{
    create_storage, CleanupError, OrphanReconciler, ReconcileReport, ReferencedFileIndex,
    ScanningIndex,
};
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;

/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Database-backed index and reconciler built from configuration
pub struct SweepContext {
    pub index: Arc<dyn ReferencedFileIndex>,
    pub reconciler: OrphanReconciler,
}

impl SweepContext {
    pub async fn connect(config: &Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(2)
            .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
            .connect(config.database_url())
            .await
            .context("Failed to connect to database")?;

        let storage = create_storage(config)
            .await
            .context("Failed to initialize storage backend")?;

        let works: Arc<dyn WorkStore> = Arc::new(WorkRepository::new(pool.clone()));
        let profile: Arc<dyn ProfileStore> = Arc::new(ProfileRepository::new(pool));
        let index: Arc<dyn ReferencedFileIndex> = Arc::new(ScanningIndex::new(works, profile));

        Ok(Self {
            reconciler: OrphanReconciler::new(storage, index.clone()),
            index,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SweepOutcome {
    DryRun {
        scanned: usize,
        referenced: usize,
        orphaned: usize,
        eligible: Vec<String>,
    },
    Swept(ReconcileReport),
}

pub async fn run_sweep(
    reconciler: &OrphanReconciler,
    max_age: Duration,
    dry_run: bool,
) -> Result<SweepOutcome, CleanupError> {
    if dry_run {
        let scan = reconciler.find_orphans(max_age).await?;
        return Ok(SweepOutcome::DryRun {
            scanned: scan.scanned,
            referenced: scan.referenced,
            orphaned: scan.orphaned,
            eligible: scan.eligible.into_iter().map(|o| o.path).collect(),
        });
    }

    reconciler.reconcile(max_age).await.map(SweepOutcome::Swept)
}

/// Sorted referenced paths
pub async fn list_referenced(index: &dyn ReferencedFileIndex) -> Result<Vec<String>, CleanupError> {
    let referenced = index.build_index().await?;
    let mut paths: Vec<String> = referenced.iter().cloned().collect();
    paths.sort();
    Ok(paths)
}

pub fn render_table(outcome: &SweepOutcome) -> String {
    let mut out = String::new();
    match outcome {
        SweepOutcome::DryRun {
            scanned,
            referenced,
            orphaned,
            eligible,
        } => {
            let _ = writeln!(out, "Dry run: nothing deleted");
            let _ = writeln!(out, "  scanned:    {}", scanned);
            let _ = writeln!(out, "  referenced: {}", referenced);
            let _ = writeln!(out, "  orphaned:   {}", orphaned);
            let _ = writeln!(out, "  would delete {}:", eligible.len());
            for path in eligible {
                let _ = writeln!(out, "    {}", path);
            }
        }
        SweepOutcome::Swept(report) => {
            let _ = writeln!(out, "  scanned:    {}", report.scanned);
            let _ = writeln!(out, "  referenced: {}", report.referenced);
            let _ = writeln!(out, "  orphaned:   {}", report.orphaned);
            let _ = writeln!(out, "  deleted:    {}", report.deleted_count);
            if !report.errors.is_empty() {
                let _ = writeln!(out, "  errors:     {}", report.errors.len());
                for failure in &report.errors {
                    let _ = writeln!(out, "    {}: {}", failure.path, failure.reason);
                }
            }
        }
    }
    out
}
