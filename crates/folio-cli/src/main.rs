//! folio-sweep: orphaned-file maintenance for the portfolio bucket.
//!
//! Reads the same environment as the API (DATABASE_URL, STORAGE_*, SUPABASE_*).

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use folio_cli::{init_tracing, list_referenced, render_table, run_sweep, SweepContext};
use folio_core::Config;

#[derive(Parser)]
#[command(name = "folio-sweep", about = "Delete files no record references")]
struct Cli {
    /// Output format: json or table
    #[arg(long, global = true, default_value = "table")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Delete unreferenced files older than the age floor
    Sweep {
        /// Minimum age in minutes; defaults to CLEANUP_EDIT_AGE_MINUTES
        #[arg(long)]
        max_age_minutes: Option<u64>,
        /// Report what would be deleted without deleting
        #[arg(long)]
        dry_run: bool,
    },
    /// Print every object path referenced by works and the profile
    Index,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = Config::from_env()?;
    config
        .validate()
        .context("Configuration validation failed")?;
    let ctx = SweepContext::connect(&config).await?;
    let json = cli.format == "json";

    match cli.command {
        Commands::Sweep {
            max_age_minutes,
            dry_run,
        } => {
            let minutes = max_age_minutes.unwrap_or(config.cleanup.edit_age_minutes);
            let max_age = Duration::from_secs(minutes.saturating_mul(60));
            let outcome = run_sweep(&ctx.reconciler, max_age, dry_run).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
            } else {
                print!("{}", render_table(&outcome));
            }
        }
        Commands::Index => {
            let paths = list_referenced(ctx.index.as_ref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&paths)?);
            } else {
                for path in &paths {
                    println!("{}", path);
                }
                eprintln!("{} referenced paths", paths.len());
            }
        }
    }

    Ok(())
}
