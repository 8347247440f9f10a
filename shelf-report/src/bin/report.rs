//! shelf-report - render the catalog charts
//!
//! Takes one snapshot of the database, computes the ten report views and
//! writes each as a PNG into the output directory.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_common::config::TomlConfig;
use shelf_common::db::connect_readonly;
use shelf_report::{run_report, PngRenderer, ReportOutcome, Snapshot};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for shelf-report
#[derive(Parser, Debug)]
#[command(name = "shelf-report")]
#[command(about = "Render rating statistics as PNG charts")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Directory the charts are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = TomlConfig::load(args.config.as_deref())?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting shelf-report v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    let db_path = config.resolve_database_path(args.database.as_deref());
    let output_dir = config.resolve_reports_dir(args.output_dir.as_deref());
    info!("Reading {}", db_path.display());

    let pool = connect_readonly(&db_path)
        .await
        .context("Failed to open database")?;
    let snapshot = Snapshot::load(&pool).await.context("Failed to read catalog")?;
    pool.close().await;

    let mut renderer = PngRenderer::new(&output_dir);
    match run_report(&snapshot, &mut renderer)? {
        ReportOutcome::InsufficientData => {
            warn!("No charts written");
        }
        ReportOutcome::Generated { written, skipped } => {
            for kind in &skipped {
                warn!("Skipped {}: nothing to plot", kind.file_name());
            }
            info!(
                "Wrote {} charts to {}",
                written,
                renderer.output_dir().display()
            );
        }
    }

    Ok(())
}
