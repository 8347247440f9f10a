//! shelf-recommend - best-rated books of a genre
//!
//! Prints up to ten books of the genre, ranked by mean score, as a text
//! table on stdout.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shelf_common::config::TomlConfig;
use shelf_common::db::connect_readonly;
use shelf_report::recommend::{format_table, recommend, Recommendation};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for shelf-recommend
#[derive(Parser, Debug)]
#[command(name = "shelf-recommend")]
#[command(about = "Recommend the best-rated books of a genre")]
#[command(version)]
struct Args {
    /// Genre id
    genre_id: i64,

    /// TOML configuration file
    #[arg(short, long, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = TomlConfig::load(args.config.as_deref())?;

    // Log to stderr; stdout carries the table
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting shelf-recommend v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    let db_path = config.resolve_database_path(args.database.as_deref());
    let pool = connect_readonly(&db_path)
        .await
        .context("Failed to open database")?;

    match recommend(&pool, args.genre_id).await? {
        Recommendation::GenreNotFound { genre_id } => {
            error!("Genre {} does not exist", genre_id);
        }
        Recommendation::NoBooks { genre } => {
            warn!("Genre '{}' has no books", genre.name);
        }
        Recommendation::Ranked { genre, rows } => {
            println!("Top books in {}:\n", genre.name);
            print!("{}", format_table(&rows));
        }
    }

    pool.close().await;
    Ok(())
}
