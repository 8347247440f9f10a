//! shelf-api - catalog and ratings HTTP service
//!
//! Serves create/read/update/delete endpoints for authors, genres, books and
//! ratings. Also registers user accounts from the command line, since there
//! is no sign-up endpoint.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shelf_api::{build_router, AppState};
use shelf_common::config::TomlConfig;
use shelf_common::db::{init_database, users};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for shelf-api
#[derive(Parser, Debug)]
#[command(name = "shelf-api")]
#[command(about = "Catalog and ratings HTTP service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "SHELF_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(short, long)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "SHELF_PORT")]
        port: Option<u16>,
    },
    /// Register a user account
    CreateUser {
        username: String,
        #[arg(long, env = "SHELF_USER_PASSWORD")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let (config, source) = TomlConfig::load(args.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{},tower_http=debug", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting shelf-api v{}", env!("CARGO_PKG_VERSION"));
    source.log();

    let db_path = config.resolve_database_path(args.database.as_deref());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .context("Failed to open database")?;

    match args.command.unwrap_or(Command::Serve { port: None }) {
        Command::CreateUser { username, password } => {
            let user = users::create_user(&pool, &username, &password).await?;
            info!("Created user '{}' (id {})", user.username, user.id);
            Ok(())
        }
        Command::Serve { port } => {
            let port = port.unwrap_or(config.port);
            let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
                .parse()
                .context("Invalid bind address")?;

            let app = build_router(AppState::new(pool));

            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .context("Failed to bind to address")?;
            info!("shelf-api listening on http://{}", addr);
            info!("Health check: http://{}/health", addr);

            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown_signal())
                .await
                .context("Server error")?;

            info!("Server shutdown complete");
            Ok(())
        }
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
