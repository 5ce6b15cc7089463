//! livecrew-api - production planning service
//!
//! Serves the REST API for productions, segments, crew assignments and
//! title definitions on top of a local SQLite database.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use livecrew_api::{build_router, AppState};
use livecrew_common::config::{ConfigFile, ConfigOverrides, ServiceConfig};
use livecrew_common::db::init_database;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for livecrew-api
#[derive(Parser, Debug)]
#[command(name = "livecrew-api")]
#[command(about = "Production planning service for LiveCrew")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "LIVECREW_PORT")]
    port: Option<u16>,

    /// Address to bind to
    #[arg(short, long, env = "LIVECREW_BIND")]
    bind: Option<String>,

    /// Root folder holding livecrew.db
    #[arg(short, long, env = "LIVECREW_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config_file = ConfigFile::discover();
    let config = ServiceConfig::resolve(
        ConfigOverrides {
            root_folder: args.root_folder,
            port: args.port,
            bind_address: args.bind,
        },
        config_file.config(),
    );

    // RUST_LOG wins over the TOML log_level
    let default_filter = format!(
        "livecrew_api={level},livecrew_common={level},tower_http={level}",
        level = config.log_level
    );
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting LiveCrew API (livecrew-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    config_file.report();
    info!("Root folder: {}", config.root_folder.display());

    let db_path = config.database_path();
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let app = build_router(AppState::new(pool));

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("livecrew-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
