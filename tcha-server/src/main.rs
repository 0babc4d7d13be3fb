//! tcha-server - TchaMusic HTTP service
//!
//! Zero-config startup: every option has a default, the TOML file is
//! optional and the database is created on first run.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tcha_common::config::{RootFolderInitializer, RootFolderResolver, TomlConfig};
use tcha_common::db::init_database;
use tcha_common::time;
use tcha_server::config::{CliOverrides, ServerConfig};
use tcha_server::db::users;
use tcha_server::{build_router, AppState};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tcha-server", version, about = "TchaMusic music sharing service")]
struct Args {
    /// TOML config file (default: ~/.config/tchamusic/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Root folder holding the database and log file
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Database file, overrides <root-folder>/tchamusic.db
    #[arg(long, env = "TCHA_DATABASE")]
    database: Option<PathBuf>,

    #[arg(long, env = "TCHA_HOST")]
    host: Option<String>,

    #[arg(short, long, env = "TCHA_PORT")]
    port: Option<u16>,

    /// trace, debug, info, warn or error; RUST_LOG wins when set
    #[arg(long)]
    log_level: Option<String>,
}

fn init_tracing(config: &ServerConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
    Ok(())
}

fn load_toml(path: Option<PathBuf>) -> TomlConfig {
    match path.or_else(|| RootFolderResolver::new("config").config_file_path()) {
        Some(path) if path.exists() => TomlConfig::load_or_default(&path),
        _ => TomlConfig::default(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = ServerConfig::resolve(
        CliOverrides {
            root_folder: args.root_folder,
            database: args.database,
            host: args.host,
            port: args.port,
            log_level: args.log_level,
        },
        load_toml(args.config),
    );

    // Root folder first so a relative log file has somewhere to go
    let initializer = RootFolderInitializer::new(config.root_folder.clone());
    initializer.ensure_directory_exists()?;

    init_tracing(&config)?;

    info!(
        "Starting TchaMusic server (tcha-server) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Root folder: {}", config.root_folder.display());
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::load(pool.clone(), &config.public_base_url).await?;
    info!(
        max_upload_bytes = state.settings.max_upload_bytes,
        song_list_limit = state.settings.song_list_limit,
        "Runtime settings loaded"
    );

    match users::purge_expired_sessions(&pool, &time::timestamp()).await {
        Ok(0) => {}
        Ok(purged) => info!(purged, "Removed expired sessions"),
        Err(e) => warn!("Failed to purge expired sessions: {}", e),
    }

    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("tcha-server listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
