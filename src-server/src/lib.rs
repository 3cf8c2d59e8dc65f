//! Activity Hub Backend
//!
//! Layered architecture:
//! - domain: Core entities and validation rules
//! - repository: Owner-scoped SQLite data access
//! - storage: Upload validation and bucket store
//! - commands: Operations behind the API
//! - http: axum router, extractors, envelopes

use std::sync::Arc;

use log::{error, info};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;

pub mod auth;
pub mod commands;
pub mod config;
pub mod domain;
pub mod http;
pub mod pokeapi;
pub mod repository;
pub mod state;
pub mod storage;

use config::{Config, ConfigError};
use domain::{DomainError, OwnerId};
use pokeapi::PokeApiCatalog;
use repository::init_db;
use state::{AppState, SharedState};
use storage::LocalBucketStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Logger: {0}")]
    Logger(String),
    #[error("Database: {0}")]
    Database(#[from] DomainError),
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("Server error: {0}")]
    Serve(std::io::Error),
}

/// Open the database, seed the development session and wire the stores
pub async fn build_state(config: Config) -> Result<SharedState, DomainError> {
    let db = init_db(&config.db_path).await?;
    info!("Database ready at {}", config.db_path.display());

    let blobs = Arc::new(LocalBucketStore::new(&config.storage_dir, &config.public_url));
    let catalog = Arc::new(PokeApiCatalog::new(&config.pokeapi_url)?);
    let dev_token = config.dev_token.clone();
    let state = AppState::new(config, db, blobs, catalog);

    if let Some(token) = dev_token {
        let owner = OwnerId::new("dev");
        state.sessions.upsert_profile(&owner, "developer").await?;
        state.sessions.insert_token(&owner, &token).await?;
        info!("Development session seeded for profile {}", owner);
    }

    Ok(state)
}

pub async fn run() -> Result<(), StartupError> {
    rolling_logger::init_logger(Config::log_dir(), "ActivityHub")
        .map_err(StartupError::Logger)?;
    let config = Config::load()?;

    let address = format!("0.0.0.0:{}", config.port);
    let state = build_state(config).await?;
    let app = http::router(state.clone());

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(StartupError::Serve)?;

    state.db.close().await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
