//! Runs the task board server.
//!
//! Configuration comes from `.env`, `taskboard.toml` and `TASKBOARD_*`
//! variables. With `storage.database_url` unset the board keeps its state
//! in memory.

use std::sync::Arc;
use taskboard::{
    app::{assemble, serve, session_coordinator},
    board::{
        adapters::{memory::InMemoryBoardStore, postgres::PostgresBoardStore},
        ports::BoardStoreError,
    },
    config::{BoardConfig, ConfigError},
};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 8;

#[derive(Debug, Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("storage unavailable: {0}")]
    Storage(#[from] BoardStoreError),
    #[error("server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    let config = BoardConfig::load_with_dotenv()?;
    init_tracing(&config.log.filter);

    let listener = TcpListener::bind(&config.server.bind).await?;
    let coordinator = session_coordinator(&config);
    match config.storage.database_url.as_deref() {
        Some(url) => {
            let store = PostgresBoardStore::connect(
                url,
                config
                    .storage
                    .max_connections
                    .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            )?;
            store.ensure_schema().await?;
            info!("using PostgreSQL storage");
            let state = assemble(&config, Arc::new(store), coordinator)?;
            serve(listener, state, shutdown_signal()).await?;
        }
        None => {
            warn!("no database configured; board state lives in memory");
            let state = assemble(&config, Arc::new(InMemoryBoardStore::new()), coordinator)?;
            serve(listener, state, shutdown_signal()).await?;
        }
    }
    info!("task board stopped");
    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
