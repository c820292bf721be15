//! Vida+ server: application entry point.
//!
//! Loads configuration, selects the identity store, checks its health and
//! builds the auth engine, then waits for a shutdown signal. No network
//! transport is mounted by this binary; the engine is held until shutdown.

mod config;
mod error;

use std::process::ExitCode;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use vida_auth::{AuthConfig, AuthService};
use vida_core::IdentityStore;
use vida_core::health;
use vida_db::{DbManager, MemoryIdentityStore};

use crate::config::{ServerConfig, StoreKind};
use crate::error::ServerError;

const DEFAULT_LOG_FILTER: &str = "vida=info";

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    info!("Starting Vida+ auth server...");

    match run().await {
        Ok(()) => {
            info!("Vida+ auth server stopped.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Vida+ auth server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), ServerError> {
    let config = ServerConfig::load()?;
    info!(
        store = ?config.store,
        issuer = %config.auth.jwt_issuer,
        "configuration loaded"
    );

    match config.store {
        StoreKind::Memory => {
            warn!("using in-memory identity store; identities are lost on shutdown");
            serve(MemoryIdentityStore::new(), config.auth).await
        }
        StoreKind::Surreal => {
            let manager = DbManager::open(&config.db).await?;
            serve(manager.identity_store(), config.auth).await
        }
    }
}

async fn serve<S>(store: S, auth: AuthConfig) -> Result<(), ServerError>
where
    S: IdentityStore,
{
    let report = health::check(&store).await;
    if !report.is_healthy() {
        return Err(ServerError::Unhealthy(report.error.unwrap_or_default()));
    }
    info!(status = ?report.status, "identity store health check passed");

    let service = AuthService::new(store, auth)?;
    info!(
        access_token_lifetime_secs = service.codec().access_lifetime_secs(),
        "auth engine ready"
    );

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    Ok(())
}
