//! HTTP bridge server: shared state, routing, and serving.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::{Mutex, RwLock};

use crate::config::BridgeConfig;
use crate::storage::KvStore;
use crate::types::{LitClient, PkpInfo, PkpMinter};

pub use error::BridgeError;

/// Everything the handlers need, injected once at startup.
pub struct AppState {
    pub config: BridgeConfig,
    /// Bridge wallet, loaded from the environment.
    pub signer: PrivateKeySigner,
    pub lit: Arc<dyn LitClient>,
    pub minter: Arc<dyn PkpMinter>,
    pub store: Arc<dyn KvStore>,
    /// The active PKP record, populated from the store at startup and
    /// replaced on every successful mint.
    pub pkp: RwLock<Option<PkpInfo>>,
    /// Serializes mints so concurrent /createWallet calls cannot
    /// interleave their store writes.
    pub mint_lock: Mutex<()>,
}

/// Build the bridge router over the shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::handle_health))
        .route("/isReady", post(handlers::handle_is_ready))
        .route("/executeJs", post(handlers::handle_execute_js))
        .route("/createWallet", post(handlers::handle_create_wallet))
        .route("/pkp", get(handlers::handle_get_pkp))
        .route("/sign", post(handlers::handle_sign))
        .with_state(state)
}

/// Bind the configured port and serve until shutdown.
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let addr = format!("127.0.0.1:{}", state.config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    tracing::info!(%addr, "Bridge server listening");

    axum::serve(listener, router(state))
        .await
        .context("Server error")?;
    Ok(())
}
