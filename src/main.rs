//! Lit Bridge Server
//!
//! The entry point for the local signing bridge. Loads the wallet from
//! the environment, opens the PKP store, kicks off the network handshake
//! in the background, and serves the JSON endpoints until shutdown.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::{Mutex, RwLock};

use lit_bridge::config::{self, ConfigOverrides};
use lit_bridge::lit::{ContractPkpMinter, HttpLitClient};
use lit_bridge::server::{self, AppState};
use lit_bridge::storage;
use lit_bridge::types::LitClient;
use lit_bridge::wallet;

/// Lit Bridge -- local JSON bridge to the Lit signing network
#[derive(Parser, Debug)]
#[command(
    name = "lit-bridge",
    version,
    about = "Local JSON bridge to the Lit signing network"
)]
struct Cli {
    /// Port to listen on (default 3092)
    #[arg(long)]
    port: Option<u16>,

    /// Network to connect to: datil-dev, datil-test, or datil
    #[arg(long)]
    network: Option<String>,

    /// Directory for the persisted PKP record
    #[arg(long)]
    storage_dir: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = config::load_config(ConfigOverrides {
        port: cli.port,
        network: cli.network,
        storage_dir: cli.storage_dir,
    })?;

    let signer = wallet::load_wallet().context("Failed to load the bridge wallet")?;
    tracing::info!(
        address = %signer.address().to_checksum(None),
        network = ?config.network,
        "Bridge wallet loaded"
    );

    let store: Arc<dyn storage::KvStore> = Arc::from(storage::open_store(&config)?);
    let pkp = storage::load_pkp(store.as_ref()).context("Failed to read the PKP store")?;
    if let Some(pkp) = &pkp {
        tracing::info!(eth_address = %pkp.eth_address, "Loaded persisted PKP");
    }

    let lit = Arc::new(HttpLitClient::new(config.network));
    let minter = Arc::new(ContractPkpMinter::new(
        config.rpc_url.clone(),
        config.network,
        signer.clone(),
    ));

    let state = Arc::new(AppState {
        config,
        signer,
        lit: lit.clone(),
        minter,
        store,
        pkp: RwLock::new(pkp),
        mint_lock: Mutex::new(()),
    });

    // Handshake in the background so the server comes up immediately;
    // /isReady reports false until a node threshold answers.
    tokio::spawn(async move {
        if let Err(e) = lit.connect().await {
            tracing::error!(error = %e, "Initial network handshake failed");
        }
    });

    server::serve(state).await
}
