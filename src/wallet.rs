//! Bridge Wallet
//!
//! One private-key signer, built once at startup from the environment
//! secret and shared immutably by all requests.

use alloy::signers::local::PrivateKeySigner;
use anyhow::{Context, Result};

use crate::config::PRIVATE_KEY_ENV;

/// Parse a signer from a hex private key (with or without "0x" prefix).
pub fn wallet_from_key(private_key: &str) -> Result<PrivateKeySigner> {
    private_key
        .trim()
        .parse()
        .context("Failed to parse private key")
}

/// Load the bridge wallet from the `LIT_BRIDGE_PRIVATE_KEY` environment
/// variable. The bridge refuses to start without it.
pub fn load_wallet() -> Result<PrivateKeySigner> {
    let key = std::env::var(PRIVATE_KEY_ENV)
        .with_context(|| format!("{PRIVATE_KEY_ENV} is not set"))?;
    wallet_from_key(&key)
}
