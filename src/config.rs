//! Bridge Configuration
//!
//! Loads the bridge's configuration from environment variables, with CLI
//! flags taking precedence and defaults filling the rest.

use std::path::PathBuf;

use anyhow::{bail, Result};

/// Environment variable holding the wallet's private key.
pub const PRIVATE_KEY_ENV: &str = "LIT_BRIDGE_PRIVATE_KEY";

/// Default HTTP port the bridge listens on.
pub const DEFAULT_PORT: u16 = 3092;

/// Default directory for the persisted PKP record.
pub const DEFAULT_STORAGE_DIR: &str = "./lit-bridge-storage";

/// Which signing network the bridge talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LitNetwork {
    /// Development network, free to mint on.
    #[default]
    DatilDev,
    /// Test network.
    DatilTest,
    /// Production network.
    Datil,
}

impl LitNetwork {
    /// Parse a network name as it appears in env/CLI config.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "datil-dev" => Ok(Self::DatilDev),
            "datil-test" => Ok(Self::DatilTest),
            "datil" => Ok(Self::Datil),
            other => bail!("unknown network: {other} (expected datil-dev, datil-test, or datil)"),
        }
    }

    /// Bootstrap node URLs for the network.
    pub fn bootstrap_urls(&self) -> Vec<String> {
        let urls: &[&str] = match self {
            Self::DatilDev => &[
                "https://15.235.83.220:7470",
                "https://15.235.83.220:7471",
                "https://15.235.83.220:7472",
            ],
            Self::DatilTest => &[
                "https://15.235.40.100:7470",
                "https://15.235.40.100:7471",
                "https://15.235.40.100:7472",
            ],
            Self::Datil => &[
                "https://51.255.59.58:443",
                "https://150.136.203.28:443",
                "https://207.244.72.175:443",
            ],
        };
        urls.iter().map(|u| u.to_string()).collect()
    }

    /// JSON-RPC endpoint of the chain the PKP contracts live on.
    pub fn rpc_url(&self) -> &'static str {
        // All three networks mint on Chronicle Yellowstone.
        "https://yellowstone-rpc.litprotocol.com"
    }

    /// Chain ID used in SIWE messages and transactions.
    pub fn chain_id(&self) -> u64 {
        175188
    }
}

/// Storage backend for the persisted PKP record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// One file per key inside the storage directory.
    #[default]
    File,
    /// SQLite kv table at `<storage_dir>/bridge.db`.
    Sqlite,
}

impl StorageBackend {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => bail!("unknown storage backend: {other} (expected file or sqlite)"),
        }
    }
}

/// Resolved bridge configuration, shared by all handlers.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    pub port: u16,
    pub network: LitNetwork,
    pub storage_backend: StorageBackend,
    pub storage_dir: String,
    /// Chain RPC URL; defaults to the network's public endpoint.
    pub rpc_url: String,
}

/// CLI overrides applied on top of environment variables.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub network: Option<String>,
    pub storage_dir: Option<String>,
}

/// Load the bridge config: defaults, then environment, then CLI overrides.
pub fn load_config(overrides: ConfigOverrides) -> Result<BridgeConfig> {
    let port = match overrides.port {
        Some(p) => p,
        None => match std::env::var("LIT_BRIDGE_PORT") {
            Ok(v) => v.parse()?,
            Err(_) => DEFAULT_PORT,
        },
    };

    let network_name = overrides
        .network
        .or_else(|| std::env::var("LIT_BRIDGE_NETWORK").ok());
    let network = match network_name {
        Some(name) => LitNetwork::parse(&name)?,
        None => LitNetwork::default(),
    };

    let storage_backend = match std::env::var("LIT_BRIDGE_STORAGE") {
        Ok(v) => StorageBackend::parse(&v)?,
        Err(_) => StorageBackend::default(),
    };

    let storage_dir = overrides
        .storage_dir
        .or_else(|| std::env::var("LIT_BRIDGE_STORAGE_DIR").ok())
        .unwrap_or_else(|| DEFAULT_STORAGE_DIR.to_string());

    let rpc_url = std::env::var("LIT_RPC_URL").unwrap_or_else(|_| network.rpc_url().to_string());

    Ok(BridgeConfig {
        port,
        network,
        storage_backend,
        storage_dir: resolve_path(&storage_dir),
        rpc_url,
    })
}

/// Resolve a path that may start with `~` to an absolute path.
///
/// If the path starts with `~`, the tilde is replaced with the user's home
/// directory. Otherwise the path is returned as-is.
pub fn resolve_path(p: &str) -> String {
    if let Some(rest) = p.strip_prefix('~') {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/root"));
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        home.join(rest).to_string_lossy().to_string()
    } else {
        p.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_with_tilde() {
        let resolved = resolve_path("~/some/path");
        assert!(!resolved.starts_with('~'));
        assert!(resolved.ends_with("some/path"));
    }

    #[test]
    fn test_resolve_path_without_tilde() {
        let path = "/absolute/path/to/file";
        assert_eq!(resolve_path(path), path);
    }

    #[test]
    fn test_network_parse() {
        assert_eq!(LitNetwork::parse("datil-dev").unwrap(), LitNetwork::DatilDev);
        assert_eq!(LitNetwork::parse("datil").unwrap(), LitNetwork::Datil);
        assert!(LitNetwork::parse("mainnet").is_err());
    }

    #[test]
    fn test_network_has_bootstrap_urls() {
        for network in [LitNetwork::DatilDev, LitNetwork::DatilTest, LitNetwork::Datil] {
            assert!(!network.bootstrap_urls().is_empty());
        }
    }

    #[test]
    fn test_storage_backend_parse() {
        assert_eq!(StorageBackend::parse("file").unwrap(), StorageBackend::File);
        assert_eq!(StorageBackend::parse("sqlite").unwrap(), StorageBackend::Sqlite);
        assert!(StorageBackend::parse("redis").is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config = load_config(ConfigOverrides {
            port: Some(4000),
            network: Some("datil-test".to_string()),
            storage_dir: Some("/tmp/lit-bridge-test".to_string()),
        })
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.network, LitNetwork::DatilTest);
        assert_eq!(config.storage_dir, "/tmp/lit-bridge-test");
    }
}
