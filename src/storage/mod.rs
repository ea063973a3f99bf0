//! Local Store
//!
//! Key-value persistence for the single minted PKP record, behind an
//! explicit read/write/clear interface so the backend stays swappable.
//! Two backends: one file per key, or a SQLite kv table.

pub mod file;
pub mod sqlite;

use anyhow::{Context, Result};

use crate::config::{BridgeConfig, StorageBackend};
use crate::types::PkpInfo;

pub use file::FileKvStore;
pub use sqlite::SqliteKvStore;

/// Fixed key the minted PKP record is persisted under.
pub const PKP_KEY: &str = "pkp";

/// Simple key-value persistence. Values are opaque strings; callers
/// layer their own serialization on top.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn delete(&self, key: &str) -> Result<()>;
}

/// Open the store backend selected by the config.
pub fn open_store(config: &BridgeConfig) -> Result<Box<dyn KvStore>> {
    match config.storage_backend {
        StorageBackend::File => Ok(Box::new(FileKvStore::new(&config.storage_dir)?)),
        StorageBackend::Sqlite => {
            let db_path = format!("{}/bridge.db", config.storage_dir);
            Ok(Box::new(SqliteKvStore::open(&db_path)?))
        }
    }
}

/// Load the persisted PKP record, if any.
pub fn load_pkp(store: &dyn KvStore) -> Result<Option<PkpInfo>> {
    match store.get(PKP_KEY)? {
        Some(raw) => {
            let pkp = serde_json::from_str(&raw).context("Failed to parse stored PKP record")?;
            Ok(Some(pkp))
        }
        None => Ok(None),
    }
}

/// Persist the PKP record, overwriting any previous one.
pub fn save_pkp(store: &dyn KvStore, pkp: &PkpInfo) -> Result<()> {
    let json = serde_json::to_string(pkp).context("Failed to serialize PKP record")?;
    store.set(PKP_KEY, &json)
}
