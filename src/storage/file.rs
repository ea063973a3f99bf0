//! File-backed key-value store: one file per key inside the storage
//! directory, created with restrictive permissions.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::KvStore;

pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Create the store, making the directory (mode 0o700) if needed.
    pub fn new(dir: &str) -> Result<Self> {
        let dir = PathBuf::from(dir);
        if !dir.exists() {
            fs::create_dir_all(&dir).context("Failed to create storage directory")?;
            fs::set_permissions(&dir, fs::Permissions::from_mode(0o700))
                .context("Failed to set storage directory permissions")?;
        }
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KvStore for FileKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stored value: {}", path.display()))?;
        Ok(Some(contents))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write stored value: {}", path.display()))?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .context("Failed to set stored value permissions")?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to delete stored value: {}", path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (FileKvStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("lit-bridge-file-{}", uuid::Uuid::new_v4()));
        let store = FileKvStore::new(dir.to_str().unwrap()).unwrap();
        (store, dir)
    }

    #[test]
    fn test_get_missing_key_is_none() {
        let (store, dir) = temp_store();
        assert!(store.get("nothing").unwrap().is_none());
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_value_survives_reopen() {
        let (store, dir) = temp_store();
        store.set("pkp", "{\"x\":1}").unwrap();
        drop(store);

        let reopened = FileKvStore::new(dir.to_str().unwrap()).unwrap();
        assert_eq!(reopened.get("pkp").unwrap().as_deref(), Some("{\"x\":1}"));
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_file_permissions_are_restrictive() {
        let (store, dir) = temp_store();
        store.set("pkp", "secret").unwrap();
        let mode = fs::metadata(dir.join("pkp")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_delete_is_idempotent() {
        let (store, dir) = temp_store();
        store.set("pkp", "v").unwrap();
        store.delete("pkp").unwrap();
        store.delete("pkp").unwrap();
        assert!(store.get("pkp").unwrap().is_none());
        fs::remove_dir_all(dir).unwrap();
    }
}
