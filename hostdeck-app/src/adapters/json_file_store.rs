//! JSON file backed `PersistentStore`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use hostdeck_core::error::{CoreError, CoreResult};
use hostdeck_core::traits::PersistentStore;
use tokio::sync::RwLock;

/// Key/value store persisted as a single JSON object.
///
/// Values are kept in memory; every write rewrites the file through a
/// temporary sibling and a rename, so a crash never leaves a half-written file.
pub struct JsonFileStore {
    path: PathBuf,
    cache: RwLock<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open (or create on first write) the store at `path`.
    ///
    /// An unreadable file starts the store empty; the bad file is only
    /// replaced on the next write.
    ///
    /// # Errors
    /// Returns `CoreError::StorageError` if the parent directory cannot be created.
    pub async fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let load_path = path.clone();
        let cache = tokio::task::spawn_blocking(move || read_file(&load_path))
            .await
            .map_err(|e| CoreError::StorageError(format!("Load task failed: {e}")))??;

        log::debug!("Opened {} with {} key(s)", path.display(), cache.len());
        Ok(Self {
            path,
            cache: RwLock::new(cache),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes are serialized by the held cache lock.
    async fn persist(&self, snapshot: BTreeMap<String, String>) -> CoreResult<()> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_file(&path, &snapshot))
            .await
            .map_err(|e| CoreError::StorageError(format!("Write task failed: {e}")))?
    }
}

fn read_file(path: &Path) -> CoreResult<BTreeMap<String, String>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::StorageError(format!("Failed to create directory: {e}")))?;
    }

    match std::fs::read_to_string(path) {
        Ok(raw) => Ok(serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::warn!("Store file {} is corrupted, starting empty: {e}", path.display());
            BTreeMap::new()
        })),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(CoreError::StorageError(format!(
            "Failed to read {}: {e}",
            path.display()
        ))),
    }
}

fn write_file(path: &Path, values: &BTreeMap<String, String>) -> CoreResult<()> {
    let json = serde_json::to_string_pretty(values)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)
        .map_err(|e| CoreError::StorageError(format!("Failed to write {}: {e}", tmp.display())))?;
    std::fs::rename(&tmp, path)
        .map_err(|e| CoreError::StorageError(format!("Failed to replace {}: {e}", path.display())))
}

#[async_trait]
impl PersistentStore for JsonFileStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.cache.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut cache = self.cache.write().await;
        let mut next = cache.clone();
        next.insert(key.to_string(), value.to_string());
        self.persist(next.clone()).await?;
        *cache = next;
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        let mut cache = self.cache.write().await;
        if !cache.contains_key(key) {
            return Ok(());
        }
        let mut next = cache.clone();
        next.remove(key);
        self.persist(next.clone()).await?;
        *cache = next;
        Ok(())
    }
}
