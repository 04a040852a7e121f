//! 持久化存储抽象 Trait

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::CoreResult;

/// Durable key/value store shared by all components
///
/// Each component owns a disjoint set of keys and (de)serializes its own
/// values, so the store only deals in raw strings.
///
/// 平台实现:
/// - `hostdeck-app`: `JsonFileStore` (单个 JSON 文件)
/// - 测试与无盘模式: `InMemoryStore`
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read a raw value
    ///
    /// # Returns
    /// * `Ok(Some(value))` - key present
    /// * `Ok(None)` - key absent
    async fn get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Write a raw value, replacing any previous one
    async fn set(&self, key: &str, value: &str) -> CoreResult<()>;

    /// Delete a key; absent keys are not an error
    async fn remove(&self, key: &str) -> CoreResult<()>;
}

/// In-memory store
///
/// Default implementation, nothing survives the process.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    values: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PersistentStore for InMemoryStore {
    async fn get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> CoreResult<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}
