//! In-memory key-value store for testing.

use crate::KeyValueStore;
use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

/// In-memory key-value store for testing.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use ucss_storage::KeyValueStore;
/// use ucss_storage::kv::MemoryStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::with_values([("tempUsercssCode1", json!({"loading": true}))]);
/// assert!(store.get("tempUsercssCode1").await?.is_some());
/// store.remove(&["tempUsercssCode1".to_string()]).await?;
/// assert!(store.get_all().await?.is_empty());
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MemoryStore {
    storage: RwLock<Map<String, Value>>,
}

impl MemoryStore {
    /// Create a store pre-populated with values.
    pub fn with_values(values: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        let map = values.into_iter().map(|(key, value)| (key.into(), value)).collect();
        Self { storage: RwLock::new(map) }
    }

    /// Stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.storage.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn set_value(&self, key: &str, value: Value) -> Result<()> {
        self.storage.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.storage.read().await.get(key).cloned())
    }

    async fn get_all(&self) -> Result<Map<String, Value>> {
        Ok(self.storage.read().await.clone())
    }

    async fn remove(&self, keys: &[String]) -> Result<()> {
        let mut guard = self.storage.write().await;
        for key in keys {
            guard.remove(key);
        }
        Ok(())
    }
}
