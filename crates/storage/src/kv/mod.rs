//! Key-value store trait and implementations.
//!
//! Models the browser's extension-local storage area: a flat namespace of
//! string keys holding JSON values.

#[cfg(feature = "mock")]
mod memory;

#[cfg(feature = "mock")]
pub use self::memory::MemoryStore;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use exn::ResultExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Store `value` under `key`, overwriting any previous value.
    async fn set_value(&self, key: &str, value: Value) -> Result<()>;

    /// Fetch the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Snapshot of every stored key and value.
    async fn get_all(&self) -> Result<Map<String, Value>>;

    /// Remove all `keys`. Keys that don't exist are ignored.
    async fn remove(&self, keys: &[String]) -> Result<()>;
}

/// Typed helpers over any [`KeyValueStore`].
#[async_trait]
pub trait KeyValueStoreExt: KeyValueStore {
    async fn set_typed<T: Serialize + Sync>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).or_raise(|| ErrorKind::Serialization)?;
        self.set_value(key, value).await
    }

    async fn get_typed<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .await?
            .map(serde_json::from_value)
            .transpose()
            .or_raise(|| ErrorKind::Serialization)
    }
}
impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

#[cfg(all(test, feature = "mock"))]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Entry {
        written_at: i64,
        code: String,
    }

    #[tokio::test]
    async fn test_typed_roundtrip_through_dyn_store() {
        let store: &dyn KeyValueStore = &MemoryStore::default();
        let entry = Entry { written_at: 5, code: "a{}".into() };
        store.set_typed("entry", &entry).await.unwrap();
        assert_eq!(store.get_typed::<Entry>("entry").await.unwrap(), Some(entry));
        assert_eq!(store.get_typed::<Entry>("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_typed_rejects_wrong_shape() {
        let store = MemoryStore::default();
        store.set_value("entry", Value::Bool(true)).await.unwrap();
        let err = store.get_typed::<Entry>("entry").await.unwrap_err();
        assert_eq!(*err, ErrorKind::Serialization);
    }
}
