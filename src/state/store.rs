use crate::error::BlobError;
use indexmap::IndexMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as Json;

/// Key/value blob storage a host can hand submitted forms to.
/// `get` reports a missing key as `None`; `list` returns every key.
pub trait BlobStore {
    fn put(&mut self, key: &str, value: Json) -> Result<(), BlobError>;
    fn list(&self) -> Vec<String>;
    fn get(&self, key: &str) -> Option<Json>;
}

#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: IndexMap<String, Json>,
    uploads_disabled: bool,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every `put` with `BlobError::UploadsDisabled`; reads still work.
    pub fn read_only() -> Self {
        Self {
            blobs: IndexMap::new(),
            uploads_disabled: true,
        }
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn put(&mut self, key: &str, value: Json) -> Result<(), BlobError> {
        if self.uploads_disabled {
            return Err(BlobError::UploadsDisabled);
        }
        tracing::debug!(key, "stored blob");
        self.blobs.insert(key.to_string(), value);
        Ok(())
    }

    fn list(&self) -> Vec<String> {
        self.blobs.keys().cloned().collect()
    }

    fn get(&self, key: &str) -> Option<Json> {
        self.blobs.get(key).cloned()
    }
}

pub fn put_json<T: Serialize>(
    store: &mut dyn BlobStore,
    key: &str,
    value: &T,
) -> Result<(), BlobError> {
    let json = serde_json::to_value(value).map_err(|source| BlobError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.put(key, json)
}

pub fn get_json<T: DeserializeOwned>(
    store: &dyn BlobStore,
    key: &str,
) -> Result<Option<T>, BlobError> {
    let Some(json) = store.get(key) else {
        return Ok(None);
    };
    serde_json::from_value(json)
        .map(Some)
        .map_err(|source| BlobError::Decode {
            key: key.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::{BlobStore, MemoryBlobStore, get_json, put_json};
    use crate::error::BlobError;
    use serde_json::json;

    #[test]
    fn missing_key_is_none() {
        let store = MemoryBlobStore::new();
        assert_eq!(store.get("nope"), None);
        let typed: Option<String> = get_json(&store, "nope").expect("no decode error");
        assert_eq!(typed, None);
    }

    #[test]
    fn list_returns_keys_in_insertion_order() {
        let mut store = MemoryBlobStore::new();
        store.put("b", json!({"n": 1})).expect("put");
        store.put("a", json!({"n": 2})).expect("put");
        store.put("b", json!({"n": 3})).expect("overwrite");
        assert_eq!(store.list(), vec!["b".to_string(), "a".to_string()]);
        assert_eq!(store.get("b"), Some(json!({"n": 3})));
    }

    #[test]
    fn typed_round_trip_through_json() {
        let mut store = MemoryBlobStore::new();
        put_json(&mut store, "shape", &vec![1, 2, 3]).expect("put");
        let back: Option<Vec<u8>> = get_json(&store, "shape").expect("decode");
        assert_eq!(back, Some(vec![1, 2, 3]));
    }

    #[test]
    fn read_only_store_refuses_uploads() {
        let mut store = MemoryBlobStore::read_only();
        assert!(matches!(
            store.put("k", json!(null)),
            Err(BlobError::UploadsDisabled)
        ));
        assert!(store.is_empty());
    }
}
