use std::sync::Arc;

use tracing::debug;

use crate::{KeyValueStore, ProgressRecord, StoreError};

/// Default key namespace for progress records.
pub const DEFAULT_NAMESPACE: &str = "chunklift";

/// Reads and writes [`ProgressRecord`]s in a [`KeyValueStore`], one record
/// per upload id.
///
/// Keys are `"{namespace}.{id}"`. The namespace is an explicit constructor
/// parameter so independent stores can share one backend without colliding.
pub struct ProgressStore {
    store: Arc<dyn KeyValueStore>,
    namespace: String,
}

impl ProgressStore {
    /// Creates a progress store over `store` under `namespace`.
    pub fn new(store: Arc<dyn KeyValueStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    fn key(&self, id: &str) -> String {
        format!("{}.{}", self.namespace, id)
    }

    /// Returns the record for `id`.
    ///
    /// A missing record is a normal state, not an error: an empty record
    /// with the given `chunk_size` and `file_size` is synthesized.
    pub fn read(
        &self,
        id: &str,
        chunk_size: u64,
        file_size: u64,
    ) -> Result<ProgressRecord, StoreError> {
        match self.store.get(&self.key(id))? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(ProgressRecord::new(chunk_size, file_size)),
        }
    }

    /// Writes the record for `id`.
    pub fn write(&self, id: &str, record: &ProgressRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(record)?;
        self.store.set(&self.key(id), &json)
    }

    /// Deletes the record for `id`.
    pub fn clear(&self, id: &str) -> Result<(), StoreError> {
        debug!(id, "clearing progress record");
        self.store.remove(&self.key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;

    fn progress_store() -> (Arc<MemoryStore>, ProgressStore) {
        let backend = Arc::new(MemoryStore::new());
        let store = ProgressStore::new(backend.clone(), DEFAULT_NAMESPACE);
        (backend, store)
    }

    #[test]
    fn missing_record_synthesizes_default() {
        let (_, store) = progress_store();
        let record = store.read("up-1", 1024, 9000).unwrap();
        assert!(!record.started);
        assert_eq!(record.chunk_size, 1024);
        assert_eq!(record.file_size, 9000);
        assert_eq!(record.resume_index(), 0);
    }

    #[test]
    fn write_then_read_roundtrip() {
        let (_, store) = progress_store();
        let mut record = ProgressRecord::new(1024, 9000);
        record.add_checksum(0, "c0".into());
        store.write("up-1", &record).unwrap();

        let back = store.read("up-1", 1024, 9000).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn clear_removes_record() {
        let (_, store) = progress_store();
        let mut record = ProgressRecord::new(1024, 9000);
        record.add_checksum(0, "c0".into());
        store.write("up-1", &record).unwrap();

        store.clear("up-1").unwrap();
        let back = store.read("up-1", 1024, 9000).unwrap();
        assert!(!back.started);
        assert_eq!(back.resume_index(), 0);
    }

    #[test]
    fn ids_are_scoped_by_namespace() {
        let backend = Arc::new(MemoryStore::new());
        let a = ProgressStore::new(backend.clone(), "ns-a");
        let b = ProgressStore::new(backend.clone(), "ns-b");

        let mut record = ProgressRecord::new(512, 2048);
        record.add_checksum(0, "c0".into());
        a.write("shared-id", &record).unwrap();

        assert!(!b.read("shared-id", 512, 2048).unwrap().started);
        assert!(a.read("shared-id", 512, 2048).unwrap().started);

        // The raw key carries the namespace prefix.
        assert!(backend.get("ns-a.shared-id").unwrap().is_some());
    }

    #[test]
    fn distinct_ids_do_not_collide() {
        let (_, store) = progress_store();
        let mut record = ProgressRecord::new(512, 2048);
        record.add_checksum(0, "c0".into());
        store.write("one", &record).unwrap();

        assert!(!store.read("two", 512, 2048).unwrap().started);
    }
}
