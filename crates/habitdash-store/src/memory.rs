use std::collections::HashMap;

use parking_lot::Mutex;

use crate::backend::{BlobStore, PersistenceResult};

/// In-memory backend. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.blobs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.lock().is_empty()
    }
}

impl BlobStore for MemoryBlobStore {
    fn load(&self, name: &str) -> PersistenceResult<Option<String>> {
        Ok(self.blobs.lock().get(name).cloned())
    }

    fn save(&self, name: &str, blob: &str) -> PersistenceResult<()> {
        self.blobs.lock().insert(name.to_string(), blob.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_is_none() {
        let store = MemoryBlobStore::new();
        assert!(store.load("habits-storage").unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_overwrites() {
        let store = MemoryBlobStore::new();
        store.save("a", "first").unwrap();
        store.save("a", "second").unwrap();
        assert_eq!(store.load("a").unwrap().as_deref(), Some("second"));
        assert_eq!(store.len(), 1);
    }
}
