use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use super::{DocumentReader, DocumentWriter};
use crate::errors::{Error, Result};

/// In-process store over a shared map. Clones share the same entries, so one
/// instance can serve as both the reader and the writer side of a test
/// pipeline.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    pub fn insert(&self, path: &str, body: &[u8]) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.to_string(), body.to_vec());
    }

    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DocumentReader for MemoryStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        self.get(path).ok_or_else(|| Error::NotFound(path.to_string()))
    }
}

impl DocumentWriter for MemoryStore {
    fn write(&self, path: &str, body: &[u8]) -> Result<()> {
        self.insert(path, body);
        Ok(())
    }
}
