pub mod fs;
pub mod memory;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use url::Url;

use crate::errors::{Error, Result};

/// Read side of the path-addressed byte store.
pub trait DocumentReader: Send + Sync {
    /// Fails with `NotFound` when no record exists at the path.
    fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Write side of the path-addressed byte store. A completed write must be
/// atomically visible to subsequent reads, or not visible at all.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, path: &str, body: &[u8]) -> Result<()>;

    fn close(&self) -> Result<()> {
        Ok(())
    }
}

type ReaderConstructor = Box<dyn Fn(&Url) -> Result<Box<dyn DocumentReader>> + Send + Sync>;
type WriterConstructor = Box<dyn Fn(&Url) -> Result<Box<dyn DocumentWriter>> + Send + Sync>;

/// Name-keyed registry of store implementations, owned by the composition
/// root and populated by explicit registration calls. Lookup happens by the
/// scheme of the target address.
#[derive(Default)]
pub struct StoreRegistry {
    readers: HashMap<String, ReaderConstructor>,
    writers: HashMap<String, WriterConstructor>,
}

impl StoreRegistry {
    pub fn new() -> StoreRegistry {
        StoreRegistry::default()
    }

    /// Registry preloaded with the built-in `fs` and `memory` stores.
    /// Memory targets are keyed by their full address, so a reader and a
    /// writer resolved from the same address share one set of entries.
    pub fn with_defaults() -> Result<StoreRegistry> {
        let mut registry = StoreRegistry::new();

        registry.register_reader("fs", Box::new(|address| fs::FsStore::reader_from(address)))?;
        registry.register_writer("fs", Box::new(|address| fs::FsStore::writer_from(address)))?;

        let memory_targets: Arc<Mutex<HashMap<String, memory::MemoryStore>>> =
            Arc::new(Mutex::new(HashMap::new()));

        let targets = Arc::clone(&memory_targets);
        registry.register_reader(
            "memory",
            Box::new(move |address| {
                Ok(Box::new(memory_store_for(&targets, address)) as Box<dyn DocumentReader>)
            }),
        )?;
        let targets = Arc::clone(&memory_targets);
        registry.register_writer(
            "memory",
            Box::new(move |address| {
                Ok(Box::new(memory_store_for(&targets, address)) as Box<dyn DocumentWriter>)
            }),
        )?;

        Ok(registry)
    }

    pub fn register_reader(&mut self, scheme: &str, ctor: ReaderConstructor) -> Result<()> {
        if self.readers.contains_key(scheme) {
            return Err(Error::DuplicateRegistration(scheme.to_string()));
        }
        self.readers.insert(scheme.to_string(), ctor);
        Ok(())
    }

    pub fn register_writer(&mut self, scheme: &str, ctor: WriterConstructor) -> Result<()> {
        if self.writers.contains_key(scheme) {
            return Err(Error::DuplicateRegistration(scheme.to_string()));
        }
        self.writers.insert(scheme.to_string(), ctor);
        Ok(())
    }

    pub fn new_reader(&self, address: &str) -> Result<Box<dyn DocumentReader>> {
        let url = Url::parse(address)?;
        let ctor = self
            .readers
            .get(url.scheme())
            .ok_or_else(|| Error::UnknownScheme(url.scheme().to_string()))?;
        ctor(&url)
    }

    pub fn new_writer(&self, address: &str) -> Result<Box<dyn DocumentWriter>> {
        let url = Url::parse(address)?;
        let ctor = self
            .writers
            .get(url.scheme())
            .ok_or_else(|| Error::UnknownScheme(url.scheme().to_string()))?;
        ctor(&url)
    }
}

fn memory_store_for(
    targets: &Mutex<HashMap<String, memory::MemoryStore>>,
    address: &Url,
) -> memory::MemoryStore {
    targets
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(address.as_str().to_string())
        .or_default()
        .clone()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn duplicate_registration_is_an_error() {
        let mut registry = StoreRegistry::with_defaults().unwrap();
        let res = registry.register_reader(
            "fs",
            Box::new(|address| fs::FsStore::reader_from(address)),
        );

        assert!(matches!(res, Err(Error::DuplicateRegistration(_))));
    }

    #[test]
    fn unknown_scheme_is_an_error() {
        let registry = StoreRegistry::with_defaults().unwrap();
        assert!(matches!(
            registry.new_reader("carrier-pigeon:///coop"),
            Err(Error::UnknownScheme(_))
        ));
    }

    #[test]
    fn defaults_resolve_fs_and_memory() {
        let registry = StoreRegistry::with_defaults().unwrap();
        assert!(registry.new_writer("memory:///").is_ok());
        assert!(registry.new_reader("fs:///tmp").is_ok());
    }

    #[test]
    fn memory_reader_and_writer_for_one_address_share_entries() {
        let registry = StoreRegistry::with_defaults().unwrap();

        let writer = registry.new_writer("memory:///").unwrap();
        writer.write("1/1.geojson", b"{\"id\":1}").unwrap();

        let reader = registry.new_reader("memory:///").unwrap();
        assert_eq!(reader.read("1/1.geojson").unwrap(), b"{\"id\":1}");
    }

    #[test]
    fn memory_targets_with_distinct_addresses_stay_distinct() {
        let registry = StoreRegistry::with_defaults().unwrap();

        let writer = registry.new_writer("memory:///a").unwrap();
        writer.write("1/1.geojson", b"{}").unwrap();

        let reader = registry.new_reader("memory:///b").unwrap();
        assert!(matches!(
            reader.read("1/1.geojson"),
            Err(Error::NotFound(_))
        ));
    }
}
