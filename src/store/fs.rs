use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use url::Url;

use super::{DocumentReader, DocumentWriter};
use crate::errors::{Error, Result};

/// Store rooted at a local directory. Writes land in a temp file first and
/// are renamed into place, so a completed write is atomically visible.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> FsStore {
        FsStore { root: root.into() }
    }

    pub fn reader_from(address: &Url) -> Result<Box<dyn DocumentReader>> {
        Ok(Box::new(FsStore::new(address.path())))
    }

    pub fn writer_from(address: &Url) -> Result<Box<dyn DocumentWriter>> {
        Ok(Box::new(FsStore::new(address.path())))
    }

    fn abs_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl DocumentReader for FsStore {
    fn read(&self, path: &str) -> Result<Vec<u8>> {
        match fs::read(self.abs_path(path)) {
            Ok(body) => Ok(body),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(Error::NotFound(path.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl DocumentWriter for FsStore {
    fn write(&self, path: &str, body: &[u8]) -> Result<()> {
        let abs_path = self.abs_path(path);
        let parent = abs_path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        // each call gets its own temp file, so concurrent writes to one
        // path can never publish each other's partial bytes
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(body)?;
        tmp.persist(&abs_path).map_err(|err| err.error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store
            .write("151/194/889/7/1511948897.geojson", b"{\"id\":1511948897}")
            .unwrap();
        let body = store.read("151/194/889/7/1511948897.geojson").unwrap();

        assert_eq!(body, b"{\"id\":1511948897}");
    }

    #[test]
    fn rewrites_fully_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write("1/1.geojson", b"first first first").unwrap();
        store.write("1/1.geojson", b"second").unwrap();

        assert_eq!(store.read("1/1.geojson").unwrap(), b"second");
    }

    #[test]
    fn concurrent_writes_to_one_path_publish_whole_documents() {
        use std::sync::Arc;
        use std::thread;

        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FsStore::new(dir.path()));

        let bodies: Vec<Vec<u8>> = (0..4)
            .map(|i| vec![b'a' + i as u8; 8192])
            .collect();

        let mut handles = Vec::new();
        for body in &bodies {
            let store = Arc::clone(&store);
            let body = body.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..16 {
                    store.write("1/1.geojson", &body).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // whatever write won, the published document is one body in full
        let published = store.read("1/1.geojson").unwrap();
        assert!(bodies.contains(&published));
    }

    #[test]
    fn missing_paths_are_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        assert!(matches!(
            store.read("0/0.geojson"),
            Err(Error::NotFound(_))
        ));
    }
}
