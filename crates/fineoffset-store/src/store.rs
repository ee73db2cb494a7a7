//! Store implementations.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Byte-oriented storage for one persisted document.
///
/// Writes replace the whole document. Implementations must not leave a
/// half-written document behind when a write fails.
pub trait ConfigStore {
    /// Whether a document has been written.
    fn exists(&self) -> bool;

    /// Size of the stored document in bytes.
    fn size(&self) -> Result<u64>;

    /// Read the whole document.
    fn read_all(&self) -> Result<Vec<u8>>;

    /// Replace the document with `data`.
    fn write_all(&mut self, data: &[u8]) -> Result<()>;
}

/// A document kept in a single file.
///
/// Every write goes to a temporary file in the same directory which is then
/// renamed over the target, so readers see either the old or the new
/// document in full.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Open a store at the given path, creating parent directories if needed.
    ///
    /// The file itself is not created until the first write.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            info!("Creating store directory {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    /// Open the store at the default location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_store_path())
    }

    /// Path of the store file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn directory(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ConfigStore for FileStore {
    fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn size(&self) -> Result<u64> {
        Ok(std::fs::metadata(&self.path)?.len())
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(&self.path)?)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let mut tmp = NamedTempFile::new_in(self.directory())?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| Error::Persist {
            path: self.path.clone(),
            source: e.error,
        })?;

        debug!("Wrote {} bytes to {}", data.len(), self.path.display());
        Ok(())
    }
}

/// A document held in memory.
///
/// Writes can be made to fail to exercise storage-failure handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<Vec<u8>>,
    fail_writes: bool,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `data`.
    pub fn with_contents(data: impl Into<Vec<u8>>) -> Self {
        Self {
            data: Some(data.into()),
            ..Self::default()
        }
    }

    /// Make subsequent writes fail (or succeed again).
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Current contents, if any.
    pub fn contents(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }
}

impl ConfigStore for MemoryStore {
    fn exists(&self) -> bool {
        self.data.is_some()
    }

    fn size(&self) -> Result<u64> {
        Ok(self.data.as_ref().map_or(0, |d| d.len() as u64))
    }

    fn read_all(&self) -> Result<Vec<u8>> {
        self.data.clone().ok_or_else(|| {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "memory store is empty",
            ))
        })
    }

    fn write_all(&mut self, data: &[u8]) -> Result<()> {
        if self.fail_writes {
            return Err(Error::WriteRejected("write failure injected".to_string()));
        }
        self.data = Some(data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(temp_dir.path().join("stationconfig.json")).unwrap();

        assert!(!store.exists());
        assert!(store.read_all().is_err());
        assert!(store.size().is_err());
    }

    #[test]
    fn test_file_store_write_and_read() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("stationconfig.json")).unwrap();

        store.write_all(b"[{\"wsID\":44}]").unwrap();
        assert!(store.exists());
        assert_eq!(store.size().unwrap(), 13);
        assert_eq!(store.read_all().unwrap(), b"[{\"wsID\":44}]");
    }

    #[test]
    fn test_file_store_write_truncates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("stationconfig.json")).unwrap();

        store.write_all(b"a much longer first document").unwrap();
        store.write_all(b"short").unwrap();
        assert_eq!(store.read_all().unwrap(), b"short");
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("dir").join("stationconfig.json");
        let mut store = FileStore::open(&path).unwrap();

        store.write_all(b"[]").unwrap();
        assert!(path.is_file());
    }

    #[test]
    fn test_file_store_leaves_no_temp_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(temp_dir.path().join("stationconfig.json")).unwrap();

        store.write_all(b"[]").unwrap();
        store.write_all(b"[{}]").unwrap();

        let entries = std::fs::read_dir(temp_dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(!store.exists());
        assert_eq!(store.size().unwrap(), 0);

        store.write_all(b"[]").unwrap();
        assert!(store.exists());
        assert_eq!(store.read_all().unwrap(), b"[]");
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn test_memory_store_failed_write_keeps_contents() {
        let mut store = MemoryStore::with_contents("[1]");
        store.set_fail_writes(true);

        let result = store.write_all(b"[2]");
        assert!(matches!(result, Err(Error::WriteRejected(_))));
        assert_eq!(store.contents(), Some(&b"[1]"[..]));
        assert_eq!(store.write_count(), 0);
    }
}
