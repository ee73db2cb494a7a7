//! Persistent byte store for Fine Offset station configuration.
//!
//! The station registry persists its table as a single document. This crate
//! provides the byte-level store behind it:
//!
//! - [`ConfigStore`]: the abstraction the registry writes through
//! - [`FileStore`]: a file on disk, replaced atomically on every write
//! - [`MemoryStore`]: an in-process store for tests and hosts without a filesystem
//!
//! # Example
//!
//! ```no_run
//! use fineoffset_store::{ConfigStore, FileStore};
//!
//! let mut store = FileStore::open_default()?;
//! store.write_all(b"[]")?;
//! assert_eq!(store.read_all()?, b"[]");
//! # Ok::<(), fineoffset_store::Error>(())
//! ```

mod error;
mod store;

pub use error::{Error, Result};
pub use store::{ConfigStore, FileStore, MemoryStore};

/// File name of the persisted station table.
pub const STORE_FILE_NAME: &str = "stationconfig.json";

/// Default store path following platform conventions.
///
/// - Linux: `~/.local/share/fineoffset/stationconfig.json`
/// - macOS: `~/Library/Application Support/fineoffset/stationconfig.json`
/// - Windows: `C:\Users\<user>\AppData\Local\fineoffset\stationconfig.json`
pub fn default_store_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("fineoffset")
        .join(STORE_FILE_NAME)
}
