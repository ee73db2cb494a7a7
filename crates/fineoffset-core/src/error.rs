//! Error types for fineoffset-core.
//!
//! No error in this crate is fatal. Callers are expected to log and carry on:
//!
//! | Error | Raised by | State after the error |
//! |-------|-----------|-----------------------|
//! | [`Error::Parse`] | `add`, `remove`, settings parsing | Unchanged |
//! | [`Error::MissingIdentity`] | `add` | Unchanged |
//! | [`Error::Decode`] | `handle_packet` | Unchanged, packet discarded |
//! | [`Error::Storage`] | `save`, `load` | In-memory table is authoritative |

use thiserror::Error;

use fineoffset_types::{DecodeError, StationId};

/// Errors that can occur in the station layer.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// A station configuration document could not be parsed.
    #[error("Failed to parse station configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A configuration to add carries the unset sentinel as type or id.
    #[error("Station configuration has no identity ({0})")]
    MissingIdentity(StationId),

    /// A raw packet was rejected by the decoder.
    #[error("Packet rejected: {0}")]
    Decode(#[from] DecodeError),

    /// The persistent store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] fineoffset_store::Error),
}

/// Result type alias using fineoffset-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;
