//! Error types for packet decoding in fineoffset-types.

use thiserror::Error;

use crate::types::MessageFormat;

/// Errors a decoder reports when it rejects a raw radio packet.
///
/// A rejected packet is discarded by the station layer; none of these
/// variants carry state that needs cleaning up.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The packet is shorter than the format requires.
    #[error("Insufficient bytes: expected {expected}, got {actual}")]
    InsufficientBytes {
        /// Number of bytes the format needs.
        expected: usize,
        /// Number of bytes supplied.
        actual: usize,
    },

    /// The packet checksum does not match its payload.
    #[error("Checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    Checksum {
        /// Checksum computed over the payload.
        expected: u8,
        /// Checksum carried in the packet.
        actual: u8,
    },

    /// The decoder has no support for this message format.
    #[error("Unsupported message format: {0}")]
    UnsupportedFormat(MessageFormat),

    /// The payload decoded but holds impossible field values.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Result type alias using fineoffset-types' DecodeError type.
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
