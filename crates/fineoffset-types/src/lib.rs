//! Platform-agnostic types for Fine Offset weather station telemetry.
//!
//! This crate provides shared types used by the station layer
//! (fineoffset-core) and by packet decoders that feed it.
//!
//! # Features
//!
//! - Decoded sensor readings and message format tags
//! - Station identity and hardware kind
//! - Length-bounded strings for persisted credentials
//! - Error types for packet decoding
//!
//! # Example
//!
//! ```
//! use fineoffset_types::{StationId, StationKind};
//!
//! let id = StationId::new(0x28, 0x2C);
//! assert!(StationKind::from_type_code(id.station_type).is_burst_capable());
//! ```

pub mod bounded;
pub mod error;
pub mod types;

pub use bounded::BoundedString;
pub use error::{DecodeError, DecodeResult};
pub use types::{MessageFormat, Reading, StationId, StationKind, UNSET};
