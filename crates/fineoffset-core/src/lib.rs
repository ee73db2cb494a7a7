//! Station management for Fine Offset weather base stations.
//!
//! This crate sits between a packet decoder and the upload services. It keeps
//! a small, persisted table of the stations the operator cares about, turns
//! decoded packets into calibrated readings with rolling values, and decides
//! when a station has something new to report.
//!
//! # Features
//!
//! - **Station registry**: fixed-size table, persisted as JSON after every change
//! - **Rolling values**: rain over the last hour, wind average and gust over the last minute
//! - **Burst voting**: WH1080-class retransmissions are deduplicated by majority vote
//! - **Report polling**: query-and-clear reportable flag per station
//! - **Upload formatting**: Weather Underground, Domoticz and Windguru request paths
//!
//! # Supported Stations
//!
//! | Type code | Family | Packet handling |
//! |-----------|--------|-----------------|
//! | `0x24` | BR1800 | merged on arrival |
//! | `0x28`, `0x2A` | WH1080 | voted per burst |
//! | other | Unknown | merged on arrival |
//!
//! # Quick Start
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use fineoffset_core::{MockDecoder, StationRegistry};
//! use fineoffset_store::MemoryStore;
//! use fineoffset_types::{MessageFormat, Reading, StationId};
//!
//! let packet = [0x24, 0x10, 0, 0, 0, 0, 0, 0, 0, 0];
//! let decoder = MockDecoder::new().with_reading(
//!     &packet,
//!     Reading { station: StationId::new(0x24, 0x10), temperature: 18.5, ..Default::default() },
//! );
//!
//! let mut registry: StationRegistry<MemoryStore> = StationRegistry::new(MemoryStore::new());
//! registry.load()?;
//! registry.add(r#"{"wsType":36,"wsID":16}"#)?;
//!
//! let now = Instant::now();
//! registry.handle_packet(MessageFormat::Br1800, &packet, now, &decoder)?;
//! for slot in registry.poll_reportable(now + Duration::from_secs(1), &decoder) {
//!     let station = &registry.stations()[slot];
//!     println!("{} reports {:.1}C", station.identity(), station.reading().temperature);
//! }
//! # Ok::<(), fineoffset_core::Error>(())
//! ```

pub mod burst;
pub mod error;
pub mod mock;
pub mod registry;
pub mod settings;
pub mod station;
pub mod traits;
pub mod upload;
pub mod window;

// Re-export the shared types crate
pub use fineoffset_types::types;

// Core exports
pub use burst::{BurstDeduplicator, BurstState, BurstTiming, RawPacket};
pub use error::{Error, Result};
pub use mock::MockDecoder;
pub use registry::{LoadOutcome, MAX_STATIONS, SharedRegistry, StationRegistry};
pub use settings::StationSettings;
pub use station::Station;
pub use traits::Decoder;
pub use upload::{DomoticzSensor, UploadRequest, UploadService};
pub use window::{TimeWindow, WindowKind};
