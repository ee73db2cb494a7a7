//! Operator tool for the Fine Offset station table.
//!
//! This crate provides the pieces behind the `fineoffset-service` binary:
//! - Loading and validating the service configuration
//! - Opening the persisted station table with the configured burst timing
//! - Rendering the table and per-station upload requests for the terminal
//!
//! # Configuration
//!
//! The service reads configuration from `~/.config/fineoffset/service.toml`:
//!
//! ```toml
//! [storage]
//! path = "~/.local/share/fineoffset/stationconfig.json"
//!
//! [burst]
//! gap_ms = 500
//! quiet_ms = 200
//! ```
//!
//! # Commands
//!
//! - `init` - Load the station table, creating it if needed
//! - `list` - Show all slots
//! - `show <type> <id>` - Print a station's settings as JSON
//! - `add <json|->` - Add or replace a station
//! - `remove <json|->` - Remove a station
//! - `urls <type> <id>` - Print the upload request templates for a station

pub mod commands;
pub mod config;

pub use commands::{open_registry, parse_code, read_json_arg, station_table};
pub use config::{BurstConfig, Config, ConfigError, StorageConfig, ValidationError};
