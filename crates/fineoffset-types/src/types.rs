//! Core types for Fine Offset station telemetry.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Value of a type or id field that marks an unused registry slot.
pub const UNSET: u16 = 0xFFFF;

/// Identity of a remote sensor unit: its protocol type code plus unit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StationId {
    /// Station type code as reported by the decoder (e.g. `0x24`).
    pub station_type: u16,
    /// Unit id, usually re-randomised by the sensor on battery change.
    pub id: u16,
}

impl StationId {
    /// The identity carried by an empty registry slot.
    pub const EMPTY: StationId = StationId {
        station_type: UNSET,
        id: UNSET,
    };

    /// Create an identity from a type code and unit id.
    #[must_use]
    pub const fn new(station_type: u16, id: u16) -> Self {
        Self { station_type, id }
    }

    /// Returns `true` if either field holds the unset sentinel.
    ///
    /// ```
    /// use fineoffset_types::StationId;
    ///
    /// assert!(StationId::EMPTY.is_unset());
    /// assert!(StationId::new(0x24, 0xFFFF).is_unset());
    /// assert!(!StationId::new(0x24, 0x2C).is_unset());
    /// ```
    #[must_use]
    pub const fn is_unset(&self) -> bool {
        self.station_type == UNSET || self.id == UNSET
    }
}

impl Default for StationId {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}/{:#06x}", self.station_type, self.id)
    }
}

/// Hardware family of a station, derived from its type code.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new station kinds
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum StationKind {
    /// BR1800 family: one transmission per reading.
    Br1800,
    /// WH1080 family: each reading is repeated in a burst of up to six packets.
    Wh1080,
    /// Any other type code. Fields are stored but no specialised handling applies.
    Unknown,
}

impl StationKind {
    /// Map a type code to its station kind.
    ///
    /// ```
    /// use fineoffset_types::StationKind;
    ///
    /// assert_eq!(StationKind::from_type_code(0x24), StationKind::Br1800);
    /// assert_eq!(StationKind::from_type_code(0x28), StationKind::Wh1080);
    /// assert_eq!(StationKind::from_type_code(0x2A), StationKind::Wh1080);
    /// assert_eq!(StationKind::from_type_code(0x10), StationKind::Unknown);
    /// ```
    #[must_use]
    pub fn from_type_code(code: u16) -> Self {
        match code {
            0x24 => StationKind::Br1800,
            0x28 | 0x2A => StationKind::Wh1080,
            _ => StationKind::Unknown,
        }
    }

    /// Whether stations of this kind retransmit each reading as a burst.
    #[must_use]
    pub fn is_burst_capable(&self) -> bool {
        matches!(self, StationKind::Wh1080)
    }
}

impl fmt::Display for StationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StationKind::Br1800 => write!(f, "BR1800"),
            StationKind::Wh1080 => write!(f, "WH1080"),
            StationKind::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Radio message format a packet was received in.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new formats
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
pub enum MessageFormat {
    /// Format not recognised.
    #[default]
    Unknown,
    /// WS3000 message as sent by WH1080-class stations.
    Ws3000,
    /// WS4000 message as sent by WH1080-class stations.
    Ws4000,
    /// BR1800 message.
    Br1800,
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageFormat::Unknown => write!(f, "unknown"),
            MessageFormat::Ws3000 => write!(f, "WS3000"),
            MessageFormat::Ws4000 => write!(f, "WS4000"),
            MessageFormat::Br1800 => write!(f, "BR1800"),
        }
    }
}

/// One decoded sensor transmission, plus the rolling values derived for it.
///
/// Wind speeds are in km/h, rain in millimetres, temperature in degrees
/// Celsius. `rain` is the sensor's lifetime counter; `rain_1h`,
/// `wind_speed_1m` and `wind_gust_1m` are filled in by the station layer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Reading {
    /// Station that sent the transmission.
    pub station: StationId,
    /// Format the packet was decoded from.
    pub format: MessageFormat,
    /// When the packet was captured.
    #[cfg_attr(feature = "serde", serde(with = "time::serde::rfc3339"))]
    pub captured_at: OffsetDateTime,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    /// Relative humidity percentage (0-100).
    pub humidity: u8,
    /// Average wind speed in km/h.
    pub wind_speed: f64,
    /// Wind gust in km/h.
    pub wind_gust: f64,
    /// Wind direction in degrees.
    pub wind_dir: u16,
    /// Lifetime rain counter in mm.
    pub rain: f64,
    /// UV index.
    pub uv_index: f64,
    /// Light level in lux.
    pub light_lux: f64,
    /// Rain over the trailing hour in mm.
    pub rain_1h: f64,
    /// Average wind speed over the trailing minute in km/h.
    pub wind_speed_1m: f64,
    /// Maximum gust over the trailing minute in km/h.
    pub wind_gust_1m: f64,
}

impl Default for Reading {
    fn default() -> Self {
        Self {
            station: StationId::EMPTY,
            format: MessageFormat::Unknown,
            captured_at: OffsetDateTime::UNIX_EPOCH,
            temperature: 0.0,
            humidity: 0,
            wind_speed: 0.0,
            wind_gust: 0.0,
            wind_dir: 0,
            rain: 0.0,
            uv_index: 0.0,
            light_lux: 0.0,
            rain_1h: 0.0,
            wind_speed_1m: 0.0,
            wind_gust_1m: 0.0,
        }
    }
}

impl Reading {
    /// Capture time as seconds since the Unix epoch.
    #[must_use]
    pub fn timestamp(&self) -> i64 {
        self.captured_at.unix_timestamp()
    }
}
