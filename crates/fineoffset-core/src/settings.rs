//! Persisted per-station configuration.
//!
//! [`StationSettings`] is the JSON object stored for every registry slot.
//! Field names on disk are fixed:
//!
//! ```json
//! {"wsID":44,"wsType":40,"windfactor":1.0,
//!  "wunderground":true,"wuID":"IAMSTER1","wuPW":"secret",
//!  "domoticz":false,"dzURL":"","dzPort":0,"dzSecure":false,"dzID":"","dzPW":"",
//!  "dzTHidx":0,"dzWidx":0,"dzRidx":0,"dzLidx":0,"dzUVidx":0,
//!  "windguru":false,"wgSalt":"","wgUID":"","wgPW":""}
//! ```
//!
//! Missing keys take their defaults: the identity fields become the unset
//! sentinel `0xFFFF`, `windfactor` becomes 1.0, and everything else is zero,
//! false or empty. Credential strings are truncated to their bound.

use serde::{Deserialize, Serialize};

use fineoffset_types::{BoundedString, StationId, UNSET};

use crate::error::Result;

/// Configuration of one station slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StationSettings {
    /// Unit id.
    #[serde(rename = "wsID")]
    pub id: u16,
    /// Station type code.
    #[serde(rename = "wsType")]
    pub station_type: u16,
    /// Multiplier applied to wind speed and gust.
    #[serde(rename = "windfactor")]
    pub wind_factor: f64,

    /// Upload to Weather Underground.
    pub wunderground: bool,
    #[serde(rename = "wuID")]
    pub wu_id: BoundedString<10>,
    #[serde(rename = "wuPW")]
    pub wu_password: BoundedString<10>,

    /// Upload to a Domoticz server.
    pub domoticz: bool,
    #[serde(rename = "dzURL")]
    pub dz_host: BoundedString<50>,
    #[serde(rename = "dzPort")]
    pub dz_port: u16,
    #[serde(rename = "dzSecure")]
    pub dz_secure: bool,
    #[serde(rename = "dzID")]
    pub dz_user: BoundedString<20>,
    #[serde(rename = "dzPW")]
    pub dz_password: BoundedString<20>,
    /// Domoticz device index for temperature and humidity.
    #[serde(rename = "dzTHidx")]
    pub dz_temp_hum_idx: u32,
    /// Domoticz device index for wind.
    #[serde(rename = "dzWidx")]
    pub dz_wind_idx: u32,
    /// Domoticz device index for rain.
    #[serde(rename = "dzRidx")]
    pub dz_rain_idx: u32,
    /// Domoticz device index for light.
    #[serde(rename = "dzLidx")]
    pub dz_light_idx: u32,
    /// Domoticz device index for UV.
    #[serde(rename = "dzUVidx")]
    pub dz_uv_idx: u32,

    /// Upload to Windguru.
    pub windguru: bool,
    /// Stored for compatibility; a fresh salt is generated per upload.
    #[serde(rename = "wgSalt")]
    pub wg_salt: BoundedString<40>,
    #[serde(rename = "wgUID")]
    pub wg_uid: BoundedString<40>,
    #[serde(rename = "wgPW")]
    pub wg_password: BoundedString<40>,
}

impl Default for StationSettings {
    fn default() -> Self {
        Self {
            id: UNSET,
            station_type: UNSET,
            wind_factor: 1.0,
            wunderground: false,
            wu_id: BoundedString::default(),
            wu_password: BoundedString::default(),
            domoticz: false,
            dz_host: BoundedString::default(),
            dz_port: 0,
            dz_secure: false,
            dz_user: BoundedString::default(),
            dz_password: BoundedString::default(),
            dz_temp_hum_idx: 0,
            dz_wind_idx: 0,
            dz_rain_idx: 0,
            dz_light_idx: 0,
            dz_uv_idx: 0,
            windguru: false,
            wg_salt: BoundedString::default(),
            wg_uid: BoundedString::default(),
            wg_password: BoundedString::default(),
        }
    }
}

impl StationSettings {
    /// Settings for a new station with everything else defaulted.
    pub fn new(id: StationId) -> Self {
        Self {
            id: id.id,
            station_type: id.station_type,
            ..Self::default()
        }
    }

    /// The `(type, id)` pair identifying this station.
    pub fn identity(&self) -> StationId {
        StationId::new(self.station_type, self.id)
    }

    /// Parse a single settings object.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to a single-line JSON object.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
