//! Request paths for the upload services.
//!
//! Each function renders the path and query of one HTTP GET request from a
//! merged [`Reading`]. Sending the request is left to the caller.
//!
//! | Service | Wind values used | Units sent |
//! |---------|------------------|------------|
//! | Weather Underground | one-minute average and gust | °F, inch, mph |
//! | Domoticz | instantaneous | °C, mm, 0.1 m/s |
//! | Windguru | one-minute average and gust | °C, knots |
//!
//! Decimal values are rendered with six fractional digits. Credentials and
//! ids are form-encoded, so `&`, `=` and spaces cannot break the query.

use md5::{Digest, Md5};
use time::OffsetDateTime;
use url::form_urlencoded;

use fineoffset_types::Reading;

use crate::station::Station;

/// km/h to miles per hour.
pub const KMH_TO_MPH: f64 = 0.621371;
/// km/h to knots.
pub const KMH_TO_KNOTS: f64 = 0.540;
/// Millimetres per inch.
pub const MM_PER_INCH: f64 = 25.4;
/// Reporting interval announced to Windguru, in seconds.
pub const WINDGURU_INTERVAL_SECS: u32 = 60;

const WUNDERGROUND_HOST: &str = "weatherstation.wunderground.com";
const WINDGURU_HOST: &str = "www.windguru.cz";

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// An upload destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadService {
    Wunderground,
    Domoticz,
    Windguru,
}

impl std::fmt::Display for UploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadService::Wunderground => write!(f, "wunderground"),
            UploadService::Domoticz => write!(f, "domoticz"),
            UploadService::Windguru => write!(f, "windguru"),
        }
    }
}

/// The Domoticz virtual sensors a station can feed, each with its own device index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomoticzSensor {
    /// `TEMP;HUM;HUM_STAT`
    TempHum,
    /// `WB;WD;WS;WG;TEMP;CHILL`
    Wind,
    /// `RAINRATE;RAINCOUNTER`
    Rain,
    /// `LUX`
    Light,
    /// `UV;TEMP`
    Uv,
}

/// One request ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub service: UploadService,
    pub host: String,
    /// Explicit port, if the service is not on the scheme default.
    pub port: Option<u16>,
    pub secure: bool,
    /// Path and query.
    pub path: String,
}

impl UploadRequest {
    /// Full URL of the request.
    pub fn url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        match self.port {
            Some(port) => format!("{}://{}:{}{}", scheme, self.host, port, self.path),
            None => format!("{}://{}{}", scheme, self.host, self.path),
        }
    }
}

/// 16-point compass name for a bearing in degrees.
///
/// ```
/// use fineoffset_core::upload::compass_point;
///
/// assert_eq!(compass_point(0), "N");
/// assert_eq!(compass_point(225), "SW");
/// assert_eq!(compass_point(350), "N");
/// ```
pub fn compass_point(degrees: u16) -> &'static str {
    let sector = ((u32::from(degrees) % 360) * 16 + 180) / 360;
    COMPASS_POINTS[sector as usize % 16]
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Weather Underground PWS upload path.
pub fn wunderground_path(reading: &Reading, id: &str, password: &str) -> String {
    format!(
        "/weatherstation/updateweatherstation.php?ID={}&PASSWORD={}&dateutc=now\
         &tempf={:.6}&humidity={}&rainin={:.6}&winddir={}\
         &windspeedmph={:.6}&windgustmph={:.6}&UV={:.6}&action=updateraw",
        encode(id),
        encode(password),
        reading.temperature * 9.0 / 5.0 + 32.0,
        reading.humidity,
        reading.rain_1h / MM_PER_INCH,
        reading.wind_dir,
        reading.wind_speed_1m * KMH_TO_MPH,
        reading.wind_gust_1m * KMH_TO_MPH,
        reading.uv_index,
    )
}

/// Domoticz `udevice` path for one sensor.
///
/// Credentials are only included when `user` is non-empty.
pub fn domoticz_path(
    reading: &Reading,
    sensor: DomoticzSensor,
    idx: u32,
    user: &str,
    password: &str,
) -> String {
    let svalue = match sensor {
        DomoticzSensor::TempHum => format!("{:.6};{};0", reading.temperature, reading.humidity),
        // Domoticz wants wind in 0.1 m/s
        DomoticzSensor::Wind => format!(
            "{};{};{:.6};{:.6};{:.6};0",
            reading.wind_dir,
            compass_point(reading.wind_dir),
            reading.wind_speed * 10.0 / 3.6,
            reading.wind_gust * 10.0 / 3.6,
            reading.temperature,
        ),
        DomoticzSensor::Rain => format!("{:.6};{:.6}", reading.rain_1h * 100.0, reading.rain),
        DomoticzSensor::Light => format!("{:.6}", reading.light_lux),
        DomoticzSensor::Uv => format!("{:.6};{:.6}", reading.uv_index, reading.temperature),
    };

    let mut path = String::from("/json.htm?");
    if !user.is_empty() {
        path.push_str(&format!(
            "username={}&password={}&",
            encode(user),
            encode(password)
        ));
    }
    path.push_str(&format!(
        "type=command&param=udevice&idx={}&nvalue=0&svalue={}",
        idx, svalue
    ));
    path
}

/// Lowercase hex MD5 of `salt + uid + password`, as Windguru expects.
pub fn windguru_hash(salt: &str, uid: &str, password: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(salt.as_bytes());
    hasher.update(uid.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Windguru station API path, signed with `salt`.
///
/// The hash is taken over the raw `uid` and `password`.
pub fn windguru_path(reading: &Reading, uid: &str, password: &str, salt: &str) -> String {
    format!(
        "/upload/api.php?uid={}&salt={}&hash={}&interval={}\
         &wind_avg={:.6}&wind_max={:.6}&wind_direction={}&temperature={:.6}",
        encode(uid),
        encode(salt),
        windguru_hash(salt, uid, password),
        WINDGURU_INTERVAL_SECS,
        reading.wind_speed_1m * KMH_TO_KNOTS,
        reading.wind_gust_1m * KMH_TO_KNOTS,
        reading.wind_dir,
        reading.temperature,
    )
}

/// A salt that differs on every call: milliseconds since the epoch plus a
/// random suffix.
pub fn fresh_salt() -> String {
    let millis = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    format!("{}{:08x}", millis, rand::random::<u32>())
}

impl Station {
    /// Requests for every enabled upload service with credentials configured.
    ///
    /// Domoticz gets one request per sensor with a non-zero device index.
    pub fn upload_requests(&self, salt: &str) -> Vec<UploadRequest> {
        let settings = self.settings();
        let reading = self.reading();
        let mut requests = Vec::new();

        if settings.wunderground && !settings.wu_id.is_empty() && !settings.wu_password.is_empty()
        {
            requests.push(UploadRequest {
                service: UploadService::Wunderground,
                host: WUNDERGROUND_HOST.to_string(),
                port: None,
                secure: true,
                path: wunderground_path(reading, &settings.wu_id, &settings.wu_password),
            });
        }

        if settings.domoticz && !settings.dz_host.is_empty() {
            let sensors = [
                (DomoticzSensor::TempHum, settings.dz_temp_hum_idx),
                (DomoticzSensor::Wind, settings.dz_wind_idx),
                (DomoticzSensor::Rain, settings.dz_rain_idx),
                (DomoticzSensor::Light, settings.dz_light_idx),
                (DomoticzSensor::Uv, settings.dz_uv_idx),
            ];
            for (sensor, idx) in sensors.into_iter().filter(|(_, idx)| *idx != 0) {
                requests.push(UploadRequest {
                    service: UploadService::Domoticz,
                    host: settings.dz_host.to_string(),
                    port: (settings.dz_port != 0).then_some(settings.dz_port),
                    secure: settings.dz_secure,
                    path: domoticz_path(
                        reading,
                        sensor,
                        idx,
                        &settings.dz_user,
                        &settings.dz_password,
                    ),
                });
            }
        }

        if settings.windguru && !settings.wg_uid.is_empty() && !settings.wg_password.is_empty() {
            requests.push(UploadRequest {
                service: UploadService::Windguru,
                host: WINDGURU_HOST.to_string(),
                port: None,
                secure: true,
                path: windguru_path(reading, &settings.wg_uid, &settings.wg_password, salt),
            });
        }

        requests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::burst::BurstTiming;
    use crate::settings::StationSettings;
    use fineoffset_types::StationId;
    use std::time::Instant;

    fn sample() -> Reading {
        Reading {
            temperature: 20.0,
            humidity: 50,
            wind_speed: 36.0,
            wind_gust: 72.0,
            wind_dir: 225,
            rain: 312.5,
            uv_index: 3.0,
            light_lux: 1500.0,
            rain_1h: 2.54,
            wind_speed_1m: 10.0,
            wind_gust_1m: 20.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_windguru_hash_reference() {
        assert_eq!(
            windguru_hash("20180214171400", "stationXY", "supersecret"),
            "c9441d30280f4f6f4946fe2b2d360df5"
        );
    }

    #[test]
    fn test_wunderground_path() {
        assert_eq!(
            wunderground_path(&sample(), "IAMSTER1", "secret"),
            "/weatherstation/updateweatherstation.php?ID=IAMSTER1&PASSWORD=secret&dateutc=now\
             &tempf=68.000000&humidity=50&rainin=0.100000&winddir=225\
             &windspeedmph=6.213710&windgustmph=12.427420&UV=3.000000&action=updateraw"
        );
    }

    #[test]
    fn test_domoticz_wind_path() {
        assert_eq!(
            domoticz_path(&sample(), DomoticzSensor::Wind, 2956, "", ""),
            "/json.htm?type=command&param=udevice&idx=2956&nvalue=0\
             &svalue=225;SW;100.000000;200.000000;20.000000;0"
        );
    }

    #[test]
    fn test_domoticz_credentials() {
        let path = domoticz_path(&sample(), DomoticzSensor::TempHum, 7, "admin", "pw");
        assert_eq!(
            path,
            "/json.htm?username=admin&password=pw&type=command&param=udevice&idx=7\
             &nvalue=0&svalue=20.000000;50;0"
        );
    }

    #[test]
    fn test_domoticz_other_sensors() {
        let r = sample();
        assert!(domoticz_path(&r, DomoticzSensor::Rain, 1, "", "").ends_with("svalue=254.000000;312.500000"));
        assert!(domoticz_path(&r, DomoticzSensor::Light, 1, "", "").ends_with("svalue=1500.000000"));
        assert!(domoticz_path(&r, DomoticzSensor::Uv, 1, "", "").ends_with("svalue=3.000000;20.000000"));
    }

    #[test]
    fn test_credentials_are_form_encoded() {
        let wu = wunderground_path(&sample(), "IAM STER", "a&b=c");
        assert!(wu.contains("?ID=IAM+STER&PASSWORD=a%26b%3Dc&dateutc=now"));

        let dz = domoticz_path(&sample(), DomoticzSensor::Light, 3, "ad min", "p&w");
        assert!(dz.starts_with("/json.htm?username=ad+min&password=p%26w&type=command"));

        let wg = windguru_path(&sample(), "id&x", "supersecret", "20180214171400");
        assert!(wg.contains("uid=id%26x&salt=20180214171400"));
        assert!(wg.contains(&windguru_hash("20180214171400", "id&x", "supersecret")));
    }

    #[test]
    fn test_windguru_path() {
        let path = windguru_path(&sample(), "stationXY", "supersecret", "20180214171400");
        assert_eq!(
            path,
            "/upload/api.php?uid=stationXY&salt=20180214171400\
             &hash=c9441d30280f4f6f4946fe2b2d360df5&interval=60\
             &wind_avg=5.400000&wind_max=10.800000&wind_direction=225&temperature=20.000000"
        );
    }

    #[test]
    fn test_fresh_salt_differs() {
        assert_ne!(fresh_salt(), fresh_salt());
        assert!(fresh_salt().len() <= 40);
    }

    #[test]
    fn test_compass_boundaries() {
        assert_eq!(compass_point(11), "N");
        assert_eq!(compass_point(12), "NNE");
        assert_eq!(compass_point(90), "E");
        assert_eq!(compass_point(270), "W");
        assert_eq!(compass_point(360), "N");
    }

    #[test]
    fn test_request_url() {
        let request = UploadRequest {
            service: UploadService::Domoticz,
            host: "192.168.44.254".to_string(),
            port: Some(8080),
            secure: false,
            path: "/json.htm?x".to_string(),
        };
        assert_eq!(request.url(), "http://192.168.44.254:8080/json.htm?x");
    }

    #[test]
    fn test_upload_requests_follow_settings() {
        let mut settings = StationSettings::new(StationId::new(0x24, 0x10));
        settings.wunderground = true;
        settings.wu_id = "IAMSTER1".into();
        settings.wu_password = "secret".into();
        settings.domoticz = true;
        settings.dz_host = "192.168.44.254".into();
        settings.dz_port = 8080;
        settings.dz_temp_hum_idx = 2955;
        settings.dz_rain_idx = 2957;
        settings.windguru = true;
        settings.wg_uid = "stationXY".into();

        let mut station = Station::from_settings(settings, BurstTiming::default());
        station.update(&sample(), &[], Instant::now());

        let requests = station.upload_requests("salt");
        let services: Vec<_> = requests.iter().map(|r| r.service).collect();
        // Windguru has no password configured
        assert_eq!(
            services,
            [
                UploadService::Wunderground,
                UploadService::Domoticz,
                UploadService::Domoticz
            ]
        );
        assert!(requests[1].path.contains("idx=2955"));
        assert!(requests[2].path.contains("idx=2957"));
        assert_eq!(requests[2].port, Some(8080));
    }

    #[test]
    fn test_disabled_services_yield_nothing() {
        let station = Station::from_settings(
            StationSettings::new(StationId::new(0x24, 0x10)),
            BurstTiming::default(),
        );
        assert!(station.upload_requests("salt").is_empty());
    }
}
