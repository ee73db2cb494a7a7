//! Helpers behind the service subcommands.

use std::fmt::Write as _;
use std::io::{self, Read};

use tracing::info;

use fineoffset_core::{LoadOutcome, Station, StationRegistry};
use fineoffset_store::{ConfigStore, FileStore};

use crate::config::Config;

/// Open the configured station table and load it, creating it if needed.
pub fn open_registry(
    config: &Config,
) -> fineoffset_core::Result<(StationRegistry<FileStore>, LoadOutcome)> {
    info!("Opening station table at {:?}", config.storage.path);
    let store = FileStore::open(&config.storage.path)?;
    let mut registry = StationRegistry::with_timing(store, config.burst.timing());
    let outcome = registry.load()?;
    Ok((registry, outcome))
}

/// Parse a type code or unit id given as decimal or `0x`-prefixed hex.
pub fn parse_code(value: &str) -> Result<u16, String> {
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse::<u16>(),
    };
    parsed.map_err(|e| format!("invalid code '{}': {}", value, e))
}

/// Return `arg` itself, or the contents of `stdin` when `arg` is `-`.
pub fn read_json_arg<R: Read>(arg: &str, mut stdin: R) -> io::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut json = String::new();
    stdin.read_to_string(&mut json)?;
    Ok(json)
}

fn enabled_services(station: &Station) -> String {
    let settings = station.settings();
    let services: Vec<&str> = [
        (settings.wunderground, "wunderground"),
        (settings.domoticz, "domoticz"),
        (settings.windguru, "windguru"),
    ]
    .into_iter()
    .filter_map(|(enabled, name)| enabled.then_some(name))
    .collect();

    if services.is_empty() {
        "-".to_string()
    } else {
        services.join(",")
    }
}

/// Render every slot as one line of a table.
pub fn station_table<S: ConfigStore, const N: usize>(registry: &StationRegistry<S, N>) -> String {
    let mut out = format!(
        "{:<4} {:<6} {:<6} {:<7} {:<6} {}\n",
        "SLOT", "TYPE", "ID", "KIND", "WIND", "UPLOADS"
    );
    for (slot, station) in registry.stations().iter().enumerate() {
        if station.is_empty() {
            let _ = writeln!(out, "{:<4} (empty)", slot);
            continue;
        }
        let identity = station.identity();
        let _ = writeln!(
            out,
            "{:<4} {:<6} {:<6} {:<7} {:<6.2} {}",
            slot,
            format!("{:#04x}", identity.station_type),
            format!("{:#06x}", identity.id),
            station.kind().to_string(),
            station.settings().wind_factor,
            enabled_services(station)
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fineoffset_store::MemoryStore;

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("36"), Ok(36));
        assert_eq!(parse_code("0x24"), Ok(0x24));
        assert_eq!(parse_code("0X2c"), Ok(0x2C));
        assert!(parse_code("0xZZ").is_err());
        assert!(parse_code("70000").is_err());
    }

    #[test]
    fn test_read_json_arg_literal() {
        let json = read_json_arg(r#"{"wsID":1}"#, io::empty()).unwrap();
        assert_eq!(json, r#"{"wsID":1}"#);
    }

    #[test]
    fn test_read_json_arg_stdin() {
        let json = read_json_arg("-", &b"{\"wsID\":2}"[..]).unwrap();
        assert_eq!(json, "{\"wsID\":2}");
    }

    #[test]
    fn test_station_table() {
        let mut registry: StationRegistry<MemoryStore> = StationRegistry::new(MemoryStore::new());
        registry
            .add(r#"{"wsType":40,"wsID":44,"wunderground":true,"windguru":true}"#)
            .unwrap();

        let table = station_table(&registry);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("SLOT"));
        assert!(lines[1].contains("0x28"));
        assert!(lines[1].contains("0x002c"));
        assert!(lines[1].contains("WH1080"));
        assert!(lines[1].ends_with("wunderground,windguru"));
        assert!(lines[2].ends_with("(empty)"));
    }

    #[test]
    fn test_open_registry_creates_table() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.storage.path = temp_dir.path().join("stationconfig.json");

        let (registry, outcome) = open_registry(&config).unwrap();
        assert_eq!(outcome, LoadOutcome::Initialized);
        assert!(config.storage.path.is_file());
        assert_eq!(registry.timing(), config.burst.timing());

        let (_, outcome) = open_registry(&config).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded { stations: 0 });
    }
}
