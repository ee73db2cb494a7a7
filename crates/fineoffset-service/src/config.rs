//! Service configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use fineoffset_core::BurstTiming;

/// Service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Station table location.
    pub storage: StorageConfig,
    /// Burst detection thresholds for WH1080-class stations.
    pub burst: BurstConfig,
}

impl Config {
    /// Load configuration from the default path, or defaults if it does not exist.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = default_config_path();
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return any errors.
    ///
    /// This checks:
    /// - Storage path is not empty
    /// - Burst quiet period is non-zero and shorter than the burst gap
    ///
    /// # Example
    ///
    /// ```
    /// use fineoffset_service::Config;
    ///
    /// let config = Config::default();
    /// config.validate().expect("Default config should be valid");
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.storage.validate());
        errors.extend(self.burst.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Station table file path.
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: fineoffset_store::default_store_path(),
        }
    }
}

impl StorageConfig {
    /// Validate storage configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.path.as_os_str().is_empty() {
            errors.push(ValidationError {
                field: "storage.path".to_string(),
                message: "station table path cannot be empty".to_string(),
            });
        }

        errors
    }
}

/// Burst detection thresholds in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BurstConfig {
    /// A packet later than this after the previous one starts a new burst.
    pub gap_ms: u64,
    /// Silence after which a burst is complete.
    pub quiet_ms: u64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        let timing = BurstTiming::default();
        Self {
            gap_ms: timing.gap.as_millis() as u64,
            quiet_ms: timing.quiet.as_millis() as u64,
        }
    }
}

impl BurstConfig {
    /// Validate burst configuration.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if self.quiet_ms == 0 {
            errors.push(ValidationError {
                field: "burst.quiet_ms".to_string(),
                message: "quiet period cannot be 0".to_string(),
            });
        } else if self.quiet_ms >= self.gap_ms {
            errors.push(ValidationError {
                field: "burst.quiet_ms".to_string(),
                message: format!(
                    "quiet period {}ms must be shorter than the burst gap {}ms",
                    self.quiet_ms, self.gap_ms
                ),
            });
        }

        errors
    }

    /// Thresholds as handed to the station registry.
    pub fn timing(&self) -> BurstTiming {
        BurstTiming {
            gap: Duration::from_millis(self.gap_ms),
            quiet: Duration::from_millis(self.quiet_ms),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// The field path (e.g., `burst.quiet_ms`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Default configuration file path.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fineoffset")
        .join("service.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.storage.path, fineoffset_store::default_store_path());
        assert_eq!(config.burst.gap_ms, 500);
        assert_eq!(config.burst.quiet_ms, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_burst_timing_conversion() {
        let config = BurstConfig {
            gap_ms: 800,
            quiet_ms: 250,
        };
        let timing = config.timing();
        assert_eq!(timing.gap, Duration::from_millis(800));
        assert_eq!(timing.quiet, Duration::from_millis(250));
        assert_eq!(BurstConfig::default().timing(), BurstTiming::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [burst]
            gap_ms = 700
            "#,
        )
        .unwrap();
        assert_eq!(config.burst.gap_ms, 700);
        assert_eq!(config.burst.quiet_ms, 200);
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_storage_path_from_toml() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            path = "/var/lib/fineoffset/stationconfig.json"
            "#,
        )
        .unwrap();
        assert_eq!(
            config.storage.path,
            PathBuf::from("/var/lib/fineoffset/stationconfig.json")
        );
    }

    #[test]
    fn test_validate_empty_storage_path() {
        let config = Config {
            storage: StorageConfig {
                path: PathBuf::new(),
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("storage.path"));
    }

    #[test]
    fn test_validate_quiet_zero() {
        let burst = BurstConfig {
            gap_ms: 500,
            quiet_ms: 0,
        };
        let errors = burst.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("cannot be 0"));
    }

    #[test]
    fn test_validate_quiet_not_shorter_than_gap() {
        let burst = BurstConfig {
            gap_ms: 200,
            quiet_ms: 200,
        };
        let errors = burst.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "burst.quiet_ms");
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let config = Config {
            storage: StorageConfig {
                path: PathBuf::new(),
            },
            burst: BurstConfig {
                gap_ms: 100,
                quiet_ms: 300,
            },
        };
        match config.validate() {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation errors, got {:?}", other),
        }
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("service.toml");
        std::fs::write(
            &path,
            "[storage]\npath = \"/tmp/stationconfig.json\"\n\n[burst]\ngap_ms = 600\nquiet_ms = 150\n",
        )
        .unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.storage.path, PathBuf::from("/tmp/stationconfig.json"));
        assert_eq!(loaded.burst, BurstConfig { gap_ms: 600, quiet_ms: 150 });
        assert!(loaded.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Config::load(temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_toml() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("service.toml");
        std::fs::write(&path, "[burst\ngap_ms = ").unwrap();
        assert!(matches!(
            Config::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn test_default_config_path() {
        let path = default_config_path();
        assert!(path.ends_with("fineoffset/service.toml"));
    }
}
