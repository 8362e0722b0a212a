//! CLI configuration.
//!
//! Settings live in `<config_dir>/incubator/config.toml`. Every section is
//! optional; missing keys fall back to the defaults below, and command-line
//! flags override whatever the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use incubator_core::FertilityCheckPolicy;
use incubator_core::lifecycle::DEFAULT_FERTILITY_CHECK_DAY;
use incubator_core::notifier::{DEFAULT_ADDRESS, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};

/// Longest controller timeout accepted from the config file.
const MAX_TIMEOUT_SECS: u64 = 60;

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub controller: ControllerSection,
    pub storage: StorageSection,
    pub catalog: CatalogSection,
    pub sensors: SensorsSection,
    pub lifecycle: LifecycleSection,
}

impl Config {
    /// Default configuration file path.
    pub fn path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("incubator")
            .join("config.toml")
    }

    /// Load configuration from `path`, or the defaults if the file does not exist.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
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

    /// Save configuration to a file, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Write {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Write {
            path: path.as_ref().to_path_buf(),
            source: e,
        })
    }

    /// Validate the configuration and return every problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.controller.validate());
        errors.extend(self.storage.validate());
        errors.extend(self.catalog.validate());
        errors.extend(self.sensors.validate());
        errors.extend(self.lifecycle.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }
}

/// Incubator controller settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerSection {
    /// Host (and optional port) of the controller.
    pub address: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ControllerSection {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

impl ControllerSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        let address = self.address.trim();
        if address.is_empty() {
            errors.push(ValidationError::new(
                "controller.address",
                "address cannot be empty",
            ));
        } else if address.contains(char::is_whitespace) {
            errors.push(ValidationError::new(
                "controller.address",
                format!("invalid address '{}': contains whitespace", self.address),
            ));
        }

        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            errors.push(ValidationError::new(
                "controller.timeout_secs",
                format!(
                    "timeout must be between 1 and {} seconds, got {}",
                    MAX_TIMEOUT_SECS, self.timeout_secs
                ),
            ));
        }

        errors
    }
}

/// Database settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSection {
    /// Database file path.
    pub path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            path: incubator_store::default_db_path(),
        }
    }
}

impl StorageSection {
    pub fn validate(&self) -> Vec<ValidationError> {
        non_empty_path("storage.path", &self.path)
    }
}

/// Species catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogSection {
    /// Path to the species JSON file.
    pub path: PathBuf,
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("aves.json"),
        }
    }
}

impl CatalogSection {
    pub fn validate(&self) -> Vec<ValidationError> {
        non_empty_path("catalog.path", &self.path)
    }
}

/// Sensor log settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorsSection {
    /// Path to the controller's CSV telemetry log.
    pub path: PathBuf,
}

impl Default for SensorsSection {
    fn default() -> Self {
        Self {
            path: PathBuf::from("dados.csv"),
        }
    }
}

impl SensorsSection {
    pub fn validate(&self) -> Vec<ValidationError> {
        non_empty_path("sensors.path", &self.path)
    }
}

/// How the fertility check day is matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    /// Only on the trigger day itself.
    #[default]
    ExactDay,
    /// Any day from the trigger day until the period ends.
    OnOrAfterDay,
}

/// Lifecycle settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleSection {
    /// Day on which the fertility check becomes available.
    pub fertility_check_day: u32,
    pub fertility_check_policy: PolicyKind,
}

impl Default for LifecycleSection {
    fn default() -> Self {
        Self {
            fertility_check_day: DEFAULT_FERTILITY_CHECK_DAY,
            fertility_check_policy: PolicyKind::default(),
        }
    }
}

impl LifecycleSection {
    pub fn policy(&self) -> FertilityCheckPolicy {
        match self.fertility_check_policy {
            PolicyKind::ExactDay => FertilityCheckPolicy::ExactDay(self.fertility_check_day),
            PolicyKind::OnOrAfterDay => {
                FertilityCheckPolicy::OnOrAfterDay(self.fertility_check_day)
            }
        }
    }

    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        if self.fertility_check_day == 0 {
            errors.push(ValidationError::new(
                "lifecycle.fertility_check_day",
                "fertility check day must be at least 1",
            ));
        }
        errors
    }
}

fn non_empty_path(field: &str, path: &Path) -> Vec<ValidationError> {
    if path.as_os_str().is_empty() {
        vec![ValidationError::new(field, "path cannot be empty")]
    } else {
        Vec::new()
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
    #[error("Failed to serialize config: {0}")]
    Serialize(toml::ser::Error),
    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    Validation(Vec<ValidationError>),
}

/// A single validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// The field path (e.g., `controller.address`).
    pub field: String,
    /// Description of the validation failure.
    pub message: String,
}

impl ValidationError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
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

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.controller.address, "192.168.1.125");
        assert_eq!(config.controller.timeout(), Duration::from_secs(5));
        assert_eq!(config.lifecycle.policy(), FertilityCheckPolicy::ExactDay(7));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [controller]
            address = "10.0.0.7:8080"

            [lifecycle]
            fertility_check_policy = "on-or-after-day"
            "#,
        )
        .unwrap();

        assert_eq!(config.controller.address, "10.0.0.7:8080");
        assert_eq!(config.controller.timeout_secs, 5);
        assert_eq!(config.catalog.path, PathBuf::from("aves.json"));
        assert_eq!(config.sensors.path, PathBuf::from("dados.csv"));
        assert_eq!(
            config.lifecycle.policy(),
            FertilityCheckPolicy::OnOrAfterDay(7)
        );
    }

    #[test]
    fn test_unknown_policy_is_a_parse_error() {
        let result: Result<Config, _> = toml::from_str(
            r#"
            [lifecycle]
            fertility_check_policy = "whenever"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_collects_all_errors() {
        let mut config = Config::default();
        config.controller.address = "  ".to_string();
        config.controller.timeout_secs = 0;
        config.catalog.path = PathBuf::new();
        config.lifecycle.fertility_check_day = 0;

        let err = config.validate().unwrap_err();
        let ConfigError::Validation(errors) = &err else {
            panic!("expected validation error, got {err:?}");
        };
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(
            fields,
            [
                "controller.address",
                "controller.timeout_secs",
                "catalog.path",
                "lifecycle.fertility_check_day",
            ]
        );

        let message = err.to_string();
        assert!(message.starts_with("Configuration validation failed:"));
        assert!(message.contains("  - controller.timeout_secs: timeout must be between 1 and 60"));
    }

    #[test]
    fn test_address_with_whitespace_rejected() {
        let section = ControllerSection {
            address: "192.168.1.125 8080".to_string(),
            ..Default::default()
        };
        let errors = section.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("whitespace"));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.controller.address = "incubadora.local".to_string();
        config.lifecycle.fertility_check_day = 8;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert!(loaded.validate().is_ok());
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_reports_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[controller\naddress = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
