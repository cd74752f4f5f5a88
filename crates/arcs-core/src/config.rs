//! Configuration structures for the arcs tracker.
//!
//! This module provides configuration types for all components of the application:
//!
//! - [`ScanConfig`] - Discovery settings (marker file, search root, scan mode)
//! - [`RegistryConfig`] - Where the registry document lives
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a partial JSON file only overrides what it names.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::classify::{ArcClassifier, DEFAULT_MARKER_FILE};
use crate::error::ConfigError;

/// Directory created under the platform data directory.
const APP_DIR_NAME: &str = "arcs";

/// File name of the registry document.
pub const REGISTRY_FILE_NAME: &str = "localArcs.json";

/// Configuration for arc discovery.
///
/// # Examples
///
/// ```
/// use arcs_core::ScanConfig;
///
/// let config = ScanConfig::default();
/// assert_eq!(config.marker_file, "isa.investigation.xlsx");
/// assert_eq!(config.search_root, "/");
/// assert!(!config.full_scan);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Marker file name that identifies an arc directory.
    pub marker_file: String,

    /// Root the Unix search starts from.
    ///
    /// The Windows strategy searches every enumerated drive instead.
    pub search_root: Utf8PathBuf,

    /// Whether scans cross filesystem boundaries and include all drives
    /// when the caller does not say otherwise.
    pub full_scan: bool,
}

impl ScanConfig {
    /// Builds the [`ArcClassifier`] for the configured marker file.
    #[must_use]
    pub fn classifier(&self) -> ArcClassifier {
        ArcClassifier::new(self.marker_file.clone())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            marker_file: DEFAULT_MARKER_FILE.to_owned(),
            search_root: Utf8PathBuf::from("/"),
            full_scan: false,
        }
    }
}

/// Configuration for the persisted registry.
///
/// # Examples
///
/// ```
/// use arcs_core::RegistryConfig;
/// use camino::Utf8PathBuf;
///
/// let config = RegistryConfig {
///     data_file: Some(Utf8PathBuf::from("/tmp/localArcs.json")),
/// };
/// assert_eq!(config.resolve_data_file().unwrap(), "/tmp/localArcs.json");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Explicit location of the registry document.
    ///
    /// `None` means `<data dir>/arcs/localArcs.json`.
    pub data_file: Option<Utf8PathBuf>,
}

impl RegistryConfig {
    /// Returns the registry document path, falling back to the platform
    /// data directory.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoDataDir`] if no data directory is known for
    /// this platform, or [`ConfigError::NonUtf8Path`] if it is not UTF-8.
    pub fn resolve_data_file(&self) -> Result<Utf8PathBuf, ConfigError> {
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }

        let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
        let data_dir = Utf8PathBuf::from_path_buf(data_dir).map_err(ConfigError::NonUtf8Path)?;
        Ok(data_dir.join(APP_DIR_NAME).join(REGISTRY_FILE_NAME))
    }
}

/// Root configuration for the arcs tracker.
///
/// # Examples
///
/// ```
/// use arcs_core::Config;
///
/// let config: Config = serde_json::from_str(r#"{"scan": {"full_scan": true}}"#).unwrap();
/// assert!(config.scan.full_scan);
/// assert_eq!(config.scan.marker_file, "isa.investigation.xlsx");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discovery configuration.
    pub scan: ScanConfig,

    /// Registry configuration.
    pub registry: RegistryConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if the file does not exist,
    /// [`ConfigError::Io`] / [`ConfigError::Parse`] if it cannot be read or
    /// parsed, and [`ConfigError::InvalidOption`] if validation fails.
    pub fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_owned()));
        }

        let contents = std::fs::read_to_string(path.as_std_path())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks option values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] describing the first bad option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let marker = self.scan.marker_file.as_str();
        if marker.is_empty() {
            return Err(ConfigError::invalid_option(
                "scan.marker_file",
                "must not be empty",
            ));
        }
        if marker.contains(['/', '\\']) {
            return Err(ConfigError::invalid_option(
                "scan.marker_file",
                "must be a file name, not a path",
            ));
        }
        if self.scan.search_root.as_str().is_empty() {
            return Err(ConfigError::invalid_option(
                "scan.search_root",
                "must not be empty",
            ));
        }
        if let Some(data_file) = &self.registry.data_file {
            if data_file.is_relative() {
                return Err(ConfigError::invalid_option(
                    "registry.data_file",
                    "must be an absolute path",
                ));
            }
        }
        Ok(())
    }
}
