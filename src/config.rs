//! Startup settings
//!
//! Settings are layered: built-in defaults, then an optional TOML file,
//! then command-line flags. A config file may set any subset of keys:
//!
//! ```toml
//! device = "usbmon1"
//! bus = 1
//! output = "/var/tmp/keys.txt"
//! daemon = true
//! immediate = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::usbmon::CaptureOptions;

/// Capture device used when none is given
pub const DEFAULT_DEVICE: &str = "usbmon0";

/// One layer of optional settings (config file or command line)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsLayer {
    pub device: Option<String>,
    /// Only decode frames from this bus (0 = all)
    pub bus: Option<u16>,
    /// Append decoded text here instead of stdout
    pub output: Option<PathBuf>,
    pub daemon: Option<bool>,
    pub immediate: Option<bool>,
}

impl SettingsLayer {
    /// Load a layer from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Values set in `other` win
    pub fn merge(self, other: SettingsLayer) -> Self {
        Self {
            device: other.device.or(self.device),
            bus: other.bus.or(self.bus),
            output: other.output.or(self.output),
            daemon: other.daemon.or(self.daemon),
            immediate: other.immediate.or(self.immediate),
        }
    }
}

/// Resolved settings for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: String,
    pub bus: u16,
    pub output: Option<PathBuf>,
    pub daemon: bool,
    pub immediate: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            bus: 0,
            output: None,
            daemon: false,
            immediate: true,
        }
    }
}

impl Settings {
    /// Apply a layer over the defaults and validate the result
    pub fn from_layer(layer: SettingsLayer) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let settings = Self {
            device: layer.device.unwrap_or(defaults.device),
            bus: layer.bus.unwrap_or(defaults.bus),
            output: layer.output.or(defaults.output),
            daemon: layer.daemon.unwrap_or(defaults.daemon),
            immediate: layer.immediate.unwrap_or(defaults.immediate),
        };

        if settings.daemon && settings.output.is_none() {
            return Err(ConfigError::DaemonWithoutOutput);
        }
        Ok(settings)
    }

    /// Resolve defaults ← optional config file ← command line
    pub fn resolve(config: Option<&Path>, cli: SettingsLayer) -> Result<Self, ConfigError> {
        let file = match config {
            Some(path) => SettingsLayer::load(path)?,
            None => SettingsLayer::default(),
        };
        Self::from_layer(file.merge(cli))
    }

    pub fn capture_options(&self) -> CaptureOptions {
        CaptureOptions {
            immediate: self.immediate,
            ..CaptureOptions::default()
        }
    }
}
