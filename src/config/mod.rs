//! Configuration module for serial-scope
//!
//! This module handles the configuration supplied at pipeline construction:
//! - Serial link settings (port, baud rate, read timeout)
//! - Frame layout and history length
//! - Consumer poll period and channel labels
//! - Logging
//!
//! # Config File Location
//!
//! When no path is given, the config is read from the platform config
//! directory under `dev.hxyulin.serial-scope`:
//! - **Linux**: `~/.config/dev.hxyulin.serial-scope/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.hxyulin.serial-scope/config.toml`
//! - **Windows**: `%APPDATA%\dev.hxyulin.serial-scope\config.toml`
//!
//! # Example
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyUSB0"
//! baud_rate = 38400
//!
//! [acquisition]
//! sample_width_bytes = 4
//! num_channels = 3
//! history_length = 100
//!
//! [display]
//! poll_interval_ms = 50
//!
//! [[display.channels]]
//! label = "Desired"
//! style = "r-"
//! ```

use crate::error::{Result, ScopeError};
use crate::types::SampleWidth;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.hxyulin.serial-scope";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default serial port
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 38400;

/// Default transport read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 4000;

/// Default consumer poll period in milliseconds
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Default log filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,serial_scope=debug";

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID).join(CONFIG_FILE))
}

// ==================== Serial ====================

/// Serial link settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port name (e.g. "/dev/ttyUSB0" or "COM3")
    pub port: String,

    /// Baud rate
    pub baud_rate: u32,

    /// Read timeout in milliseconds; also bounds how long `stop()` can wait
    pub read_timeout_ms: u64,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

// ==================== Acquisition ====================

/// Frame layout and acquisition loop settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Bytes per channel value: 2 (i16) or 4 (f32)
    pub sample_width_bytes: u8,

    /// Channels per frame
    pub num_channels: usize,

    /// Values retained per channel
    pub history_length: usize,

    /// Delay before the initial input flush, in milliseconds
    pub warmup_ms: u64,

    /// How long `start()` waits for the first frame after warm-up, in milliseconds
    pub start_timeout_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_width_bytes: 4,
            num_channels: 3,
            history_length: crate::pipeline::DEFAULT_HISTORY_LENGTH,
            warmup_ms: 1000,
            start_timeout_ms: 10_000,
        }
    }
}

impl AcquisitionConfig {
    /// Check the frame layout and return the typed sample width
    pub fn validate(&self) -> Result<SampleWidth> {
        let width = SampleWidth::try_from(self.sample_width_bytes)
            .map_err(|e| ScopeError::Config(e.to_string()))?;
        if self.num_channels == 0 {
            return Err(ScopeError::Config(
                "num_channels must be at least 1".to_string(),
            ));
        }
        if self.history_length == 0 {
            return Err(ScopeError::Config(
                "history_length must be at least 1".to_string(),
            ));
        }
        Ok(width)
    }

    /// Exact byte length of one frame
    pub fn frame_len(&self) -> usize {
        self.num_channels * self.sample_width_bytes as usize
    }
}

// ==================== Display ====================

/// Label and line style of one channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelDisplay {
    pub label: String,
    /// Free-form style hint for the renderer (e.g. "r-")
    #[serde(default)]
    pub style: String,
}

impl ChannelDisplay {
    pub fn new(label: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            style: style.into(),
        }
    }
}

/// Consumer-side settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Period of the render poll in milliseconds
    pub poll_interval_ms: u64,

    /// Per-channel labels, in channel order
    pub channels: Vec<ChannelDisplay>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            channels: vec![
                ChannelDisplay::new("Desired", "r-"),
                ChannelDisplay::new("Actual", "c-"),
                ChannelDisplay::new("Error", "b-"),
            ],
        }
    }
}

impl DisplayConfig {
    /// Label of a channel, falling back to `ch{index}`
    pub fn label(&self, index: usize) -> String {
        self.channels
            .get(index)
            .map(|c| c.label.clone())
            .unwrap_or_else(|| format!("ch{}", index))
    }
}

// ==================== Logging ====================

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Directory for daily rolling log files; stderr only when unset
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
        }
    }
}

// ==================== Scope Config ====================

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub serial: SerialConfig,
    pub acquisition: AcquisitionConfig,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

impl ScopeConfig {
    /// Default config file location, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        default_config_path()
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ScopeError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ScopeError::Serialization(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load from `path`, or the default location, falling back to defaults
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match default_config_path() {
                Some(p) if p.exists() => p,
                _ => return Self::default(),
            },
        };

        match Self::load(&path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", path);
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load config, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Save the config as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| ScopeError::Serialization(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
