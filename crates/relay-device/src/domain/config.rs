//! TOML-based configuration for the device.
//!
//! Reads and writes [`DeviceConfig`] to an explicit path or to the
//! platform-appropriate config file:
//! - Windows:  `%APPDATA%\RemoteInputRelay\device.toml`
//! - Linux:    `$XDG_CONFIG_HOME/remote-input-relay/device.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/RemoteInputRelay/device.toml`
//!
//! Example file:
//!
//! ```toml
//! [gesture]
//! sensitivity = 2.0
//!
//! [audio]
//! chunk_interval_ms = 100
//!
//! [transport]
//! outbound_queue_capacity = 256
//!
//! [haptics]
//! click_ms = 30
//! key_ms = 20
//!
//! [logging]
//! level = "info"
//! ```
//!
//! Every section and field is optional; absent values take the defaults
//! shown above.  The capture format itself (mono, 16 kHz, echo cancellation
//! and noise suppression on) is fixed and not configurable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use relay_core::CaptureConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name of the device config inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "device.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level device configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DeviceConfig {
    #[serde(default)]
    pub gesture: GestureConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub transport: TransportConfig,
    #[serde(default)]
    pub haptics: HapticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Touchpad settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GestureConfig {
    /// Multiplier applied to finger travel before rounding.
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f64,
}

/// Audio chunking settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioConfig {
    /// Interval between audio chunks in milliseconds.
    #[serde(default = "default_chunk_interval_ms")]
    pub chunk_interval_ms: u64,
}

/// Outbound transport settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportConfig {
    /// Maximum number of frames waiting to be written to the socket.
    #[serde(default = "default_queue_capacity")]
    pub outbound_queue_capacity: usize,
}

/// Haptic pulse lengths.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HapticsConfig {
    #[serde(default = "default_click_ms")]
    pub click_ms: u64,
    #[serde(default = "default_key_ms")]
    pub key_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_sensitivity() -> f64 {
    relay_core::domain::gesture::DEFAULT_SENSITIVITY
}
fn default_chunk_interval_ms() -> u64 {
    relay_core::domain::audio::DEFAULT_CHUNK_INTERVAL_MS
}
fn default_queue_capacity() -> usize {
    256
}
fn default_click_ms() -> u64 {
    30
}
fn default_key_ms() -> u64 {
    20
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            sensitivity: default_sensitivity(),
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            chunk_interval_ms: default_chunk_interval_ms(),
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: default_queue_capacity(),
        }
    }
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            click_ms: default_click_ms(),
            key_ms: default_key_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AudioConfig {
    /// The fixed capture format with the configured chunk interval.
    ///
    /// A zero interval falls back to the default so a typo in the file
    /// cannot stall the chunk ticker.
    pub fn capture_config(&self) -> CaptureConfig {
        let defaults = CaptureConfig::default();
        CaptureConfig {
            chunk_interval: if self.chunk_interval_ms == 0 {
                defaults.chunk_interval
            } else {
                Duration::from_millis(self.chunk_interval_ms)
            },
            ..defaults
        }
    }
}

impl HapticsConfig {
    pub fn click_pulse(&self) -> Duration {
        Duration::from_millis(self.click_ms)
    }

    pub fn key_pulse(&self) -> Duration {
        Duration::from_millis(self.key_ms)
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    platform_config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .ok_or(ConfigError::NoPlatformConfigDir)
}

/// Loads a [`DeviceConfig`] from `path`, or from [`config_file_path`] when
/// `path` is `None`.  A missing file yields `DeviceConfig::default()`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: Option<&Path>) -> Result<DeviceConfig, ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    match std::fs::read_to_string(&path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DeviceConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists `config` to `path`, or to [`config_file_path`] when `path` is
/// `None`.  Creates the parent directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &DeviceConfig, path: Option<&Path>) -> Result<(), ConfigError> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })
}

/// Resolves the platform config directory including the application folder.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("RemoteInputRelay"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("RemoteInputRelay")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("remote-input-relay"))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
