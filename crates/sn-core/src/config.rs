//! Engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Which output backend the engine should open at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Real audio output through the default cpal device
    #[default]
    Cpal,
    /// Silent backend (headless hosts, tests)
    Null,
}

/// Log verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

/// Audio section of the config file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Backend to open at startup
    pub backend: BackendKind,
    /// Maximum number of simultaneously live effect instances
    pub max_concurrent_effects: usize,
    /// Initial background-music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Initial master effects volume (0.0 - 1.0)
    pub effects_volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Cpal,
            max_concurrent_effects: 32,
            music_volume: 1.0,
            effects_volume: 1.0,
        }
    }
}

/// Debug section of the config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log verbosity
    pub log_level: LogLevel,
}

/// Top-level engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Load configuration from `sonance.toml` in the working directory.
    /// Missing file yields defaults; a malformed file is an error.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("sonance.toml"))
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Write the configuration out as TOML
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
