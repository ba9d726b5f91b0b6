//! Configuration type definitions

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::IterastResult;

use super::loader::{self, ConfigWarning};

/// How reload events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[eval] ...` log lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Color output mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Clear the screen before logging `[reset]`
    #[serde(default = "default_true")]
    pub clear: bool,

    #[serde(default)]
    pub format: OutputFormat,

    #[serde(default)]
    pub color: ColorMode,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            clear: true,
            format: OutputFormat::default(),
            color: ColorMode::default(),
        }
    }
}

/// File watching configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Quiet period before a burst of changes is processed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Startup window during which file events are discarded
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cooldown_ms: default_cooldown_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    100
}

fn default_cooldown_ms() -> u64 {
    500
}

/// Full configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub watch: WatchConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> IterastResult<Self> {
        let (config, _warnings) = loader::load_with_warnings(path)?;
        Ok(config)
    }

    /// Load configuration and collect non-fatal warnings (e.g. unknown keys).
    pub fn load_with_warnings(path: &Path) -> IterastResult<(Self, Vec<ConfigWarning>)> {
        loader::load_with_warnings(path)
    }

    /// Load `iterast.toml` next to `script` (if any), then apply env overrides
    pub fn load_for_script(script: &Path) -> IterastResult<(Self, Vec<ConfigWarning>)> {
        loader::load_for_script(script)
    }

    /// Apply environment variable overrides (ITERAST_* prefix)
    pub fn with_env_overrides(self) -> Self {
        loader::with_env_overrides(self)
    }
}
