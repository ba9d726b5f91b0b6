//! Configuration module for iterast
//!
//! Configuration hierarchy:
//! 1. CLI flags (highest priority)
//! 2. Environment variables (ITERAST_*)
//! 3. `iterast.toml` in the watched script's directory
//! 4. Built-in defaults (lowest priority)

mod env_validator;
mod loader;
mod types;

pub use env_validator::{levenshtein, EnvVarValidator};
pub use loader::{ConfigWarning, CONFIG_FILE_NAME};
pub use types::{ColorMode, Config, OutputConfig, OutputFormat, WatchConfig};
