//! Configuration loading

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{IterastError, IterastResult};

use super::env_validator::{closest, EnvVarValidator};
use super::types::{ColorMode, Config, OutputFormat};

/// Name of the per-directory configuration file
pub const CONFIG_FILE_NAME: &str = "iterast.toml";

const KNOWN_KEYS: &[&str] = &["output", "clear", "format", "color", "watch", "debounce_ms", "cooldown_ms"];

/// Non-fatal configuration warning surfaced to CLI users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub key: String,
    pub file: PathBuf,
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning: unknown config key '{}' in {}", self.key, self.file.display())?;
        if let Some(line) = self.line {
            write!(f, ":{line}")?;
        }
        if let Some(suggestion) = &self.suggestion {
            write!(f, ". Did you mean '{suggestion}'?")?;
        }
        Ok(())
    }
}

/// Load configuration and collect non-fatal warnings (e.g. unknown keys).
pub fn load_with_warnings(path: &Path) -> IterastResult<(Config, Vec<ConfigWarning>)> {
    let content = fs::read_to_string(path)?;

    let mut unknown_paths: Vec<String> = Vec::new();
    let deserializer = toml::de::Deserializer::new(&content);
    let config: Config = serde_ignored::deserialize(deserializer, |p| {
        unknown_paths.push(p.to_string());
    })
    .map_err(|e| IterastError::Config {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let warnings = unknown_paths
        .into_iter()
        .map(|dotted| {
            let key = dotted.rsplit('.').next().unwrap_or(&dotted).to_string();
            ConfigWarning {
                line: find_line_number(&content, &key),
                suggestion: closest(&key, KNOWN_KEYS).map(str::to_string),
                file: path.to_path_buf(),
                key,
            }
        })
        .collect();

    Ok((config, warnings))
}

/// Load `iterast.toml` from the script's directory, or defaults, then
/// apply environment overrides
pub fn load_for_script(script: &Path) -> IterastResult<(Config, Vec<ConfigWarning>)> {
    let dir = script
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let path = dir.join(CONFIG_FILE_NAME);

    let (config, warnings) = if path.is_file() {
        load_with_warnings(&path)?
    } else {
        (Config::default(), Vec::new())
    };
    Ok((with_env_overrides(config), warnings))
}

/// Apply environment variable overrides (ITERAST_* prefix)
pub fn with_env_overrides(config: Config) -> Config {
    with_env_overrides_from(config, |key| std::env::var(key).ok(), &mut std::io::stderr())
}

/// Apply overrides read through `get_env`, writing warnings to `writer`
pub fn with_env_overrides_from(
    mut config: Config,
    get_env: impl Fn(&str) -> Option<String>,
    writer: &mut impl Write,
) -> Config {
    if let Some(value) = get_env("ITERAST_OUTPUT") {
        config.output.format = EnvVarValidator::new("ITERAST_OUTPUT", &["text", "json"]).parse_with_writer(
            &value,
            |v| match v.to_lowercase().as_str() {
                "text" => Some(OutputFormat::Text),
                "json" => Some(OutputFormat::Json),
                _ => None,
            },
            config.output.format,
            writer,
        );
    }

    if let Some(value) = get_env("ITERAST_COLOR") {
        config.output.color = EnvVarValidator::new("ITERAST_COLOR", &["auto", "always", "never"])
            .parse_with_writer(
                &value,
                |v| match v.to_lowercase().as_str() {
                    "auto" => Some(ColorMode::Auto),
                    "always" => Some(ColorMode::Always),
                    "never" => Some(ColorMode::Never),
                    _ => None,
                },
                config.output.color,
                writer,
            );
    }

    if let Some(value) = get_env("ITERAST_CLEAR") {
        config.output.clear = EnvVarValidator::new("ITERAST_CLEAR", &["true", "false", "1", "0"])
            .parse_with_writer(
                &value,
                |v| match v.to_lowercase().as_str() {
                    "true" | "1" => Some(true),
                    "false" | "0" => Some(false),
                    _ => None,
                },
                config.output.clear,
                writer,
            );
    }

    if let Some(value) = get_env("ITERAST_DEBOUNCE_MS") {
        config.watch.debounce_ms = EnvVarValidator::new("ITERAST_DEBOUNCE_MS", &["<milliseconds>"])
            .parse_with_writer(
                &value,
                |v| v.trim().parse().ok(),
                config.watch.debounce_ms,
                writer,
            );
    }

    config
}

fn find_line_number(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.trim_start().starts_with(needle))
        .map(|i| i + 1)
}
