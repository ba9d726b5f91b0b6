//! Reload event types and triggers

use std::fmt;
use std::path::PathBuf;

/// Events emitted while keeping the script's environment alive
///
/// The text rendering (`Display`) is the log line contract; `to_json`
/// produces one NDJSON object per event.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ReloadEvent {
    /// Watching started
    WatchStarted { script: String },
    /// The environment was discarded and rebuilt
    Reset { clear_screen: bool },
    /// A statement is about to run
    Eval { line: String },
    /// A statement or module reload faulted
    Exception { message: String },
    /// A tracked module is being reloaded in place
    Reload { module: String },
    /// The watched script failed to parse
    SyntaxError { message: String },
    /// The watched script could not be read
    Unreadable { path: String, message: String },
    /// Operator-forced full reload
    FullReload,
    /// Watching stopped
    Shutdown,
}

impl ReloadEvent {
    /// Convert to a single-line JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| r#"{"event":"error"}"#.to_string())
    }

    /// Whether the event reports a failure (routed to stderr)
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            ReloadEvent::Exception { .. }
                | ReloadEvent::SyntaxError { .. }
                | ReloadEvent::Unreadable { .. }
        )
    }
}

impl fmt::Display for ReloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReloadEvent::WatchStarted { script } => write!(f, "[watch] {script}"),
            ReloadEvent::Reset { .. } => write!(f, "[reset]"),
            ReloadEvent::Eval { line } => write!(f, "[eval] {line}"),
            ReloadEvent::Exception { message } => write!(f, "[Exception] {message}"),
            ReloadEvent::Reload { module } => write!(f, "[reload] {module}"),
            ReloadEvent::SyntaxError { message } => write!(f, "[SyntaxError] {message}"),
            ReloadEvent::Unreadable { path, message } => {
                write!(f, "[error] cannot read {path}: {message}")
            }
            ReloadEvent::FullReload => write!(f, "[full-reload]"),
            ReloadEvent::Shutdown => write!(f, "[stop]"),
        }
    }
}

/// What woke the orchestrator up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A file in the watched directory changed
    Modified(PathBuf),
    /// The operator asked for a cold restart of the environment
    FullReload,
}
