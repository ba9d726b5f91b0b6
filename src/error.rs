//! Error types for iterast
//!
//! Uses `thiserror` for library errors. Script-level problems (syntax
//! errors, runtime faults) are not errors here: they are reported as
//! reload events and never stop the watch loop.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for iterast operations
pub type IterastResult<T> = Result<T, IterastError>;

/// Main error type for iterast operations
#[derive(Error, Debug)]
pub enum IterastError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The watched script failed to parse
    #[error("syntax error in {file}:{source}")]
    Parse {
        file: PathBuf,
        source: crate::script::ParseError,
    },

    /// File system watcher could not be set up
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// Invalid configuration file
    #[error("invalid config in {file}: {message}")]
    Config { file: PathBuf, message: String },

    /// The script to watch does not exist
    #[error("script not found: {path}")]
    ScriptNotFound { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ParseError;

    #[test]
    fn test_error_display_script_not_found() {
        let err = IterastError::ScriptNotFound {
            path: PathBuf::from("demo/main.it"),
        };
        assert_eq!(err.to_string(), "script not found: demo/main.it");
    }

    #[test]
    fn test_error_display_parse() {
        let err = IterastError::Parse {
            file: PathBuf::from("main.it"),
            source: ParseError::new(3, 7, "expected expression, found end of input"),
        };
        assert_eq!(
            err.to_string(),
            "syntax error in main.it:3:7: expected expression, found end of input"
        );
    }

    #[test]
    fn test_error_from_io() {
        let err: IterastError = std::io::Error::other("disk on fire").into();
        assert_eq!(err.to_string(), "IO error: disk on fire");
    }
}
