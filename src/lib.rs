//! iterast - live-reload for scripts that keeps program state alive
//!
//! Watches one script. On every save only the statements that changed
//! (and everything after them) are re-executed against the live
//! environment; imported modules are reloaded in place.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod presentation;
pub mod script;

// Re-exports for convenience
pub use application::{
    ReloadEvent, ReloadOrchestrator, ReloadState, Trigger, WatchOptions, WatchUseCase,
};
pub use config::Config;
pub use error::{IterastError, IterastResult};
pub use script::{Interpreter, ScriptParser};
