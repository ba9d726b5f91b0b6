//! Application Layer
//!
//! Use cases that drive the domain through its ports.
//!
//! - `EnvironmentManager` - Owns the live environment (reset, apply, module reload)
//! - `ReloadOrchestrator` - Sequences differ, environment and dependency tracker per trigger
//! - `WatchUseCase` - Feeds file system and operator triggers to the orchestrator

pub mod environment;
pub mod reload;
pub mod watch;

pub use environment::{ApplyOutcome, EnvironmentManager, ResetMode};
pub use reload::{ReloadEvent, ReloadOrchestrator, ReloadState, Trigger};
pub use watch::{WatchOptions, WatchUseCase};
