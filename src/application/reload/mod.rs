//! Reload Use Case
//!
//! Keeps one script's environment alive across edits:
//! - `ReloadOrchestrator` - State machine driven by `Trigger`s
//! - `ReloadEvent` - Log events emitted while reloading
//!
//! ## Usage
//!
//! ```ignore
//! let mut orchestrator = ReloadOrchestrator::new(ScriptParser::new(), executor, script);
//! orchestrator.start(&|event| println!("{event}"));
//! orchestrator.handle(Trigger::Modified(path), &|event| println!("{event}"));
//! ```

mod event;
mod orchestrator;


pub use event::{ReloadEvent, Trigger};
pub use orchestrator::{ReloadOrchestrator, ReloadState};
