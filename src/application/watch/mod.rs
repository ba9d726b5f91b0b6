//! Watch Use Case
//!
//! Turns file system notifications and operator input into reload triggers:
//! - File system monitoring (via `notify` crate), non-recursive on the script's directory
//! - Debouncing (100ms default)
//! - Content-hash filtering of saves that changed nothing
//! - Operator full reload (`r` or `reload` on stdin)
//!
//! ## Usage
//!
//! ```ignore
//! let options = WatchOptions::new(script).with_clear_screen(false);
//! let use_case = WatchUseCase::new(options);
//! use_case.start(ScriptParser::new(), executor, running, |event| { ... });
//! ```

mod cache;
mod event;
mod input;
mod use_case;


pub use cache::{compute_content_hash, ContentHashes};
pub use event::{WatchMessage, WatchOptions, WatcherState, DEBOUNCE_MS};
pub use input::{is_reload_command, spawn_operator_input};
pub use use_case::WatchUseCase;
