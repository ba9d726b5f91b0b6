//! Domain Layer
//!
//! The reload engine's pure logic, with no file system or terminal access.
//!
//! ## Structure
//!
//! - `entities/` - Snapshots of the watched script and the two-slot store
//! - `services/` - Statement differ and dependency tracker
//! - `ports/` - Interfaces for the script parser and executor
//!
//! ## Design Principles
//!
//! 1. **No I/O** - Watching, reading and printing happen in outer layers
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - Parsing and execution go through trait-defined ports
//!
//! ## Shared Kernel
//!
//! The script layer's syntax tree and value model (`Statement`,
//! `Environment`, `BaseScope`, `Fault`) are used here directly rather than
//! mirrored by domain-owned types. Statements are compared by their parsed
//! form and environments are handed through the executor port untouched,
//! so both layers must agree on these types. `crate::script` in turn only
//! depends on the domain for the port traits it implements.

pub mod entities;
pub mod ports;
pub mod services;
