//! Domain Ports (Interfaces)
//!
//! The reload engine treats parsing and execution as capabilities.
//! The `script` module provides the concrete implementations.

pub mod executor;
pub mod source_parser;

pub use executor::Executor;
pub use source_parser::SourceParser;
