//! The watched script language
//!
//! A small statement-oriented language: the reload engine only needs a
//! parser that yields top-level statements with a stable textual form, and
//! an executor that runs them against a persistent environment.

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
mod lexer;
pub mod parser;
pub mod value;

pub use ast::{Expr, Statement, Stmt};
pub use builtins::BaseScope;
pub use environment::Environment;
pub use error::{Fault, ParseError};
pub use interpreter::Interpreter;
pub use parser::parse_program;
pub use value::Value;

use crate::domain::ports::SourceParser;

/// [`SourceParser`] backed by [`parse_program`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptParser;

impl ScriptParser {
    pub fn new() -> Self {
        Self
    }
}

impl SourceParser for ScriptParser {
    fn parse(&self, source: &str) -> Result<Vec<Statement>, ParseError> {
        parse_program(source)
    }
}
