//! Parse errors and runtime faults raised by scripts

use thiserror::Error;

/// Malformed source text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{line}:{column}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// A runtime fault raised while executing a statement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Fault {
    #[error("name '{0}' is not defined")]
    UndefinedName(String),

    #[error("unsupported operand types for {op}: '{left}' and '{right}'")]
    Operands {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("{0}")]
    Type(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("sequence too large (limit is {} items)", super::value::MAX_SEQUENCE_LEN)]
    TooLarge,

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("{name}() takes {expected} argument(s) but {given} were given")]
    Arity {
        name: String,
        expected: usize,
        given: usize,
    },

    #[error("'{0}' object is not callable")]
    NotCallable(&'static str),

    #[error("module '{module}' has no attribute '{name}'")]
    UnknownAttribute { module: String, name: String },

    #[error("no module named '{0}'")]
    ModuleNotFound(String),

    #[error("circular import of module '{0}'")]
    CircularImport(String),

    #[error("cannot import name '{name}' from '{module}'")]
    ImportName { module: String, name: String },

    #[error("cannot read module '{module}': {message}")]
    ModuleIo { module: String, message: String },

    #[error("syntax error in module '{module}' at {error}")]
    ModuleSyntax { module: String, error: ParseError },

    #[error("in module '{module}': {cause}")]
    InModule { module: String, cause: Box<Fault> },

    #[error("maximum recursion depth exceeded")]
    RecursionLimit,

    #[error("'{0}' outside of {1}")]
    Misplaced(&'static str, &'static str),

    #[error("function '{0}' outlived the environment it was defined in")]
    Detached(String),

    #[error("cannot write output: {0}")]
    Output(String),

    #[error("{0}")]
    Raised(String),
}
