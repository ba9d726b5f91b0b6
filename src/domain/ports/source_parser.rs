//! SourceParser port - turns script text into top-level statements

use crate::script::{ParseError, Statement};

pub trait SourceParser {
    /// Parse a whole file into its ordered top-level statements
    fn parse(&self, source: &str) -> Result<Vec<Statement>, ParseError>;
}
