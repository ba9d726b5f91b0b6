//! Executor port - runs statements against a persistent environment
//!
//! Implementations own whatever process-wide state the language needs
//! (such as a module registry); the environment itself belongs to the caller.

use crate::script::{BaseScope, Environment, Fault, Statement};

pub trait Executor {
    /// Bindings every fresh environment starts from
    fn base_scope(&self) -> BaseScope;

    /// Execute one statement, mutating `env` in place
    fn execute(&mut self, statement: &Statement, env: &mut Environment) -> Result<(), Fault>;

    /// Re-read `module` from disk and rebind every name in `env` that held
    /// the previous version, leaving all other bindings untouched
    fn reload_module(&mut self, module: &str, env: &mut Environment) -> Result<(), Fault>;

    /// Whether `module` is currently loaded
    fn is_loaded(&self, module: &str) -> bool;

    /// File extension (without the dot) that imported modules are read from
    fn module_extension(&self) -> &str;
}
