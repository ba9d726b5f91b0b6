//! Execution Environment Manager
//!
//! Owns the one live [`Environment`]. A reset replaces it wholesale with a
//! copy of the base scope; `apply` mutates it in place one statement at a
//! time and stops at the first fault. Recovery policy is the caller's.

use std::path::{Path, PathBuf};

use crate::application::reload::ReloadEvent;
use crate::domain::ports::Executor;
use crate::script::{BaseScope, Environment, Fault, Statement, Value};

/// Binding that identifies the main execution context
pub const MAIN_NAME: &str = "__main__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetMode {
    /// Regular reset: the screen may be cleared first
    Normal,
    /// Reset after a fault: keeps the fault visible
    ErrorRecovery,
}

/// Result of applying a batch of statements
#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Completed,
    Faulted { index: usize, fault: Fault },
}

impl ApplyOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ApplyOutcome::Completed)
    }

    /// Index of the statement that faulted
    pub fn failed_at(&self) -> Option<usize> {
        match self {
            ApplyOutcome::Completed => None,
            ApplyOutcome::Faulted { index, .. } => Some(*index),
        }
    }
}

pub struct EnvironmentManager<X> {
    executor: X,
    base: BaseScope,
    script: PathBuf,
    environment: Environment,
    clear_screen: bool,
}

impl<X: Executor> EnvironmentManager<X> {
    /// Capture the executor's base scope and seed a first environment
    pub fn new(executor: X, script: impl Into<PathBuf>) -> Self {
        let base = executor.base_scope();
        let script = script.into();
        let environment = seed(&base, &script);
        Self {
            executor,
            base,
            script,
            environment,
            clear_screen: true,
        }
    }

    /// Whether normal resets ask the sink to clear the screen
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn executor(&self) -> &X {
        &self.executor
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Discard the environment and start over from the base scope
    pub fn reset(&mut self, mode: ResetMode, on_event: &impl Fn(ReloadEvent)) -> &Environment {
        self.environment = seed(&self.base, &self.script);
        on_event(ReloadEvent::Reset {
            clear_screen: mode == ResetMode::Normal && self.clear_screen,
        });
        &self.environment
    }

    /// Execute `statements` in order, stopping at the first fault
    pub fn apply(&mut self, statements: &[Statement], on_event: &impl Fn(ReloadEvent)) -> ApplyOutcome {
        for (index, statement) in statements.iter().enumerate() {
            on_event(ReloadEvent::Eval {
                line: statement.preview(),
            });
            if let Err(fault) = self.executor.execute(statement, &mut self.environment) {
                on_event(ReloadEvent::Exception {
                    message: fault.to_string(),
                });
                return ApplyOutcome::Faulted { index, fault };
            }
        }
        ApplyOutcome::Completed
    }

    /// Reload `module` in place inside the current environment
    pub fn reload_module(&mut self, module: &str, on_event: &impl Fn(ReloadEvent)) -> Result<(), Fault> {
        on_event(ReloadEvent::Reload {
            module: module.to_string(),
        });
        self.executor.reload_module(module, &mut self.environment)
    }

    pub fn is_loaded(&self, module: &str) -> bool {
        self.executor.is_loaded(module)
    }
}

/// A fresh environment: the base scope plus the main-context conventions
fn seed(base: &BaseScope, script: &Path) -> Environment {
    let env = Environment::from_base(base);
    let dir = script
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    env.set("__name__", Value::str(MAIN_NAME));
    env.set("__file__", Value::str(script.display().to_string()));
    env.set("__path__", Value::list(vec![Value::str(dir.display().to_string())]));
    env
}
