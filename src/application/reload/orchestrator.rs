//! Reload Orchestrator
//!
//! The state machine sequencing parse, diff, apply and module reloads for
//! each trigger. Triggers are processed one at a time to completion.

use std::fs;
use std::path::{Path, PathBuf};

use crate::application::environment::{ApplyOutcome, EnvironmentManager, ResetMode};
use crate::domain::entities::{Snapshot, SnapshotStore};
use crate::domain::ports::{Executor, SourceParser};
use crate::domain::services::{should_reload, DependencySet, ReplayPlan, StatementDiffer};
use crate::error::{IterastError, IterastResult};
use crate::script::{Environment, Statement};

use super::event::{ReloadEvent, Trigger};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadState {
    Idle,
    Reloading,
    /// The last replay faulted; the environment is fresh and empty
    ErrorRecovered,
}

pub struct ReloadOrchestrator<P, X> {
    parser: P,
    differ: StatementDiffer,
    manager: EnvironmentManager<X>,
    store: SnapshotStore,
    dependencies: DependencySet,
    script: PathBuf,
    state: ReloadState,
}

impl<P: SourceParser, X: Executor> ReloadOrchestrator<P, X> {
    pub fn new(parser: P, executor: X, script: impl Into<PathBuf>) -> Self {
        let script = script.into();
        let script = script.canonicalize().unwrap_or(script);
        Self {
            parser,
            differ: StatementDiffer::new(),
            manager: EnvironmentManager::new(executor, script.clone()),
            store: SnapshotStore::new(),
            dependencies: DependencySet::new(),
            script,
            state: ReloadState::Idle,
        }
    }

    /// Whether normal resets ask the sink to clear the screen
    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.manager = self.manager.with_clear_screen(clear_screen);
        self
    }

    pub fn state(&self) -> ReloadState {
        self.state
    }

    pub fn environment(&self) -> &Environment {
        self.manager.environment()
    }

    pub fn executor(&self) -> &X {
        self.manager.executor()
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    /// Canonical path of the watched script
    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Whether `path` names the watched script
    pub fn is_main_file(&self, path: &Path) -> bool {
        path == self.script || path.canonicalize().is_ok_and(|p| p == self.script)
    }

    /// Initial parse, reset and full replay
    pub fn start(&mut self, on_event: &impl Fn(ReloadEvent)) {
        self.state = ReloadState::Reloading;
        self.store.clear();
        let snapshot = self.load(on_event);

        self.manager.reset(ResetMode::Normal, on_event);
        match snapshot {
            Some(snapshot) => {
                self.store.push(snapshot);
                self.replay_current(on_event);
            }
            None => self.state = ReloadState::Idle,
        }
    }

    pub fn handle(&mut self, trigger: Trigger, on_event: &impl Fn(ReloadEvent)) {
        match trigger {
            Trigger::FullReload => self.full_reload(on_event),
            Trigger::Modified(path) if self.is_main_file(&path) => {
                self.on_main_file_modified(on_event)
            }
            Trigger::Modified(path) => self.on_dependency_modified(&path, on_event),
        }
    }

    /// Re-parse the script and replay what changed
    pub fn on_main_file_modified(&mut self, on_event: &impl Fn(ReloadEvent)) {
        // A parse failure leaves snapshots and environment as they were.
        let Some(snapshot) = self.load(on_event) else {
            return;
        };

        // After a fault the environment is empty, so diffing would skip
        // statements whose bindings no longer exist.
        let cold = self.state == ReloadState::ErrorRecovered || self.store.is_empty();
        self.state = ReloadState::Reloading;
        self.store.push(snapshot);

        let plan = match self.store.pair() {
            Some((previous, current)) if !cold => self.differ.diff(previous, current),
            _ => self.store.current().map(ReplayPlan::full).unwrap_or_default(),
        };

        if plan.full_reset {
            self.manager.reset(ResetMode::Normal, on_event);
        }
        self.replay(&plan.statements, on_event);
    }

    /// Reload a tracked module in place, then replay the whole script
    ///
    /// Files whose base name is not a tracked module are ignored.
    pub fn on_dependency_modified(&mut self, path: &Path, on_event: &impl Fn(ReloadEvent)) {
        let Some(module) = should_reload(path, &self.dependencies) else {
            return;
        };

        let previous = self.state;
        self.state = ReloadState::Reloading;
        if let Err(fault) = self.manager.reload_module(&module, on_event) {
            on_event(ReloadEvent::Exception {
                message: fault.to_string(),
            });
            self.recover(on_event);
            return;
        }

        // The environment was not replayed, so it is no more trustworthy
        // than before the reload.
        let Some(snapshot) = self.load(on_event) else {
            self.state = previous;
            return;
        };
        self.store.push(snapshot);
        self.replay_current(on_event);
    }

    /// Parse, reset and replay everything, bypassing the differ
    pub fn full_reload(&mut self, on_event: &impl Fn(ReloadEvent)) {
        on_event(ReloadEvent::FullReload);
        let Some(snapshot) = self.load(on_event) else {
            return;
        };

        self.state = ReloadState::Reloading;
        self.store.push(snapshot);
        self.manager.reset(ResetMode::Normal, on_event);
        self.replay_current(on_event);
    }

    fn read_snapshot(&self) -> IterastResult<Snapshot> {
        let source = fs::read_to_string(&self.script)?;
        let statements = self
            .parser
            .parse(&source)
            .map_err(|source| IterastError::Parse {
                file: self.script.clone(),
                source,
            })?;
        Ok(Snapshot::new(statements))
    }

    fn load(&self, on_event: &impl Fn(ReloadEvent)) -> Option<Snapshot> {
        match self.read_snapshot() {
            Ok(snapshot) => Some(snapshot),
            Err(IterastError::Parse { file, source }) => {
                on_event(ReloadEvent::SyntaxError {
                    message: format!("{}:{source}", file.display()),
                });
                None
            }
            Err(e) => {
                on_event(ReloadEvent::Unreadable {
                    path: self.script.display().to_string(),
                    message: e.to_string(),
                });
                None
            }
        }
    }

    fn replay_current(&mut self, on_event: &impl Fn(ReloadEvent)) {
        let statements = self
            .store
            .current()
            .map(|snapshot| snapshot.statements().to_vec())
            .unwrap_or_default();
        self.replay(&statements, on_event);
    }

    fn replay(&mut self, statements: &[Statement], on_event: &impl Fn(ReloadEvent)) {
        match self.manager.apply(statements, on_event) {
            ApplyOutcome::Completed => self.state = ReloadState::Idle,
            ApplyOutcome::Faulted { .. } => self.recover(on_event),
        }
        self.refresh_dependencies();
    }

    fn recover(&mut self, on_event: &impl Fn(ReloadEvent)) {
        self.manager.reset(ResetMode::ErrorRecovery, on_event);
        self.state = ReloadState::ErrorRecovered;
    }

    fn refresh_dependencies(&mut self) {
        if let Some(current) = self.store.current() {
            self.dependencies =
                DependencySet::from_snapshot(current, |module| self.manager.is_loaded(module));
        }
    }
}
