//! Watch options, messages and debounce state

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::Config;

/// Debounce duration in milliseconds
pub const DEBOUNCE_MS: u64 = 100;

/// Startup cooldown in milliseconds
pub const COOLDOWN_MS: u64 = 500;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Script to keep alive
    pub script: PathBuf,
    /// Clear the screen on normal resets
    pub clear_screen: bool,
    /// Quiet period before processing a burst of changes
    pub debounce: Duration,
    /// Startup window during which notifications are discarded
    pub cooldown: Duration,
    /// Read operator commands from stdin
    pub operator_input: bool,
}

impl WatchOptions {
    /// Create new watch options with defaults
    pub fn new(script: impl Into<PathBuf>) -> Self {
        Self {
            script: script.into(),
            clear_screen: true,
            debounce: Duration::from_millis(DEBOUNCE_MS),
            cooldown: Duration::from_millis(COOLDOWN_MS),
            operator_input: false,
        }
    }

    /// Take screen and timing settings from `config`
    pub fn with_config(mut self, config: &Config) -> Self {
        self.clear_screen = config.output.clear;
        self.debounce = Duration::from_millis(config.watch.debounce_ms);
        self.cooldown = Duration::from_millis(config.watch.cooldown_ms);
        self
    }

    pub fn with_clear_screen(mut self, clear_screen: bool) -> Self {
        self.clear_screen = clear_screen;
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_operator_input(mut self, operator_input: bool) -> Self {
        self.operator_input = operator_input;
        self
    }

    /// Directory that is watched (non-recursively)
    pub fn watch_dir(&self) -> &Path {
        self.script
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }
}

/// Messages delivered to the watch loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchMessage {
    /// A file in the watched directory was modified or created
    Changed(PathBuf),
    /// The operator requested a full reload
    FullReload,
}

/// Watcher state for debouncing
#[derive(Debug)]
pub struct WatcherState {
    debounce: Duration,
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
}

impl Default for WatcherState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEBOUNCE_MS))
    }
}

impl WatcherState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    /// Add a file change to pending changes
    pub fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    /// Whether the debounce period has passed with changes pending
    pub fn should_process(&self) -> bool {
        match self.last_change {
            Some(last) => !self.pending_changes.is_empty() && last.elapsed() >= self.debounce,
            None => false,
        }
    }

    /// Take all pending changes, sorted, with `main` (if present) last
    ///
    /// Dependencies are handled before the script that imports them.
    pub fn take_changes(&mut self, main: &Path) -> Vec<PathBuf> {
        let mut changes: Vec<_> = self.pending_changes.drain().collect();
        changes.sort_by_key(|path| (path == main, path.clone()));
        self.last_change = None;
        changes
    }

    pub fn has_pending(&self) -> bool {
        !self.pending_changes.is_empty()
    }
}
