//! Watch Use Case implementation

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::application::reload::{ReloadEvent, ReloadOrchestrator, Trigger};
use crate::domain::ports::{Executor, SourceParser};
use crate::error::{IterastError, IterastResult};

use super::cache::ContentHashes;
use super::event::{WatchMessage, WatchOptions, WatcherState};
use super::input::spawn_operator_input;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Watch Use Case
///
/// Runs the reload orchestrator for one script until the running flag is
/// cleared.
pub struct WatchUseCase {
    options: WatchOptions,
}

impl WatchUseCase {
    pub fn new(options: WatchOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    /// Start watching (blocking)
    ///
    /// Blocks until `running` is set to false. Every reload event is
    /// delivered to `on_event`.
    pub fn start<P, X, F>(
        &self,
        parser: P,
        executor: X,
        running: Arc<AtomicBool>,
        on_event: F,
    ) -> IterastResult<()>
    where
        P: SourceParser,
        X: Executor,
        F: Fn(ReloadEvent),
    {
        let script = self
            .options
            .script
            .canonicalize()
            .map_err(|_| IterastError::ScriptNotFound {
                path: self.options.script.clone(),
            })?;
        let dir = script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.options.watch_dir().to_path_buf());
        let extension = executor.module_extension().to_string();

        on_event(ReloadEvent::WatchStarted {
            script: script.display().to_string(),
        });

        let mut orchestrator = ReloadOrchestrator::new(parser, executor, &script)
            .with_clear_screen(self.options.clear_screen);
        orchestrator.start(&on_event);

        let (tx, rx) = channel();
        let notify_tx = tx.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                        for path in event.paths {
                            let _ = notify_tx.send(WatchMessage::Changed(path));
                        }
                    }
                }
            },
            Config::default(),
        )?;
        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        if self.options.operator_input {
            spawn_operator_input(tx);
        } else {
            drop(tx);
        }

        // Pre-populate so that the first notification for an untouched
        // file is recognised as a no-op.
        let mut hashes = ContentHashes::new();
        hashes.seed_directory(&dir, Some(&extension));
        if let Ok(content) = fs::read_to_string(&script) {
            hashes.update(&script, &content);
        }

        // notify sometimes reports existing files right after registration
        drain_until(&rx, Instant::now() + self.options.cooldown);

        let mut state = WatcherState::new(self.options.debounce);
        while running.load(Ordering::SeqCst) {
            match rx.recv_timeout(POLL_INTERVAL) {
                Ok(WatchMessage::Changed(path)) => {
                    let path = path.canonicalize().unwrap_or(path);
                    if !is_watched(&path, &script, &extension) {
                        continue;
                    }
                    if let Ok(content) = fs::read_to_string(&path) {
                        if hashes.update(&path, &content) {
                            state.add_change(path);
                        }
                    }
                }
                Ok(WatchMessage::FullReload) => {
                    orchestrator.handle(Trigger::FullReload, &on_event);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if state.should_process() {
                for path in state.take_changes(&script) {
                    orchestrator.handle(Trigger::Modified(path), &on_event);
                }
            }
        }

        on_event(ReloadEvent::Shutdown);
        Ok(())
    }
}

/// The main script is watched whatever its name; other files only when they
/// carry the extension modules are resolved with.
pub(super) fn is_watched(path: &Path, script: &Path, extension: &str) -> bool {
    path == script || path.extension().and_then(|e| e.to_str()) == Some(extension)
}

fn drain_until(rx: &Receiver<WatchMessage>, deadline: Instant) {
    while Instant::now() < deadline {
        let _ = rx.recv_timeout(POLL_INTERVAL);
    }
}
