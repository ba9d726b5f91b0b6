//! Common test utilities for iterast scenario tests.
//!
//! - `Session`: an orchestrator over a script in a temp directory, with
//!   captured events and captured `print` output
//! - `SharedBuffer`: a cloneable in-memory writer

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tempfile::TempDir;

use iterast::script::Value;
use iterast::{Interpreter, ReloadEvent, ReloadOrchestrator, ScriptParser, Trigger};

#[derive(Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub struct Session {
    pub dir: TempDir,
    pub script: PathBuf,
    pub orchestrator: ReloadOrchestrator<ScriptParser, Interpreter>,
    pub output: SharedBuffer,
    events: Rc<RefCell<Vec<ReloadEvent>>>,
}

impl Session {
    pub fn new(source: &str) -> Self {
        Self::with_modules(source, &[])
    }

    pub fn with_modules(source: &str, modules: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        for (name, body) in modules {
            fs::write(root.join(format!("{name}.it")), body).unwrap();
        }
        let script = root.join("main.it");
        fs::write(&script, source).unwrap();

        let output = SharedBuffer::default();
        let executor = Interpreter::for_script(&script).with_output(output.clone());
        Self {
            dir,
            orchestrator: ReloadOrchestrator::new(ScriptParser::new(), executor, &script),
            script,
            output,
            events: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn root(&self) -> &Path {
        self.script.parent().unwrap()
    }

    pub fn start(&mut self) -> Vec<ReloadEvent> {
        let events = self.events.clone();
        self.orchestrator
            .start(&move |event| events.borrow_mut().push(event));
        self.take()
    }

    /// Rewrite the script and deliver the modification
    pub fn edit(&mut self, source: &str) -> Vec<ReloadEvent> {
        fs::write(&self.script, source).unwrap();
        let script = self.script.clone();
        self.deliver(Trigger::Modified(script))
    }

    /// Write a sibling file and deliver the modification
    pub fn write_file(&mut self, name: &str, body: &str) -> Vec<ReloadEvent> {
        let path = self.root().join(name);
        fs::write(&path, body).unwrap();
        self.deliver(Trigger::Modified(path))
    }

    pub fn deliver(&mut self, trigger: Trigger) -> Vec<ReloadEvent> {
        let events = self.events.clone();
        self.orchestrator
            .handle(trigger, &move |event| events.borrow_mut().push(event));
        self.take()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.orchestrator.environment().get(name)
    }

    /// Bindings created by user code, sorted by name
    pub fn user_bindings(&self) -> Vec<(String, Value)> {
        let env = self.orchestrator.environment();
        let mut names = env.names();
        names.sort();
        names
            .into_iter()
            .filter(|name| !name.starts_with("__"))
            .filter_map(|name| env.get(&name).map(|value| (name, value)))
            .filter(|(_, value)| !matches!(value, Value::Builtin(_)))
            .collect()
    }

    fn take(&self) -> Vec<ReloadEvent> {
        self.events.borrow_mut().drain(..).collect()
    }
}

pub fn eval(line: &str) -> ReloadEvent {
    ReloadEvent::Eval {
        line: line.to_string(),
    }
}

pub const RESET: ReloadEvent = ReloadEvent::Reset { clear_screen: true };
pub const RECOVERY_RESET: ReloadEvent = ReloadEvent::Reset {
    clear_screen: false,
};
