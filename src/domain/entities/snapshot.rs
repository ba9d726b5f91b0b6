//! Snapshot entity and store

use std::collections::{BTreeSet, VecDeque};

use crate::domain::services::extract;
use crate::script::Statement;

/// Number of snapshots the store retains
pub const SNAPSHOT_CAPACITY: usize = 2;

/// The watched script's top-level statements at one point in time
///
/// Immutable once created. Carries the set of modules its imports reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    statements: Vec<Statement>,
    modules: BTreeSet<String>,
}

impl Snapshot {
    pub fn new(statements: Vec<Statement>) -> Self {
        let mut snapshot = Self {
            statements,
            modules: BTreeSet::new(),
        };
        snapshot.modules = extract(&snapshot);
        snapshot
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Top-level names of the modules imported anywhere in the snapshot
    pub fn modules(&self) -> &BTreeSet<String> {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// The most recent snapshots, oldest first
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: VecDeque<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a snapshot, evicting the oldest when the store is full
    pub fn push(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() == SNAPSHOT_CAPACITY {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn current(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn previous(&self) -> Option<&Snapshot> {
        if self.snapshots.len() == SNAPSHOT_CAPACITY {
            self.snapshots.front()
        } else {
            None
        }
    }

    /// `(previous, current)` once two snapshots are held
    pub fn pair(&self) -> Option<(&Snapshot, &Snapshot)> {
        Some((self.previous()?, self.current()?))
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_program;

    fn snapshot(source: &str) -> Snapshot {
        Snapshot::new(parse_program(source).unwrap())
    }

    #[test]
    fn store_never_holds_more_than_two() {
        let mut store = SnapshotStore::new();
        assert!(store.pair().is_none());

        store.push(snapshot("a = 1"));
        assert_eq!(store.len(), 1);
        assert!(store.previous().is_none());
        assert_eq!(store.current(), Some(&snapshot("a = 1")));

        store.push(snapshot("a = 2"));
        store.push(snapshot("a = 3"));
        assert_eq!(store.len(), SNAPSHOT_CAPACITY);

        let (previous, current) = store.pair().unwrap();
        assert_eq!(previous, &snapshot("a = 2"));
        assert_eq!(current, &snapshot("a = 3"));
    }

    #[test]
    fn snapshot_records_imported_modules() {
        let snap = snapshot("import os.path\nfrom util import f\nfn g() { import inner }\nx = 1");
        let modules: Vec<_> = snap.modules().iter().map(String::as_str).collect();
        assert_eq!(modules, vec!["inner", "os", "util"]);
        assert_eq!(snap.len(), 4);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut store = SnapshotStore::new();
        store.push(snapshot("x = 1"));
        store.clear();
        assert!(store.is_empty());
        assert!(store.current().is_none());
    }
}
