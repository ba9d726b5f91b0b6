//! Statement Differ Domain Service
//!
//! Decides which top-level statements must be re-executed after an edit.
//! Statement order is treated as a dependency chain: once position `i`
//! differs, every statement from `i` onward is replayed.

use crate::domain::entities::Snapshot;
use crate::script::Statement;

/// What to do with the environment after an edit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplayPlan {
    /// Discard the environment before replaying
    pub full_reset: bool,
    /// Statements to execute, in source order
    pub statements: Vec<Statement>,
}

impl ReplayPlan {
    /// Reset and replay every statement of `snapshot`
    pub fn full(snapshot: &Snapshot) -> Self {
        Self {
            full_reset: true,
            statements: snapshot.statements().to_vec(),
        }
    }

    /// Run `statements` on top of the existing environment
    pub fn incremental(statements: Vec<Statement>) -> Self {
        Self {
            full_reset: false,
            statements,
        }
    }

    /// Whether applying the plan would change nothing
    pub fn is_noop(&self) -> bool {
        !self.full_reset && self.statements.is_empty()
    }
}

/// Differ service comparing consecutive snapshots
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementDiffer;

impl StatementDiffer {
    pub fn new() -> Self {
        Self
    }

    pub fn diff(&self, previous: &Snapshot, current: &Snapshot) -> ReplayPlan {
        let (before, after) = (previous.statements(), current.statements());

        // Removal invalidates positional comparison.
        if after.len() < before.len() {
            return ReplayPlan::full(current);
        }

        let divergence = before
            .iter()
            .zip(after)
            .position(|(old, new)| old != new)
            .unwrap_or(before.len());

        ReplayPlan::incremental(after[divergence..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_program;

    fn snapshot(source: &str) -> Snapshot {
        Snapshot::new(parse_program(source).unwrap())
    }

    fn sources(plan: &ReplayPlan) -> Vec<String> {
        plan.statements.iter().map(Statement::source).collect()
    }

    #[test]
    fn test_identical_snapshots_replay_nothing() {
        let s = snapshot("a = 1\nb = a + 1");
        let plan = StatementDiffer::new().diff(&s, &s.clone());
        assert!(plan.is_noop());
    }

    #[test]
    fn test_appended_statement_only() {
        let plan = StatementDiffer::new().diff(&snapshot("a = 1\nb = 2"), &snapshot("a = 1\nb = 2\nc = 3"));
        assert!(!plan.full_reset);
        assert_eq!(sources(&plan), vec!["c = 3"]);
    }

    #[test]
    fn test_change_cascades_to_later_statements() {
        let plan = StatementDiffer::new().diff(
            &snapshot("a = 1\nb = 2\nc = 3"),
            &snapshot("a = 10\nb = 2\nc = 3"),
        );
        assert!(!plan.full_reset);
        assert_eq!(sources(&plan), vec!["a = 10", "b = 2", "c = 3"]);
    }

    #[test]
    fn test_change_plus_append() {
        let plan = StatementDiffer::new().diff(
            &snapshot("a = 1\nb = 2"),
            &snapshot("a = 1\nb = 20\nc = 3"),
        );
        assert_eq!(sources(&plan), vec!["b = 20", "c = 3"]);
    }

    #[test]
    fn test_shrink_forces_full_reset() {
        let plan = StatementDiffer::new().diff(&snapshot("a = 1\nb = 2\nc = 3"), &snapshot("a = 1\nb = 2"));
        assert!(plan.full_reset);
        assert_eq!(sources(&plan), vec!["a = 1", "b = 2"]);
    }

    #[test]
    fn test_shrink_to_empty() {
        let plan = StatementDiffer::new().diff(&snapshot("a = 1"), &snapshot("# nothing left\n"));
        assert!(plan.full_reset);
        assert!(plan.statements.is_empty());
    }

    #[test]
    fn test_formatting_changes_are_not_divergence() {
        let plan = StatementDiffer::new().diff(
            &snapshot("a = 1\nfn f(x) { return x }"),
            &snapshot("a   =   1  # same\nfn f(x) {\n    return x\n}\nb = 2"),
        );
        assert_eq!(sources(&plan), vec!["b = 2"]);
    }
}
