//! Property tests for the statement differ.

use proptest::prelude::*;

use iterast::domain::entities::Snapshot;
use iterast::domain::ports::SourceParser;
use iterast::domain::services::StatementDiffer;
use iterast::ScriptParser;

fn snapshot(values: &[i64]) -> Snapshot {
    let source: String = values
        .iter()
        .enumerate()
        .map(|(i, n)| format!("v{i} = {n}\n"))
        .collect();
    Snapshot::new(ScriptParser::new().parse(&source).unwrap())
}

fn values(min: usize) -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-1000i64..1000, min..8)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: diffing a snapshot against itself is a no-op.
    #[test]
    fn property_unchanged_snapshot_is_noop(vals in values(0)) {
        let s = snapshot(&vals);
        let plan = StatementDiffer::new().diff(&s, &s);

        prop_assert!(!plan.full_reset);
        prop_assert!(plan.statements.is_empty());
    }

    /// PROPERTY: appending statements replays exactly the appended ones.
    #[test]
    fn property_append_replays_only_new_statements(
        prefix in values(0),
        appended in proptest::collection::vec(-1000i64..1000, 1..4),
    ) {
        let all: Vec<i64> = prefix.iter().chain(&appended).copied().collect();
        let previous = snapshot(&prefix);
        let current = snapshot(&all);

        let plan = StatementDiffer::new().diff(&previous, &current);

        prop_assert!(!plan.full_reset);
        prop_assert_eq!(&plan.statements[..], &current.statements()[prefix.len()..]);
    }

    /// PROPERTY: a change replays everything from the first divergence onward.
    #[test]
    fn property_divergence_cascades(
        vals in values(1),
        index in any::<prop::sample::Index>(),
    ) {
        let changed_at = index.index(vals.len());
        let mut edited = vals.clone();
        edited[changed_at] += 1;

        let current = snapshot(&edited);
        let plan = StatementDiffer::new().diff(&snapshot(&vals), &current);

        prop_assert!(!plan.full_reset);
        prop_assert_eq!(&plan.statements[..], &current.statements()[changed_at..]);
    }

    /// PROPERTY: removing statements forces a reset with a full replay.
    #[test]
    fn property_shrink_forces_full_reset(
        vals in values(1),
        index in any::<prop::sample::Index>(),
    ) {
        let kept = index.index(vals.len());
        let current = snapshot(&vals[..kept]);

        let plan = StatementDiffer::new().diff(&snapshot(&vals), &current);

        prop_assert!(plan.full_reset);
        prop_assert_eq!(&plan.statements[..], current.statements());
    }
}
