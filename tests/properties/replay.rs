//! Property tests for incremental replay against the live environment.

use proptest::prelude::*;

use crate::common::Session;

/// `v0 = n` or `vi = v(i-1) + n`: every line depends on the one before it
fn program(steps: &[(bool, i64)]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(i, &(chained, n))| {
            if chained && i > 0 {
                format!("v{i} = v{} + {n}\n", i - 1)
            } else {
                format!("v{i} = {n}\n")
            }
        })
        .collect()
}

fn steps() -> impl Strategy<Value = Vec<(bool, i64)>> {
    proptest::collection::vec((any::<bool>(), 0i64..100), 0..6)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 32,
        .. ProptestConfig::default()
    })]

    /// PROPERTY: after an edit, the live environment matches a cold run of the new source.
    #[test]
    fn property_incremental_matches_cold_run(before in steps(), after in steps()) {
        let mut live = Session::new(&program(&before));
        live.start();
        live.edit(&program(&after));

        let mut cold = Session::new(&program(&after));
        cold.start();

        prop_assert_eq!(live.user_bindings(), cold.user_bindings());
    }
}
