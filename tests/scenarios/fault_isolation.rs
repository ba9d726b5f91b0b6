//! Faults are not rolled back but never leave a partial environment.

use iterast::script::Value;
use iterast::ReloadEvent;

use crate::common::{eval, Session, RECOVERY_RESET, RESET};

#[test]
fn output_before_the_fault_is_kept_and_state_is_discarded() {
    let mut session = Session::new(concat!(
        "x = 1\n",
        "print(\"before\")\n",
        "raise \"boom\"\n",
        "print(\"after\")\n",
    ));

    let events = session.start();

    assert_eq!(events[0], RESET);
    assert_eq!(events[1], eval("x = 1"));
    assert_eq!(
        &events[events.len() - 2..],
        &[
            ReloadEvent::Exception {
                message: "boom".to_string()
            },
            RECOVERY_RESET,
        ]
    );
    // Nothing after the raising statement ran
    assert_eq!(events.len(), 6, "{events:?}");

    let printed = session.output.contents();
    assert!(printed.contains("before"), "{printed:?}");
    assert!(!printed.contains("after"), "{printed:?}");

    // Post-fault state equals a fresh reset
    assert!(session.user_bindings().is_empty());
    assert!(session.get("print").is_some());
    assert_eq!(
        session.get("__name__"),
        Some(Value::str("__main__"))
    );
}

#[test]
fn fault_inside_a_function_call_is_reported() {
    let mut session = Session::new(concat!(
        "fn divide(a, b) {\n",
        "    return a / b\n",
        "}\n",
        "ok = divide(4, 2)\n",
        "bad = divide(1, 0)\n",
    ));

    let events = session.start();

    assert!(events.contains(&ReloadEvent::Exception {
        message: "division by zero".to_string()
    }));
    assert_eq!(session.get("ok"), None);
}

#[test]
fn runaway_recursion_faults_instead_of_crashing() {
    let mut session = Session::new("fn loop(n) {\n    return loop(n + 1)\n}\nloop(0)\n");

    let events = session.start();

    assert!(
        events
            .iter()
            .any(|e| matches!(e, ReloadEvent::Exception { message } if message.contains("recursion"))),
        "{events:?}"
    );
    assert!(session.user_bindings().is_empty());
}
