//! A user edits one script over several saves.

use iterast::script::Value;
use iterast::{ReloadEvent, ReloadState, Trigger};

use crate::common::{eval, Session, RECOVERY_RESET, RESET};

#[test]
fn edit_append_change_fault_and_recover() {
    let mut session = Session::new("x = 1\n");

    // Startup runs everything against a fresh environment
    assert_eq!(session.start(), vec![RESET, eval("x = 1")]);
    assert_eq!(session.user_bindings(), vec![("x".to_string(), Value::Int(1))]);

    // Appending runs only the new line
    assert_eq!(session.edit("x = 1\ny = 2\n"), vec![eval("y = 2")]);
    assert_eq!(
        session.user_bindings(),
        vec![
            ("x".to_string(), Value::Int(1)),
            ("y".to_string(), Value::Int(2)),
        ]
    );

    // Changing the first line re-runs it and everything after it
    assert_eq!(
        session.edit("x = 5\ny = 2\n"),
        vec![eval("x = 5"), eval("y = 2")]
    );
    assert_eq!(session.get("x"), Some(Value::Int(5)));
    assert_eq!(session.get("y"), Some(Value::Int(2)));

    // A raising statement is logged and leaves an empty environment
    let events = session.edit("x = 5\ny = 2\nz = 1 / 0\n");
    assert_eq!(
        events,
        vec![
            eval("z = 1 / 0"),
            ReloadEvent::Exception {
                message: "division by zero".to_string()
            },
            RECOVERY_RESET,
        ]
    );
    assert!(session.user_bindings().is_empty());
    assert_eq!(session.orchestrator.state(), ReloadState::ErrorRecovered);

    // The next valid edit starts over with a full replay
    assert_eq!(
        session.edit("x = 5\ny = 3\n"),
        vec![RESET, eval("x = 5"), eval("y = 3")]
    );
    assert_eq!(session.get("y"), Some(Value::Int(3)));
    assert_eq!(session.orchestrator.state(), ReloadState::Idle);
}

#[test]
fn unchanged_save_keeps_state_and_logs_nothing() {
    let mut session = Session::new("items = []\npush(items, 1)\n");
    session.start();

    assert!(session.edit("items = []\npush(items, 1)\n").is_empty());
    // The side effect ran exactly once
    assert_eq!(session.get("items"), Some(Value::list(vec![Value::Int(1)])));
}

#[test]
fn comments_and_whitespace_are_not_changes() {
    let mut session = Session::new("x = 1\ny = x + 1\n");
    session.start();

    let events = session.edit("# setup\nx   =   1\n\ny = x+1  # derived\n");
    assert!(events.is_empty(), "{events:?}");
}

#[test]
fn deleting_lines_resets_and_forgets_their_bindings() {
    let mut session = Session::new("a = 1\nb = 2\nc = 3\n");
    session.start();

    assert_eq!(session.edit("a = 1\nb = 2\n"), vec![RESET, eval("a = 1"), eval("b = 2")]);
    assert_eq!(session.get("c"), None);
}

#[test]
fn syntax_error_keeps_previous_state() {
    let mut session = Session::new("x = 1\n");
    session.start();

    let events = session.edit("x = 1\ny = (\n");
    assert_eq!(events.len(), 1);
    assert!(
        matches!(&events[0], ReloadEvent::SyntaxError { message } if message.contains("main.it:")),
        "{events:?}"
    );
    assert_eq!(session.get("x"), Some(Value::Int(1)));

    // Fixing the error diffs against the last good snapshot
    assert_eq!(session.edit("x = 1\ny = 2\n"), vec![eval("y = 2")]);
}

#[test]
fn operator_full_reload_replays_everything() {
    let mut session = Session::new("x = 1\ny = 2\n");
    session.start();

    assert_eq!(
        session.deliver(Trigger::FullReload),
        vec![ReloadEvent::FullReload, RESET, eval("x = 1"), eval("y = 2")]
    );
}
