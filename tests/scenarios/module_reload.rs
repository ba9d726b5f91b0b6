//! Editing an imported module reloads it in place.

use iterast::script::Value;
use iterast::ReloadEvent;

use crate::common::{eval, Session};

const MAIN: &str = "import util\nx = util.value\n";

#[test]
fn module_edit_reloads_and_replays_the_script() {
    let mut session = Session::with_modules(MAIN, &[("util", "value = 1\n")]);
    session.start();
    assert_eq!(session.get("x"), Some(Value::Int(1)));

    let events = session.write_file("util.it", "value = 2\n");

    assert_eq!(
        events,
        vec![
            ReloadEvent::Reload {
                module: "util".to_string()
            },
            eval("import util"),
            eval("x = util.value"),
        ]
    );
    assert_eq!(session.get("x"), Some(Value::Int(2)));
}

#[test]
fn untracked_files_change_nothing() {
    let mut session = Session::with_modules(MAIN, &[("util", "value = 1\n")]);
    session.start();
    let before = session.user_bindings();

    assert!(session.write_file("other.it", "value = 99\n").is_empty());
    assert!(session.write_file("notes.txt", "util\n").is_empty());
    assert_eq!(session.user_bindings(), before);
}

#[test]
fn faulting_module_edit_resets_the_environment() {
    let mut session = Session::with_modules(MAIN, &[("util", "value = 1\n")]);
    session.start();

    let events = session.write_file("util.it", "value = 1 / 0\n");

    assert_eq!(
        events[0],
        ReloadEvent::Reload {
            module: "util".to_string()
        }
    );
    assert!(
        matches!(&events[1], ReloadEvent::Exception { message } if message.contains("util")),
        "{events:?}"
    );
    assert_eq!(events[2], ReloadEvent::Reset { clear_screen: false });
    assert!(session.user_bindings().is_empty());
}

#[test]
fn dropping_an_import_stops_tracking_the_module() {
    let mut session = Session::with_modules(MAIN, &[("util", "value = 1\n")]);
    session.start();

    session.edit("x = 3\n");

    assert!(session.write_file("util.it", "value = 2\n").is_empty());
    assert_eq!(session.get("x"), Some(Value::Int(3)));
}
