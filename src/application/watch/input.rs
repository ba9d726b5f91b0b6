//! Operator commands read from stdin

use std::io::{self, BufRead};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

use super::event::WatchMessage;

/// Whether an input line asks for a full reload
pub fn is_reload_command(line: &str) -> bool {
    matches!(line.trim(), "r" | "reload")
}

/// Forward reload commands from stdin until EOF or the loop goes away
pub fn spawn_operator_input(tx: Sender<WatchMessage>) -> JoinHandle<()> {
    thread::spawn(move || forward_commands(io::stdin().lock(), &tx))
}

pub(crate) fn forward_commands(input: impl BufRead, tx: &Sender<WatchMessage>) {
    for line in input.lines() {
        let Ok(line) = line else {
            break;
        };
        if is_reload_command(&line) && tx.send(WatchMessage::FullReload).is_err() {
            break;
        }
    }
}
