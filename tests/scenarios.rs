//! Scenario tests for iterast.
//!
//! Scenarios drive the reload orchestrator through complete editing
//! sessions and check both the event log and the live environment.
//!
//! Run with: cargo test --test scenarios

mod common;

#[path = "scenarios/editing_session.rs"]
mod editing_session;

#[path = "scenarios/fault_isolation.rs"]
mod fault_isolation;

#[path = "scenarios/module_reload.rs"]
mod module_reload;
