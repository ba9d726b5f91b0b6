//! Domain Services
//!
//! Pure logic over snapshots. No I/O, easily testable.

mod dependency_tracker;
mod differ;

pub use dependency_tracker::{extract, should_reload, DependencySet};
pub use differ::{ReplayPlan, StatementDiffer};
