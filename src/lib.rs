//! Rolling Balls Restorer
//!
//! This library finds short sequences of ball rolls that rearrange a start
//! board towards a target board, using a constraint-propagating backward
//! search.

pub mod board;
pub mod config;
pub mod restore;
pub mod search;
pub mod utils;

pub use config::Settings;
pub use restore::{RestoreOutcome, RestoreProblem};

use anyhow::Result;

/// Main entry point: moves that bring `start_rows` as close to
/// `target_rows` as the time limit allows
pub fn restore_pattern<S: AsRef<str>>(settings: Settings, start_rows: &[S], target_rows: &[S]) -> Result<RestoreOutcome> {
    let problem = RestoreProblem::from_rows(settings, start_rows, target_rows)?;
    problem.solve()
}
