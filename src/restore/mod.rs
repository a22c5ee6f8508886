//! Restore orchestration: target ordering, scheduling, results and replay

pub mod basin;
pub mod outcome;
pub mod problem;
pub mod validator;

pub use basin::{basin_area, basin_score, prioritized_targets};
pub use outcome::{score, GenerationReport, RestoreOutcome, RestoreStatistics};
pub use problem::RestoreProblem;
pub use validator::{IllegalMove, MoveValidator, ValidationResult};
