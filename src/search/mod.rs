//! Constraint-propagating search for short move sequences

pub mod backtracker;
pub mod cell_set;
pub mod commute;
pub mod enumerate;
pub mod multistep;
pub mod openings;
pub mod state;

pub use backtracker::Backtracker;
pub use cell_set::CellSet;
pub use commute::{commute, commute_all};
pub use enumerate::{enumerate_moves, Candidate, Candidates};
pub use multistep::{multistep, MultistepResult};
pub use openings::{compute_openings, Opening, OpeningCache};
pub use state::{Conflict, Goal, RestorePoint, Speculation, State};
