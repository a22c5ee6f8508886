//! Formatting and statistics helpers

pub mod display;
pub mod stats;

pub use display::{Color, ColorOutput, OutcomeFormatter};
pub use stats::Distribution;
