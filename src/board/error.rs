//! Errors raised at the board boundary

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board has no rows")]
    Empty,

    #[error("board rows cannot be empty")]
    EmptyRow,

    #[error("row {row} has length {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        found: usize,
        expected: usize,
    },

    #[error("invalid cell character '{ch}' at ({row}, {col}); expected '#', '.' or a digit")]
    InvalidCell { ch: char, row: usize, col: usize },

    #[error("start board is {start_rows}x{start_cols} but target board is {target_rows}x{target_cols}")]
    DimensionMismatch {
        start_rows: usize,
        start_cols: usize,
        target_rows: usize,
        target_cols: usize,
    },

    #[error("cell ({row}, {col}) is outside the board")]
    OutOfBounds { row: usize, col: usize },

    #[error("illegal move {row} {col} {direction}: {reason}")]
    IllegalMove {
        row: usize,
        col: usize,
        direction: u8,
        reason: &'static str,
    },

    #[error("malformed move record '{0}'")]
    MalformedMove(String),
}
