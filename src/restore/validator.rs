//! Replay of move lists against the physical roll rule

use super::outcome::score;
use crate::board::{Board, BoardError, MoveRecord};
use std::fmt;

/// Replays move records on a start board
pub struct MoveValidator {
    start: Board,
    target: Board,
}

/// Result of replaying a move list
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Every move was legal when played
    pub is_valid: bool,
    /// Moves played before the first illegal one
    pub moves_applied: usize,
    pub illegal_move: Option<IllegalMove>,
    /// Board after the legal prefix
    pub final_board: Board,
    pub matches_target: bool,
    pub score: f64,
}

/// The first move that could not be played
#[derive(Debug, Clone)]
pub struct IllegalMove {
    pub index: usize,
    pub record: MoveRecord,
    pub error: BoardError,
}

impl MoveValidator {
    /// Both boards must have the same dimensions
    pub fn new(start: Board, target: Board) -> Result<Self, BoardError> {
        let (s, t) = (start.geometry(), target.geometry());
        if s.rows() != t.rows() || s.cols() != t.cols() {
            return Err(BoardError::DimensionMismatch {
                start_rows: s.rows(),
                start_cols: s.cols(),
                target_rows: t.rows(),
                target_cols: t.cols(),
            });
        }
        Ok(Self { start, target })
    }

    /// Play `records` in order, stopping at the first illegal one
    pub fn validate(&self, records: &[MoveRecord]) -> ValidationResult {
        let mut board = self.start.clone();
        let mut illegal_move = None;

        for (index, record) in records.iter().enumerate() {
            let played = board
                .resolve_record(record)
                .and_then(|mv| board.apply_move(mv));
            if let Err(error) = played {
                illegal_move = Some(IllegalMove {
                    index,
                    record: *record,
                    error,
                });
                break;
            }
        }

        let moves_applied = illegal_move.as_ref().map_or(records.len(), |m| m.index);
        let matches_target = self
            .target
            .geometry()
            .interior()
            .filter(|&p| self.target[p].is_ball())
            .all(|p| board[p] == self.target[p]);

        ValidationResult {
            is_valid: illegal_move.is_none(),
            moves_applied,
            illegal_move,
            score: score(&board, &self.target),
            matches_target,
            final_board: board,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Legal: {}", if self.is_valid { "yes" } else { "no" })?;
        writeln!(f, "  Moves applied: {}", self.moves_applied)?;
        if let Some(ref illegal) = self.illegal_move {
            writeln!(f, "  Move {} ({}): {}", illegal.index, illegal.record, illegal.error)?;
        }
        writeln!(f, "  Target balls matched: {}", if self.matches_target { "all" } else { "not all" })?;
        writeln!(f, "  Score: {:.4}", self.score)?;
        Ok(())
    }
}
