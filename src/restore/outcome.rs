//! Result of a restore run

use crate::board::{io::moves_to_string, Board, MoveRecord};
use serde::{Deserialize, Serialize};

/// Moves found for one start/target pair, with the board they lead to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreOutcome {
    /// Moves to play, in order
    pub moves: Vec<MoveRecord>,
    /// Whether the move list was cut to the per-ball limit
    pub truncated: bool,
    /// Board rows after playing `moves`
    pub final_board: Vec<String>,
    pub statistics: RestoreStatistics,
}

/// Counters and timings collected while restoring
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreStatistics {
    pub width: usize,
    pub height: usize,
    pub walls: usize,
    pub balls: usize,
    pub colors: usize,
    pub generations: Vec<GenerationReport>,
    pub result_size: usize,
    pub elapsed_seconds: f64,
    pub timed_out: bool,
    /// Fraction of target balls matched; a ball of the wrong colour counts half
    pub score: f64,
}

/// Summary of one scheduler pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub tasks: usize,
    pub solved: usize,
    /// One character per attempted cell: `.` unsolved, `1` direct, `2` composed
    pub pattern: String,
}

impl RestoreOutcome {
    /// Outcome with no moves for an untouched board
    pub fn empty(board: &Board, statistics: RestoreStatistics) -> Self {
        Self {
            moves: Vec::new(),
            truncated: false,
            final_board: board.rows(),
            statistics,
        }
    }

    pub fn move_count(&self) -> usize {
        self.moves.len()
    }

    /// Move list in judge layout: count, then one record per line
    pub fn to_judge_format(&self) -> String {
        moves_to_string(&self.moves)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// How well `board` matches the balls of `target`.
///
/// Each target ball scores 1.0 for the same colour on `board`, 0.5 for a ball
/// of another colour, else nothing; the sum is divided by the number of
/// target balls. A target without balls scores 0.
pub fn score(board: &Board, target: &Board) -> f64 {
    let balls = target.balls();
    if balls.is_empty() {
        return 0.0;
    }
    let total: f64 = balls
        .iter()
        .map(|&p| {
            if board[p] == target[p] {
                1.0
            } else if board[p].is_ball() {
                0.5
            } else {
                0.0
            }
        })
        .sum();
    total / balls.len() as f64
}
