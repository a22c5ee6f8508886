//! Roll moves and their textual records

use super::geometry::{Geometry, PackedCoord};
use super::BoardError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A roll from `from` to `to` along one axis.
///
/// Ordering is lexicographic on `(from, to)`; the search relies on it to pick
/// one member of every commuting pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    pub from: PackedCoord,
    pub to: PackedCoord,
}

impl Move {
    pub fn new(from: PackedCoord, to: PackedCoord) -> Self {
        Self { from, to }
    }

    /// The same roll travelled the other way
    pub fn reversed(self) -> Self {
        Self {
            from: self.to,
            to: self.from,
        }
    }
}

/// Externally visible move: origin in unframed coordinates plus a direction
/// digit (0 left, 1 down, 2 right, 3 up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MoveRecord {
    pub row: usize,
    pub col: usize,
    pub direction: u8,
}

impl MoveRecord {
    pub fn from_move(mv: Move, geometry: &Geometry) -> Self {
        let (row, col) = geometry.to_row_col(mv.from);
        Self {
            row,
            col,
            direction: geometry.direction_code(geometry.move_dir(mv)),
        }
    }
}

impl fmt::Display for MoveRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.row, self.col, self.direction)
    }
}

impl FromStr for MoveRecord {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || BoardError::MalformedMove(s.to_string());
        let fields: Vec<&str> = s.split_whitespace().collect();
        let [row, col, direction] = fields.as_slice() else {
            return Err(malformed());
        };
        let row = row.parse().map_err(|_| malformed())?;
        let col = col.parse().map_err(|_| malformed())?;
        let direction: u8 = direction.parse().map_err(|_| malformed())?;
        if direction > 3 {
            return Err(malformed());
        }
        Ok(Self { row, col, direction })
    }
}
