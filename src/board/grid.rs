//! Framed board and the physical roll rule

use super::cell::Cell;
use super::geometry::{Geometry, Offset, PackedCoord};
use super::moves::{Move, MoveRecord};
use super::BoardError;
use std::collections::BTreeSet;
use std::fmt;
use std::ops::{Index, IndexMut};

/// A board surrounded by a one-cell wall frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    geometry: Geometry,
    cells: Vec<Cell>,
}

impl Board {
    /// Board of the given playable size with every playable cell empty
    pub fn new(rows: usize, cols: usize) -> Self {
        let geometry = Geometry::framed(rows, cols);
        let mut cells = vec![Cell::Wall; geometry.len()];
        for p in geometry.interior() {
            cells[p] = Cell::Empty;
        }
        Self { geometry, cells }
    }

    /// Build a board from rows over `#`, `.` and `0`-`9`
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, BoardError> {
        let first = rows.first().ok_or(BoardError::Empty)?;
        let cols = first.as_ref().chars().count();
        if cols == 0 {
            return Err(BoardError::EmptyRow);
        }

        let mut board = Self::new(rows.len(), cols);
        for (row, line) in rows.iter().enumerate() {
            let line = line.as_ref();
            let found = line.chars().count();
            if found != cols {
                return Err(BoardError::RaggedRow { row, found, expected: cols });
            }
            for (col, ch) in line.chars().enumerate() {
                let cell = Cell::from_char(ch).ok_or(BoardError::InvalidCell { ch, row, col })?;
                let p = board.geometry.from_row_col(row, col);
                board.cells[p] = cell;
            }
        }
        Ok(board)
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Cell at an unframed row and column
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if row < self.geometry.rows() && col < self.geometry.cols() {
            Some(self.cells[self.geometry.from_row_col(row, col)])
        } else {
            None
        }
    }

    /// Playable rows as text
    pub fn rows(&self) -> Vec<String> {
        (0..self.geometry.rows())
            .map(|row| {
                (0..self.geometry.cols())
                    .map(|col| self.cells[self.geometry.from_row_col(row, col)].to_char())
                    .collect()
            })
            .collect()
    }

    /// Coordinates of every ball
    pub fn balls(&self) -> Vec<PackedCoord> {
        self.geometry.interior().filter(|&p| self.cells[p].is_ball()).collect()
    }

    pub fn ball_count(&self) -> usize {
        self.geometry.interior().filter(|&p| self.cells[p].is_ball()).count()
    }

    /// Walls inside the frame
    pub fn wall_count(&self) -> usize {
        self.geometry.interior().filter(|&p| self.cells[p] == Cell::Wall).count()
    }

    /// Distinct ball colours
    pub fn colors(&self) -> BTreeSet<u8> {
        self.geometry.interior().filter_map(|p| self.cells[p].color()).collect()
    }

    /// Where a ball at `from` comes to rest rolling in direction `d`
    pub fn roll_stop(&self, from: PackedCoord, d: Offset) -> PackedCoord {
        let mut pos = from;
        while self.cells[self.geometry.step(pos, d)] == Cell::Empty {
            pos = self.geometry.step(pos, d);
        }
        pos
    }

    /// Every cell a ball at `from` can roll to in one move
    pub fn roll_destinations(&self, from: PackedCoord) -> Vec<PackedCoord> {
        assert!(self.cells[from] != Cell::Wall, "cannot roll from a wall");
        let mut result = Vec::with_capacity(4);
        for d in self.geometry.dirs() {
            let pos = self.roll_stop(from, d);
            if pos != from && self.cells[self.geometry.step(pos, d)] != Cell::Forbidden {
                result.push(pos);
            }
        }
        result
    }

    /// Every empty cell from which a ball rolls to rest exactly on `to`
    pub fn roll_origins(&self, to: PackedCoord) -> Vec<PackedCoord> {
        let mut result = Vec::new();
        for d in self.geometry.dirs() {
            let stopper = self.cells[self.geometry.back(to, d)];
            if stopper == Cell::Empty || stopper == Cell::Forbidden {
                continue;
            }
            let mut pos = self.geometry.step(to, d);
            while self.cells[pos] == Cell::Empty {
                result.push(pos);
                pos = self.geometry.step(pos, d);
            }
        }
        result
    }

    /// Roll the ball at `mv.from`; it must come to rest on `mv.to`
    pub fn apply_move(&mut self, mv: Move) -> Result<(), BoardError> {
        let record = MoveRecord::from_move(mv, &self.geometry);
        let illegal = |reason| BoardError::IllegalMove {
            row: record.row,
            col: record.col,
            direction: record.direction,
            reason,
        };
        if !self.cells[mv.from].is_ball() {
            return Err(illegal("no ball at origin"));
        }
        if !self.roll_destinations(mv.from).contains(&mv.to) {
            return Err(illegal("ball does not come to rest on the destination"));
        }
        self.cells[mv.to] = self.cells[mv.from];
        self.cells[mv.from] = Cell::Empty;
        Ok(())
    }

    /// Turn a textual record into a concrete move on this board
    pub fn resolve_record(&self, record: &MoveRecord) -> Result<Move, BoardError> {
        let illegal = |reason| BoardError::IllegalMove {
            row: record.row,
            col: record.col,
            direction: record.direction,
            reason,
        };
        if record.row >= self.geometry.rows() || record.col >= self.geometry.cols() {
            return Err(BoardError::OutOfBounds { row: record.row, col: record.col });
        }
        let d = self
            .geometry
            .offset_for_code(record.direction)
            .ok_or_else(|| BoardError::MalformedMove(record.to_string()))?;
        let from = self.geometry.from_row_col(record.row, record.col);
        if !self.cells[from].is_ball() {
            return Err(illegal("no ball at origin"));
        }
        let to = self.roll_stop(from, d);
        if to == from {
            return Err(illegal("ball is blocked"));
        }
        Ok(Move::new(from, to))
    }
}

impl Index<PackedCoord> for Board {
    type Output = Cell;

    #[inline]
    fn index(&self, p: PackedCoord) -> &Cell {
        &self.cells[p]
    }
}

impl IndexMut<PackedCoord> for Board {
    #[inline]
    fn index_mut(&mut self, p: PackedCoord) -> &mut Cell {
        &mut self.cells[p]
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
