//! Knowledge lattice for a single cell

use crate::board::Cell;

/// What is known about the content of a cell.
///
/// `Unknown` is below everything and `AnyBall` is below every concrete ball.
/// `Contradiction` is only ever returned by the combine operations; it is
/// never stored in a [`State`](super::State).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellSet {
    Unknown,
    Empty,
    AnyBall,
    Ball(u8),
    Wall,
    Contradiction,
}

impl CellSet {
    /// Exact knowledge of a board cell
    pub fn from_cell(cell: Cell) -> Self {
        match cell {
            Cell::Wall => CellSet::Wall,
            Cell::Empty => CellSet::Empty,
            Cell::Ball(color) => CellSet::Ball(color),
            Cell::Forbidden => panic!("forbidden cells have no knowledge value"),
        }
    }

    #[inline]
    pub fn is_ball(self) -> bool {
        matches!(self, CellSet::AnyBall | CellSet::Ball(_))
    }

    #[inline]
    pub fn is_contradiction(self) -> bool {
        self == CellSet::Contradiction
    }

    /// Evidence that the cell is empty
    pub fn combine_with_empty(self) -> Self {
        match self {
            CellSet::Unknown | CellSet::Empty => CellSet::Empty,
            CellSet::AnyBall | CellSet::Ball(_) | CellSet::Wall | CellSet::Contradiction => {
                CellSet::Contradiction
            }
        }
    }

    /// Evidence that the cell holds a ball of `color`
    pub fn combine_with_concrete_ball(self, color: u8) -> Self {
        match self {
            CellSet::Unknown | CellSet::AnyBall => CellSet::Ball(color),
            CellSet::Ball(c) if c == color => self,
            CellSet::Ball(_)
            | CellSet::Empty
            | CellSet::Wall
            | CellSet::Contradiction => CellSet::Contradiction,
        }
    }

    /// Evidence that the cell holds some ball
    pub fn combine_with_any_ball(self) -> Self {
        match self {
            CellSet::Unknown => CellSet::AnyBall,
            CellSet::AnyBall | CellSet::Ball(_) => self,
            CellSet::Empty | CellSet::Wall | CellSet::Contradiction => CellSet::Contradiction,
        }
    }

    /// Evidence that the cell stops a rolling ball: a wall or some ball
    pub fn combine_with_obstacle(self) -> Self {
        match self {
            CellSet::Wall => CellSet::Wall,
            other => other.combine_with_any_ball(),
        }
    }

    /// Single-character rendering for diagnostics
    pub fn to_char(self) -> char {
        match self {
            CellSet::Unknown => ' ',
            CellSet::Empty => '.',
            CellSet::AnyBall => '?',
            CellSet::Ball(color) => (b'0' + color) as char,
            CellSet::Wall => 'W',
            CellSet::Contradiction => '!',
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CellSet; 7] = [
        CellSet::Unknown,
        CellSet::Empty,
        CellSet::AnyBall,
        CellSet::Ball(0),
        CellSet::Ball(9),
        CellSet::Wall,
        CellSet::Contradiction,
    ];

    #[test]
    fn test_combine_with_empty() {
        assert_eq!(CellSet::Unknown.combine_with_empty(), CellSet::Empty);
        assert_eq!(CellSet::Empty.combine_with_empty(), CellSet::Empty);
        assert!(CellSet::AnyBall.combine_with_empty().is_contradiction());
        assert!(CellSet::Ball(3).combine_with_empty().is_contradiction());
        assert!(CellSet::Wall.combine_with_empty().is_contradiction());
    }

    #[test]
    fn test_combine_with_concrete_ball() {
        assert_eq!(CellSet::Unknown.combine_with_concrete_ball(4), CellSet::Ball(4));
        assert_eq!(CellSet::AnyBall.combine_with_concrete_ball(4), CellSet::Ball(4));
        assert_eq!(CellSet::Ball(4).combine_with_concrete_ball(4), CellSet::Ball(4));
        assert!(CellSet::Ball(5).combine_with_concrete_ball(4).is_contradiction());
        assert!(CellSet::Empty.combine_with_concrete_ball(4).is_contradiction());
        assert!(CellSet::Wall.combine_with_concrete_ball(4).is_contradiction());
    }

    #[test]
    fn test_combine_with_any_ball_and_obstacle() {
        assert_eq!(CellSet::Unknown.combine_with_any_ball(), CellSet::AnyBall);
        assert_eq!(CellSet::Ball(2).combine_with_any_ball(), CellSet::Ball(2));
        assert!(CellSet::Empty.combine_with_any_ball().is_contradiction());
        assert!(CellSet::Wall.combine_with_any_ball().is_contradiction());

        assert_eq!(CellSet::Wall.combine_with_obstacle(), CellSet::Wall);
        assert_eq!(CellSet::Unknown.combine_with_obstacle(), CellSet::AnyBall);
        assert_eq!(CellSet::Ball(1).combine_with_obstacle(), CellSet::Ball(1));
        assert!(CellSet::Empty.combine_with_obstacle().is_contradiction());
    }

    #[test]
    fn test_combines_are_monotone() {
        // Combining never loses information: a non-contradictory result is at
        // least as specific as its input, and combining again is a no-op.
        for s in ALL {
            for r in [
                s.combine_with_empty(),
                s.combine_with_any_ball(),
                s.combine_with_obstacle(),
                s.combine_with_concrete_ball(7),
            ] {
                if r.is_contradiction() {
                    continue;
                }
                assert!(s == CellSet::Unknown || s == r || (s == CellSet::AnyBall && r.is_ball()));
            }
            let e = s.combine_with_empty();
            if !e.is_contradiction() {
                assert_eq!(e.combine_with_empty(), e);
            }
        }
    }

    #[test]
    fn test_contradiction_is_absorbing() {
        let c = CellSet::Contradiction;
        assert!(c.combine_with_empty().is_contradiction());
        assert!(c.combine_with_any_ball().is_contradiction());
        assert!(c.combine_with_obstacle().is_contradiction());
        assert!(c.combine_with_concrete_ball(0).is_contradiction());
    }

    #[test]
    fn test_from_cell() {
        assert_eq!(CellSet::from_cell(Cell::Wall), CellSet::Wall);
        assert_eq!(CellSet::from_cell(Cell::Ball(6)), CellSet::Ball(6));
        assert_eq!(CellSet::from_cell(Cell::Empty).to_char(), '.');
    }
}
