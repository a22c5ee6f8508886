//! Board cell contents

/// Content of one board cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cell {
    Wall,
    Empty,
    /// Ball of colour 0-9
    Ball(u8),
    /// Marks a ball position that basin estimation treats as unusable.
    /// Never produced by parsing.
    Forbidden,
}

impl Cell {
    /// Parse a board character: `#` wall, `.` empty, `0`-`9` ball
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '#' => Some(Cell::Wall),
            '.' => Some(Cell::Empty),
            '0'..='9' => Some(Cell::Ball(ch as u8 - b'0')),
            _ => None,
        }
    }

    pub fn to_char(self) -> char {
        match self {
            Cell::Wall => '#',
            Cell::Empty => '.',
            Cell::Ball(color) => (b'0' + color) as char,
            Cell::Forbidden => 'x',
        }
    }

    #[inline]
    pub fn is_ball(self) -> bool {
        matches!(self, Cell::Ball(_))
    }

    pub fn color(self) -> Option<u8> {
        match self {
            Cell::Ball(color) => Some(color),
            _ => None,
        }
    }
}
