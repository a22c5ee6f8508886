//! Packed coordinates over the wall-framed board

use super::moves::Move;

/// Index of a cell in the framed board, `x + y * width`
pub type PackedCoord = usize;

/// Signed step between neighbouring cells: one of `±1`, `±width`
pub type Offset = isize;

/// Dimensions of a framed board and its four roll directions.
///
/// Built once per restore call and shared by reference with everything that
/// scans the board. The frame is one wall cell thick on every side, so any
/// scan that starts inside the board stops on a wall before leaving it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: usize,
    height: usize,
    dirs: [Offset; 4],
}

impl Geometry {
    /// Geometry for a board of `rows` x `cols` playable cells plus the frame
    pub fn framed(rows: usize, cols: usize) -> Self {
        let width = cols + 2;
        let height = rows + 2;
        let w = width as Offset;
        Self {
            width,
            height,
            dirs: [1, -1, w, -w],
        }
    }

    /// Width including the frame
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height including the frame
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of playable rows
    pub fn rows(&self) -> usize {
        self.height - 2
    }

    /// Number of playable columns
    pub fn cols(&self) -> usize {
        self.width - 2
    }

    /// Total number of cells including the frame
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The four roll directions in scan order: right, left, down, up
    #[inline]
    pub fn dirs(&self) -> [Offset; 4] {
        self.dirs
    }

    #[inline]
    pub fn pack(&self, x: usize, y: usize) -> PackedCoord {
        x + y * self.width
    }

    #[inline]
    pub fn unpack(&self, p: PackedCoord) -> (usize, usize) {
        (p % self.width, p / self.width)
    }

    /// Coordinate of a playable cell given its unframed row and column
    pub fn from_row_col(&self, row: usize, col: usize) -> PackedCoord {
        self.pack(col + 1, row + 1)
    }

    /// Unframed row and column of a playable cell
    pub fn to_row_col(&self, p: PackedCoord) -> (usize, usize) {
        let (x, y) = self.unpack(p);
        (y - 1, x - 1)
    }

    /// Neighbour of `p` in direction `d`
    #[inline]
    pub fn step(&self, p: PackedCoord, d: Offset) -> PackedCoord {
        p.wrapping_add_signed(d)
    }

    /// Neighbour of `p` against direction `d`
    #[inline]
    pub fn back(&self, p: PackedCoord, d: Offset) -> PackedCoord {
        p.wrapping_add_signed(-d)
    }

    /// Whether `p` lies on the frame
    pub fn is_frame(&self, p: PackedCoord) -> bool {
        let (x, y) = self.unpack(p);
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    /// All playable coordinates in row-major order
    pub fn interior(&self) -> impl Iterator<Item = PackedCoord> + '_ {
        (1..self.height - 1).flat_map(move |y| (1..self.width - 1).map(move |x| self.pack(x, y)))
    }

    /// Direction of a move, derived from the difference of its endpoints
    pub fn move_dir(&self, mv: Move) -> Offset {
        let w = self.width as Offset;
        let d = mv.to as Offset - mv.from as Offset;
        assert!(d != 0, "move must change position");
        if d <= -w {
            -w
        } else if d < 0 {
            -1
        } else if d < w {
            1
        } else {
            w
        }
    }

    pub fn is_horizontal(&self, d: Offset) -> bool {
        d == 1 || d == -1
    }

    /// Direction digit used in move records: left 0, down 1, right 2, up 3
    pub fn direction_code(&self, d: Offset) -> u8 {
        let w = self.width as Offset;
        match d {
            -1 => 0,
            1 => 2,
            _ if d == w => 1,
            _ if d == -w => 3,
            _ => panic!("{} is not a roll direction for width {}", d, self.width),
        }
    }

    /// Offset for a move-record direction digit
    pub fn offset_for_code(&self, code: u8) -> Option<Offset> {
        let w = self.width as Offset;
        match code {
            0 => Some(-1),
            1 => Some(w),
            2 => Some(1),
            3 => Some(-w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_framed_dimensions() {
        let geo = Geometry::framed(3, 4);
        assert_eq!(geo.width(), 6);
        assert_eq!(geo.height(), 5);
        assert_eq!(geo.rows(), 3);
        assert_eq!(geo.cols(), 4);
        assert_eq!(geo.dirs(), [1, -1, 6, -6]);
        assert_eq!(geo.interior().count(), 12);
    }

    #[test]
    fn test_row_col_round_trip() {
        let geo = Geometry::framed(3, 4);
        let p = geo.from_row_col(2, 1);
        assert_eq!(geo.unpack(p), (2, 3));
        assert_eq!(geo.to_row_col(p), (2, 1));
        assert!(!geo.is_frame(p));
        assert!(geo.is_frame(geo.pack(0, 2)));
    }

    #[test]
    fn test_move_direction() {
        let geo = Geometry::framed(4, 4);
        let p = geo.from_row_col(1, 1);
        let w = geo.width() as Offset;
        assert_eq!(geo.move_dir(Move::new(p, p + 2)), 1);
        assert_eq!(geo.move_dir(Move::new(p, p - 1)), -1);
        assert_eq!(geo.move_dir(Move::new(p, p + 2 * geo.width())), w);
        assert_eq!(geo.move_dir(Move::new(p, p - geo.width())), -w);
    }

    #[test]
    fn test_direction_codes() {
        let geo = Geometry::framed(2, 2);
        for code in 0..4 {
            let d = geo.offset_for_code(code).unwrap();
            assert_eq!(geo.direction_code(d), code);
        }
        assert_eq!(geo.offset_for_code(4), None);
        assert_eq!(geo.direction_code(-1), 0);
        assert_eq!(geo.direction_code(geo.width() as Offset), 1);
    }
}
