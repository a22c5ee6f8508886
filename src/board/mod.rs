//! Board model: cells, packed coordinates, roll moves and board I/O

pub mod cell;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod io;
pub mod moves;

pub use cell::Cell;
pub use error::BoardError;
pub use geometry::{Geometry, Offset, PackedCoord};
pub use grid::Board;
pub use io::{load_board_from_file, load_moves_from_file, load_problem_from_file, Problem};
pub use moves::{Move, MoveRecord};
