//! Precomputed move chains that clear a single conflict

use super::cell_set::CellSet;
use super::state::State;
use crate::board::{Cell, Move, PackedCoord};
use std::collections::{HashMap, VecDeque};

/// Moves in search order: the first leaves the destination, the last lands
/// on the board ball that supplies it.
pub type Opening = Vec<Move>;

/// Openings keyed by destination and required ball, valid for one initial
/// board. Owned by a single search session.
#[derive(Debug, Default)]
pub struct OpeningCache {
    entries: HashMap<(PackedCoord, CellSet), Vec<Opening>>,
}

impl OpeningCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Openings that bring a `ball` to `destination`, computed on first use.
    ///
    /// `ball` must be `AnyBall` or a concrete ball. Unknown-ness of the source
    /// ball is checked against `state` when the entry is first computed.
    pub fn get_or_compute(&mut self, state: &State<'_>, destination: PackedCoord, ball: CellSet) -> &[Opening] {
        assert!(ball.is_ball(), "openings need a ball kind, got {:?}", ball);
        self.entries
            .entry((destination, ball))
            .or_insert_with(|| compute_openings(state, destination, ball))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Breadth-first search over the initial board from `destination`.
///
/// Each reached empty cell remembers the move that leaves it towards the
/// destination side. The first suitable board ball found ends the search; a
/// chain that needs the ball's own starting cell as a fulcrum is skipped.
pub fn compute_openings(state: &State<'_>, destination: PackedCoord, ball: CellSet) -> Vec<Opening> {
    let board = state.initial_board();
    let geometry = board.geometry();
    assert_eq!(board[destination], Cell::Empty, "openings start from an empty cell");

    let mut visited = vec![false; geometry.len()];
    let mut via: Vec<Option<Move>> = vec![None; geometry.len()];
    let mut queue = VecDeque::new();
    visited[destination] = true;
    queue.push_back(destination);

    while let Some(p) = queue.pop_front() {
        for d in geometry.dirs() {
            if board[geometry.step(p, d)] == Cell::Empty {
                continue;
            }

            let mut pp = geometry.back(p, d);
            while board[pp] == Cell::Empty {
                if !visited[pp] {
                    visited[pp] = true;
                    via[pp] = Some(Move::new(p, pp));
                    queue.push_back(pp);
                }
                pp = geometry.back(pp, d);
            }

            let Cell::Ball(color) = board[pp] else {
                continue;
            };
            if state.knowledge(pp) != CellSet::Unknown {
                continue;
            }
            if ball != CellSet::AnyBall && ball != CellSet::Ball(color) {
                continue;
            }

            let mut chain = vec![Move::new(p, pp)];
            let mut valid = true;
            let mut t = p;
            while let Some(step) = via[t] {
                let dd = geometry.move_dir(step);
                if geometry.back(step.from, dd) == pp {
                    valid = false;
                    break;
                }
                chain.push(step);
                t = step.from;
            }
            if valid {
                chain.reverse();
                return vec![chain];
            }
        }
    }

    Vec::new()
}
