//! Two-stage composition on top of the backtracker

use super::backtracker::Backtracker;
use super::cell_set::CellSet;
use super::state::State;
use crate::board::{BoardError, Cell, Move};
use tracing::debug;

/// How a goal was reached, with the moves in search order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MultistepResult {
    /// 0 when unsolved, 1 for a direct solution, 2 for a composed one
    pub steps: u8,
    pub moves: Vec<Move>,
}

impl MultistepResult {
    pub fn solved(&self) -> bool {
        self.steps > 0
    }

    /// Moves to play on the real board, in playing order
    pub fn real_moves(&self) -> impl Iterator<Item = Move> + '_ {
        self.moves.iter().rev().map(|mv| mv.reversed())
    }
}

/// Solve `state` directly, or by first parking a ball next to the first
/// conflict and then solving the real goal from there.
///
/// Only fails with an error if a found solution cannot be replayed on the
/// board, which would mean the search produced an illegal move.
pub fn multistep(state: &mut State<'_>, depth: usize) -> Result<MultistepResult, BoardError> {
    {
        let mut direct = Backtracker::new(state);
        if direct.search(1, depth) {
            return Ok(MultistepResult {
                steps: 1,
                moves: direct.into_solution().unwrap_or_default(),
            });
        }
    }

    let Some(&p) = state.conflicts().first() else {
        return Ok(MultistepResult::default());
    };
    let board = state.initial_board();
    let geometry = *board.geometry();

    for d in geometry.dirs() {
        let q = geometry.step(p, d);
        if state.knowledge(q) != CellSet::Unknown || board[q] != Cell::Empty {
            continue;
        }

        let mut intermediate_goal = state.rebuild_goals();
        intermediate_goal.remove(&p);
        intermediate_goal.insert(q, CellSet::AnyBall);

        let mut first_state = State::new(board, &intermediate_goal);
        let mut first = Backtracker::new(&mut first_state);
        if !first.search(1, depth) {
            continue;
        }
        let parking = first.into_solution().unwrap_or_default();

        let mut scratch = board.clone();
        for mv in parking.iter().rev() {
            scratch.apply_move(mv.reversed())?;
        }

        let mut second_state = State::new(&scratch, &state.rebuild_goals());
        let mut second = Backtracker::new(&mut second_state);
        if !second.search(1, depth) {
            continue;
        }

        let mut moves = second.into_solution().unwrap_or_default();
        moves.extend(parking);
        debug!(direction = d, moves = moves.len(), "composed two-step solution");
        return Ok(MultistepResult { steps: 2, moves });
    }

    Ok(MultistepResult::default())
}
