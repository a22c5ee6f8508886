//! Iterative-deepening search over candidate moves

use super::commute::{commute, commute_all};
use super::enumerate::enumerate_moves;
use super::openings::{Opening, OpeningCache};
use super::state::{Conflict, State};
use crate::board::Move;
use tracing::debug;

/// Depth-first search with increasing depth bounds.
///
/// Moves are recorded in search order, from the goal towards the board the
/// state starts from. To play them on the real board, reverse the list and
/// flip every move.
pub struct Backtracker<'s, 'b> {
    state: &'s mut State<'b>,
    moves: Vec<Move>,
    solution: Option<Vec<Move>>,
    openings: OpeningCache,
    nodes: u64,
}

impl<'s, 'b> Backtracker<'s, 'b> {
    pub fn new(state: &'s mut State<'b>) -> Self {
        Self {
            state,
            moves: Vec::new(),
            solution: None,
            openings: OpeningCache::new(),
            nodes: 0,
        }
    }

    /// Run depth bounds `min_depth..=max_depth` until one succeeds.
    ///
    /// The state is back in its starting position afterwards.
    pub fn search(&mut self, min_depth: usize, max_depth: usize) -> bool {
        for depth in min_depth..=max_depth {
            self.rec(depth);
            if self.solution.is_some() {
                break;
            }
        }
        debug!(
            solved = self.solution.is_some(),
            nodes = self.nodes,
            openings_cached = self.openings.len(),
            "backtracker finished"
        );
        self.solution.is_some()
    }

    pub fn solved(&self) -> bool {
        self.solution.is_some()
    }

    pub fn solution(&self) -> Option<&[Move]> {
        self.solution.as_deref()
    }

    pub fn into_solution(self) -> Option<Vec<Move>> {
        self.solution
    }

    pub fn nodes_visited(&self) -> u64 {
        self.nodes
    }

    pub fn openings_cached(&self) -> usize {
        self.openings.len()
    }

    fn rec(&mut self, depth: usize) {
        if self.solution.is_some() {
            return;
        }
        self.nodes += 1;

        if self.state.conflicts().is_empty() {
            self.solution = Some(self.moves.clone());
            return;
        }

        // Lower bounds: every clear needs a ball to leave, every fill a ball
        // to arrive, and a replace needs both.
        let mut n1 = 0;
        let mut n2 = 0;
        for &p in self.state.conflicts() {
            match self.state.conflict_type(p) {
                Conflict::None => {}
                Conflict::Clear => n1 += 1,
                Conflict::Fill => n2 += 1,
                Conflict::Replace => {
                    n1 += 1;
                    n2 += 1;
                }
            }
        }
        if n1 == self.state.conflicts().len() && n2 == 0 && self.try_solve_with_openings() {
            return;
        }
        if n1.max(n2) > depth {
            return;
        }

        let geometry = *self.state.initial_board().geometry();
        for candidate in enumerate_moves(self.state) {
            if self.solution.is_some() {
                break;
            }
            let mv = candidate.mv;
            if let Some(&last) = self.moves.last() {
                if last > mv && commute(last, mv, &geometry) {
                    continue;
                }
            }

            let point = self.state.restore_point();
            candidate.apply(self.state);
            self.moves.push(mv);

            self.rec(depth - 1);

            let popped = self.moves.pop();
            debug_assert_eq!(popped, Some(mv));
            self.state.rollback(point);
        }
    }

    /// Resolve a pure set of clear conflicts with one cached opening each,
    /// provided the openings are mutually independent.
    fn try_solve_with_openings(&mut self) -> bool {
        let geometry = *self.state.initial_board().geometry();
        let mut chosen: Vec<Opening> = Vec::new();

        for &conflict in self.state.conflicts() {
            debug_assert_eq!(self.state.conflict_type(conflict), Conflict::Clear);
            let ball = self.state.knowledge(conflict);
            let Some(opening) = self.openings.get_or_compute(self.state, conflict, ball).first() else {
                return false;
            };
            let Some(origin) = opening.last().map(|mv| mv.to) else {
                return false;
            };
            if self.state.knowledge(origin).combine_with_empty().is_contradiction() {
                return false;
            }
            if !chosen.iter().all(|prev| commute_all(prev, opening, &geometry)) {
                return false;
            }
            chosen.push(opening.clone());
        }

        let mut solution = self.moves.clone();
        solution.extend(chosen.into_iter().flatten());
        self.solution = Some(solution);
        true
    }
}
