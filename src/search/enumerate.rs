//! Conflict-driven move generation

use super::cell_set::CellSet;
use super::state::{Conflict, RestorePoint, State};
use crate::board::{Geometry, Move, PackedCoord};
use std::collections::BTreeSet;

/// A move together with the knowledge it implies.
///
/// `edits` are relative to the state the enumeration ran on; replaying them
/// with [`Candidate::apply`] puts the state into the position right after
/// the move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub mv: Move,
    edits: Vec<(PackedCoord, CellSet)>,
}

impl Candidate {
    pub fn apply(&self, state: &mut State<'_>) {
        for &(p, value) in &self.edits {
            state.edit_cur(p, value);
        }
    }

    pub fn edits(&self) -> &[(PackedCoord, CellSet)] {
        &self.edits
    }
}

/// Candidate moves produced by [`enumerate_moves`], in generation order
#[derive(Debug)]
pub struct Candidates {
    inner: std::vec::IntoIter<Candidate>,
}

impl Iterator for Candidates {
    type Item = Candidate;

    fn next(&mut self) -> Option<Candidate> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Candidates {}

/// Every move that could help resolve the current conflicts.
///
/// The forward pass rolls the ball off each clear or replace conflict; cells
/// that stopped such a roll without being walls are expanded in a second
/// stage, since clearing them may open the way. The backward pass looks for
/// balls that could roll onto each fill conflict, skipping origins the
/// forward pass already expanded.
///
/// The state is left exactly as it was found.
pub fn enumerate_moves(state: &mut State<'_>) -> Candidates {
    let geometry = *state.initial_board().geometry();
    let base = state.restore_point();
    let mut out = Vec::new();

    let stage0: Vec<PackedCoord> = state
        .conflicts()
        .iter()
        .copied()
        .filter(|&p| state.conflict_type(p) != Conflict::Fill)
        .collect();
    let mut blockers = BTreeSet::new();
    let mut explored = Vec::with_capacity(stage0.len());

    for &from in &stage0 {
        explored.push(from);
        expand_forward(state, &geometry, base, from, Some(&mut blockers), &mut out);
    }
    for from in &stage0 {
        blockers.remove(from);
    }
    for from in blockers {
        explored.push(from);
        expand_forward(state, &geometry, base, from, None, &mut out);
    }

    explored.sort_unstable();
    let fills: Vec<PackedCoord> = state
        .conflicts()
        .iter()
        .copied()
        .filter(|&p| state.conflict_type(p) == Conflict::Fill)
        .collect();
    for to in fills {
        expand_backward(state, &geometry, base, to, &explored, &mut out);
    }

    debug_assert_eq!(state.restore_point(), base);
    Candidates {
        inner: out.into_iter(),
    }
}

/// Roll the ball on `from` in every direction with a usable fulcrum,
/// stopping on each cell that can be empty.
fn expand_forward(
    state: &mut State<'_>,
    geometry: &Geometry,
    base: RestorePoint,
    from: PackedCoord,
    mut blockers: Option<&mut BTreeSet<PackedCoord>>,
    out: &mut Vec<Candidate>,
) {
    for dir in geometry.dirs() {
        let behind = geometry.back(from, dir);
        let fulcrum = state.knowledge(behind).combine_with_obstacle();
        if fulcrum.is_contradiction() {
            continue;
        }

        let mut roll = state.speculate();
        roll.edit_cur(behind, fulcrum);
        let rolling_ball = roll.knowledge(from);
        roll.edit_cur(from, CellSet::Empty);

        let mut p = geometry.step(from, dir);
        loop {
            let emptied = roll.knowledge(p).combine_with_empty();
            if emptied.is_contradiction() {
                if roll.knowledge(p) != CellSet::Wall {
                    if let Some(blockers) = blockers.as_mut() {
                        blockers.insert(p);
                    }
                }
                break;
            }

            {
                let mut landing = roll.speculate();
                landing.edit_cur(p, rolling_ball);
                out.push(Candidate {
                    mv: Move::new(from, p),
                    edits: landing.edits_since(base),
                });
            }

            roll.edit_cur(p, emptied);
            p = geometry.step(p, dir);
        }
    }
}

/// Find balls that could roll onto the fill conflict `to`
fn expand_backward(
    state: &mut State<'_>,
    geometry: &Geometry,
    base: RestorePoint,
    to: PackedCoord,
    explored: &[PackedCoord],
    out: &mut Vec<Candidate>,
) {
    for dir in geometry.dirs() {
        let mut scan = state.speculate();
        let mut p = geometry.back(to, dir);
        loop {
            let rolling_ball = scan.knowledge(p).combine_with_any_ball();
            if !rolling_ball.is_contradiction() {
                let behind = geometry.back(p, dir);
                let fulcrum = scan.knowledge(behind).combine_with_obstacle();
                if !fulcrum.is_contradiction() && explored.binary_search(&p).is_err() {
                    let mut landing = scan.speculate();
                    landing.edit_cur(behind, fulcrum);
                    landing.edit_cur(p, CellSet::Empty);
                    landing.edit_cur(to, rolling_ball);
                    out.push(Candidate {
                        mv: Move::new(p, to),
                        edits: landing.edits_since(base),
                    });
                }
            }

            let emptied = scan.knowledge(p).combine_with_empty();
            if emptied.is_contradiction() {
                break;
            }
            scan.edit_cur(p, emptied);
            p = geometry.back(p, dir);
        }
    }
}
