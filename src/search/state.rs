//! Incremental knowledge state with undoable edits

use super::cell_set::CellSet;
use crate::board::{Board, Cell, Move, PackedCoord};
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

/// Required knowledge per cell
pub type Goal = BTreeMap<PackedCoord, CellSet>;

/// How the knowledge of a cell disagrees with the board the state starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conflict {
    None,
    /// Board has a ball, knowledge says empty
    Fill,
    /// Board is empty, knowledge demands a ball
    Clear,
    /// Board ball has a colour the knowledge rules out
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConflictChange {
    Added(PackedCoord),
    /// Cell taken out of the conflict list at `index`
    Removed { cell: PackedCoord, index: usize },
}

/// Log positions to roll back to; obtained from [`State::restore_point`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct RestorePoint {
    undo_len: usize,
    conflict_len: usize,
}

/// Knowledge about every cell of a board, constrained by a goal.
///
/// `conflicts` always holds exactly the cells whose [`Conflict`] is not
/// `None`. Every change goes through [`State::edit_cur`], which logs the old
/// value so that rolling back to a [`RestorePoint`] restores both the
/// knowledge and the conflict set.
#[derive(Debug, Clone)]
pub struct State<'b> {
    initial: &'b Board,
    cur: Vec<CellSet>,
    conflicts: Vec<PackedCoord>,
    undo_log: Vec<(PackedCoord, CellSet)>,
    conflict_log: Vec<ConflictChange>,
}

impl<'b> State<'b> {
    /// Walls are known, everything else starts unknown; then every goal
    /// entry is asserted.
    ///
    /// # Panics
    ///
    /// Panics if a goal entry names a wall or holds `Contradiction`.
    pub fn new(initial: &'b Board, goal: &Goal) -> Self {
        let cur = initial
            .cells()
            .iter()
            .map(|&cell| if cell == Cell::Wall { CellSet::Wall } else { CellSet::Unknown })
            .collect();

        let mut state = Self {
            initial,
            cur,
            conflicts: Vec::new(),
            undo_log: Vec::with_capacity(256),
            conflict_log: Vec::with_capacity(256),
        };
        for (&p, &value) in goal {
            state.edit_cur(p, value);
        }
        state
    }

    pub fn initial_board(&self) -> &'b Board {
        self.initial
    }

    pub fn cur(&self) -> &[CellSet] {
        &self.cur
    }

    #[inline]
    pub fn knowledge(&self, p: PackedCoord) -> CellSet {
        self.cur[p]
    }

    /// Cells currently in conflict, in no particular order
    pub fn conflicts(&self) -> &[PackedCoord] {
        &self.conflicts
    }

    pub fn conflict_type(&self, p: PackedCoord) -> Conflict {
        match self.initial[p] {
            Cell::Empty => {
                if self.cur[p].combine_with_empty().is_contradiction() {
                    Conflict::Clear
                } else {
                    Conflict::None
                }
            }
            Cell::Ball(color) => {
                if self.cur[p] == CellSet::Empty {
                    Conflict::Fill
                } else if self.cur[p].combine_with_concrete_ball(color).is_contradiction() {
                    Conflict::Replace
                } else {
                    Conflict::None
                }
            }
            Cell::Wall | Cell::Forbidden => panic!("no conflict is defined for cell {}", p),
        }
    }

    /// Set the knowledge of `p`, logging the change for rollback.
    ///
    /// # Panics
    ///
    /// Panics when storing `Contradiction` or `Wall`, or when changing a wall cell.
    pub fn edit_cur(&mut self, p: PackedCoord, value: CellSet) {
        assert!(!value.is_contradiction(), "contradiction stored at {}", p);
        if self.cur[p] == value {
            return;
        }
        assert!(self.initial[p] != Cell::Wall, "edit of wall cell {}", p);
        assert!(value != CellSet::Wall, "wall knowledge stored at {}", p);

        self.undo_log.push((p, self.cur[p]));

        let was_conflict = self.conflict_type(p) != Conflict::None;
        self.cur[p] = value;
        let is_conflict = self.conflict_type(p) != Conflict::None;

        if !was_conflict && is_conflict {
            self.conflicts.push(p);
            self.conflict_log.push(ConflictChange::Added(p));
        } else if was_conflict && !is_conflict {
            let index = self.remove_conflict(p);
            self.conflict_log.push(ConflictChange::Removed { cell: p, index });
        }
    }

    fn remove_conflict(&mut self, p: PackedCoord) -> usize {
        let index = self
            .conflicts
            .iter()
            .position(|&q| q == p)
            .unwrap_or_else(|| panic!("cell {} missing from conflict set", p));
        self.conflicts.swap_remove(index);
        index
    }

    pub fn restore_point(&self) -> RestorePoint {
        RestorePoint {
            undo_len: self.undo_log.len(),
            conflict_len: self.conflict_log.len(),
        }
    }

    /// Undo every edit made since `point`, newest first.
    ///
    /// The conflict list comes back in its original order, not just with the
    /// same members. Restore points must be released in LIFO order.
    pub fn rollback(&mut self, point: RestorePoint) {
        assert!(
            self.undo_log.len() >= point.undo_len && self.conflict_log.len() >= point.conflict_len,
            "restore point released out of order"
        );
        while self.undo_log.len() > point.undo_len {
            if let Some((p, old)) = self.undo_log.pop() {
                self.cur[p] = old;
            }
        }
        while self.conflict_log.len() > point.conflict_len {
            match self.conflict_log.pop() {
                Some(ConflictChange::Added(p)) => {
                    let last = self.conflicts.pop();
                    assert_eq!(last, Some(p), "conflict list out of step with its log");
                }
                Some(ConflictChange::Removed { cell, index }) => {
                    self.conflicts.push(cell);
                    let last = self.conflicts.len() - 1;
                    self.conflicts.swap(index, last);
                }
                None => break,
            }
        }
    }

    /// Open a scoped speculation; dropping the guard rolls back everything
    /// edited through it.
    pub fn speculate(&mut self) -> Speculation<'_, 'b> {
        let point = self.restore_point();
        Speculation { state: self, point }
    }

    /// Current knowledge of every cell touched since `point`.
    ///
    /// Re-asserting these values on the state as it was at `point` reproduces
    /// the current knowledge and conflict set.
    pub fn edits_since(&self, point: RestorePoint) -> Vec<(PackedCoord, CellSet)> {
        let mut touched: Vec<PackedCoord> = Vec::new();
        for &(p, _) in &self.undo_log[point.undo_len..] {
            if !touched.contains(&p) {
                touched.push(p);
            }
        }
        touched.into_iter().map(|p| (p, self.cur[p])).collect()
    }

    /// Assert the effect of a roll on the knowledge: the cell behind the
    /// origin is an obstacle, the origin and the path become empty and the
    /// destination takes the rolling ball.
    ///
    /// # Panics
    ///
    /// Panics if any step contradicts current knowledge.
    pub fn apply_move(&mut self, mv: Move) {
        let geometry = *self.initial.geometry();
        let dir = geometry.move_dir(mv);

        let behind = geometry.back(mv.from, dir);
        let fulcrum = self.cur[behind].combine_with_obstacle();
        assert!(!fulcrum.is_contradiction(), "no obstacle behind {:?}", mv);
        self.edit_cur(behind, fulcrum);

        let rolling_ball = self.cur[mv.from].combine_with_any_ball();
        assert!(!rolling_ball.is_contradiction(), "no ball at origin of {:?}", mv);
        self.edit_cur(mv.from, CellSet::Empty);

        let mut p = geometry.step(mv.from, dir);
        while p != mv.to {
            let e = self.cur[p].combine_with_empty();
            assert!(!e.is_contradiction(), "path of {:?} is blocked at {}", mv, p);
            self.edit_cur(p, e);
            p = geometry.step(p, dir);
        }

        assert!(
            !self.cur[mv.to].combine_with_empty().is_contradiction(),
            "destination of {:?} is occupied",
            mv
        );
        self.edit_cur(mv.to, rolling_ball);
    }

    /// Every cell with known content, as a goal for a fresh state
    pub fn rebuild_goals(&self) -> Goal {
        self.cur
            .iter()
            .enumerate()
            .filter(|&(p, &value)| value != CellSet::Unknown && self.initial[p] != Cell::Wall)
            .map(|(p, &value)| (p, value))
            .collect()
    }

    /// Recompute the conflict set from scratch and compare
    pub fn check_conflicts(&self) -> bool {
        let mut expected: Vec<PackedCoord> = self
            .initial
            .geometry()
            .interior()
            .filter(|&p| self.initial[p] != Cell::Wall && self.conflict_type(p) != Conflict::None)
            .collect();
        let mut actual = self.conflicts.clone();
        expected.sort_unstable();
        actual.sort_unstable();
        expected == actual
    }
}

/// Guard returned by [`State::speculate`].
///
/// Dereferences to the state; edits made through it are undone on drop.
/// Guards nest: a speculation can open another one.
pub struct Speculation<'s, 'b> {
    state: &'s mut State<'b>,
    point: RestorePoint,
}

impl<'s, 'b> Deref for Speculation<'s, 'b> {
    type Target = State<'b>;

    fn deref(&self) -> &State<'b> {
        self.state
    }
}

impl<'s, 'b> DerefMut for Speculation<'s, 'b> {
    fn deref_mut(&mut self) -> &mut State<'b> {
        self.state
    }
}

impl Drop for Speculation<'_, '_> {
    fn drop(&mut self) {
        self.state.rollback(self.point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: &[&str]) -> Board {
        Board::from_rows(rows).unwrap()
    }

    fn sorted(v: &[PackedCoord]) -> Vec<PackedCoord> {
        let mut v = v.to_vec();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_new_state_marks_walls_and_goals() {
        let b = board(&["0.#", "..."]);
        let geo = *b.geometry();
        let target = geo.from_row_col(0, 1);
        let goal = Goal::from([(target, CellSet::Ball(0))]);
        let state = State::new(&b, &goal);

        assert_eq!(state.knowledge(geo.from_row_col(0, 2)), CellSet::Wall);
        assert_eq!(state.knowledge(geo.pack(0, 0)), CellSet::Wall);
        assert_eq!(state.knowledge(geo.from_row_col(0, 0)), CellSet::Unknown);
        assert_eq!(state.knowledge(target), CellSet::Ball(0));
        assert_eq!(state.conflicts(), &[target]);
        assert_eq!(state.conflict_type(target), Conflict::Clear);
        assert!(state.check_conflicts());
    }

    #[test]
    fn test_conflict_types() {
        let b = board(&["01."]);
        let geo = *b.geometry();
        let (a, c, e) = (geo.from_row_col(0, 0), geo.from_row_col(0, 1), geo.from_row_col(0, 2));
        let goal = Goal::from([(a, CellSet::Empty), (c, CellSet::Ball(2)), (e, CellSet::AnyBall)]);
        let state = State::new(&b, &goal);

        assert_eq!(state.conflict_type(a), Conflict::Fill);
        assert_eq!(state.conflict_type(c), Conflict::Replace);
        assert_eq!(state.conflict_type(e), Conflict::Clear);
        assert_eq!(sorted(state.conflicts()), vec![a, c, e]);
    }

    #[test]
    fn test_matching_goal_has_no_conflict() {
        let b = board(&["0.", ".1"]);
        let geo = *b.geometry();
        let goal = Goal::from([
            (geo.from_row_col(0, 0), CellSet::Ball(0)),
            (geo.from_row_col(0, 1), CellSet::Empty),
            (geo.from_row_col(1, 1), CellSet::AnyBall),
        ]);
        let state = State::new(&b, &goal);
        assert!(state.conflicts().is_empty());
    }

    #[test]
    fn test_rollback_restores_knowledge_and_conflicts() {
        let b = board(&["0..", "..."]);
        let geo = *b.geometry();
        let mut state = State::new(&b, &Goal::new());
        let before = state.cur().to_vec();

        let point = state.restore_point();
        state.edit_cur(geo.from_row_col(0, 0), CellSet::Empty);
        state.edit_cur(geo.from_row_col(0, 1), CellSet::Ball(3));
        state.edit_cur(geo.from_row_col(0, 1), CellSet::Empty);
        state.edit_cur(geo.from_row_col(1, 2), CellSet::AnyBall);
        assert_eq!(state.conflicts().len(), 2);
        assert!(state.check_conflicts());

        state.rollback(point);
        assert_eq!(state.cur(), &before[..]);
        assert!(state.conflicts().is_empty());
    }

    #[test]
    fn test_rollback_keeps_conflict_order() {
        let b = board(&["...", "..."]);
        let geo = *b.geometry();
        let goal = Goal::from([
            (geo.from_row_col(0, 0), CellSet::AnyBall),
            (geo.from_row_col(0, 1), CellSet::AnyBall),
            (geo.from_row_col(0, 2), CellSet::AnyBall),
        ]);
        let mut state = State::new(&b, &goal);
        let before = state.conflicts().to_vec();
        assert_eq!(before.len(), 3);

        let point = state.restore_point();
        state.edit_cur(before[0], CellSet::Empty);
        state.edit_cur(geo.from_row_col(1, 0), CellSet::AnyBall);
        state.edit_cur(before[1], CellSet::Empty);
        assert_ne!(state.conflicts(), &before[..]);

        state.rollback(point);
        assert_eq!(state.conflicts(), &before[..]);
        assert!(state.check_conflicts());
    }

    #[test]
    fn test_nested_speculation() {
        let b = board(&["0..", "..."]);
        let geo = *b.geometry();
        let p = geo.from_row_col(0, 1);
        let q = geo.from_row_col(1, 1);
        let mut state = State::new(&b, &Goal::new());
        {
            let mut outer = state.speculate();
            outer.edit_cur(p, CellSet::AnyBall);
            {
                let mut inner = outer.speculate();
                inner.edit_cur(q, CellSet::Ball(1));
                assert_eq!(inner.conflicts().len(), 2);
            }
            assert_eq!(outer.knowledge(q), CellSet::Unknown);
            assert_eq!(outer.conflicts(), &[p]);
            assert!(outer.check_conflicts());
        }
        assert_eq!(state.knowledge(p), CellSet::Unknown);
        assert!(state.conflicts().is_empty());
    }

    #[test]
    fn test_edits_since_replays_to_same_state() {
        let b = board(&["0..", "..."]);
        let geo = *b.geometry();
        let mut state = State::new(&b, &Goal::new());
        let base = state.restore_point();
        state.edit_cur(geo.from_row_col(0, 1), CellSet::AnyBall);
        state.edit_cur(geo.from_row_col(0, 0), CellSet::Empty);
        state.edit_cur(geo.from_row_col(0, 1), CellSet::Ball(4));
        let edits = state.edits_since(base);
        let expected = state.cur().to_vec();
        let expected_conflicts = sorted(state.conflicts());
        state.rollback(base);

        assert_eq!(edits.len(), 2);
        for (p, value) in edits {
            state.edit_cur(p, value);
        }
        assert_eq!(state.cur(), &expected[..]);
        assert_eq!(sorted(state.conflicts()), expected_conflicts);
    }

    #[test]
    fn test_apply_move() {
        let b = board(&["....", "...."]);
        let geo = *b.geometry();
        let mut state = State::new(&b, &Goal::new());
        // The ball ends on (0, 3) after rolling right from (0, 0).
        let mv = Move::new(geo.from_row_col(0, 0), geo.from_row_col(0, 3));
        state.apply_move(mv);

        assert_eq!(state.knowledge(geo.pack(0, 1)), CellSet::Wall);
        assert_eq!(state.knowledge(geo.from_row_col(0, 0)), CellSet::Empty);
        assert_eq!(state.knowledge(geo.from_row_col(0, 1)), CellSet::Empty);
        assert_eq!(state.knowledge(geo.from_row_col(0, 2)), CellSet::Empty);
        assert_eq!(state.knowledge(geo.from_row_col(0, 3)), CellSet::AnyBall);
        assert_eq!(state.conflicts(), &[geo.from_row_col(0, 3)]);
        assert!(state.check_conflicts());
    }

    #[test]
    fn test_rebuild_goals() {
        let b = board(&["0.", ".."]);
        let geo = *b.geometry();
        let goal = Goal::from([(geo.from_row_col(1, 1), CellSet::Ball(0))]);
        let mut state = State::new(&b, &goal);
        state.edit_cur(geo.from_row_col(0, 0), CellSet::Empty);

        let rebuilt = state.rebuild_goals();
        assert_eq!(rebuilt.len(), 2);
        assert_eq!(rebuilt[&geo.from_row_col(0, 0)], CellSet::Empty);
        assert_eq!(rebuilt[&geo.from_row_col(1, 1)], CellSet::Ball(0));
    }

    #[test]
    #[should_panic(expected = "contradiction stored")]
    fn test_contradiction_is_never_stored() {
        let b = board(&[".."]);
        let mut state = State::new(&b, &Goal::new());
        let p = b.geometry().from_row_col(0, 0);
        state.edit_cur(p, CellSet::Contradiction);
    }

    #[test]
    #[should_panic(expected = "edit of wall cell")]
    fn test_wall_cells_are_immutable() {
        let b = board(&[".#"]);
        let mut state = State::new(&b, &Goal::new());
        let p = b.geometry().from_row_col(0, 1);
        state.edit_cur(p, CellSet::Empty);
    }
}
