//! Goal scheduler: commits target cells one at a time

use super::basin::prioritized_targets;
use super::outcome::{score, GenerationReport, RestoreOutcome, RestoreStatistics};
use crate::board::{Board, BoardError, Move, MoveRecord, PackedCoord};
use crate::config::{Relaxation, Settings};
use crate::search::{multistep, CellSet, Goal, State};
use anyhow::{Context, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// A start board to be rearranged towards a target board
pub struct RestoreProblem {
    settings: Settings,
    start: Board,
    target: Board,
}

impl RestoreProblem {
    /// Build from rows; both boards must have the same dimensions
    pub fn from_rows<S: AsRef<str>>(settings: Settings, start_rows: &[S], target_rows: &[S]) -> Result<Self> {
        let start = Board::from_rows(start_rows).context("Failed to parse start board")?;
        let target = Board::from_rows(target_rows).context("Failed to parse target board")?;
        Self::new(settings, start, target)
    }

    /// Settings are validated here, so a problem always holds a usable
    /// configuration
    pub fn new(settings: Settings, start: Board, target: Board) -> Result<Self> {
        settings.validate().context("Invalid restore settings")?;
        let (s, t) = (start.geometry(), target.geometry());
        if s.rows() != t.rows() || s.cols() != t.cols() {
            return Err(BoardError::DimensionMismatch {
                start_rows: s.rows(),
                start_cols: s.cols(),
                target_rows: t.rows(),
                target_cols: t.cols(),
            }
            .into());
        }
        Ok(Self { settings, start, target })
    }

    pub fn start(&self) -> &Board {
        &self.start
    }

    pub fn target(&self) -> &Board {
        &self.target
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Target balls in the order the scheduler attempts them, with scores
    pub fn schedule(&self) -> Vec<(f64, PackedCoord)> {
        prioritized_targets(&self.target, self.settings.search.basin_trials, self.settings.search.basin_seed)
    }

    /// Run every configured generation until all targets are committed or
    /// the time limit passes
    pub fn solve(&self) -> Result<RestoreOutcome> {
        let start_time = Instant::now();
        // A limit too large to represent means no deadline at all
        let deadline = Duration::try_from_secs_f64(self.settings.search.time_limit_seconds)
            .ok()
            .and_then(|limit| start_time.checked_add(limit));
        let geometry = *self.start.geometry();

        let mut statistics = RestoreStatistics {
            width: geometry.cols(),
            height: geometry.rows(),
            walls: self.target.wall_count(),
            balls: self.target.ball_count(),
            colors: self.target.colors().len(),
            ..Default::default()
        };
        info!(
            width = statistics.width,
            height = statistics.height,
            walls = statistics.walls,
            balls = statistics.balls,
            colors = statistics.colors,
            "restoring board"
        );

        if self.settings.knob("return_empty") != 0 {
            info!("return_empty knob set, skipping search");
            statistics.score = score(&self.start, &self.target);
            return Ok(RestoreOutcome::empty(&self.start, statistics));
        }

        let targets = self.schedule();
        let mut board = self.start.clone();
        let mut committed = Goal::new();
        let mut played: Vec<Move> = Vec::new();

        'generations: for (generation, config) in self.settings.search.generations.iter().enumerate() {
            let mut report = GenerationReport {
                generation,
                ..Default::default()
            };

            for &(_, p) in &targets {
                if committed.contains_key(&p) {
                    continue;
                }
                if deadline.is_some_and(|deadline| Instant::now() > deadline) {
                    warn!(generation, "time limit reached");
                    statistics.timed_out = true;
                    statistics.generations.push(report);
                    break 'generations;
                }

                let wanted = match config.relaxation {
                    Relaxation::Exact => CellSet::from_cell(self.target[p]),
                    Relaxation::AnyBall => CellSet::AnyBall,
                };
                let mut goal = committed.clone();
                goal.insert(p, wanted);

                let result = {
                    let mut state = State::new(&board, &goal);
                    multistep(&mut state, config.depth)?
                };
                report.tasks += 1;

                if result.solved() {
                    report.solved += 1;
                    committed.insert(p, wanted);
                    for mv in result.real_moves() {
                        board
                            .apply_move(mv)
                            .with_context(|| format!("Search produced an unplayable move {:?}", mv))?;
                        played.push(mv);
                    }
                    report.pattern.push(char::from(b'0' + result.steps));
                } else {
                    report.pattern.push('.');
                }
                let (row, col) = geometry.to_row_col(p);
                debug!(generation, row, col, steps = result.steps, moves = result.moves.len(), "goal attempted");
            }

            info!(
                generation,
                tasks = report.tasks,
                solved = report.solved,
                pattern = %report.pattern,
                "generation finished"
            );
            statistics.generations.push(report);
        }

        let limit = self.settings.search.moves_per_ball * statistics.balls;
        let truncated = played.len() > limit;
        if truncated {
            warn!(moves = played.len(), limit, "too many moves, truncating");
            played.truncate(limit);
            board = self.start.clone();
            for &mv in &played {
                board.apply_move(mv)?;
            }
        }

        statistics.result_size = played.len();
        statistics.elapsed_seconds = start_time.elapsed().as_secs_f64();
        statistics.score = score(&board, &self.target);
        info!(
            result_size = statistics.result_size,
            elapsed = statistics.elapsed_seconds,
            score = statistics.score,
            "restore finished"
        );

        Ok(RestoreOutcome {
            moves: played.iter().map(|&mv| MoveRecord::from_move(mv, &geometry)).collect(),
            truncated,
            final_board: board.rows(),
            statistics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::restore::MoveValidator;

    fn settings() -> Settings {
        let mut settings = Settings::default();
        settings.search.time_limit_seconds = 30.0;
        settings
    }

    fn replay(problem: &RestoreProblem, outcome: &RestoreOutcome) -> Board {
        let validator = MoveValidator::new(problem.start().clone(), problem.target().clone()).unwrap();
        let result = validator.validate(&outcome.moves);
        assert!(result.is_valid, "{}", result);
        result.final_board
    }

    #[test]
    fn test_single_roll() {
        let problem = RestoreProblem::from_rows(settings(), &["...", ".0.", "..."], &["...", "..0", "..."]).unwrap();
        let outcome = problem.solve().unwrap();
        assert_eq!(outcome.moves, vec![MoveRecord { row: 1, col: 1, direction: 2 }]);
        assert_eq!(outcome.statistics.score, 1.0);
        assert_eq!(outcome.statistics.generations[0].pattern, "1");
        assert_eq!(replay(&problem, &outcome).rows(), outcome.final_board);
    }

    #[test]
    fn test_dimension_mismatch_is_rejected() {
        assert!(RestoreProblem::from_rows(settings(), &["..", ".."], &["...", "..."]).is_err());
    }

    #[test]
    fn test_return_empty_knob() {
        let mut settings = settings();
        settings.apply_knob_override("return_empty=1").unwrap();
        let problem = RestoreProblem::from_rows(settings, &["...", ".0.", "..."], &["...", "..0", "..."]).unwrap();
        let outcome = problem.solve().unwrap();
        assert!(outcome.moves.is_empty());
        assert!(outcome.statistics.generations.is_empty());
    }

    #[test]
    fn test_expired_deadline_commits_nothing() {
        let mut settings = settings();
        settings.search.time_limit_seconds = 1e-9;
        let problem = RestoreProblem::from_rows(settings, &["...", ".0.", "..."], &["...", "..0", "..."]).unwrap();
        let outcome = problem.solve().unwrap();
        assert!(outcome.statistics.timed_out);
        assert!(outcome.moves.is_empty());
    }

    #[test]
    fn test_invalid_time_limits_are_errors() {
        for limit in [-1.0, 0.0, f64::NAN] {
            let mut settings = settings();
            settings.search.time_limit_seconds = limit;
            assert!(RestoreProblem::from_rows(settings, &["0.."], &["..0"]).is_err());
        }
    }

    #[test]
    fn test_unrepresentable_time_limit_means_no_deadline() {
        for limit in [1e20, f64::INFINITY] {
            let mut settings = settings();
            settings.search.time_limit_seconds = limit;
            let problem = RestoreProblem::from_rows(settings, &["...", ".0.", "..."], &["...", "..0", "..."]).unwrap();
            let outcome = problem.solve().unwrap();
            assert!(!outcome.statistics.timed_out);
            assert_eq!(outcome.moves, vec![MoveRecord { row: 1, col: 1, direction: 2 }]);
        }
    }

    #[test]
    fn test_truncation_replays_prefix() {
        let mut settings = settings();
        settings.search.moves_per_ball = 1;
        let start = ["0...", "....", "...."];
        let target = ["....", "....", "...0"];
        let problem = RestoreProblem::from_rows(settings, &start, &target).unwrap();
        let outcome = problem.solve().unwrap();
        assert!(outcome.moves.len() <= 1);
        assert_eq!(outcome.truncated, outcome.statistics.generations.iter().any(|g| g.solved > 0));
        assert_eq!(replay(&problem, &outcome).rows(), outcome.final_board);
    }
}
