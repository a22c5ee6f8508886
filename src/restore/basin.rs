//! Reachability estimates used to order target cells

use crate::board::{Board, Cell, PackedCoord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Number of cells from which a ball can eventually roll onto `destination`
pub fn basin_area(board: &Board, destination: PackedCoord) -> usize {
    let mut visited = vec![false; board.geometry().len()];
    let mut worklist = vec![destination];
    visited[destination] = true;
    let mut area = 0;

    while let Some(p) = worklist.pop() {
        for origin in board.roll_origins(p) {
            if !visited[origin] {
                visited[origin] = true;
                area += 1;
                worklist.push(origin);
            }
        }
    }

    area
}

/// Mean basin area over randomly perturbed copies of `target`.
///
/// In each trial every ball independently becomes forbidden, stays, or is
/// removed (probabilities 1/2, 1/4, 1/4). The generator is seeded per call, so
/// scores do not depend on the order cells are scored in.
pub fn basin_score(target: &Board, destination: PackedCoord, trials: usize, seed: u64) -> f64 {
    if trials == 0 {
        return 0.0;
    }
    let balls = target.balls();
    let mut adjusted = target.clone();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut total = 0usize;
    for _ in 0..trials {
        for &p in &balls {
            adjusted[p] = if rng.gen_bool(0.5) {
                Cell::Forbidden
            } else if rng.gen_bool(0.5) {
                target[p]
            } else {
                Cell::Empty
            };
        }
        total += basin_area(&adjusted, destination);
    }
    total as f64 / trials as f64
}

/// Every target ball with its score, lowest score first; ties by coordinate
pub fn prioritized_targets(target: &Board, trials: usize, seed: u64) -> Vec<(f64, PackedCoord)> {
    let mut scored: Vec<(f64, PackedCoord)> = target
        .balls()
        .par_iter()
        .map(|&p| (basin_score(target, p, trials, seed), p))
        .collect();
    scored.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    scored
}
