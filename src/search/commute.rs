//! Independence test for pairs of moves

use crate::board::{Geometry, Move, PackedCoord};
use itertools::Itertools;

/// Cells a move depends on: from the obstacle behind its origin through its
/// destination, as an inclusive range along the move's axis.
fn span(mv: Move, geometry: &Geometry) -> (PackedCoord, PackedCoord, bool) {
    let d = geometry.move_dir(mv);
    let behind = geometry.back(mv.from, d);
    (behind.min(mv.to), behind.max(mv.to), geometry.is_horizontal(d))
}

fn in_span(pt: PackedCoord, span: (PackedCoord, PackedCoord, bool), geometry: &Geometry) -> bool {
    let (min, max, horizontal) = span;
    if pt < min || pt > max {
        return false;
    }
    horizontal || (pt - min) % geometry.width() == 0
}

/// Whether `a` and `b` can be applied in either order with the same result.
///
/// They must not share an endpoint, and neither move's span may contain an
/// endpoint of the other.
pub fn commute(a: Move, b: Move, geometry: &Geometry) -> bool {
    if a.from == b.from || a.from == b.to || a.to == b.from || a.to == b.to {
        return false;
    }

    let span_a = span(a, geometry);
    if in_span(b.from, span_a, geometry) || in_span(b.to, span_a, geometry) {
        return false;
    }
    let span_b = span(b, geometry);
    !(in_span(a.from, span_b, geometry) || in_span(a.to, span_b, geometry))
}

/// Every move of `a` commutes with every move of `b`
pub fn commute_all(a: &[Move], b: &[Move], geometry: &Geometry) -> bool {
    a.iter()
        .cartesian_product(b.iter())
        .all(|(&x, &y)| commute(x, y, geometry))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geo() -> Geometry {
        Geometry::framed(5, 5)
    }

    fn mv(g: &Geometry, from: (usize, usize), to: (usize, usize)) -> Move {
        Move::new(g.from_row_col(from.0, from.1), g.from_row_col(to.0, to.1))
    }

    #[test]
    fn test_shared_endpoint_does_not_commute() {
        let g = geo();
        let a = mv(&g, (0, 0), (0, 3));
        let b = mv(&g, (0, 3), (3, 3));
        assert!(!commute(a, b, &g));
        assert!(!commute(b, a, &g));
    }

    #[test]
    fn test_disjoint_rows_commute() {
        let g = geo();
        let a = mv(&g, (0, 0), (0, 3));
        let b = mv(&g, (2, 4), (2, 1));
        assert!(commute(a, b, &g));
        assert!(commute(b, a, &g));
    }

    #[test]
    fn test_span_includes_cell_behind_origin() {
        let g = geo();
        // a rolls right from (1, 1), so it depends on (1, 0) being an obstacle.
        let a = mv(&g, (1, 1), (1, 4));
        let b = mv(&g, (1, 0), (4, 0));
        assert!(!commute(a, b, &g));
    }

    #[test]
    fn test_vertical_span_only_matches_column() {
        let g = geo();
        let a = mv(&g, (0, 2), (4, 2));
        // (2, 3) lies between the endpoints numerically but not in the column.
        let b = mv(&g, (2, 3), (2, 4));
        assert!(commute(a, b, &g));

        let crossing = mv(&g, (2, 2), (2, 0));
        assert!(!commute(a, crossing, &g));
    }

    #[test]
    fn test_commute_all() {
        let g = geo();
        let left = vec![mv(&g, (0, 0), (0, 2)), mv(&g, (1, 0), (1, 2))];
        let right = vec![mv(&g, (4, 4), (4, 1))];
        assert!(commute_all(&left, &right, &g));

        let clashing = vec![mv(&g, (1, 4), (1, 1))];
        assert!(!commute_all(&left, &clashing, &g));
    }
}
