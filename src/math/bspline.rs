//! B-spline basis evaluation.
//!
//! Knot vectors follow the FITPACK convention used for least-squares splines
//! with user-supplied interior knots: `degree + 1` copies of the left data
//! bound, the interior knots, then `degree + 1` copies of the right data bound.
//! A spline with `m` interior knots therefore has `m + degree + 1` basis
//! functions (and coefficients).
//!
//! Evaluation uses the Cox-de Boor recursion in the triangular form of
//! Algorithm A2.2 ("The NURBS Book", Piegl & Tiller), which only computes the
//! `degree + 1` basis functions that are non-zero at a point.
//!
//! Numerical notes:
//! - Points left of the first span (or right of the last) are evaluated with the
//!   polynomial piece of that end span, i.e. the spline is extrapolated rather
//!   than clamped.

/// Denominators below this are treated as empty knot spans.
const SPAN_EPS: f64 = 1e-12;

/// Build a clamped knot vector around `interior` knots.
pub fn clamped_knot_vector(x_first: f64, x_last: f64, interior: &[f64], degree: usize) -> Vec<f64> {
    let mut knots = Vec::with_capacity(interior.len() + 2 * (degree + 1));
    knots.extend(std::iter::repeat_n(x_first, degree + 1));
    knots.extend_from_slice(interior);
    knots.extend(std::iter::repeat_n(x_last, degree + 1));
    knots
}

/// Number of basis functions for a knot vector of the given degree.
pub fn basis_len(knots: &[f64], degree: usize) -> usize {
    knots.len().saturating_sub(degree + 1)
}

/// Index `mu` of the knot span used to evaluate `x`, with `knots[mu] <= x < knots[mu + 1]`
/// inside the domain and clamped to the first/last span outside it.
///
/// # Panics
/// Panics if the knot vector has fewer than `2 * (degree + 1)` entries.
pub fn find_span(knots: &[f64], degree: usize, x: f64) -> usize {
    let n_basis = basis_len(knots, degree);
    assert!(
        n_basis > degree,
        "knot vector too short for degree {degree}"
    );

    let above = knots.partition_point(|&t| t <= x);
    above.saturating_sub(1).clamp(degree, n_basis - 1)
}

/// Evaluate the `degree + 1` non-zero basis functions at `x`.
///
/// Writes `N[span - degree ..= span]` into `out` and returns `span - degree`,
/// the global index of `out[0]`.
///
/// # Panics
/// Panics if `out.len() != degree + 1`.
pub fn eval_nonzero_basis(knots: &[f64], degree: usize, x: f64, out: &mut [f64]) -> usize {
    assert_eq!(
        out.len(),
        degree + 1,
        "output buffer must hold degree + 1 values"
    );

    let span = find_span(knots, degree, x);
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];

    out.fill(0.0);
    out[0] = 1.0;

    for d in 1..=degree {
        left[d] = x - knots[span + 1 - d];
        right[d] = knots[span + d] - x;

        let mut saved = 0.0;
        for r in 0..d {
            let den = right[r + 1] + left[d - r];
            let temp = if den.abs() > SPAN_EPS {
                out[r] / den
            } else {
                0.0
            };
            out[r] = saved + right[r + 1] * temp;
            saved = left[d - r] * temp;
        }
        out[d] = saved;
    }

    span - degree
}

/// Fill a full-length basis row (zeros outside the local support).
pub fn fill_basis_row(knots: &[f64], degree: usize, x: f64, row: &mut [f64]) {
    debug_assert_eq!(row.len(), basis_len(knots, degree));
    let mut local = vec![0.0; degree + 1];
    let start = eval_nonzero_basis(knots, degree, x, &mut local);
    row.fill(0.0);
    row[start..start + degree + 1].copy_from_slice(&local);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knot_vector_layout() {
        let t = clamped_knot_vector(0.0, 10.0, &[2.5, 5.0, 7.5], 3);
        assert_eq!(
            t,
            vec![0.0, 0.0, 0.0, 0.0, 2.5, 5.0, 7.5, 10.0, 10.0, 10.0, 10.0]
        );
        assert_eq!(basis_len(&t, 3), 7);
    }

    #[test]
    fn span_lookup_clamps_to_domain() {
        let t = clamped_knot_vector(0.0, 10.0, &[2.5, 5.0, 7.5], 3);
        assert_eq!(find_span(&t, 3, -1.0), 3);
        assert_eq!(find_span(&t, 3, 0.0), 3);
        assert_eq!(find_span(&t, 3, 2.5), 4);
        assert_eq!(find_span(&t, 3, 9.99), 6);
        assert_eq!(find_span(&t, 3, 10.0), 6);
        assert_eq!(find_span(&t, 3, 11.0), 6);
    }

    #[test]
    fn single_segment_matches_bernstein() {
        // No interior knots: the cubic B-splines are the Bernstein polynomials.
        let t = clamped_knot_vector(0.0, 1.0, &[], 3);
        let mut out = [0.0; 4];
        let start = eval_nonzero_basis(&t, 3, 0.5, &mut out);
        assert_eq!(start, 0);
        let expected = [0.125, 0.375, 0.375, 0.125];
        for (got, want) in out.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "got {out:?}");
        }
    }

    #[test]
    fn basis_is_partition_of_unity() {
        let t = clamped_knot_vector(4010.0, 4990.0, &[4250.0, 4500.0, 4750.0], 3);
        let mut row = vec![0.0; basis_len(&t, 3)];
        for &x in &[4010.0, 4100.0, 4250.0, 4499.0, 4750.0, 4900.0, 4990.0] {
            fill_basis_row(&t, 3, x, &mut row);
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-12, "sum at {x} = {sum}");
            assert!(row.iter().all(|v| *v >= -1e-12));
        }
    }
}
