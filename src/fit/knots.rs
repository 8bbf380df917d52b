//! Knot placement for background splines.

/// Interior knots for a fit window.
///
/// `count` positions are spaced evenly across `[window_lo, window_hi]` (both ends
/// included) and the two end positions are dropped, leaving `count - 2` interior
/// knots. Dropping the ends keeps knots off the data edges, where they would
/// coincide with the clamped boundary knots.
pub fn interior_knots(window_lo: f64, window_hi: f64, count: usize) -> Vec<f64> {
    if count < 3 {
        return Vec::new();
    }
    let step = (window_hi - window_lo) / (count as f64 - 1.0);
    (1..count - 1).map(|i| window_lo + i as f64 * step).collect()
}

/// `n` evenly spaced points across `[lo, hi]`, endpoints included.
pub fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![lo],
        _ => {
            let step = (hi - lo) / (n as f64 - 1.0);
            let mut out: Vec<f64> = (0..n).map(|i| lo + i as f64 * step).collect();
            out[n - 1] = hi;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_knots_drop_window_ends() {
        let t = interior_knots(4390.0, 4610.0, 5);
        assert_eq!(t, vec![4445.0, 4500.0, 4555.0]);
    }

    #[test]
    fn two_positions_leave_no_interior_knots() {
        assert!(interior_knots(0.0, 1.0, 2).is_empty());
        assert!(interior_knots(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn linspace_hits_both_ends() {
        let v = linspace(1.0, 2.0, 5);
        assert_eq!(v, vec![1.0, 1.25, 1.5, 1.75, 2.0]);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
    }
}
