//! Background spline model.
//!
//! The fitter relies on two primitive operations:
//! - build a design row for a given wavelength (for least squares)
//! - predict flux at a wavelength given the fitted coefficients (for residuals,
//!   synthesis and plots)

use serde::{Deserialize, Serialize};

use crate::math::{basis_len, eval_nonzero_basis, fill_basis_row};

/// A fitted regression spline: full knot vector plus one coefficient per basis function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplineModel {
    pub degree: usize,
    pub knots: Vec<f64>,
    pub coeffs: Vec<f64>,
}

impl SplineModel {
    /// Returns `None` if the coefficient count does not match the knot vector.
    pub fn new(degree: usize, knots: Vec<f64>, coeffs: Vec<f64>) -> Option<Self> {
        if knots.len() < 2 * (degree + 1) || coeffs.len() != basis_len(&knots, degree) {
            return None;
        }
        Some(Self {
            degree,
            knots,
            coeffs,
        })
    }

    /// Knots strictly between the clamped end knots.
    pub fn interior_knots(&self) -> &[f64] {
        &self.knots[self.degree + 1..self.knots.len() - self.degree - 1]
    }

    /// Evaluate the spline at `x` (end pieces extrapolate outside the knot span).
    pub fn predict(&self, x: f64) -> f64 {
        let mut local = vec![0.0; self.degree + 1];
        let start = eval_nonzero_basis(&self.knots, self.degree, x, &mut local);
        local
            .iter()
            .zip(&self.coeffs[start..start + self.degree + 1])
            .map(|(b, c)| b * c)
            .sum()
    }

    pub fn predict_many(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.predict(x)).collect()
    }
}

/// Fill a design row of basis values for wavelength `x`.
///
/// # Panics
/// Panics if `out` does not have one slot per basis function.
pub fn fill_design_row(knots: &[f64], degree: usize, x: f64, out: &mut [f64]) {
    assert_eq!(
        out.len(),
        basis_len(knots, degree),
        "design row has the wrong length"
    );
    fill_basis_row(knots, degree, x, out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::clamped_knot_vector;

    #[test]
    fn constant_coefficients_give_constant_spline() {
        let knots = clamped_knot_vector(0.0, 10.0, &[3.0, 6.0], 3);
        let model = SplineModel::new(3, knots, vec![4.0; 6]).unwrap();
        for &x in &[0.0, 1.5, 3.0, 7.7, 10.0] {
            assert!((model.predict(x) - 4.0).abs() < 1e-12);
        }
        assert_eq!(model.interior_knots(), &[3.0, 6.0]);
    }

    #[test]
    fn mismatched_coefficients_are_rejected() {
        let knots = clamped_knot_vector(0.0, 10.0, &[5.0], 3);
        assert!(SplineModel::new(3, knots, vec![1.0; 4]).is_none());
    }

    #[test]
    fn linear_control_polygon_extrapolates_linearly() {
        // Coefficients at the Greville abscissae of a linear function reproduce it,
        // including outside the knot span.
        let knots = clamped_knot_vector(0.0, 3.0, &[], 3);
        let coeffs = vec![0.0, 1.0, 2.0, 3.0];
        let model = SplineModel::new(3, knots, coeffs).unwrap();
        for &x in &[-1.0, 0.0, 1.2, 3.0, 4.5] {
            assert!((model.predict(x) - x).abs() < 1e-12, "x={x}");
        }
    }
}
