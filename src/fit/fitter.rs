//! Least-squares regression spline fitting.
//!
//! Given:
//! - wavelengths `x_i` (strictly increasing)
//! - flux values `y_i`
//! - interior knots
//!
//! we build the clamped knot vector on `[x_first, x_last]`, solve an ordinary
//! least squares problem for the B-spline coefficients and return the model
//! together with its fitted values and residuals.
//!
//! This is a regression spline, not an interpolant: with far more samples than
//! coefficients the residuals carry the local noise, which the clipper relies on.

use nalgebra::{DMatrix, DVector};

use crate::math::{basis_len, clamped_knot_vector, solve_least_squares};
use crate::models::{SplineModel, fill_design_row};

/// Why a spline could not be determined from the given data.
#[derive(Debug, Clone, PartialEq)]
pub struct FitFailure {
    pub available: usize,
    pub required: usize,
    pub reason: String,
}

impl FitFailure {
    pub fn new(available: usize, required: usize, reason: impl Into<String>) -> Self {
        Self {
            available,
            required,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FitFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} samples, {} required)",
            self.reason, self.available, self.required
        )
    }
}

/// A fitted spline plus its in-sample evaluation.
#[derive(Debug, Clone)]
pub struct SplineFit {
    pub model: SplineModel,
    pub fitted: Vec<f64>,
    pub residuals: Vec<f64>,
    pub sse: f64,
    pub rmse: f64,
}

/// Fit a least-squares spline of `degree` with the given interior knots.
pub fn fit_regression_spline(
    x: &[f64],
    y: &[f64],
    interior: &[f64],
    degree: usize,
) -> Result<SplineFit, FitFailure> {
    let m = x.len();
    let required = interior.len() + degree + 1;

    if y.len() != m {
        return Err(FitFailure::new(
            m,
            required,
            "wavelength and flux lengths differ",
        ));
    }
    if m < required {
        return Err(FitFailure::new(
            m,
            required,
            "too few fit samples for the spline",
        ));
    }
    debug_assert!(
        x.windows(2).all(|w| w[0] < w[1]),
        "x must be strictly increasing"
    );

    let x_first = x[0];
    let x_last = x[m - 1];

    if interior.windows(2).any(|w| w[1] <= w[0]) {
        return Err(FitFailure::new(
            m,
            required,
            "interior knots are not strictly increasing",
        ));
    }
    if interior.iter().any(|&t| t <= x_first || t >= x_last) {
        return Err(FitFailure::new(
            m,
            required,
            format!("fit data [{x_first}, {x_last}] does not span every interior knot"),
        ));
    }

    let knots = clamped_knot_vector(x_first, x_last, interior, degree);
    if !schoenberg_whitney(x, &knots, degree) {
        return Err(FitFailure::new(
            m,
            required,
            "fit samples are too sparse between knots to determine the spline",
        ));
    }

    let p = basis_len(&knots, degree);
    let mut design = DMatrix::<f64>::zeros(m, p);
    let mut row = vec![0.0; p];
    for (i, &xi) in x.iter().enumerate() {
        fill_design_row(&knots, degree, xi, &mut row);
        for (j, &b) in row.iter().enumerate() {
            design[(i, j)] = b;
        }
    }
    let rhs = DVector::from_column_slice(y);

    let coeffs = solve_least_squares(&design, &rhs)
        .ok_or_else(|| FitFailure::new(m, required, "least-squares system is singular"))?;

    let model = SplineModel::new(degree, knots, coeffs.iter().copied().collect())
        .ok_or_else(|| FitFailure::new(m, required, "coefficient count does not match knots"))?;

    let fitted = model.predict_many(x);
    let residuals: Vec<f64> = y.iter().zip(&fitted).map(|(obs, fit)| obs - fit).collect();
    let sse: f64 = residuals.iter().map(|r| r * r).sum();
    let rmse = (sse / m as f64).sqrt();

    Ok(SplineFit {
        model,
        fitted,
        residuals,
        sse,
        rmse,
    })
}

/// Schoenberg-Whitney condition for a clamped knot vector.
///
/// There must be a subsequence of data points `x_j` with
/// `t_j < x_j < t_{j + degree + 1}` for every basis function `j`; otherwise the
/// least-squares matrix is rank deficient. Scans greedily left to right, taking
/// the first usable point for each basis function (FITPACK `fpchec`).
fn schoenberg_whitney(x: &[f64], knots: &[f64], degree: usize) -> bool {
    let m = x.len();
    let n_basis = basis_len(knots, degree);
    if m < n_basis || n_basis <= degree {
        return false;
    }

    if x[0] >= knots[degree + 1] || x[m - 1] <= knots[n_basis - 1] {
        return false;
    }

    let mut i = 0usize;
    let mut l = degree + 1;
    for j in 1..n_basis.saturating_sub(1) {
        let tj = knots[j];
        l += 1;
        let tl = knots[l];
        loop {
            i += 1;
            if i >= m - 1 {
                return false;
            }
            if x[i] > tj {
                break;
            }
        }
        if x[i] >= tl {
            return false;
        }
    }

    true
}
