//! Mathematical utilities: B-spline basis, least squares, sample statistics.

pub mod bspline;
pub mod ols;
pub mod stats;

pub use bspline::*;
pub use ols::*;
pub use stats::*;
