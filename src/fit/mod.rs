//! Background spline fitting.
//!
//! Responsibilities:
//!
//! - place interior knots across a fit window
//! - check that the fit data can determine the spline
//! - solve the least-squares problem and report residuals

pub mod fitter;
pub mod knots;

pub use fitter::*;
pub use knots::*;
