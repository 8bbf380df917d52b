//! Spline model used as the local continuum around a clipped line.
//!
//! The model is a plain value (knots + coefficients) so fitting, clipping and
//! plotting code can share it without extra state.

pub mod spline;

pub use spline::*;
