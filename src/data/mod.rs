//! Synthetic spectra for demos and checks.

pub mod sample;

pub use sample::*;
