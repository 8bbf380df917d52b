//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - spectra and their shared wavelength grid (`Spectrum`)
//! - clip intervals and ordered requests (`ClipInterval`, `ClipRequest`)
//! - per-run clip parameters (`ClipConfig`) and their defaults

pub mod types;

pub use types::*;
