//! Emission-line clipping.
//!
//! - [`clipper`]: replace one interval with spline continuum plus matched noise
//! - [`sequencer`]: apply an ordered request, one interval after another
//! - [`noise`]: residual statistics and the Gaussian draws
//! - [`calibrate`]: repeated synthetic trials checking the noise match

pub mod calibrate;
pub mod clipper;
pub mod noise;
pub mod sequencer;

pub use calibrate::{RecoveryReport, TrialResult, noise_recovery};
pub use clipper::{
    ClipDiagnostics, ClipOutcome, RegionClipper, WindowView, clip, fit_mask, window_view,
};
pub use noise::NoiseModel;
pub use sequencer::{SequenceOutcome, clip_many, clip_many_detailed, clip_many_with};
