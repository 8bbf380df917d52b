//! Single-interval clipping.
//!
//! For one interval `(lower, upper)`:
//!
//! 1. window: samples with wavelength in `(lower - margin, upper + margin)`
//! 2. mask: samples strictly inside `(lower, upper)` are replaced, the rest are fit data
//! 3. fit: cubic regression spline with `knots - 2` interior knots on the fit data
//! 4. noise: mean / population std of the fit residuals
//! 5. synthesis: spline + one Gaussian draw per replaced sample
//! 6. reassembly: replaced values written back; everything else untouched
//!
//! Nothing here renders or prints; callers get a [`ClipDiagnostics`] bundle if
//! they want to look at the intermediate steps.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::clip::noise::NoiseModel;
use crate::domain::{ClipConfig, ClipInterval, SPLINE_DEGREE, Spectrum};
use crate::error::ClipError;
use crate::fit::{FitFailure, fit_regression_spline, interior_knots, linspace};
use crate::models::SplineModel;

/// Points on the diagnostic spline curve spanning the fit window.
const DIAGNOSTIC_CURVE_POINTS: usize = 50;

/// Read-only slice of a spectrum around one clip interval.
#[derive(Debug, Clone, Copy)]
pub struct WindowView<'a> {
    /// Index of the first window sample in the full spectrum.
    pub start: usize,
    pub wavelength: &'a [f64],
    pub flux: &'a [f64],
}

impl WindowView<'_> {
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }
}

/// Samples with wavelength in the open range `(lower - margin, upper + margin)`.
pub fn window_view<'a>(
    wavelength: &'a [f64],
    flux: &'a [f64],
    interval: &ClipInterval,
    margin: f64,
) -> WindowView<'a> {
    let (lo, hi) = interval.window(margin);
    let start = wavelength.partition_point(|&w| w <= lo);
    let end = wavelength.partition_point(|&w| w < hi).max(start);
    WindowView {
        start,
        wavelength: &wavelength[start..end],
        flux: &flux[start..end],
    }
}

/// `true` for fit data, `false` for samples to replace.
pub fn fit_mask(window_wavelength: &[f64], interval: &ClipInterval) -> Vec<bool> {
    window_wavelength
        .iter()
        .map(|&w| !interval.contains(w))
        .collect()
}

/// Everything computed while clipping one interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDiagnostics {
    pub interval: ClipInterval,
    pub margin: f64,
    pub knots: usize,
    pub window_start: usize,
    pub window_wavelength: Vec<f64>,
    pub window_flux: Vec<f64>,
    pub fit_mask: Vec<bool>,
    pub interior_knots: Vec<f64>,
    pub spline: SplineModel,
    /// Spline evaluated on evenly spaced points across the fit window.
    pub curve_wavelength: Vec<f64>,
    pub curve_flux: Vec<f64>,
    pub fit_wavelength: Vec<f64>,
    pub residuals: Vec<f64>,
    pub noise: NoiseModel,
    /// Indices into the full spectrum of the replaced samples.
    pub replaced_indices: Vec<usize>,
    pub replaced_before: Vec<f64>,
    pub replaced_after: Vec<f64>,
}

impl ClipDiagnostics {
    pub fn fit_count(&self) -> usize {
        self.fit_wavelength.len()
    }

    pub fn replaced_count(&self) -> usize {
        self.replaced_indices.len()
    }
}

/// New flux for the whole spectrum plus the diagnostics of one clip.
#[derive(Debug, Clone)]
pub struct ClipOutcome {
    pub flux: Vec<f64>,
    pub diagnostics: ClipDiagnostics,
}

/// Replaces one wavelength interval with spline continuum plus matched noise.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionClipper {
    config: ClipConfig,
}

impl RegionClipper {
    pub fn new(config: ClipConfig) -> Result<Self, ClipError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ClipConfig {
        &self.config
    }

    /// Clip one interval, returning the full-length replacement flux.
    pub fn clip<R: Rng + ?Sized>(
        &self,
        spectrum: &Spectrum,
        interval: &ClipInterval,
        rng: &mut R,
    ) -> Result<Vec<f64>, ClipError> {
        self.clip_detailed(spectrum, interval, rng)
            .map(|outcome| outcome.flux)
    }

    /// Clip one interval and keep the intermediate artifacts.
    pub fn clip_detailed<R: Rng + ?Sized>(
        &self,
        spectrum: &Spectrum,
        interval: &ClipInterval,
        rng: &mut R,
    ) -> Result<ClipOutcome, ClipError> {
        let ClipConfig { margin, knots } = self.config;
        let (lower, upper) = (interval.lower(), interval.upper());

        let window = window_view(
            spectrum.wavelength(),
            spectrum.flux(),
            interval,
            margin,
        );
        if window.is_empty() {
            return Err(ClipError::EmptyWindow {
                lower,
                upper,
                margin,
            });
        }

        let mask = fit_mask(window.wavelength, interval);
        let (fit_x, fit_y): (Vec<f64>, Vec<f64>) = window
            .wavelength
            .iter()
            .zip(window.flux)
            .zip(&mask)
            .filter(|(_, keep)| **keep)
            .map(|((&w, &f), _)| (w, f))
            .unzip();

        let required = self.config.coefficient_count();
        if fit_x.len() < required {
            return Err(insufficient_data(
                interval,
                FitFailure::new(fit_x.len(), required, "too few fit samples for the spline"),
            ));
        }

        let (window_lo, window_hi) = interval.window(margin);
        let interior = interior_knots(window_lo, window_hi, knots);
        let fit = fit_regression_spline(&fit_x, &fit_y, &interior, SPLINE_DEGREE)
            .map_err(|failure| insufficient_data(interval, failure))?;

        let Some(noise) = NoiseModel::from_residuals(&fit.residuals) else {
            let failure = FitFailure::new(fit_x.len(), required, "residuals are not finite");
            return Err(insufficient_data(interval, failure));
        };

        let replaced_indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter(|(_, keep)| !**keep)
            .map(|(i, _)| window.start + i)
            .collect();

        let draws = noise.draw(rng, replaced_indices.len());
        let mut flux = spectrum.flux().to_vec();
        let mut replaced_before = Vec::with_capacity(replaced_indices.len());
        let mut replaced_after = Vec::with_capacity(replaced_indices.len());
        for (&idx, draw) in replaced_indices.iter().zip(draws) {
            let value = fit.model.predict(spectrum.wavelength()[idx]) + draw;
            replaced_before.push(flux[idx]);
            replaced_after.push(value);
            flux[idx] = value;
        }

        if replaced_indices.is_empty() {
            log::debug!("clip ({lower}, {upper}): no samples inside the interval, flux unchanged");
        }
        log::debug!(
            "clip ({lower}, {upper}): window={} fit={} replaced={} noise mean={:.4e} std={:.4e}",
            window.len(),
            fit_x.len(),
            replaced_indices.len(),
            noise.mean(),
            noise.std_dev()
        );

        let curve_wavelength = linspace(window_lo, window_hi, DIAGNOSTIC_CURVE_POINTS);
        let curve_flux = fit.model.predict_many(&curve_wavelength);

        let diagnostics = ClipDiagnostics {
            interval: *interval,
            margin,
            knots,
            window_start: window.start,
            window_wavelength: window.wavelength.to_vec(),
            window_flux: window.flux.to_vec(),
            fit_mask: mask,
            interior_knots: interior,
            spline: fit.model,
            curve_wavelength,
            curve_flux,
            fit_wavelength: fit_x,
            residuals: fit.residuals,
            noise,
            replaced_indices,
            replaced_before,
            replaced_after,
        };

        Ok(ClipOutcome {
            flux,
            diagnostics,
        })
    }
}

fn insufficient_data(interval: &ClipInterval, failure: FitFailure) -> ClipError {
    ClipError::InsufficientData {
        lower: interval.lower(),
        upper: interval.upper(),
        available: failure.available,
        required: failure.required,
        reason: failure.reason,
    }
}

/// Clip one interval of `spectrum` with the given configuration.
pub fn clip<R: Rng + ?Sized>(
    spectrum: &Spectrum,
    interval: &ClipInterval,
    config: &ClipConfig,
    rng: &mut R,
) -> Result<Vec<f64>, ClipError> {
    RegionClipper::new(*config)?.clip(spectrum, interval, rng)
}
