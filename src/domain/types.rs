//! Shared domain types.
//!
//! These types are intentionally kept lightweight so they can be:
//!
//! - passed through the clipping core without copying the wavelength grid
//! - produced by any region source (CLI flags, region files, the TUI picker)
//! - exported alongside diagnostics

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ClipError;

/// Default half-width of the fit window around a clip interval (wavelength units).
pub const DEFAULT_MARGIN: f64 = 100.0;

/// Default number of evenly spaced knot positions across the fit window.
///
/// The first and last positions are dropped, so `DEFAULT_KNOTS - 2` interior
/// knots enter the spline.
pub const DEFAULT_KNOTS: usize = 5;

/// Degree of the background spline (cubic).
pub const SPLINE_DEGREE: usize = 3;

/// A 1-D spectrum: strictly increasing wavelengths and their flux values.
///
/// The wavelength grid is reference counted so every clipped copy derived from
/// a spectrum shares it.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    wavelength: Arc<[f64]>,
    flux: Vec<f64>,
}

impl Spectrum {
    pub fn new(wavelength: Vec<f64>, flux: Vec<f64>) -> Result<Self, ClipError> {
        if wavelength.len() != flux.len() {
            return Err(ClipError::InvalidSpectrum(format!(
                "{} wavelengths but {} flux values",
                wavelength.len(),
                flux.len()
            )));
        }
        if wavelength.is_empty() {
            return Err(ClipError::InvalidSpectrum("no samples".to_string()));
        }
        if let Some(i) = wavelength.iter().position(|w| !w.is_finite()) {
            return Err(ClipError::InvalidSpectrum(format!("non-finite wavelength at sample {i}")));
        }
        if let Some(i) = flux.iter().position(|f| !f.is_finite()) {
            return Err(ClipError::InvalidSpectrum(format!("non-finite flux at sample {i}")));
        }
        if let Some(i) = wavelength.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ClipError::InvalidSpectrum(format!(
                "wavelengths must be strictly increasing (sample {} = {} follows {})",
                i + 1,
                wavelength[i + 1],
                wavelength[i]
            )));
        }

        Ok(Self {
            wavelength: wavelength.into(),
            flux,
        })
    }

    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub fn len(&self) -> usize {
        self.flux.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flux.is_empty()
    }

    /// Wavelength span `(first, last)`.
    pub fn range(&self) -> (f64, f64) {
        (self.wavelength[0], self.wavelength[self.wavelength.len() - 1])
    }

    /// A new spectrum on the same grid with replaced flux values.
    pub fn with_flux(&self, flux: Vec<f64>) -> Result<Self, ClipError> {
        if flux.len() != self.wavelength.len() {
            return Err(ClipError::InvalidSpectrum(format!(
                "replacement flux has {} values for a grid of {}",
                flux.len(),
                self.wavelength.len()
            )));
        }
        Ok(Self {
            wavelength: Arc::clone(&self.wavelength),
            flux,
        })
    }

    /// True when both spectra share the same wavelength grid allocation.
    pub fn shares_grid_with(&self, other: &Spectrum) -> bool {
        Arc::ptr_eq(&self.wavelength, &other.wavelength)
    }

    pub fn into_flux(self) -> Vec<f64> {
        self.flux
    }
}

/// A wavelength range `(lower, upper)` to remove and backfill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipInterval {
    lower: f64,
    upper: f64,
}

impl ClipInterval {
    pub fn new(lower: f64, upper: f64) -> Result<Self, ClipError> {
        if !(lower.is_finite() && upper.is_finite() && lower < upper) {
            return Err(ClipError::InvalidInterval { lower, upper });
        }
        Ok(Self { lower, upper })
    }

    pub fn lower(&self) -> f64 {
        self.lower
    }

    pub fn upper(&self) -> f64 {
        self.upper
    }

    pub fn midpoint(&self) -> f64 {
        0.5 * (self.lower + self.upper)
    }

    /// Fit window `(lower - margin, upper + margin)`.
    pub fn window(&self, margin: f64) -> (f64, f64) {
        (self.lower - margin, self.upper + margin)
    }

    /// Open-interval membership: samples exactly on a bound are not replaced.
    pub fn contains(&self, wavelength: f64) -> bool {
        wavelength > self.lower && wavelength < self.upper
    }
}

/// Ordered list of intervals to clip, applied in list order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipRequest {
    intervals: Vec<ClipInterval>,
}

impl ClipRequest {
    pub fn new(intervals: Vec<ClipInterval>) -> Self {
        Self { intervals }
    }

    /// Build a request from a flat `lower, upper, lower, upper, ...` sequence.
    ///
    /// An odd-length sequence is rejected rather than truncated.
    pub fn from_boundaries(boundaries: &[f64]) -> Result<Self, ClipError> {
        if boundaries.len() % 2 != 0 {
            return Err(ClipError::UnpairedBoundary {
                count: boundaries.len(),
            });
        }
        let intervals = boundaries
            .chunks_exact(2)
            .map(|pair| ClipInterval::new(pair[0], pair[1]))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { intervals })
    }

    pub fn intervals(&self) -> &[ClipInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Flat boundary form, the inverse of [`ClipRequest::from_boundaries`].
    pub fn boundaries(&self) -> Vec<f64> {
        self.intervals
            .iter()
            .flat_map(|iv| [iv.lower, iv.upper])
            .collect()
    }

    /// Append another request's intervals after this one's.
    pub fn extend(&mut self, other: ClipRequest) {
        self.intervals.extend(other.intervals);
    }

    /// Index pairs `(i, j)`, `i < j`, whose fit windows overlap.
    ///
    /// For these pairs the result depends on list order.
    pub fn overlapping_windows(&self, margin: f64) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, a) in self.intervals.iter().enumerate() {
            let (a0, a1) = a.window(margin);
            for (j, b) in self.intervals.iter().enumerate().skip(i + 1) {
                let (b0, b1) = b.window(margin);
                if a0 < b1 && b0 < a1 {
                    out.push((i, j));
                }
            }
        }
        out
    }
}

/// Parameters shared by every clip of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClipConfig {
    /// Window half-width added on both sides of a clip interval.
    pub margin: f64,
    /// Evenly spaced knot positions across the window (ends dropped).
    pub knots: usize,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            knots: DEFAULT_KNOTS,
        }
    }
}

impl ClipConfig {
    pub fn validate(&self) -> Result<(), ClipError> {
        if !(self.margin.is_finite() && self.margin > 0.0) {
            return Err(ClipError::InvalidConfig(format!(
                "margin must be finite and > 0 (got {})",
                self.margin
            )));
        }
        if self.knots < 2 {
            return Err(ClipError::InvalidConfig(format!(
                "knots must be >= 2 (got {}); the two end positions are always dropped",
                self.knots
            )));
        }
        Ok(())
    }

    /// Interior knots actually used by the spline.
    pub fn interior_knot_count(&self) -> usize {
        self.knots.saturating_sub(2)
    }

    /// Number of spline coefficients, i.e. the minimum number of fit samples.
    pub fn coefficient_count(&self) -> usize {
        self.interior_knot_count().saturating_add(SPLINE_DEGREE + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectrum_rejects_unsorted_or_mismatched_input() {
        assert!(matches!(
            Spectrum::new(vec![1.0, 2.0], vec![1.0]),
            Err(ClipError::InvalidSpectrum(_))
        ));
        assert!(matches!(
            Spectrum::new(vec![1.0, 1.0, 2.0], vec![0.0; 3]),
            Err(ClipError::InvalidSpectrum(_))
        ));
        assert!(matches!(
            Spectrum::new(vec![1.0, f64::NAN], vec![0.0; 2]),
            Err(ClipError::InvalidSpectrum(_))
        ));
        assert!(Spectrum::new(vec![], vec![]).is_err());
    }

    #[test]
    fn with_flux_shares_grid() {
        let s = Spectrum::new(vec![1.0, 2.0, 3.0], vec![0.0; 3]).unwrap();
        let t = s.with_flux(vec![1.0; 3]).unwrap();
        assert!(s.shares_grid_with(&t));
        assert_eq!(t.flux(), &[1.0, 1.0, 1.0]);
        assert!(s.with_flux(vec![1.0; 2]).is_err());
    }

    #[test]
    fn interval_requires_lower_below_upper() {
        assert!(ClipInterval::new(1.0, 2.0).is_ok());
        assert!(matches!(
            ClipInterval::new(2.0, 2.0),
            Err(ClipError::InvalidInterval { .. })
        ));
        assert!(ClipInterval::new(f64::NAN, 2.0).is_err());
    }

    #[test]
    fn interval_membership_is_open() {
        let iv = ClipInterval::new(10.0, 20.0).unwrap();
        assert!(!iv.contains(10.0));
        assert!(iv.contains(10.5));
        assert!(!iv.contains(20.0));
    }

    #[test]
    fn request_pairs_boundaries_in_order() {
        let boundaries = [10.0, 20.0, 50.0, 60.0];
        let req = ClipRequest::from_boundaries(&boundaries).unwrap();
        assert_eq!(req.len(), 2);
        assert_eq!(req.intervals()[1].lower(), 50.0);
        assert_eq!(req.boundaries(), vec![10.0, 20.0, 50.0, 60.0]);
    }

    #[test]
    fn odd_boundary_count_is_rejected() {
        let boundaries = [10.0, 20.0, 30.0];
        let err = ClipRequest::from_boundaries(&boundaries).unwrap_err();
        assert_eq!(err, ClipError::UnpairedBoundary { count: 3 });
        assert!(err.is_invalid_interval());
    }

    #[test]
    fn reversed_pair_is_rejected() {
        let err = ClipRequest::from_boundaries(&[20.0, 10.0]).unwrap_err();
        assert!(err.is_invalid_interval());
    }

    #[test]
    fn overlapping_windows_are_reported() {
        let boundaries = [100.0, 110.0, 200.0, 210.0, 1000.0, 1010.0];
        let req = ClipRequest::from_boundaries(&boundaries).unwrap();
        assert_eq!(req.overlapping_windows(50.0), vec![(0, 1)]);
        assert!(req.overlapping_windows(10.0).is_empty());
    }

    #[test]
    fn config_validation() {
        assert!(ClipConfig::default().validate().is_ok());
        assert_eq!(ClipConfig::default().interior_knot_count(), 3);
        assert_eq!(ClipConfig::default().coefficient_count(), 7);
        let no_margin = ClipConfig {
            margin: 0.0,
            knots: 5,
        };
        let one_knot = ClipConfig {
            margin: 10.0,
            knots: 1,
        };
        assert!(no_margin.validate().is_err());
        assert!(one_knot.validate().is_err());
        let huge = ClipConfig {
            margin: 10.0,
            knots: usize::MAX,
        };
        assert_eq!(huge.coefficient_count(), usize::MAX);
    }
}
