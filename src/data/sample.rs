//! Synthetic spectrum generation.
//!
//! A synthetic spectrum is a linear continuum, optional Gaussian emission lines
//! and white Gaussian noise on an evenly spaced wavelength grid. The noiseless
//! continuum (without lines) is kept alongside, which is what a perfect clip of
//! a line should give back.

use std::str::FromStr;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::domain::Spectrum;
use crate::error::ClipError;

/// Gaussian emission line `amplitude * exp(-0.5 * ((w - center) / sigma)^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionLine {
    pub center: f64,
    pub amplitude: f64,
    pub sigma: f64,
}

impl EmissionLine {
    pub fn new(center: f64, amplitude: f64, sigma: f64) -> Result<Self, ClipError> {
        if !(center.is_finite() && amplitude.is_finite() && sigma.is_finite() && sigma > 0.0) {
            return Err(ClipError::InvalidConfig(format!(
                "emission line needs finite values and sigma > 0 (got {center}:{amplitude}:{sigma})"
            )));
        }
        Ok(Self {
            center,
            amplitude,
            sigma,
        })
    }

    pub fn profile(&self, wavelength: f64) -> f64 {
        let z = (wavelength - self.center) / self.sigma;
        self.amplitude * (-0.5 * z * z).exp()
    }
}

/// Parses `center:amplitude:sigma`, e.g. `4861.3:12:2.5`.
impl FromStr for EmissionLine {
    type Err = ClipError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').map(str::trim).collect();
        let [center, amplitude, sigma] = parts.as_slice() else {
            return Err(ClipError::InvalidConfig(format!(
                "emission line '{s}' must look like center:amplitude:sigma"
            )));
        };
        let parse = |field: &str, name: &str| {
            let reason = || format!("emission line '{s}': invalid {name} '{field}'");
            field
                .parse::<f64>()
                .map_err(|_| ClipError::InvalidConfig(reason()))
        };
        Self::new(
            parse(*center, "center")?,
            parse(*amplitude, "amplitude")?,
            parse(*sigma, "sigma")?,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthConfig {
    pub start: f64,
    pub end: f64,
    pub step: f64,
    /// Continuum level at `start`.
    pub level: f64,
    /// Continuum change per wavelength unit.
    pub slope: f64,
    /// Standard deviation of the additive white noise.
    pub sigma: f64,
    pub lines: Vec<EmissionLine>,
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            start: 4000.0,
            end: 5000.0,
            step: 1.0,
            level: 10.0,
            slope: 0.0,
            sigma: 0.5,
            lines: Vec::new(),
            seed: 0,
        }
    }
}

/// Upper bound on the number of synthetic samples.
pub const MAX_SYNTH_SAMPLES: usize = 10_000_000;

impl SynthConfig {
    pub fn validate(&self) -> Result<(), ClipError> {
        if !(self.start.is_finite() && self.end.is_finite() && self.end > self.start) {
            return Err(ClipError::InvalidConfig(format!(
                "synthetic range must be finite with end > start (got {} .. {})",
                self.start, self.end
            )));
        }
        if !(self.step.is_finite() && self.step > 0.0) {
            let reason = format!("step must be > 0 (got {})", self.step);
            return Err(ClipError::InvalidConfig(reason));
        }
        let samples = self.sample_count_estimate();
        if !(samples.is_finite() && samples <= MAX_SYNTH_SAMPLES as f64) {
            return Err(ClipError::InvalidConfig(format!(
                "step {} over {} .. {} gives more than {MAX_SYNTH_SAMPLES} samples",
                self.step, self.start, self.end
            )));
        }
        if !(self.sigma.is_finite() && self.sigma >= 0.0) {
            let reason = format!("noise sigma must be >= 0 (got {})", self.sigma);
            return Err(ClipError::InvalidConfig(reason));
        }
        if !(self.level.is_finite() && self.slope.is_finite()) {
            let reason = "continuum level and slope must be finite";
            return Err(ClipError::InvalidConfig(reason.to_string()));
        }
        Ok(())
    }

    /// Evenly spaced grid `start, start + step, ...` up to and including `end`
    /// (within rounding).
    ///
    /// Call [`SynthConfig::validate`] first; the sample count is only bounded there.
    pub fn wavelength_grid(&self) -> Vec<f64> {
        let n = self.sample_count_estimate() as usize;
        (0..n).map(|i| self.start + i as f64 * self.step).collect()
    }

    fn sample_count_estimate(&self) -> f64 {
        ((self.end - self.start) / self.step + 1e-9).floor() + 1.0
    }

    pub fn continuum_at(&self, wavelength: f64) -> f64 {
        self.level + self.slope * (wavelength - self.start)
    }
}

#[derive(Debug, Clone)]
pub struct SyntheticSpectrum {
    /// Continuum + lines + noise.
    pub spectrum: Spectrum,
    /// Noiseless continuum without lines, on the same grid.
    pub continuum: Vec<f64>,
}

/// Generate a spectrum seeded from `config.seed`.
pub fn generate_spectrum(config: &SynthConfig) -> Result<SyntheticSpectrum, ClipError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    generate_spectrum_with(config, &mut rng)
}

/// Generate a spectrum drawing noise from `rng` (one draw per sample, in order).
pub fn generate_spectrum_with<R: Rng + ?Sized>(
    config: &SynthConfig,
    rng: &mut R,
) -> Result<SyntheticSpectrum, ClipError> {
    config.validate()?;
    let normal = Normal::new(0.0, config.sigma)
        .map_err(|e| ClipError::InvalidConfig(format!("noise distribution error: {e}")))?;

    let wavelength = config.wavelength_grid();
    let continuum: Vec<f64> = wavelength.iter().map(|&w| config.continuum_at(w)).collect();
    let flux: Vec<f64> = wavelength
        .iter()
        .zip(&continuum)
        .map(|(&w, &c)| {
            let lines: f64 = config.lines.iter().map(|line| line.profile(w)).sum();
            c + lines + normal.sample(rng)
        })
        .collect();

    let spectrum = Spectrum::new(wavelength, flux)?;
    log::debug!(
        "synthetic spectrum: {} samples, {} lines, sigma={}",
        spectrum.len(),
        config.lines.len(),
        config.sigma
    );

    Ok(SyntheticSpectrum {
        spectrum,
        continuum,
    })
}
