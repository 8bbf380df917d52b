//! Applying a whole clip request.
//!
//! A request is a left fold over its intervals: each step clips the spectrum
//! produced by the previous step, so list order matters whenever two fit
//! windows overlap. The first failing interval aborts the run; no partially
//! clipped spectrum is returned.

use rand::Rng;

use crate::clip::clipper::{ClipDiagnostics, RegionClipper};
use crate::domain::{ClipInterval, ClipRequest, Spectrum};
use crate::error::ClipError;

/// Final spectrum plus one diagnostics bundle per interval, in request order.
#[derive(Debug, Clone)]
pub struct SequenceOutcome {
    pub spectrum: Spectrum,
    pub steps: Vec<ClipDiagnostics>,
}

/// Fold `clip_fn` over the request's intervals.
pub fn clip_many_with<F>(
    spectrum: &Spectrum,
    request: &ClipRequest,
    mut clip_fn: F,
) -> Result<Spectrum, ClipError>
where
    F: FnMut(&Spectrum, &ClipInterval) -> Result<Vec<f64>, ClipError>,
{
    request
        .intervals()
        .iter()
        .try_fold(spectrum.clone(), |state, interval| {
            let flux = clip_fn(&state, interval)?;
            state.with_flux(flux)
        })
}

/// Clip every interval of the request with `clipper`, in order.
pub fn clip_many<R: Rng + ?Sized>(
    spectrum: &Spectrum,
    request: &ClipRequest,
    clipper: &RegionClipper,
    rng: &mut R,
) -> Result<Spectrum, ClipError> {
    warn_overlapping_windows(request, clipper.config().margin);
    clip_many_with(spectrum, request, |state, interval| {
        clipper.clip(state, interval, rng)
    })
}

/// Like [`clip_many`], keeping each step's diagnostics.
pub fn clip_many_detailed<R: Rng + ?Sized>(
    spectrum: &Spectrum,
    request: &ClipRequest,
    clipper: &RegionClipper,
    rng: &mut R,
) -> Result<SequenceOutcome, ClipError> {
    warn_overlapping_windows(request, clipper.config().margin);

    let mut steps = Vec::with_capacity(request.len());
    let spectrum = clip_many_with(spectrum, request, |state, interval| {
        let outcome = clipper.clip_detailed(state, interval, rng)?;
        steps.push(outcome.diagnostics);
        Ok(outcome.flux)
    })?;

    Ok(SequenceOutcome {
        spectrum,
        steps,
    })
}

fn warn_overlapping_windows(request: &ClipRequest, margin: f64) {
    for (i, j) in request.overlapping_windows(margin) {
        let (a, b) = (&request.intervals()[i], &request.intervals()[j]);
        log::warn!(
            "fit windows of ({}, {}) and ({}, {}) overlap; results depend on request order",
            a.lower(),
            a.upper(),
            b.lower(),
            b.upper()
        );
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};

    use super::*;
    use crate::domain::ClipConfig;

    fn noisy_spectrum(seed: u64) -> Spectrum {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 0.4).unwrap();
        let wavelength: Vec<f64> = (0..=2000).map(|i| 4000.0 + i as f64).collect();
        let flux = wavelength
            .iter()
            .map(|&w| 20.0 - 0.003 * (w - 4000.0) + normal.sample(&mut rng))
            .collect();
        Spectrum::new(wavelength, flux).unwrap()
    }

    #[test]
    fn sequential_clips_touch_only_their_intervals() {
        let spectrum = noisy_spectrum(1);
        let boundaries = [4500.0, 4520.0, 5200.0, 5215.0];
        let request = ClipRequest::from_boundaries(&boundaries).unwrap();
        let clipper = RegionClipper::default();

        let mut rng = StdRng::seed_from_u64(5);
        let out = clip_many(&spectrum, &request, &clipper, &mut rng).unwrap();
        assert_eq!(out.len(), spectrum.len());
        assert!(out.shares_grid_with(&spectrum));

        for (i, &w) in spectrum.wavelength().iter().enumerate() {
            let inside = request.intervals().iter().any(|iv| iv.contains(w));
            if inside {
                assert_ne!(out.flux()[i], spectrum.flux()[i]);
            } else {
                assert_eq!(out.flux()[i], spectrum.flux()[i], "sample {w} changed");
            }
        }
    }

    #[test]
    fn each_step_sees_the_previous_result() {
        let spectrum = noisy_spectrum(2);
        let boundaries = [4500.0, 4520.0, 4560.0, 4580.0];
        let request = ClipRequest::from_boundaries(&boundaries).unwrap();
        let clipper = RegionClipper::default();

        let mut rng = StdRng::seed_from_u64(7);
        let outcome = clip_many_detailed(&spectrum, &request, &clipper, &mut rng).unwrap();

        // The second window contains the first interval, so its fit data must be
        // the already-clipped values.
        let first = &outcome.steps[0];
        let second = &outcome.steps[1];
        for (k, &idx) in first.replaced_indices.iter().enumerate() {
            let pos = idx - second.window_start;
            assert_eq!(second.window_flux[pos], first.replaced_after[k]);
        }
        assert_eq!(outcome.steps.len(), 2);
    }

    #[test]
    fn disjoint_windows_commute_and_match_single_clips() {
        let spectrum = noisy_spectrum(3);
        let a = ClipInterval::new(4300.0, 4320.0).unwrap();
        let b = ClipInterval::new(5500.0, 5530.0).unwrap();
        let clipper = RegionClipper::new(ClipConfig::default()).unwrap();

        // A deterministic stand-in for the noise source: each interval gets its own
        // seeded generator, independent of list order.
        let seeded = |state: &Spectrum, iv: &ClipInterval| {
            let mut rng = StdRng::seed_from_u64(iv.lower() as u64);
            clipper.clip(state, iv, &mut rng)
        };

        let forward = ClipRequest::new(vec![a, b]);
        let backward = ClipRequest::new(vec![b, a]);
        let ab = clip_many_with(&spectrum, &forward, seeded).unwrap();
        let ba = clip_many_with(&spectrum, &backward, seeded).unwrap();
        assert_eq!(ab.flux(), ba.flux());

        let only_a = seeded(&spectrum, &a).unwrap();
        for (i, &w) in spectrum.wavelength().iter().enumerate() {
            if a.contains(w) {
                assert_eq!(ab.flux()[i], only_a[i]);
            }
        }
    }

    #[test]
    fn failure_aborts_the_whole_request() {
        let spectrum = noisy_spectrum(4);
        let boundaries = [4500.0, 4520.0, 9000.0, 9010.0];
        let request = ClipRequest::from_boundaries(&boundaries).unwrap();
        let clipper = RegionClipper::default();
        let mut calls = 0;
        let result = clip_many_with(&spectrum, &request, |state, iv| {
            calls += 1;
            let mut rng = StdRng::seed_from_u64(0);
            clipper.clip(state, iv, &mut rng)
        });
        assert!(matches!(result, Err(ClipError::EmptyWindow { .. })));
        assert_eq!(calls, 2);
    }

    #[test]
    fn empty_request_returns_input() {
        let spectrum = noisy_spectrum(5);
        let request = ClipRequest::default();
        let clipper = RegionClipper::default();
        let mut rng = StdRng::seed_from_u64(0);
        let out = clip_many(&spectrum, &request, &clipper, &mut rng).unwrap();
        assert_eq!(out, spectrum);
    }
}
