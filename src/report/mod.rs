//! Reporting utilities: per-interval summaries and formatted terminal output.

pub mod format;

pub use format::*;

use crate::clip::ClipDiagnostics;
use crate::math::mean;

/// One row of the per-interval table.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalSummary {
    pub lower: f64,
    pub upper: f64,
    pub window: usize,
    pub fit: usize,
    pub replaced: usize,
    pub noise_mean: f64,
    pub noise_std: f64,
    /// Mean of `after - before` over the replaced samples (negative for a
    /// removed emission line).
    pub mean_change: Option<f64>,
}

pub fn summarize_clip(diag: &ClipDiagnostics) -> IntervalSummary {
    let changes: Vec<f64> = diag
        .replaced_after
        .iter()
        .zip(&diag.replaced_before)
        .map(|(after, before)| after - before)
        .collect();

    IntervalSummary {
        lower: diag.interval.lower(),
        upper: diag.interval.upper(),
        window: diag.window_wavelength.len(),
        fit: diag.fit_count(),
        replaced: diag.replaced_count(),
        noise_mean: diag.noise.mean(),
        noise_std: diag.noise.std_dev(),
        mean_change: mean(&changes),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::clip::RegionClipper;
    use crate::data::{EmissionLine, SynthConfig, generate_spectrum};
    use crate::domain::ClipInterval;

    #[test]
    fn removed_line_shows_negative_change() {
        let synth = generate_spectrum(&SynthConfig {
            sigma: 0.1,
            lines: vec![EmissionLine::new(4500.0, 10.0, 4.0).unwrap()],
            ..SynthConfig::default()
        })
        .unwrap();
        let iv = ClipInterval::new(4480.0, 4520.0).unwrap();
        let outcome = RegionClipper::default()
            .clip_detailed(&synth.spectrum, &iv, &mut StdRng::seed_from_u64(4))
            .unwrap();

        let row = summarize_clip(&outcome.diagnostics);
        assert_eq!(row.replaced, 39);
        assert_eq!(row.window, 239);
        assert_eq!(row.fit, 200);
        // Line area 10 * 4 * sqrt(2 pi) ~ 100 spread over 39 samples.
        let change = row.mean_change.unwrap();
        assert!(change < -2.0 && change > -3.2, "mean change {change}");
    }
}
