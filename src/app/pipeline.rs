//! Shared clip pipeline used by the `clip` and `pick` front-ends.
//!
//! spectrum ingest -> clip request -> sequential clipping with one seeded generator
//!
//! The front-ends only differ in where the request comes from (flags/region
//! files vs. the interactive picker) and in what they print.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::clip::{RegionClipper, SequenceOutcome, clip_many_detailed};
use crate::domain::{ClipConfig, ClipRequest};
use crate::error::AppError;
use crate::io::{LoadedSpectrum, load_region_file, load_spectrum};

/// All computed outputs of a single clip run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub loaded: LoadedSpectrum,
    pub request: ClipRequest,
    pub config: ClipConfig,
    pub seed: u64,
    pub outcome: SequenceOutcome,
}

/// Load the spectrum, prompting for a file when none was given.
pub fn resolve_spectrum(file: Option<&Path>) -> Result<LoadedSpectrum, AppError> {
    let path = match file {
        Some(path) => crate::cli::picker::validate_spectrum_path(path)?,
        None => crate::cli::picker::prompt_for_spectrum_path()?,
    };
    load_spectrum(&path)
}

/// Combine `--lines` boundaries and an optional region file, flags first.
pub fn build_request(lines: &[f64], regions: Option<&Path>) -> Result<ClipRequest, AppError> {
    let mut request = ClipRequest::from_boundaries(lines)?;
    if let Some(path) = regions {
        request.extend(load_region_file(path)?);
    }
    Ok(request)
}

/// Clip `request` out of the loaded spectrum.
pub fn run_clip(
    loaded: LoadedSpectrum,
    request: ClipRequest,
    config: ClipConfig,
    seed: u64,
) -> Result<RunOutput, AppError> {
    let clipper = RegionClipper::new(config)?;
    let mut rng = StdRng::seed_from_u64(seed);

    log::info!(
        "clipping {} interval(s) from {} (seed {seed})",
        request.len(),
        loaded.source.display()
    );
    let outcome = clip_many_detailed(&loaded.spectrum, &request, &clipper, &mut rng)?;

    Ok(RunOutput {
        loaded,
        request,
        config,
        seed,
        outcome,
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::data::{EmissionLine, SynthConfig, generate_spectrum};

    fn loaded_synthetic() -> LoadedSpectrum {
        let synth = generate_spectrum(&SynthConfig {
            lines: vec![EmissionLine::new(4500.0, 5.0, 2.0).unwrap()],
            ..SynthConfig::default()
        })
        .unwrap();
        let rows = synth.spectrum.len();
        LoadedSpectrum {
            spectrum: synth.spectrum,
            source: PathBuf::from("synthetic.tsv"),
            delimiter: '\t',
            row_errors: Vec::new(),
            dropped_wavelengths: Vec::new(),
            rows_read: rows,
            rows_used: rows,
        }
    }

    #[test]
    fn request_keeps_flag_intervals_before_region_file() {
        let file_name = format!("emclip_pipeline_regions_{}.txt", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        std::fs::write(&path, "# lower upper\n6540 6590\n").unwrap();

        let request = build_request(&[4490.0, 4510.0], Some(path.as_path())).unwrap();
        assert_eq!(request.boundaries(), vec![4490.0, 4510.0, 6540.0, 6590.0]);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn odd_flag_boundaries_are_a_usage_error() {
        let err = build_request(&[4490.0], None).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn same_seed_reproduces_the_run() {
        let request = ClipRequest::from_boundaries(&[4490.0, 4510.0]).unwrap();
        let config = ClipConfig::default();
        let a = run_clip(loaded_synthetic(), request.clone(), config, 11).unwrap();
        let b = run_clip(loaded_synthetic(), request, config, 11).unwrap();

        assert_eq!(a.outcome.spectrum.flux(), b.outcome.spectrum.flux());
        assert_eq!(a.outcome.steps.len(), 1);
        assert_eq!(a.outcome.steps[0].replaced_count(), 19);
    }

    #[test]
    fn insufficient_data_is_a_data_error() {
        // Window (4989, 5000.5) leaves only 4990 and 5000 to fit.
        let request = ClipRequest::from_boundaries(&[4990.0, 4999.5]).unwrap();
        let config = ClipConfig {
            margin: 1.0,
            knots: 5,
        };
        let err = run_clip(loaded_synthetic(), request, config, 1).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
