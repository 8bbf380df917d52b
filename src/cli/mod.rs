//! Command-line parsing for the emission-line clipper.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the clipping code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::data::{EmissionLine, SynthConfig};
use crate::domain::{ClipConfig, DEFAULT_KNOTS, DEFAULT_MARGIN};

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "emclip",
    version,
    arg_required_else_help = true,
    about = "Replace emission lines in 1-D spectra with spline continuum plus matched noise"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clip the intervals given by --lines/--regions and write the result.
    Clip(ClipArgs),
    /// Mark intervals interactively in a terminal chart, then clip.
    ///
    /// Intervals given by --lines/--regions are pre-marked.
    Pick(ClipArgs),
    /// Write a synthetic spectrum (continuum + noise + optional lines).
    Synth(SynthArgs),
    /// Check that clipped regions reproduce the noise of a synthetic spectrum.
    Check(CheckArgs),
    /// Re-render a saved diagnostics JSON as ASCII plots.
    Plot(PlotArgs),
}

/// Options shared by `clip` and `pick`.
#[derive(Debug, Args, Clone)]
pub struct ClipArgs {
    /// Spectrum file (header with `#wave`/`wavelength` and `flux`). Prompts when omitted.
    #[arg(short = 'f', long = "file", value_name = "SPECTRUM")]
    pub file: Option<PathBuf>,

    /// Flat boundary list `lower,upper,lower,upper,...`.
    #[arg(short = 'l', long, value_delimiter = ',', num_args = 1.., value_name = "WAVE")]
    pub lines: Vec<f64>,

    /// Region file with boundaries (whitespace/comma separated, `#` comments).
    #[arg(short = 'r', long, value_name = "FILE")]
    pub regions: Option<PathBuf>,

    /// Output spectrum (default: `<input stem>_clipped.tsv` next to the input).
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Fit window half-width around each interval (wavelength units).
    #[arg(long, env = "EMCLIP_MARGIN", default_value_t = DEFAULT_MARGIN)]
    pub margin: f64,

    /// Evenly spaced knot positions across the window (ends dropped).
    #[arg(long, env = "EMCLIP_KNOTS", default_value_t = DEFAULT_KNOTS)]
    pub knots: usize,

    /// Random seed for the replacement noise (random when omitted; printed either way).
    #[arg(long, env = "EMCLIP_SEED")]
    pub seed: Option<u64>,

    /// Print ASCII plots of every clip and of the whole spectrum.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write per-clip diagnostics to JSON.
    #[arg(long, value_name = "JSON")]
    pub diagnostics: Option<PathBuf>,

    /// Write a markdown debug bundle into this directory.
    #[arg(long, value_name = "DIR")]
    pub debug_dir: Option<PathBuf>,

    /// Save the final intervals as a region file.
    #[arg(long, value_name = "FILE")]
    pub save_regions: Option<PathBuf>,
}

impl ClipArgs {
    pub fn clip_config(&self) -> ClipConfig {
        ClipConfig {
            margin: self.margin,
            knots: self.knots,
        }
    }
}

/// Synthetic spectrum shape, shared by `synth` and `check`.
#[derive(Debug, Args, Clone)]
pub struct SynthOptions {
    /// First wavelength.
    #[arg(long, default_value_t = 4000.0)]
    pub start: f64,

    /// Last wavelength (inclusive).
    #[arg(long, default_value_t = 5000.0)]
    pub end: f64,

    /// Wavelength step.
    #[arg(long, default_value_t = 1.0)]
    pub step: f64,

    /// Continuum level at the first wavelength.
    #[arg(long, default_value_t = 10.0)]
    pub level: f64,

    /// Continuum slope per wavelength unit.
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub slope: f64,

    /// Gaussian noise standard deviation.
    #[arg(long, default_value_t = 0.5)]
    pub sigma: f64,

    /// Emission line `center:amplitude:sigma` (repeatable).
    #[arg(long = "line", value_name = "C:A:S")]
    pub lines: Vec<EmissionLine>,
}

impl SynthOptions {
    pub fn synth_config(&self, seed: u64) -> SynthConfig {
        SynthConfig {
            start: self.start,
            end: self.end,
            step: self.step,
            level: self.level,
            slope: self.slope,
            sigma: self.sigma,
            lines: self.lines.clone(),
            seed,
        }
    }
}

#[derive(Debug, Args, Clone)]
pub struct SynthArgs {
    #[command(flatten)]
    pub shape: SynthOptions,

    /// Noise seed.
    #[arg(long, env = "EMCLIP_SEED", default_value_t = 0)]
    pub seed: u64,

    /// Output spectrum (TSV with `#wave`, `flux`, `continuum`).
    #[arg(short = 'o', long)]
    pub output: PathBuf,
}

#[derive(Debug, Args, Clone)]
pub struct CheckArgs {
    #[command(flatten)]
    pub shape: SynthOptions,

    /// Lower bound of the clipped interval.
    #[arg(long, default_value_t = 4480.0)]
    pub lower: f64,

    /// Upper bound of the clipped interval.
    #[arg(long, default_value_t = 4520.0)]
    pub upper: f64,

    /// Fit window half-width around the interval.
    #[arg(long, env = "EMCLIP_MARGIN", default_value_t = DEFAULT_MARGIN)]
    pub margin: f64,

    /// Evenly spaced knot positions across the window (ends dropped).
    #[arg(long, env = "EMCLIP_KNOTS", default_value_t = DEFAULT_KNOTS)]
    pub knots: usize,

    /// Number of independent trials.
    #[arg(long, default_value_t = 200)]
    pub trials: usize,

    /// Seed of the first trial; trial `t` uses `seed + t`.
    #[arg(long, env = "EMCLIP_SEED", default_value_t = 0)]
    pub seed: u64,
}

/// Options for plotting saved diagnostics.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Diagnostics JSON written by `emclip clip --diagnostics`.
    #[arg(long, value_name = "JSON")]
    pub diagnostics: PathBuf,

    /// Only this clip (1-based).
    #[arg(long)]
    pub clip: Option<usize>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}
