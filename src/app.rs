//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real entry point that:
//! - parses CLI arguments (with `.env` fallbacks)
//! - resolves the spectrum and the clip request
//! - runs the clip pipeline
//! - prints reports/plots and writes the requested files

use clap::Parser;

use crate::cli::{CheckArgs, ClipArgs, Command, PlotArgs, SynthArgs};
use crate::clip::ClipDiagnostics;
use crate::domain::{ClipConfig, ClipInterval};
use crate::error::AppError;
use crate::io::{DiagnosticsFile, default_output_path};

pub mod pipeline;

/// Entry point for the `emclip` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case.
    dotenvy::dotenv().ok();

    // `emclip -f sn.flm` behaves like `emclip pick -f sn.flm`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Clip(args) => handle_clip(args, RequestSource::Flags),
        Command::Pick(args) => handle_clip(args, RequestSource::Picker),
        Command::Synth(args) => handle_synth(args),
        Command::Check(args) => handle_check(args),
        Command::Plot(args) => handle_plot(args),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestSource {
    Flags,
    Picker,
}

fn handle_clip(args: ClipArgs, source: RequestSource) -> Result<(), AppError> {
    let config = args.clip_config();
    config.validate()?;

    let seed = args.seed.unwrap_or_else(rand::random);
    log::info!("noise seed {seed}");

    let loaded = pipeline::resolve_spectrum(args.file.as_deref())?;
    let mut request = pipeline::build_request(&args.lines, args.regions.as_deref())?;

    if source == RequestSource::Picker {
        let title = loaded.source.display().to_string();
        request = crate::tui::pick_regions(&loaded.spectrum, &title, &request)?
            .ok_or_else(|| AppError::new(2, "Canceled."))?;
    }
    if request.is_empty() {
        return Err(AppError::new(
            2,
            "No intervals to clip. Pass --lines lower,upper, --regions FILE, or use `emclip pick`.",
        ));
    }

    let run = pipeline::run_clip(loaded, request, config, seed)?;
    let input_path = run.loaded.source.clone();
    let steps = &run.outcome.steps;

    println!(
        "{}",
        crate::report::format_run_summary(
            Some(input_path.as_path()),
            &run.loaded.spectrum,
            run.loaded.row_errors.len(),
            &run.config,
            run.seed,
            &run.request,
        )
    );
    let rows: Vec<_> = steps.iter().map(crate::report::summarize_clip).collect();
    println!("{}", crate::report::format_clip_table(&rows));

    if args.plot {
        for diag in steps {
            print_clip_plots(diag, args.width, args.height);
        }
        println!(
            "{}",
            crate::plot::render_spectrum_plot(
                run.loaded.spectrum.wavelength(),
                run.loaded.spectrum.flux(),
                run.outcome.spectrum.flux(),
                args.width,
                args.height,
                None,
            )
        );
    }

    let output = args.output.clone();
    let output = output.unwrap_or_else(|| default_output_path(&input_path));
    crate::io::write_clipped_spectrum(&output, &run.outcome.spectrum, &run.loaded.spectrum)?;
    println!("Wrote {}", output.display());

    let input = Some(input_path.as_path());
    if let Some(path) = &args.diagnostics {
        let file = DiagnosticsFile::new(input, run.seed, &run.config, steps.clone());
        crate::io::write_diagnostics_json(path, &file)?;
        println!("Wrote {}", path.display());
    }
    if let Some(dir) = &args.debug_dir {
        let path = crate::debug::write_debug_bundle(dir, input, run.seed, &run.config, steps)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.save_regions {
        crate::io::write_region_file(path, &run.request)?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

fn handle_synth(args: SynthArgs) -> Result<(), AppError> {
    let config = args.shape.synth_config(args.seed);
    let synth = crate::data::generate_spectrum(&config)?;
    crate::io::write_synthetic_spectrum(&args.output, &synth)?;

    println!(
        "Wrote {} ({} samples, {} line(s), seed {})",
        args.output.display(),
        synth.spectrum.len(),
        config.lines.len(),
        config.seed
    );
    Ok(())
}

fn handle_check(args: CheckArgs) -> Result<(), AppError> {
    let interval = ClipInterval::new(args.lower, args.upper)?;
    let config = ClipConfig {
        margin: args.margin,
        knots: args.knots,
    };
    let synth = args.shape.synth_config(args.seed);

    let report = crate::clip::noise_recovery(&synth, &interval, &config, args.trials, args.seed)?;
    println!("{}", crate::report::format_recovery_report(&report));
    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_diagnostics_json(&args.diagnostics)?;
    if file.clips.is_empty() {
        let reason = format!("'{}' holds no clips.", args.diagnostics.display());
        return Err(AppError::new(3, reason));
    }

    let selected: Vec<_> = match args.clip {
        Some(n) if n >= 1 && n <= file.clips.len() => vec![&file.clips[n - 1]],
        Some(n) => {
            return Err(AppError::new(
                2,
                format!("--clip {n} is out of range (1-{}).", file.clips.len()),
            ));
        }
        None => file.clips.iter().collect(),
    };

    for diag in selected {
        print_clip_plots(diag, args.width, args.height);
    }
    Ok(())
}

/// Fit plot plus a half-height residual plot for one clip.
fn print_clip_plots(diag: &ClipDiagnostics, width: usize, height: usize) {
    let fit = crate::plot::render_clip_plot(diag, width, height);
    let residuals = crate::plot::render_residual_plot(diag, width, height / 2);
    println!("{fit}");
    println!("{residuals}");
}

/// Rewrite argv so `emclip -f FILE ...` defaults to `emclip pick -f FILE ...`.
///
/// Rules:
/// - `emclip`                         -> unchanged (clap prints help)
/// - `emclip -f X ...`                -> `emclip pick -f X ...`
/// - `emclip --help/--version/-h/-V`  -> unchanged
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1) else {
        return argv;
    };

    let is_help_or_version = matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_help_or_version {
        return argv;
    }

    // If the first token is a flag, treat it as "pick flags".
    if arg1.starts_with('-') {
        argv.insert(1, "pick".to_string());
    }
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_flags_default_to_pick() {
        assert_eq!(
            rewrite_args(argv(&["emclip", "-f", "sn.flm"])),
            argv(&["emclip", "pick", "-f", "sn.flm"])
        );
        assert_eq!(
            rewrite_args(argv(&["emclip", "--lines", "4490,4510"])),
            argv(&["emclip", "pick", "--lines", "4490,4510"])
        );
    }

    #[test]
    fn subcommands_help_and_empty_argv_are_untouched() {
        for args in [
            &["emclip"][..],
            &["emclip", "--help"],
            &["emclip", "-V"],
            &["emclip", "clip", "-f", "sn.flm"],
            &["emclip", "synth", "-o", "s.tsv"],
        ] {
            assert_eq!(rewrite_args(argv(args)), argv(args));
        }
    }

    #[test]
    fn rewritten_argv_parses() {
        let rewritten = rewrite_args(argv(&["emclip", "-f", "sn.flm", "--knots", "7"]));
        let cli = crate::cli::Cli::try_parse_from(rewritten).unwrap();
        let Command::Pick(args) = cli.command else {
            panic!("expected pick");
        };
        assert_eq!(args.knots, 7);
    }
}
