//! Debug bundle writer: one markdown file per run with a section per clip.
//!
//! Each section carries the numbers behind a clip (window, knots, spline
//! coefficients, noise model, replaced samples) and ASCII renderings of the fit,
//! the residuals and the before/after flux in the window.

use std::fs::create_dir_all;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::clip::ClipDiagnostics;
use crate::domain::ClipConfig;
use crate::error::AppError;
use crate::plot::{render_clip_plot, render_residual_plot, render_spectrum_plot};

const PLOT_WIDTH: usize = 100;
const PLOT_HEIGHT: usize = 20;

pub fn write_debug_bundle(
    dir: &Path,
    source: Option<&Path>,
    seed: u64,
    config: &ClipConfig,
    steps: &[ClipDiagnostics],
) -> Result<PathBuf, AppError> {
    create_dir_all(dir).map_err(|e| AppError::file("create debug dir", dir, e))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("emclip_debug_seed{seed}_{ts}.md"));

    let text = render_debug_bundle(source, seed, config, steps);
    std::fs::write(&path, text).map_err(|e| AppError::file("write debug file", &path, e))?;

    log::info!("wrote debug bundle to {}", path.display());
    Ok(path)
}

pub fn render_debug_bundle(
    source: Option<&Path>,
    seed: u64,
    config: &ClipConfig,
    steps: &[ClipDiagnostics],
) -> String {
    let mut out = String::new();
    out.push_str("# emclip debug bundle\n");
    out.push_str(&format!("- generated: {}\n", Local::now().to_rfc3339()));
    if let Some(path) = source {
        out.push_str(&format!("- input: {}\n", path.display()));
    }
    out.push_str(&format!("- seed: {seed}\n"));
    out.push_str(&format!(
        "- margin: {} | knots: {} ({} interior)\n",
        config.margin,
        config.knots,
        config.interior_knot_count()
    ));
    out.push_str(&format!("- clips: {}\n", steps.len()));

    for (i, diag) in steps.iter().enumerate() {
        write_clip_section(&mut out, i + 1, diag);
    }
    out
}

fn write_clip_section(out: &mut String, n: usize, d: &ClipDiagnostics) {
    let (lower, upper) = (d.interval.lower(), d.interval.upper());
    let (w0, w1) = d.interval.window(d.margin);

    let line = d.interval.midpoint().trunc();
    out.push_str(&format!("\n## Clip {n}: ({lower}, {upper}) line {line}\n"));
    out.push_str(&format!(
        "- window: ({w0}, {w1}), {} samples from index {}\n",
        d.window_wavelength.len(),
        d.window_start
    ));
    out.push_str(&format!(
        "- fit samples: {} | replaced: {}\n",
        d.fit_count(),
        d.replaced_count()
    ));
    let knots = fmt_vec(&d.interior_knots);
    out.push_str(&format!("- interior knots: {knots}\n"));
    let coeffs = fmt_vec(&d.spline.coeffs);
    out.push_str(&format!("- spline coefficients: {coeffs}\n"));
    out.push_str(&format!(
        "- noise: mean={:.6e} std={:.6e} (n={})\n",
        d.noise.mean(),
        d.noise.std_dev(),
        d.noise.sample_size()
    ));
    if let Some((min, max)) = min_max(&d.residuals) {
        out.push_str(&format!("- residual range: [{min:.6e}, {max:.6e}]\n"));
    }

    out.push_str("\n### Fit\n```text\n");
    out.push_str(&render_clip_plot(d, PLOT_WIDTH, PLOT_HEIGHT));
    out.push_str("```\n");

    out.push_str("\n### Residuals\n```text\n");
    out.push_str(&render_residual_plot(d, PLOT_WIDTH, PLOT_HEIGHT / 2));
    out.push_str("```\n");

    let mut clipped = d.window_flux.clone();
    for (&idx, &after) in d.replaced_indices.iter().zip(&d.replaced_after) {
        let slot = idx
            .checked_sub(d.window_start)
            .and_then(|pos| clipped.get_mut(pos));
        if let Some(slot) = slot {
            *slot = after;
        }
    }
    out.push_str("\n### Input vs clipped\n```text\n");
    out.push_str(&render_spectrum_plot(
        &d.window_wavelength,
        &d.window_flux,
        &clipped,
        PLOT_WIDTH,
        PLOT_HEIGHT,
        None,
    ));
    out.push_str("```\n");

    out.push_str("\n### Replaced samples\n");
    out.push_str("| index | wave | before | after |\n");
    out.push_str("| - | - | - | - |\n");
    for (k, &idx) in d.replaced_indices.iter().enumerate() {
        let wave = idx
            .checked_sub(d.window_start)
            .and_then(|pos| d.window_wavelength.get(pos))
            .copied()
            .unwrap_or(f64::NAN);
        out.push_str(&format!(
            "| {idx} | {wave} | {} | {} |\n",
            fmt_opt(d.replaced_before.get(k).copied()),
            fmt_opt(d.replaced_after.get(k).copied())
        ));
    }
}

fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some((min, max))
}

fn fmt_vec(values: &[f64]) -> String {
    let parts: Vec<String> = values.iter().map(|v| format!("{v:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_opt(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.6e}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::clip::{RegionClipper, clip_many_detailed};
    use crate::data::{SynthConfig, generate_spectrum};
    use crate::domain::ClipRequest;

    #[test]
    fn bundle_has_a_section_per_clip() {
        let synth = generate_spectrum(&SynthConfig::default()).unwrap();
        let boundaries = [4300.0, 4310.0, 4690.5, 4700.5];
        let request = ClipRequest::from_boundaries(&boundaries).unwrap();
        let outcome = clip_many_detailed(
            &synth.spectrum,
            &request,
            &RegionClipper::default(),
            &mut StdRng::seed_from_u64(9),
        )
        .unwrap();

        let dir_name = format!("emclip_debug_{}", std::process::id());
        let dir = std::env::temp_dir().join(dir_name);
        let config = ClipConfig::default();
        let path = write_debug_bundle(&dir, None, 9, &config, &outcome.steps).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        let file_name = path.file_name().unwrap().to_string_lossy();
        assert!(file_name.starts_with("emclip_debug_seed9_"));
        assert!(text.starts_with("# emclip debug bundle\n"));
        assert!(text.contains("## Clip 1: (4300, 4310) line 4305\n"));
        assert!(text.contains("## Clip 2: (4690.5, 4700.5) line 4695\n"));
        let knots = "- interior knots: [4252.500000, 4305.000000, 4357.500000]\n";
        assert!(text.contains(knots));
        assert_eq!(text.matches("### Replaced samples").count(), 2);
        // 9 replaced samples in the first clip, 10 in the second.
        let rows = text.lines().filter(|l| l.starts_with("| ")).count();
        // Each table also has a header row and a separator row.
        assert_eq!(rows, 19 + 2 * 2);
    }
}
