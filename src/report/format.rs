//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the clipping code stays free of presentation
//! - output changes are localized (golden tests below)

use std::path::Path;

use crate::clip::RecoveryReport;
use crate::domain::{ClipConfig, ClipRequest, Spectrum};
use crate::report::IntervalSummary;

/// Format the run header (input, parameters, seed, request).
pub fn format_run_summary(
    source: Option<&Path>,
    spectrum: &Spectrum,
    rows_skipped: usize,
    config: &ClipConfig,
    seed: u64,
    request: &ClipRequest,
) -> String {
    let mut out = String::new();
    let (w0, w1) = spectrum.range();

    out.push_str("=== emclip - emission line clipping ===\n");
    if let Some(path) = source {
        out.push_str(&format!("Input: {}\n", path.display()));
    }
    out.push_str(&format!(
        "Spectrum: n={} | wave=[{w0:.2}, {w1:.2}] | skipped rows={rows_skipped}\n",
        spectrum.len()
    ));
    out.push_str(&format!(
        "Window margin={} | knots={} ({} interior) | seed={seed}\n",
        config.margin,
        config.knots,
        config.interior_knot_count()
    ));
    out.push_str(&format!("Intervals: {}\n", fmt_vec(&request.boundaries())));

    out
}

/// Column names and widths of the per-interval table.
const TABLE_COLUMNS: [(&str, usize); 9] = [
    ("#", 3),
    ("lower", 12),
    ("upper", 12),
    ("window", 7),
    ("fit", 5),
    ("replaced", 8),
    ("noise_mean", 11),
    ("noise_std", 11),
    ("mean_change", 11),
];

/// Format the per-interval table.
pub fn format_clip_table(rows: &[IntervalSummary]) -> String {
    let header: Vec<String> = TABLE_COLUMNS
        .iter()
        .map(|&(name, width)| format!("{name:>width$}"))
        .collect();
    let rule: Vec<String> = TABLE_COLUMNS
        .iter()
        .map(|&(_, width)| "-".repeat(width))
        .collect();

    let mut out = String::new();
    out.push_str(header.join(" ").trim_end());
    out.push('\n');
    out.push_str(rule.join(" ").trim_end());
    out.push('\n');

    for (i, r) in rows.iter().enumerate() {
        let change = r
            .mean_change
            .map(|c| format!("{c:.3e}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{:>3} {:>12.3} {:>12.3} {:>7} {:>5} {:>8} {:>11.3e} {:>11.3e} {:>11}",
                i + 1,
                r.lower,
                r.upper,
                r.window,
                r.fit,
                r.replaced,
                r.noise_mean,
                r.noise_std,
                change
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format a noise-recovery report.
pub fn format_recovery_report(report: &RecoveryReport) -> String {
    let mut out = String::new();
    out.push_str("=== emclip - noise recovery check ===\n");
    out.push_str(&format!(
        "Interval: ({}, {}) | margin={} | knots={}\n",
        report.interval.lower(),
        report.interval.upper(),
        report.config.margin,
        report.config.knots
    ));
    out.push_str(&format!("Trials: {}\n", report.trials.len()));
    out.push_str(&format!("True sigma     : {:.4}\n", report.true_sigma));
    out.push_str(&format!("Recovered sigma: {:.4}", report.pooled_sigma));
    if let Some(ratio) = report.sigma_ratio() {
        out.push_str(&format!(" (ratio {ratio:.3})"));
    }
    out.push('\n');
    out.push_str(&format!("Mean bias      : {:+.4}\n", report.mean_bias));

    let residual_sigmas: Vec<f64> = report.trials.iter().map(|t| t.residual_sigma).collect();
    if let Some(m) = crate::math::mean(&residual_sigmas) {
        out.push_str(&format!("Residual sigma : {m:.4} (mean over trials)\n"));
    }

    out
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x}")).collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_table_golden() {
        let rows = vec![IntervalSummary {
            lower: 4490.0,
            upper: 4510.0,
            window: 219,
            fit: 200,
            replaced: 19,
            noise_mean: 0.0,
            noise_std: 0.5,
            mean_change: None,
        }];
        let expected = concat!(
            "  #        lower        upper  window   fit replaced  noise_mean   noise_std mean_change\n",
            "--- ------------ ------------ ------- ----- -------- ----------- ----------- -----------\n",
            "  1     4490.000     4510.000     219   200       19     0.000e0    5.000e-1           -\n",
        );
        assert_eq!(format_clip_table(&rows), expected);
    }

    #[test]
    fn run_summary_lists_parameters() {
        let wavelength = vec![4000.0, 4001.0, 4002.0];
        let spectrum = Spectrum::new(wavelength, vec![1.0; 3]).unwrap();
        let request = ClipRequest::from_boundaries(&[4000.5, 4001.5]).unwrap();
        let txt = format_run_summary(
            Some(Path::new("sn.flm")),
            &spectrum,
            2,
            &ClipConfig::default(),
            42,
            &request,
        );
        assert!(txt.contains("Input: sn.flm\n"));
        let spectrum_line = "Spectrum: n=3 | wave=[4000.00, 4002.00] | skipped rows=2\n";
        assert!(txt.contains(spectrum_line));
        let config_line = "Window margin=100 | knots=5 (3 interior) | seed=42\n";
        assert!(txt.contains(config_line));
        assert!(txt.contains("Intervals: [4000.5, 4001.5]\n"));
    }
}
