//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fit data: `.`
//! - spline: `-` line
//! - replaced samples: `*`
//! - clip interval bounds: `|`
//! - residuals: `o` around a `-` zero line
//! - spectrum overlays: input `.`, clipped `o`

use crate::clip::ClipDiagnostics;

/// Render the fit window of one clip: fit data, spline, bounds and replaced samples.
pub fn render_clip_plot(diag: &ClipDiagnostics, width: usize, height: usize) -> String {
    let (x_min, x_max) = diag.interval.window(diag.margin);

    let fit: Vec<(f64, f64)> = masked_points(diag, true);
    let replaced: Vec<(f64, f64)> = diag
        .replaced_indices
        .iter()
        .zip(&diag.replaced_after)
        .filter_map(|(&idx, &y)| {
            let pos = idx.checked_sub(diag.window_start)?;
            let w = diag.window_wavelength.get(pos)?;
            Some((*w, y))
        })
        .collect();
    let curve: Vec<(f64, f64)> = diag
        .curve_wavelength
        .iter()
        .copied()
        .zip(diag.curve_flux.iter().copied())
        .collect();

    let ys = fit.iter().chain(&replaced).chain(&curve).map(|&(_, y)| y);
    let (y_min, y_max) = value_range(ys).unwrap_or((0.0, 1.0));

    let mut canvas = Canvas::new(width, height, (x_min, x_max), pad_range(y_min, y_max, 0.05));
    canvas.polyline(&curve, '-');
    canvas.vline(diag.interval.lower(), '|');
    canvas.vline(diag.interval.upper(), '|');
    canvas.points(&fit, '.');
    canvas.points(&replaced, '*');

    let header = format!(
        "Clip ({}, {}): window=[{x_min:.2}, {x_max:.2}] | flux=[{:.3e}, {:.3e}] | fit={} replaced={}",
        diag.interval.lower(),
        diag.interval.upper(),
        canvas.y_range.0,
        canvas.y_range.1,
        diag.fit_count(),
        diag.replaced_count()
    );
    canvas.render(&header)
}

/// Render the fit residuals of one clip around a zero line.
pub fn render_residual_plot(diag: &ClipDiagnostics, width: usize, height: usize) -> String {
    let (x_min, x_max) = diag.interval.window(diag.margin);
    let points: Vec<(f64, f64)> = diag
        .fit_wavelength
        .iter()
        .copied()
        .zip(diag.residuals.iter().copied())
        .collect();

    let ys = points.iter().map(|&(_, y)| y).chain(std::iter::once(0.0));
    let (y_min, y_max) = value_range(ys).unwrap_or((-1.0, 1.0));

    let mut canvas = Canvas::new(width, height, (x_min, x_max), pad_range(y_min, y_max, 0.05));
    canvas.polyline(&[(x_min, 0.0), (x_max, 0.0)], '-');
    canvas.points(&points, 'o');

    let header = format!(
        "Residuals: mean={:.3e} std={:.3e} | n={}",
        diag.noise.mean(),
        diag.noise.std_dev(),
        diag.noise.sample_size()
    );
    canvas.render(&header)
}

/// Input (`.`) vs clipped (`o`) flux on a shared grid.
///
/// `x_range` restricts the view; `None` shows the whole spectrum.
pub fn render_spectrum_plot(
    wavelength: &[f64],
    input: &[f64],
    clipped: &[f64],
    width: usize,
    height: usize,
    x_range: Option<(f64, f64)>,
) -> String {
    let full = value_range(wavelength.iter().copied()).unwrap_or((0.0, 1.0));
    let (x_min, x_max) = x_range.filter(|(a, b)| b > a).unwrap_or(full);
    let in_view = |w: f64| w >= x_min && w <= x_max;

    let input_pts: Vec<(f64, f64)> = wavelength
        .iter()
        .copied()
        .zip(input.iter().copied())
        .filter(|&(w, _)| in_view(w))
        .collect();
    let clipped_pts: Vec<(f64, f64)> = wavelength
        .iter()
        .copied()
        .zip(clipped.iter().copied())
        .filter(|&(w, _)| in_view(w))
        .collect();

    let ys = input_pts.iter().chain(&clipped_pts).map(|&(_, y)| y);
    let (y_min, y_max) = value_range(ys).unwrap_or((0.0, 1.0));

    let mut canvas = Canvas::new(width, height, (x_min, x_max), pad_range(y_min, y_max, 0.05));
    canvas.points(&input_pts, '.');
    canvas.points(&clipped_pts, 'o');

    let header = format!(
        "Spectrum: wave=[{x_min:.2}, {x_max:.2}] | flux=[{:.3e}, {:.3e}]",
        canvas.y_range.0, canvas.y_range.1
    );
    canvas.render(&header)
}

fn masked_points(diag: &ClipDiagnostics, keep: bool) -> Vec<(f64, f64)> {
    diag.window_wavelength
        .iter()
        .zip(&diag.window_flux)
        .zip(&diag.fit_mask)
        .filter(|(_, m)| **m == keep)
        .map(|((&w, &f), _)| (w, f))
        .collect()
}

struct Canvas {
    grid: Vec<Vec<char>>,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Canvas {
    fn new(width: usize, height: usize, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let width = width.max(10);
        let height = height.max(5);
        Self {
            grid: vec![vec![' '; width]; height],
            x_range,
            y_range,
        }
    }

    fn width(&self) -> usize {
        self.grid[0].len()
    }

    fn height(&self) -> usize {
        self.grid.len()
    }

    fn cell(&self, x: f64, y: f64) -> (usize, usize) {
        (
            map_x(x, self.x_range.0, self.x_range.1, self.width()),
            map_y(y, self.y_range.0, self.y_range.1, self.height()),
        )
    }

    fn points(&mut self, points: &[(f64, f64)], ch: char) {
        for &(x, y) in points {
            let (col, row) = self.cell(x, y);
            self.grid[row][col] = ch;
        }
    }

    fn polyline(&mut self, points: &[(f64, f64)], ch: char) {
        let mut prev = None;
        for &(x, y) in points {
            let (col, row) = self.cell(x, y);
            match prev {
                Some((c0, r0)) => draw_line(&mut self.grid, c0, r0, col, row, ch),
                None => self.grid[row][col] = ch,
            }
            prev = Some((col, row));
        }
    }

    /// Vertical marker on blank cells only.
    fn vline(&mut self, x: f64, ch: char) {
        if x < self.x_range.0 || x > self.x_range.1 {
            return;
        }
        let col = map_x(x, self.x_range.0, self.x_range.1, self.width());
        for row in &mut self.grid {
            if row[col] == ' ' {
                row[col] = ch;
            }
        }
    }

    fn render(self, header: &str) -> String {
        let mut out = String::new();
        out.push_str(header);
        out.push('\n');
        for row in self.grid {
            out.push_str(&row.into_iter().collect::<String>());
            out.push('\n');
        }
        out
    }
}

fn value_range(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values.filter(|v| v.is_finite()) {
        min = min.min(v);
        max = max.max(v);
    }
    if !(min.is_finite() && max.is_finite()) {
        return None;
    }
    if max > min {
        Some((min, max))
    } else {
        // Flat data: open a unit band around the value.
        Some((min - 0.5, max + 0.5))
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let width = width.max(2);
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let height = height.max(2);
    let u = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // y=top is max -> row 0
    (height as f64 - 1.0 - (u * (height as f64 - 1.0))).round() as usize
}

/// Integer line drawing (Bresenham-ish); only fills blank cells.
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
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
    fn spectrum_plot_golden_snapshot_small() {
        let wl = [0.0, 3.0, 6.0, 9.0];
        let input = [0.0, 0.0, 4.0, 0.0];
        let clipped = [0.0, 0.0, 0.0, 0.0];

        let txt = render_spectrum_plot(&wl, &input, &clipped, 10, 5, None);
        let expected = concat!(
            "Spectrum: wave=[0.00, 9.00] | flux=[-2.000e-1, 4.200e0]\n",
            "      .   \n",
            "          \n",
            "          \n",
            "          \n",
            "o  o  o  o\n",
        );
        assert_eq!(txt, expected);
    }

    #[test]
    fn clip_plot_marks_every_element() {
        let synth = generate_spectrum(&SynthConfig {
            lines: vec![EmissionLine::new(4500.0, 6.0, 3.0).unwrap()],
            ..SynthConfig::default()
        })
        .unwrap();
        let iv = ClipInterval::new(4480.0, 4520.0).unwrap();
        let outcome = RegionClipper::default()
            .clip_detailed(&synth.spectrum, &iv, &mut StdRng::seed_from_u64(2))
            .unwrap();

        let txt = render_clip_plot(&outcome.diagnostics, 60, 15);
        let lines: Vec<&str> = txt.lines().collect();
        assert_eq!(lines.len(), 16);
        let title = "Clip (4480, 4520): window=[4380.00, 4620.00]";
        assert!(lines[0].starts_with(title));
        assert!(lines[1..].iter().all(|l| l.chars().count() == 60));
        for ch in ['.', '-', '*', '|'] {
            assert!(txt.contains(ch), "missing {ch:?} in\n{txt}");
        }

        let residuals = render_residual_plot(&outcome.diagnostics, 60, 9);
        assert_eq!(residuals.lines().count(), 10);
        assert!(residuals.contains('o'));
    }

    #[test]
    fn spectrum_plot_respects_view_range() {
        let wl: Vec<f64> = (0..100).map(f64::from).collect();
        let flux: Vec<f64> = wl
            .iter()
            .map(|&w| if w > 50.0 { 100.0 } else { 1.0 })
            .collect();
        let txt = render_spectrum_plot(&wl, &flux, &flux, 20, 5, Some((0.0, 40.0)));
        assert!(txt.starts_with("Spectrum: wave=[0.00, 40.00]"));
        // Only the flat part is in view, so the unit band puts it mid-plot.
        assert!(txt.lines().nth(3).is_some_and(|l| l.contains('o')));
    }
}
