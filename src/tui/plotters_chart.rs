//! Plotters-powered spectrum chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// A render-only chart description; all series and bounds are computed by the caller.
pub struct SpectrumChart<'a> {
    /// Visible part of the spectrum.
    pub spectrum: &'a [(f64, f64)],
    /// Marked boundaries in click order.
    pub boundaries: &'a [f64],
    /// Cursor wavelength.
    pub cursor: f64,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
    pub fmt_x: fn(f64) -> String,
    pub fmt_y: fn(f64) -> String,
}

impl Widget for SpectrumChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters may fail to lay out a chart in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let [x0, x1] = self.x_bounds;
        let [y0, y1] = self.y_bounds;
        let finite = x0.is_finite() && x1.is_finite() && y0.is_finite() && y1.is_finite();
        if !finite || x1 <= x0 || y1 <= y0 {
            return;
        }

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                // Terminal cells are low-res, so keep label areas compact.
                .set_label_area_size(LabelAreaPosition::Left, 8)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("wavelength")
                .y_desc("flux")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| (self.fmt_x)(*v))
                .y_label_formatter(&|v| (self.fmt_y)(*v))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .bold_line_style(&WHITE)
                .draw()?;

            let spectrum_color = RGBColor(0, 255, 255); // cyan
            let paired_color = RGBColor(0, 255, 0); // green
            let pending_color = RGBColor(255, 105, 180); // pink
            let cursor_color = RGBColor(255, 255, 0); // yellow

            let trace = LineSeries::new(self.spectrum.iter().copied(), &spectrum_color);
            chart.draw_series(trace)?;

            // A trailing unpaired boundary is drawn in the pending color.
            let paired = self.boundaries.len() - self.boundaries.len() % 2;
            for (i, &b) in self.boundaries.iter().enumerate() {
                if b < x0 || b > x1 {
                    continue;
                }
                let color = if i < paired {
                    paired_color
                } else {
                    pending_color
                };
                chart.draw_series(LineSeries::new([(b, y0), (b, y1)], &color))?;
            }

            if self.cursor >= x0 && self.cursor <= x1 {
                let marker = [(self.cursor, y0), (self.cursor, y1)];
                chart.draw_series(LineSeries::new(marker, &cursor_color))?;
            }

            Ok(())
        });

        widget.render(area, buf);
    }
}
