//! Ratatui-based region picker.
//!
//! Shows the spectrum with a movable cursor; the user marks clip boundaries at
//! the cursor and finishes with an even number of them. The key handling lives
//! in [`PickerState`], which knows nothing about the terminal.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::domain::{ClipRequest, Spectrum};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::SpectrumChart;

/// Fewest samples a zoomed view may show.
const MIN_VIEW: usize = 16;

/// Run the picker; `Ok(None)` when the user cancels.
pub fn pick_regions(
    spectrum: &Spectrum,
    title: &str,
    preset: &ClipRequest,
) -> Result<Option<ClipRequest>, AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = PickerApp {
        state: PickerState::new(spectrum, preset),
        title: title.to_string(),
    };
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            let reason = format!("Failed to enter alternate screen: {e}");
            return Err(AppError::new(4, reason));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

/// Outcome of one key press.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerAction {
    Continue,
    Finish(ClipRequest),
    Cancel,
}

/// Cursor, zoom and marked boundaries over one spectrum.
#[derive(Debug, Clone)]
pub struct PickerState<'a> {
    spectrum: &'a Spectrum,
    cursor: usize,
    /// Visible sample range `[view_start, view_end)`.
    view_start: usize,
    view_end: usize,
    boundaries: Vec<f64>,
    status: String,
}

impl<'a> PickerState<'a> {
    pub fn new(spectrum: &'a Spectrum, preset: &ClipRequest) -> Self {
        let boundaries = preset.boundaries();
        let status = if boundaries.is_empty() {
            "Mark line boundaries with Enter/Space.".to_string()
        } else {
            format!("{} interval(s) pre-marked.", preset.len())
        };
        Self {
            spectrum,
            cursor: spectrum.len() / 2,
            view_start: 0,
            view_end: spectrum.len(),
            boundaries,
            status,
        }
    }

    pub fn cursor_wavelength(&self) -> f64 {
        self.spectrum.wavelength()[self.cursor]
    }

    pub fn cursor_flux(&self) -> f64 {
        self.spectrum.flux()[self.cursor]
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn view(&self) -> (usize, usize) {
        (self.view_start, self.view_end)
    }

    fn view_len(&self) -> usize {
        self.view_end - self.view_start
    }

    pub fn handle_key(&mut self, code: KeyCode) -> PickerAction {
        match code {
            KeyCode::Esc => return PickerAction::Cancel,
            KeyCode::Char('q') => return self.finish(),
            KeyCode::Left => self.move_cursor(-1),
            KeyCode::Right => self.move_cursor(1),
            KeyCode::PageUp => self.move_cursor(-(self.fast_step() as isize)),
            KeyCode::PageDown => self.move_cursor(self.fast_step() as isize),
            KeyCode::Home => self.move_cursor(-(self.spectrum.len() as isize)),
            KeyCode::End => self.move_cursor(self.spectrum.len() as isize),
            KeyCode::Enter | KeyCode::Char(' ') => {
                let w = self.cursor_wavelength();
                self.boundaries.push(w);
                let pairs = self.boundaries.len() / 2;
                self.status = if self.boundaries.len() % 2 == 1 {
                    format!("Lower boundary at {w}; mark the upper one.")
                } else {
                    format!("Upper boundary at {w}; {pairs} interval(s).")
                };
            }
            KeyCode::Backspace => {
                self.status = match self.boundaries.pop() {
                    Some(w) => format!("Removed boundary at {w}."),
                    None => "No boundary to remove.".to_string(),
                };
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(0.5),
            KeyCode::Char('-') => self.zoom(2.0),
            KeyCode::Char('c') => {
                self.boundaries.clear();
                self.status = "Cleared all boundaries.".to_string();
            }
            _ => {}
        }
        PickerAction::Continue
    }

    fn finish(&mut self) -> PickerAction {
        if self.boundaries.len() % 2 != 0 {
            self.status = format!(
                "{} boundaries marked; mark or remove one before finishing.",
                self.boundaries.len()
            );
            return PickerAction::Continue;
        }
        match ClipRequest::from_boundaries(&self.boundaries) {
            Ok(request) => PickerAction::Finish(request),
            Err(err) => {
                self.status = err.to_string();
                PickerAction::Continue
            }
        }
    }

    fn fast_step(&self) -> usize {
        (self.view_len() / 10).max(1)
    }

    fn move_cursor(&mut self, delta: isize) {
        let last = self.spectrum.len() - 1;
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
        self.follow_cursor();
    }

    /// Shift the view so it contains the cursor.
    fn follow_cursor(&mut self) {
        let len = self.view_len();
        if self.cursor < self.view_start {
            self.view_start = self.cursor;
            self.view_end = self.view_start + len;
        } else if self.cursor >= self.view_end {
            self.view_end = self.cursor + 1;
            self.view_start = self.view_end - len;
        }
    }

    /// Scale the visible span around the cursor.
    fn zoom(&mut self, factor: f64) {
        let n = self.spectrum.len();
        let len = ((self.view_len() as f64 * factor).round() as usize).clamp(MIN_VIEW.min(n), n);
        let start = self.cursor.saturating_sub(len / 2).min(n - len);
        self.view_start = start;
        self.view_end = start + len;
        self.status = format!("Showing {len} of {n} samples.");
    }

    /// Visible `(wavelength, flux)` points with padded bounds.
    fn visible_series(&self) -> (Vec<(f64, f64)>, [f64; 2], [f64; 2]) {
        let wl = &self.spectrum.wavelength()[self.view_start..self.view_end];
        let fx = &self.spectrum.flux()[self.view_start..self.view_end];
        let points: Vec<(f64, f64)> = wl.iter().copied().zip(fx.iter().copied()).collect();

        let mut x_bounds = [wl[0], wl[wl.len() - 1]];
        if x_bounds[1] <= x_bounds[0] {
            x_bounds = [x_bounds[0] - 0.5, x_bounds[0] + 0.5];
        }

        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        for &y in fx {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
        if y_max <= y_min {
            y_min -= 0.5;
            y_max += 0.5;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
        (points, x_bounds, [y_min - pad, y_max + pad])
    }
}

struct PickerApp<'a> {
    state: PickerState<'a>,
    title: String,
}

impl PickerApp<'_> {
    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<Option<ClipRequest>, AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let ready = event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?;
            if !ready {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.state.handle_key(key.code) {
                        PickerAction::Continue => needs_redraw = true,
                        PickerAction::Finish(request) => return Ok(Some(request)),
                        PickerAction::Cancel => return Ok(None),
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let s = &self.state;
        let mut lines = vec![Line::from(vec![
            Span::styled("emclip", Style::default().fg(Color::Cyan)),
            Span::raw(format!(" {} | n={}", self.title, s.spectrum.len())),
        ])];

        let pairs: Vec<String> = s
            .boundaries
            .chunks(2)
            .map(|pair| match pair {
                [lo, hi] => format!("({lo}, {hi})"),
                [lo] => format!("({lo}, ?)"),
                _ => String::new(),
            })
            .collect();
        let intervals = if pairs.is_empty() {
            "-".to_string()
        } else {
            pairs.join(" ")
        };
        lines.push(Line::from(Span::styled(
            format!(
                "cursor: {} flux={:.4e} | intervals: {intervals}",
                s.cursor_wavelength(),
                s.cursor_flux()
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Spectrum").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (points, x_bounds, y_bounds) = self.state.visible_series();
        let widget = SpectrumChart {
            spectrum: &points,
            boundaries: &self.state.boundaries,
            cursor: self.state.cursor_wavelength(),
            x_bounds,
            y_bounds,
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = concat!(
            "←/→ move  PgUp/PgDn fast  Enter/Space mark  Backspace undo  ",
            "+/- zoom  c clear  q done  Esc cancel"
        );
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(self.state.status(), Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.2e}")
}
