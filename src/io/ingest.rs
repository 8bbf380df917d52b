//! Spectrum file ingest.
//!
//! Spectra arrive as delimited text with a header row, e.g. the `.flm` files of
//! the CfA supernova archive:
//!
//! ```text
//! #wave	flux
//! 3480.0	1.2e-15
//! ```
//!
//! Design goals:
//! - **Lenient header matching** (leading `#`, BOM, case and whitespace ignored)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Strict spectrum invariants** once rows are collected (strictly increasing
//!   wavelengths, finite values)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;

use crate::domain::Spectrum;
use crate::error::AppError;

/// Header names accepted for the wavelength column (after normalization).
const WAVELENGTH_HEADERS: [&str; 4] = ["wave", "wavelength", "wlen", "lambda"];
const FLUX_HEADER: &str = "flux";

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Ingest output: the validated spectrum plus what happened on the way.
#[derive(Debug, Clone)]
pub struct LoadedSpectrum {
    pub spectrum: Spectrum,
    pub source: PathBuf,
    pub delimiter: char,
    pub row_errors: Vec<RowError>,
    /// Wavelengths of skipped rows whose flux was unusable; they are missing
    /// from the grid and from any output written from it.
    pub dropped_wavelengths: Vec<f64>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load a spectrum file.
pub fn load_spectrum(path: &Path) -> Result<LoadedSpectrum, AppError> {
    let text = std::fs::read_to_string(path).map_err(|e| AppError::file("read spectrum", path, e))?;
    let loaded = parse_spectrum(&text, path)?;

    log::info!(
        "loaded {} samples from {} ({} rows skipped)",
        loaded.rows_used,
        path.display(),
        loaded.row_errors.len()
    );
    if let Some(first) = loaded.row_errors.first() {
        log::warn!(
            "{}: skipped {} row(s); first at line {}: {}",
            path.display(),
            loaded.row_errors.len(),
            first.line,
            first.message
        );
    }

    Ok(loaded)
}

/// Parse spectrum text; `source` is only used for messages.
pub fn parse_spectrum(text: &str, source: &Path) -> Result<LoadedSpectrum, AppError> {
    let delimiter = sniff_delimiter(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::file("read header of", source, e))?
        .clone();
    let header_map = build_header_map(&headers);

    let wave_idx = WAVELENGTH_HEADERS
        .iter()
        .find_map(|name| header_map.get(*name).copied())
        .ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "'{}' has no wavelength column (expected one of #wave, wave, wavelength, wlen, lambda).",
                    source.display()
                ),
            )
        })?;
    let flux_idx = header_map
        .get(FLUX_HEADER)
        .copied()
        .ok_or_else(|| AppError::new(2, format!("'{}' has no `flux` column.", source.display())))?;

    let mut wavelength = Vec::new();
    let mut flux = Vec::new();
    let mut row_errors = Vec::new();
    let mut dropped_wavelengths = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(idx + 2);
                row_errors.push(RowError {
                    line,
                    message: format!("parse error: {e}"),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        match parse_row(&record, wave_idx, flux_idx) {
            Ok((w, f)) => {
                wavelength.push(w);
                flux.push(f);
            }
            Err(message) => {
                if let Ok(w) = parse_field(&record, wave_idx, "wavelength") {
                    dropped_wavelengths.push(w);
                }
                row_errors.push(RowError { line, message });
            }
        }
    }

    if let (Some(first), Some(last)) = (dropped_wavelengths.first(), dropped_wavelengths.last()) {
        log::warn!(
            "{}: dropped {} sample(s) with unusable flux between {first} and {last}; \
             the output grid will not contain them",
            source.display(),
            dropped_wavelengths.len()
        );
    }

    let rows_used = wavelength.len();
    if rows_used == 0 {
        let reason = format!("No valid spectrum rows in '{}'.", source.display());
        return Err(AppError::new(3, reason));
    }

    let spectrum = Spectrum::new(wavelength, flux)?;

    Ok(LoadedSpectrum {
        spectrum,
        source: source.to_path_buf(),
        delimiter: delimiter as char,
        row_errors,
        dropped_wavelengths,
        rows_read,
        rows_used,
    })
}

/// Pick the delimiter from the first non-empty line: tab, comma or semicolon,
/// whichever occurs most (tab on ties or when none occurs).
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
    let mut best = (b'\t', header.matches('\t').count());
    for candidate in [b',', b';'] {
        let count = header.matches(candidate as char).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM; spectrum
    // archives mark the header with `#`.
    let name = name
        .trim()
        .trim_start_matches('\u{feff}')
        .trim_start_matches('#')
        .trim();
    name.to_ascii_lowercase()
}

fn parse_row(
    record: &StringRecord,
    wave_idx: usize,
    flux_idx: usize,
) -> Result<(f64, f64), String> {
    let w = parse_field(record, wave_idx, "wavelength")?;
    let f = parse_field(record, flux_idx, "flux")?;
    Ok((w, f))
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("missing {name} value"))?;
    let value = raw
        .parse::<f64>()
        .map_err(|_| format!("invalid {name} '{raw}'"))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("non-finite {name} '{raw}'"))
    }
}
