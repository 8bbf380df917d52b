//! Read/write clip diagnostics JSON.
//!
//! The file is the portable record of a run: parameters, seed and every
//! per-interval [`ClipDiagnostics`] bundle, so `emclip plot` can re-render a
//! run without the input spectrum.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clip::ClipDiagnostics;
use crate::domain::ClipConfig;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsFile {
    pub tool: String,
    pub generated: DateTime<Utc>,
    pub input: Option<PathBuf>,
    pub seed: u64,
    pub margin: f64,
    pub knots: usize,
    pub clips: Vec<ClipDiagnostics>,
}

impl DiagnosticsFile {
    pub fn new(
        input: Option<&Path>,
        seed: u64,
        config: &ClipConfig,
        clips: Vec<ClipDiagnostics>,
    ) -> Self {
        Self {
            tool: "emclip".to_string(),
            generated: Utc::now(),
            input: input.map(Path::to_path_buf),
            seed,
            margin: config.margin,
            knots: config.knots,
            clips,
        }
    }
}

/// Write a diagnostics JSON file.
pub fn write_diagnostics_json(path: &Path, file: &DiagnosticsFile) -> Result<(), AppError> {
    let out = File::create(path).map_err(|e| AppError::file("create diagnostics JSON", path, e))?;
    serde_json::to_writer_pretty(out, file)
        .map_err(|e| AppError::new(2, format!("Failed to write diagnostics JSON: {e}")))?;
    log::info!(
        "wrote diagnostics for {} clip(s) to {}",
        file.clips.len(),
        path.display()
    );
    Ok(())
}

/// Read a diagnostics JSON file.
pub fn read_diagnostics_json(path: &Path) -> Result<DiagnosticsFile, AppError> {
    let file = File::open(path).map_err(|e| AppError::file("open diagnostics JSON", path, e))?;
    let parsed = serde_json::from_reader(file);
    parsed.map_err(|e| AppError::new(2, format!("Invalid diagnostics JSON: {e}")))
}
