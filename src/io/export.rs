//! Spectrum exports.
//!
//! Output spectra are tab separated with a `#wave` header, so a clipped file can
//! be fed straight back in as input.

use std::path::{Path, PathBuf};

use crate::data::SyntheticSpectrum;
use crate::domain::Spectrum;
use crate::error::AppError;

/// `<dir>/<stem>_clipped.tsv` next to the input file.
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "spectrum".to_string());
    input.with_file_name(format!("{stem}_clipped.tsv"))
}

/// Write the clipped spectrum with the input flux alongside.
///
/// Columns: `#wave`, `flux` (clipped), `flux_input`.
pub fn write_clipped_spectrum(
    path: &Path,
    clipped: &Spectrum,
    input: &Spectrum,
) -> Result<(), AppError> {
    let (n_clipped, n_input) = (clipped.len(), input.len());
    if n_clipped != n_input {
        let reason = format!("Clipped spectrum has {n_clipped} samples, input {n_input}.");
        return Err(AppError::new(4, reason));
    }
    write_columns_tsv(
        path,
        &["#wave", "flux", "flux_input"],
        &[clipped.wavelength(), clipped.flux(), input.flux()],
    )?;
    log::info!("wrote clipped spectrum to {}", path.display());
    Ok(())
}

/// Write a synthetic spectrum: `#wave`, `flux` (noisy), `continuum` (noiseless, no lines).
pub fn write_synthetic_spectrum(path: &Path, synth: &SyntheticSpectrum) -> Result<(), AppError> {
    write_columns_tsv(
        path,
        &["#wave", "flux", "continuum"],
        &[
            synth.spectrum.wavelength(),
            synth.spectrum.flux(),
            &synth.continuum,
        ],
    )?;
    log::info!("wrote synthetic spectrum to {}", path.display());
    Ok(())
}

/// Write equal-length columns as TSV. Values use the shortest exact float form.
fn write_columns_tsv(path: &Path, header: &[&str], columns: &[&[f64]]) -> Result<(), AppError> {
    let rows = columns.first().map_or(0, |c| c.len());
    if columns.iter().any(|c| c.len() != rows) || header.len() != columns.len() {
        return Err(AppError::new(4, "Export columns have mismatched lengths."));
    }

    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)
        .map_err(|e| AppError::file("create", path, e))?;

    writer
        .write_record(header)
        .map_err(|e| AppError::file("write header to", path, e))?;

    let mut record = Vec::with_capacity(columns.len());
    for i in 0..rows {
        record.clear();
        record.extend(columns.iter().map(|c| c[i].to_string()));
        writer
            .write_record(&record)
            .map_err(|e| AppError::file("write row to", path, e))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::file("flush output", path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::load_spectrum;

    #[test]
    fn default_output_sits_next_to_input() {
        let absolute = default_output_path(Path::new("/data/SN1997ef.flm"));
        assert_eq!(absolute, PathBuf::from("/data/SN1997ef_clipped.tsv"));
        let relative = default_output_path(Path::new("spec.tsv"));
        assert_eq!(relative, PathBuf::from("spec_clipped.tsv"));
    }

    #[test]
    fn clipped_output_is_valid_input() {
        let wavelength = vec![4000.0, 4000.5, 4001.0];
        let input = Spectrum::new(wavelength, vec![1.0, 2.5, 3.0]).unwrap();
        let clipped = input.with_flux(vec![1.0, 2.125, 3.0]).unwrap();
        let file_name = format!("emclip_export_{}.tsv", std::process::id());
        let path = std::env::temp_dir().join(file_name);

        write_clipped_spectrum(&path, &clipped, &input).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let reloaded = load_spectrum(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(text.lines().next(), Some("#wave\tflux\tflux_input"));
        assert_eq!(text.lines().nth(2), Some("4000.5\t2.125\t2.5"));
        assert_eq!(reloaded.spectrum.flux(), clipped.flux());
        assert_eq!(reloaded.spectrum.wavelength(), input.wavelength());
    }
}
