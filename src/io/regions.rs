//! Region files: clip boundaries as plain text.
//!
//! Numbers are separated by whitespace or commas, `#` starts a comment, and a
//! line may hold any number of boundaries. Boundaries are read in file order and
//! paired as `lower, upper`:
//!
//! ```text
//! # H-alpha
//! 6540 6590
//! 4840, 4880   # H-beta
//! ```

use std::path::Path;

use crate::domain::ClipRequest;
use crate::error::AppError;

/// Flat boundary list from region text.
pub fn parse_region_text(text: &str) -> Result<Vec<f64>, String> {
    let mut out = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("");
        let tokens = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty());
        for token in tokens {
            let value = token
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("line {}: invalid boundary '{token}'", idx + 1))?;
            out.push(value);
        }
    }
    Ok(out)
}

/// Load a region file into a validated request.
pub fn load_region_file(path: &Path) -> Result<ClipRequest, AppError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| AppError::file("read region file", path, e))?;
    let boundaries = parse_region_text(&text).map_err(|e| {
        let reason = format!("Invalid region file '{}': {e}", path.display());
        AppError::new(2, reason)
    })?;
    let request = ClipRequest::from_boundaries(&boundaries)?;
    log::info!("read {} interval(s) from {}", request.len(), path.display());
    Ok(request)
}

/// Write a request as a region file, one interval per line.
pub fn write_region_file(path: &Path, request: &ClipRequest) -> Result<(), AppError> {
    let mut text = String::from("# lower upper\n");
    for iv in request.intervals() {
        text.push_str(&format!("{} {}\n", iv.lower(), iv.upper()));
    }
    std::fs::write(path, text).map_err(|e| AppError::file("write region file", path, e))?;
    log::info!("wrote {} interval(s) to {}", request.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mixed_separators_and_comments() {
        let text = "# regions\n6540 6590\n4840, 4880   # H-beta\n\n5000,5010 5100 5120\n";
        let expected = [
            6540.0, 6590.0, 4840.0, 4880.0, 5000.0, 5010.0, 5100.0, 5120.0,
        ];
        assert_eq!(parse_region_text(text).unwrap(), expected);
    }

    #[test]
    fn reports_bad_tokens_with_line() {
        let err = parse_region_text("6540 6590\n4840 abc\n").unwrap_err();
        assert!(err.starts_with("line 2"), "got {err}");
    }

    #[test]
    fn odd_region_file_is_rejected_and_round_trip_works() {
        let dir = std::env::temp_dir();
        let pid = std::process::id();
        let odd = dir.join(format!("emclip_regions_odd_{pid}.txt"));
        std::fs::write(&odd, "10 20 30\n").unwrap();
        let err = load_region_file(&odd).unwrap_err();
        std::fs::remove_file(&odd).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("3 boundaries"));

        let path = dir.join(format!("emclip_regions_{pid}.txt"));
        let boundaries = [4490.0, 4510.5, 6540.0, 6590.0];
        let request = ClipRequest::from_boundaries(&boundaries).unwrap();
        write_region_file(&path, &request).unwrap();
        let back = load_region_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(back, request);
    }
}
