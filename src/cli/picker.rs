//! Interactive spectrum file picker.
//!
//! Kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `emclip pick` and choose a file" UX
//!
//! The picker searches for spectrum files (`.flm`, `.tsv`, `.txt`, `.csv`,
//! `.dat`) under the current working directory.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::AppError;

/// Default directory recursion depth for finding spectrum files.
const DEFAULT_SEARCH_DEPTH: usize = 4;

/// Extensions accepted as spectrum files (case-insensitive).
pub const SPECTRUM_EXTENSIONS: [&str; 5] = ["flm", "tsv", "txt", "csv", "dat"];

/// Prompt the user to select a spectrum file from the current directory tree.
///
/// Behavior:
/// - list discovered spectrum files
/// - accept either a number (from the list) or an explicit path
/// - `q` cancels
pub fn prompt_for_spectrum_path() -> Result<PathBuf, AppError> {
    let files = discover_spectrum_files();
    if files.is_empty() {
        return Err(AppError::new(
            2,
            "No spectrum files found. Provide one with `emclip clip -f <spectrum.flm>`.",
        ));
    }

    println!("Found {} spectrum file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        println!("{:>3}) {}", idx + 1, pretty_path(path));
    }

    loop {
        let count = files.len();
        print!("Select a file by number (1-{count}) or type a path (q to quit): ");
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(2, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a spectrum path with `-f <spectrum.flm>`.",
            ));
        }

        match interpret_input(input.trim(), &files) {
            Choice::Quit => return Err(AppError::new(2, "Canceled.")),
            Choice::Pick(path) => return Ok(path),
            Choice::Retry(message) => println!("{message}"),
        }
    }
}

#[derive(Debug, PartialEq)]
enum Choice {
    Quit,
    Pick(PathBuf),
    Retry(String),
}

/// A list number, an explicit path, or `q`.
fn interpret_input(input: &str, files: &[PathBuf]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Quit;
    }
    if let Ok(choice) = input.parse::<usize>() {
        return match choice.checked_sub(1).and_then(|i| files.get(i)) {
            Some(path) => match validate_spectrum_path(path) {
                Ok(path) => Choice::Pick(path),
                Err(err) => Choice::Retry(err.to_string()),
            },
            None => Choice::Retry(format!(
                "Invalid choice: {choice}. Enter a number between 1 and {}.",
                files.len()
            )),
        };
    }
    match validate_spectrum_path(Path::new(input)) {
        Ok(path) => Choice::Pick(path),
        Err(err) => Choice::Retry(err.to_string()),
    }
}

/// Validate the provided path points to a spectrum file.
pub fn validate_spectrum_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.exists() {
        return Err(AppError::new(
            2,
            format!("Spectrum file not found: {}", path.display()),
        ));
    }
    if path.is_dir() {
        return Err(AppError::new(
            2,
            format!("Expected a file, got a directory: {}", path.display()),
        ));
    }
    if !has_spectrum_extension(path) {
        return Err(AppError::new(
            2,
            format!(
                "Expected a spectrum file ({}) (got: {}).",
                SPECTRUM_EXTENSIONS.map(|e| format!(".{e}")).join(", "),
                path.display()
            ),
        ));
    }

    Ok(path.to_path_buf())
}

/// Discover spectrum files under the current directory (deterministic order).
pub fn discover_spectrum_files() -> Vec<PathBuf> {
    find_spectrum_files(Path::new("."), DEFAULT_SEARCH_DEPTH)
}

fn find_spectrum_files(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut out = Vec::new();
    find_spectrum_files_inner(root, 0, max_depth, &mut out);
    out.sort_by(|a, b| pretty_path(a).cmp(&pretty_path(b)));
    out
}

fn find_spectrum_files_inner(root: &Path, depth: usize, max_depth: usize, out: &mut Vec<PathBuf>) {
    if depth > max_depth {
        return;
    }

    let Ok(entries) = fs::read_dir(root) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(_) => continue,
        };

        if file_type.is_dir() {
            if should_skip_dir(&path) {
                continue;
            }
            find_spectrum_files_inner(&path, depth + 1, max_depth, out);
            continue;
        }

        // Our own outputs are not inputs.
        if file_type.is_file() && has_spectrum_extension(&path) && !is_clipped_output(&path) {
            out.push(path);
        }
    }
}

fn has_spectrum_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };
    SPECTRUM_EXTENSIONS
        .iter()
        .any(|known| ext.eq_ignore_ascii_case(known))
}

fn is_clipped_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.ends_with("_clipped"))
}

fn should_skip_dir(path: &Path) -> bool {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
    matches!(name, ".git" | "target" | "node_modules")
}

fn pretty_path(path: &Path) -> String {
    let stripped = path.strip_prefix("./").unwrap_or(path);
    stripped.display().to_string()
}
