//! Path helpers for input validation and output placement

use crate::error::AlphaCutResult;
use std::fs;
use std::path::{Path, PathBuf};

/// Input extensions the pipeline accepts (lowercase, with dot)
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &[".mp4", ".mov", ".m4v"];

/// Container extension for the alpha-preserving output
pub const OUTPUT_EXTENSION: &str = "mov";

/// Suffix appended to the input stem when deriving an output path
const OUTPUT_SUFFIX: &str = "_nobg";

/// Check whether a path carries a supported video extension (case-insensitive)
pub fn is_supported_video(path: &Path) -> bool {
    match path.extension() {
        Some(ext) => {
            let ext = format!(".{}", ext.to_string_lossy().to_lowercase());
            SUPPORTED_INPUT_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// Derive the default output path for an input video.
///
/// `video.mp4` becomes `video_nobg.mov` beside the input, or under
/// `output_dir` when one is given.
pub fn derive_output_path(input: &Path, output_dir: Option<&Path>) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    let file_name = format!("{}{}.{}", stem, OUTPUT_SUFFIX, OUTPUT_EXTENSION);

    match output_dir {
        Some(dir) => dir.join(file_name),
        None => match input.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        },
    }
}

/// Create a directory and its parents if missing
pub fn ensure_directory(dir: &Path) -> AlphaCutResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// File size in megabytes (1 MB = 1024 * 1024 bytes)
pub fn file_size_mb(path: &Path) -> AlphaCutResult<f64> {
    let metadata = fs::metadata(path)?;
    Ok(metadata.len() as f64 / 1024.0 / 1024.0)
}
