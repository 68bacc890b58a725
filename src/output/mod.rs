//! Output size reduction module

use serde::{Deserialize, Serialize};

pub mod compressor;

pub use compressor::Compressor;

/// Outcome of a compression attempt.
///
/// Compression is best-effort and never fails the caller; inspect
/// `success` and `error_message` instead of a `Result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionResult {
    /// Whether the output now satisfies the size cap
    pub success: bool,
    /// Input file path
    pub input_path: String,
    /// Final output path (equals the input when nothing was done)
    pub output_path: String,
    /// Input size before compression in MB
    pub original_size_mb: f64,
    /// Output size after compression in MB
    pub compressed_size_mb: f64,
    /// Compressed size divided by original size
    pub compression_ratio: f64,
    /// Video bitrate the encode targeted, when one was computed
    pub target_bitrate_kbps: Option<u32>,
    /// Failure description when `success` is false
    pub error_message: Option<String>,
    /// Backup left beside the input in overwrite mode, when one survives
    pub backup_path: Option<String>,
}

impl CompressionResult {
    /// Untouched-input result for files already within the cap
    pub fn unchanged(input_path: &str, size_mb: f64) -> Self {
        Self {
            success: true,
            input_path: input_path.to_string(),
            output_path: input_path.to_string(),
            original_size_mb: size_mb,
            compressed_size_mb: size_mb,
            compression_ratio: 1.0,
            target_bitrate_kbps: None,
            error_message: None,
            backup_path: None,
        }
    }

    /// Failure result that leaves the input untouched
    pub fn failed(input_path: &str, size_mb: f64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            input_path: input_path.to_string(),
            output_path: input_path.to_string(),
            original_size_mb: size_mb,
            compressed_size_mb: size_mb,
            compression_ratio: 1.0,
            target_bitrate_kbps: None,
            error_message: Some(message.into()),
            backup_path: None,
        }
    }
}
