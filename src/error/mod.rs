//! Error handling module for AlphaCut

use thiserror::Error;

/// Main error type for AlphaCut operations
#[derive(Error, Debug)]
pub enum AlphaCutError {
    /// Input video cannot be opened or decoded
    #[error("Cannot open video {path}: {reason}")]
    OpenError { path: String, reason: String },

    /// Input extension is not in the supported allow-list
    #[error("Unsupported input format '{extension}' for {path} (supported: .mp4, .mov, .m4v)")]
    UnsupportedFormat { path: String, extension: String },

    /// Processing was cancelled by the caller; not a failure
    #[error("Processing cancelled")]
    ProcessingCancelled,

    /// External encoder exited with a non-zero status
    #[error("Encoding failed: {message}")]
    EncodeError { message: String },

    /// Produced file failed post-encode verification
    #[error("Output failed integrity verification: {path}")]
    IntegrityError { path: String },

    /// Required external tool is not installed or not on PATH
    #[error("Required tool not found: {tool}")]
    ToolNotFound { tool: String },

    /// External command exceeded its allotted time
    #[error("Command '{program}' timed out after {seconds}s")]
    CommandTimeout { program: String, seconds: u64 },

    /// Caller supplied an invalid argument or parameter
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Matting model failure
    #[error("Model error: {message}")]
    ModelError { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Image encoding or decoding error
    #[error("Image error: {0}")]
    ImageError(#[from] image::ImageError),

    /// Tensor shape error
    #[error("Tensor shape error: {0}")]
    ShapeError(#[from] ndarray::ShapeError),

    /// ONNX Runtime error
    #[cfg(feature = "onnx")]
    #[error("Inference runtime error: {0}")]
    OrtError(#[from] ort::Error),
}

/// Result type alias for AlphaCut operations
pub type AlphaCutResult<T> = std::result::Result<T, AlphaCutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AlphaCutError::UnsupportedFormat {
            path: "clip.avi".to_string(),
            extension: ".avi".to_string(),
        };
        assert!(err.to_string().contains(".avi"));
        assert!(err.to_string().contains("clip.avi"));

        let err = AlphaCutError::ToolNotFound {
            tool: "ffmpeg".to_string(),
        };
        assert!(err.to_string().contains("ffmpeg"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: AlphaCutError = io.into();
        assert!(matches!(err, AlphaCutError::IoError(_)));
    }
}
