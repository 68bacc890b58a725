//! Common utilities and helpers

pub mod path;
pub mod time;

pub use path::{
    derive_output_path, ensure_directory, file_size_mb, is_supported_video, OUTPUT_EXTENSION,
    SUPPORTED_INPUT_EXTENSIONS,
};
pub use time::format_duration;
