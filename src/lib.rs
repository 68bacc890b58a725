//! AlphaCut video background removal library
//!
//! Removes the background from videos using a recurrent matting model,
//! writing alpha-capable output sized to fit a configurable cap, with
//! best-effort post-hoc compression for oversized results.

pub mod cli;
pub mod config;
pub mod decode;
pub mod engine;
pub mod error;
pub mod exec;
pub mod model;
pub mod output;
pub mod planner;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AlphaCutError, AlphaCutResult};
pub use planner::OutputParams;
pub use probe::VideoInfo;
