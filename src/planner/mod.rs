//! Output parameter planning
//!
//! Pure decision logic: estimate the encoded size of a run, then reduce
//! frame rate and resolution in stages until the estimate fits the budget.

use serde::{Deserialize, Serialize};

pub mod estimator;
pub mod optimizer;

pub use estimator::SizeEstimator;
pub use optimizer::ParameterOptimizer;

/// Encoding parameters chosen for a processing run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputParams {
    /// Target width in pixels, always even
    pub width: u32,
    /// Target height in pixels, always even
    pub height: u32,
    /// Target frame rate
    pub fps: f64,
    /// Source width
    pub original_width: u32,
    /// Source height
    pub original_height: u32,
    /// Source frame rate
    pub original_fps: f64,
    /// Whether any parameter differs from the source
    pub is_adjusted: bool,
}

impl OutputParams {
    /// Parameters that leave the source untouched
    pub fn passthrough(width: u32, height: u32, fps: f64) -> Self {
        Self {
            width,
            height,
            fps,
            original_width: width,
            original_height: height,
            original_fps: fps,
            is_adjusted: false,
        }
    }

    /// True when the target resolution differs from the source
    pub fn resolution_adjusted(&self) -> bool {
        self.width != self.original_width || self.height != self.original_height
    }

    /// True when the target frame rate differs from the source
    pub fn fps_adjusted(&self) -> bool {
        self.fps != self.original_fps
    }
}
