//! Matting model seam
//!
//! The pipeline treats the model as an opaque stateful collaborator. The
//! real session lives behind the `onnx` feature; everything else in the
//! crate only sees this trait.

#[cfg(feature = "onnx")]
pub mod rvm;

#[cfg(feature = "onnx")]
pub use rvm::RvmSession;

use crate::error::AlphaCutResult;
use ndarray::Array3;

/// Frame tensor in CHW layout, values in [0, 1]
pub type FrameTensor = Array3<f32>;

/// Per-frame inference result.
///
/// Values are nominally in [0, 1] but the model does not guarantee
/// clamping; compositing must clamp before quantizing.
#[derive(Debug, Clone)]
pub struct MatteOutput {
    /// Foreground color, shape `[3, H, W]`
    pub foreground: Array3<f32>,
    /// Alpha matte, shape `[1, H, W]`
    pub alpha: Array3<f32>,
}

/// Recurrent matting model contract.
///
/// Implementations carry temporal state across `process_frame` calls to
/// keep consecutive mattes coherent. `reset_state` starts a fresh temporal
/// context and is called once per video, before the first frame.
pub trait MattingModel: Send {
    /// Drop any recurrent state
    fn reset_state(&mut self) {}

    /// Run inference on one frame, updating recurrent state as a side
    /// effect
    fn process_frame(&mut self, frame: &FrameTensor) -> AlphaCutResult<MatteOutput>;
}
