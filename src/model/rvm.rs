//! RobustVideoMatting ONNX session
//!
//! The model takes the source frame plus four recurrent tensors and returns
//! the foreground, the alpha matte, and the updated recurrent tensors.
//! Recurrent shapes follow the RVM architecture: 16/20/24/28 channels at
//! full, half, quarter, and eighth spatial scale of the downsampled input.

use super::{FrameTensor, MatteOutput, MattingModel};
use crate::error::{AlphaCutError, AlphaCutResult};
use ndarray::{Array4, Axis, Ix4};
use ort::{GraphOptimizationLevel, Session};
use std::path::Path;
use tracing::{debug, info};

/// Default internal downsampling applied by the model
pub const DEFAULT_DOWNSAMPLE_RATIO: f32 = 0.5;
const MIN_DOWNSAMPLE_RATIO: f32 = 0.1;
const MAX_DOWNSAMPLE_RATIO: f32 = 1.0;

/// ONNX Runtime session wrapping the RVM model
pub struct RvmSession {
    session: Session,
    r1: Option<Array4<f32>>,
    r2: Option<Array4<f32>>,
    r3: Option<Array4<f32>>,
    r4: Option<Array4<f32>>,
    downsample_ratio: f32,
}

impl RvmSession {
    /// Load the model from an ONNX file
    pub fn load(model_path: &Path) -> AlphaCutResult<Self> {
        info!("Loading matting model from {}", model_path.display());
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(num_cpus::get())?
            .commit_from_file(model_path)?;
        info!("Matting model loaded");

        Ok(Self {
            session,
            r1: None,
            r2: None,
            r3: None,
            r4: None,
            downsample_ratio: DEFAULT_DOWNSAMPLE_RATIO,
        })
    }

    /// Override the downsample ratio, clamped to the model's valid range
    pub fn with_downsample_ratio(mut self, ratio: f32) -> Self {
        self.downsample_ratio = ratio.clamp(MIN_DOWNSAMPLE_RATIO, MAX_DOWNSAMPLE_RATIO);
        self
    }

    /// Zero-initialize the recurrent tensors for a frame of the given size
    fn init_recurrent_state(&mut self, height: usize, width: usize) {
        let h = ((height as f32 * self.downsample_ratio) as usize).max(1);
        let w = ((width as f32 * self.downsample_ratio) as usize).max(1);
        debug!("Initializing recurrent state at {}x{}", w, h);

        self.r1 = Some(Array4::zeros((1, 16, h, w)));
        self.r2 = Some(Array4::zeros((1, 20, (h / 2).max(1), (w / 2).max(1))));
        self.r3 = Some(Array4::zeros((1, 24, (h / 4).max(1), (w / 4).max(1))));
        self.r4 = Some(Array4::zeros((1, 28, (h / 8).max(1), (w / 8).max(1))));
    }
}

impl MattingModel for RvmSession {
    fn reset_state(&mut self) {
        debug!("Resetting recurrent matting state");
        self.r1 = None;
        self.r2 = None;
        self.r3 = None;
        self.r4 = None;
    }

    fn process_frame(&mut self, frame: &FrameTensor) -> AlphaCutResult<MatteOutput> {
        let shape = frame.shape();
        if shape.len() != 3 || shape[0] != 3 {
            return Err(AlphaCutError::ModelError {
                message: format!("expected a [3, H, W] frame tensor, got {shape:?}"),
            });
        }
        let (height, width) = (shape[1], shape[2]);

        if self.r1.is_none() {
            self.init_recurrent_state(height, width);
        }
        let (Some(r1), Some(r2), Some(r3), Some(r4)) = (
            self.r1.as_ref(),
            self.r2.as_ref(),
            self.r3.as_ref(),
            self.r4.as_ref(),
        ) else {
            return Err(AlphaCutError::ModelError {
                message: "recurrent state not initialized".to_string(),
            });
        };

        let src = frame.view().insert_axis(Axis(0));
        let outputs = self.session.run(ort::inputs![
            src,
            r1.view(),
            r2.view(),
            r3.view(),
            r4.view()
        ]?)?;

        // Output order: fgr, pha, r1, r2, r3, r4
        let foreground = outputs[0]
            .try_extract_tensor::<f32>()?
            .view()
            .to_owned()
            .into_dimensionality::<Ix4>()?;
        let alpha = outputs[1]
            .try_extract_tensor::<f32>()?
            .view()
            .to_owned()
            .into_dimensionality::<Ix4>()?;

        self.r1 = Some(
            outputs[2]
                .try_extract_tensor::<f32>()?
                .view()
                .to_owned()
                .into_dimensionality()?,
        );
        self.r2 = Some(
            outputs[3]
                .try_extract_tensor::<f32>()?
                .view()
                .to_owned()
                .into_dimensionality()?,
        );
        self.r3 = Some(
            outputs[4]
                .try_extract_tensor::<f32>()?
                .view()
                .to_owned()
                .into_dimensionality()?,
        );
        self.r4 = Some(
            outputs[5]
                .try_extract_tensor::<f32>()?
                .view()
                .to_owned()
                .into_dimensionality()?,
        );

        Ok(MatteOutput {
            foreground: foreground.index_axis_move(Axis(0), 0),
            alpha: alpha.index_axis_move(Axis(0), 0),
        })
    }
}
