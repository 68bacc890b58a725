//! Sequential matting pipeline
//!
//! Drives one video end to end: probe, plan, decode frame by frame through
//! the recurrent model, persist RGBA frames to a scratch directory, then
//! mux them into the final container. Frames must flow through the model
//! in source order, so the loop is strictly sequential; cancel and pause
//! are honored at the checkpoint between frames.

use crate::decode::DecoderFactory;
use crate::engine::compositor;
use crate::engine::muxer::Muxer;
use crate::engine::signals::RunControl;
use crate::engine::ProgressSink;
use crate::error::{AlphaCutError, AlphaCutResult};
use crate::model::MattingModel;
use crate::planner::{OutputParams, ParameterOptimizer};
use crate::probe::VideoProbe;
use crate::utils;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

pub struct MattingPipeline {
    probe: VideoProbe,
    optimizer: ParameterOptimizer,
    decoder_factory: Box<dyn DecoderFactory>,
    model: Box<dyn MattingModel>,
    muxer: Muxer,
    control: Arc<RunControl>,
}

impl MattingPipeline {
    pub fn new(
        probe: VideoProbe,
        optimizer: ParameterOptimizer,
        decoder_factory: Box<dyn DecoderFactory>,
        model: Box<dyn MattingModel>,
        muxer: Muxer,
    ) -> Self {
        Self {
            probe,
            optimizer,
            decoder_factory,
            model,
            muxer,
            control: Arc::new(RunControl::new()),
        }
    }

    /// Shared handle for driving cancel/pause from another thread
    pub fn control(&self) -> Arc<RunControl> {
        self.control.clone()
    }

    pub fn cancel(&self) {
        self.control.cancel()
    }

    pub fn pause(&self) {
        self.control.pause()
    }

    pub fn resume(&self) {
        self.control.resume()
    }

    pub fn is_paused(&self) -> bool {
        self.control.is_paused()
    }

    /// Run the full matting pass for one video.
    ///
    /// `output` defaults to `<stem>_nobg.mov` beside the input; `params`
    /// defaults to the optimizer's plan for the probed geometry. Returns
    /// the output path on success. Cancellation surfaces as
    /// [`AlphaCutError::ProcessingCancelled`] and leaves no output behind.
    pub fn process(
        &mut self,
        input: &Path,
        output: Option<&Path>,
        params: Option<OutputParams>,
        progress: Option<&dyn ProgressSink>,
    ) -> AlphaCutResult<PathBuf> {
        self.control.reset();

        if !utils::is_supported_video(input) {
            let extension = input
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_default();
            return Err(AlphaCutError::UnsupportedFormat {
                path: input.display().to_string(),
                extension,
            });
        }

        let output = match output {
            Some(path) => path.to_path_buf(),
            None => utils::derive_output_path(input, None),
        };
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() {
                utils::ensure_directory(parent)?;
            }
        }

        let info = self.probe.probe(input)?;
        let params = match params {
            Some(params) => params,
            None => self.optimizer.optimize(
                info.width,
                info.height,
                info.fps,
                info.duration,
                info.has_audio,
            )?,
        };
        info!(
            "Processing {} -> {} ({}x{} @ {} fps, {} frames)",
            input.display(),
            output.display(),
            params.width,
            params.height,
            params.fps,
            info.frame_count
        );

        // The recurrent state belongs to exactly one video
        self.model.reset_state();

        let frames_dir = TempDir::new()?;
        debug!("Frame scratch directory: {}", frames_dir.path().display());

        let mut decoder = self.decoder_factory.open(input, &info)?;
        let mut frames_done: u64 = 0;
        loop {
            self.control.wait_if_paused();
            if self.control.is_cancelled() {
                info!("Run cancelled at frame {}", frames_done);
                return Err(AlphaCutError::ProcessingCancelled);
            }

            let Some(frame) = decoder.read_frame()? else {
                break;
            };
            let tensor = compositor::frame_to_tensor(&frame);
            let matte = self.model.process_frame(&tensor)?;
            let rgba = compositor::compose_rgba(&matte.foreground, &matte.alpha)?;
            let frame_path = frames_dir
                .path()
                .join(format!("frame_{frames_done:06}.png"));
            rgba.save(&frame_path)?;
            frames_done += 1;

            if let Some(sink) = progress {
                sink.on_progress(frames_done, info.frame_count);
            }
        }
        drop(decoder);

        // Covers a cancel that lands after the final frame
        if self.control.is_cancelled() {
            info!("Run cancelled before muxing");
            return Err(AlphaCutError::ProcessingCancelled);
        }

        info!("Matted {} frames, muxing", frames_done);
        self.muxer
            .mux(frames_dir.path(), input, &output, &params, info.has_audio)?;
        Ok(output)
    }
}
