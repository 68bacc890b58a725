//! Matting engine module

pub mod compositor;
pub mod muxer;
pub mod pipeline;
pub mod signals;

pub use muxer::Muxer;
pub use pipeline::MattingPipeline;
pub use signals::RunControl;

/// Receives frame-loop progress.
///
/// Called on the pipeline's worker thread after each frame is persisted;
/// marshalling to a UI thread is the caller's concern.
pub trait ProgressSink: Send + Sync {
    /// `frames_done` counts persisted frames starting at 1; `total_frames`
    /// is the probed frame count and may be an estimate.
    fn on_progress(&self, frames_done: u64, total_frames: u64);
}

impl<F> ProgressSink for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_progress(&self, frames_done: u64, total_frames: u64) {
        self(frames_done, total_frames)
    }
}
