//! Video decoding seam
//!
//! The pipeline consumes frames through [`Decoder`], so tests can feed
//! synthetic frames and the real implementation can stream from an external
//! decoder process.

pub mod pipe;

pub use pipe::FfmpegDecoderFactory;

use crate::error::AlphaCutResult;
use crate::probe::VideoInfo;
use image::RgbImage;
use std::path::Path;

/// Streaming frame source for one video, yielding frames in source order
pub trait Decoder {
    /// Next frame, or `None` at end of stream
    fn read_frame(&mut self) -> AlphaCutResult<Option<RgbImage>>;
}

impl std::fmt::Debug for dyn Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn Decoder")
    }
}

/// Opens a [`Decoder`] for a probed video
pub trait DecoderFactory: Send + Sync {
    fn open(&self, path: &Path, info: &VideoInfo) -> AlphaCutResult<Box<dyn Decoder>>;
}
