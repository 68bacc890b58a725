//! Frame decoding over an external rawvideo pipe
//!
//! Spawns the decoder tool writing packed RGB24 to stdout and reads it one
//! frame-sized chunk at a time. A short read means end of stream.

use super::{Decoder, DecoderFactory};
use crate::error::{AlphaCutError, AlphaCutResult};
use crate::exec::hidden_command;
use crate::probe::VideoInfo;
use image::RgbImage;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Stdio};
use tracing::{debug, warn};

/// Opens ffmpeg rawvideo pipes
pub struct FfmpegDecoderFactory {
    ffmpeg: PathBuf,
}

impl FfmpegDecoderFactory {
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl DecoderFactory for FfmpegDecoderFactory {
    fn open(&self, path: &Path, info: &VideoInfo) -> AlphaCutResult<Box<dyn Decoder>> {
        debug!(
            "Opening rawvideo pipe for {} ({}x{})",
            path.display(),
            info.width,
            info.height
        );
        let mut child = hidden_command(&self.ffmpeg)
            .args([
                "-i",
                &path.display().to_string(),
                "-f",
                "rawvideo",
                "-pix_fmt",
                "rgb24",
                "-v",
                "error",
                "pipe:1",
            ])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: format!("cannot spawn decoder: {e}"),
            })?;

        let reader = child.stdout.take().map(BufReader::new);
        Ok(Box::new(FfmpegPipeDecoder {
            child,
            reader,
            width: info.width,
            height: info.height,
            finished: false,
        }))
    }
}

/// Decoder reading frames from a running child process
pub struct FfmpegPipeDecoder {
    child: Child,
    reader: Option<BufReader<ChildStdout>>,
    width: u32,
    height: u32,
    finished: bool,
}

impl FfmpegPipeDecoder {
    fn finish(&mut self) {
        self.finished = true;
        self.reader = None;
        match self.child.wait() {
            Ok(status) if !status.success() => {
                let mut diagnostics = String::new();
                if let Some(mut stderr) = self.child.stderr.take() {
                    let _ = stderr.read_to_string(&mut diagnostics);
                }
                warn!(
                    "Decoder exited with {}: {}",
                    status,
                    diagnostics.trim()
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to reap decoder process: {e}"),
        }
    }
}

impl Decoder for FfmpegPipeDecoder {
    fn read_frame(&mut self) -> AlphaCutResult<Option<RgbImage>> {
        if self.finished {
            return Ok(None);
        }
        let frame_len = self.width as usize * self.height as usize * 3;
        let mut buf = vec![0u8; frame_len];

        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        match reader.read_exact(&mut buf) {
            Ok(()) => {
                let frame = RgbImage::from_raw(self.width, self.height, buf).ok_or_else(|| {
                    AlphaCutError::InvalidInput {
                        message: "frame buffer does not match probed dimensions".to_string(),
                    }
                })?;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                self.finish();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for FfmpegPipeDecoder {
    fn drop(&mut self) {
        // A cancelled run abandons the stream mid-decode; reap the child
        // so it does not linger.
        if !self.finished {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
