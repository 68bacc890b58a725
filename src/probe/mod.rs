//! Media file inspection via the external prober
//!
//! Thin wrapper over ffprobe: stream geometry, audio presence, and the
//! integrity check the compressor relies on. All invocations go through the
//! [`CommandRunner`] seam.

use crate::config::ProbeSettings;
use crate::error::{AlphaCutError, AlphaCutResult};
use crate::exec::{CommandRunner, CommandSpec};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Source video information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate
    pub fps: f64,
    /// Total frame count
    pub frame_count: u64,
    /// Duration in seconds
    pub duration: f64,
    /// Whether an audio stream is present
    pub has_audio: bool,
}

/// Prober over the external media-inspection tool
pub struct VideoProbe {
    runner: Arc<dyn CommandRunner>,
    ffprobe: Option<PathBuf>,
    settings: ProbeSettings,
}

impl VideoProbe {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        ffprobe: Option<PathBuf>,
        settings: ProbeSettings,
    ) -> Self {
        Self {
            runner,
            ffprobe,
            settings,
        }
    }

    /// Extract geometry, frame rate, frame count, duration, and audio
    /// presence for a video file.
    pub fn probe(&self, path: &Path) -> AlphaCutResult<VideoInfo> {
        let ffprobe = self.require_ffprobe()?;

        let spec = CommandSpec::new(ffprobe, geometry_args(path));
        let out = self.runner.run(&spec)?;
        if !out.success() {
            return Err(AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: first_nonempty_line(&out.stderr)
                    .unwrap_or_else(|| "prober exited with a non-zero status".to_string()),
            });
        }

        let line = first_nonempty_line(&out.stdout).ok_or_else(|| AlphaCutError::OpenError {
            path: path.display().to_string(),
            reason: "no video stream found".to_string(),
        })?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 3 {
            return Err(AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: format!("unexpected probe output: {line}"),
            });
        }

        let width: u32 = parse_field(fields[0], path, "width")?;
        let height: u32 = parse_field(fields[1], path, "height")?;
        let fps = parse_rate(fields[2]).ok_or_else(|| AlphaCutError::OpenError {
            path: path.display().to_string(),
            reason: format!("invalid frame rate: {}", fields[2]),
        })?;
        if fps <= 0.0 {
            return Err(AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: "zero frame rate".to_string(),
            });
        }

        let nb_frames = fields.get(3).and_then(|f| f.trim().parse::<u64>().ok());
        let (frame_count, duration) = match nb_frames {
            Some(n) if n > 0 => (n, n as f64 / fps),
            _ => {
                // Some containers omit nb_frames; reconstruct it from the
                // container duration instead.
                let duration = self.duration(path)?;
                ((duration * fps).round() as u64, duration)
            }
        };

        let info = VideoInfo {
            width,
            height,
            fps,
            frame_count,
            duration,
            has_audio: self.has_audio_stream(path),
        };
        debug!(
            "Probed {}: {}x{} @ {:.3} fps, {} frames, {:.2}s, audio={}",
            path.display(),
            info.width,
            info.height,
            info.fps,
            info.frame_count,
            info.duration,
            info.has_audio
        );
        Ok(info)
    }

    /// Container duration in seconds
    pub fn duration(&self, path: &Path) -> AlphaCutResult<f64> {
        let ffprobe = self.require_ffprobe()?;
        let spec = CommandSpec::new(ffprobe, duration_args(path));
        let out = self.runner.run(&spec)?;
        if !out.success() {
            return Err(AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: first_nonempty_line(&out.stderr)
                    .unwrap_or_else(|| "duration query failed".to_string()),
            });
        }
        out.stdout
            .trim()
            .parse::<f64>()
            .map_err(|_| AlphaCutError::OpenError {
                path: path.display().to_string(),
                reason: format!("unparseable duration: {}", out.stdout.trim()),
            })
    }

    /// Detect an audio stream.
    ///
    /// Fail-open: when the prober is missing or the query cannot run,
    /// assume audio is present. The muxer maps audio optionally, so a false
    /// positive is harmless while a false negative silently drops sound.
    pub fn has_audio_stream(&self, path: &Path) -> bool {
        let Some(ffprobe) = self.ffprobe.as_ref() else {
            return true;
        };
        let spec = CommandSpec::new(ffprobe, audio_args(path));
        match self.runner.run(&spec) {
            Ok(out) => out.success() && out.stdout.contains("audio"),
            Err(e) => {
                warn!("Audio probe failed for {}: {}", path.display(), e);
                true
            }
        }
    }

    /// Check that a produced file is playable: the prober must report a
    /// parseable duration within the configured timeout.
    ///
    /// Without a prober this degrades to an exists-and-nonempty check.
    pub fn verify_integrity(&self, path: &Path) -> bool {
        let Some(ffprobe) = self.ffprobe.as_ref() else {
            warn!(
                "ffprobe unavailable; size check only for {}",
                path.display()
            );
            return std::fs::metadata(path).map(|m| m.len() > 0).unwrap_or(false);
        };
        let spec = CommandSpec::new(ffprobe, duration_args(path))
            .with_timeout(Duration::from_secs(self.settings.integrity_timeout_secs));
        match self.runner.run(&spec) {
            Ok(out) => out.success() && out.stdout.trim().parse::<f64>().is_ok(),
            Err(e) => {
                warn!("Integrity probe failed for {}: {}", path.display(), e);
                false
            }
        }
    }

    fn require_ffprobe(&self) -> AlphaCutResult<&PathBuf> {
        self.ffprobe
            .as_ref()
            .ok_or_else(|| AlphaCutError::ToolNotFound {
                tool: "ffprobe".to_string(),
            })
    }
}

fn geometry_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "v:0".to_string(),
        "-show_entries".to_string(),
        "stream=width,height,r_frame_rate,nb_frames".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        path.display().to_string(),
    ]
}

fn duration_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-show_entries".to_string(),
        "format=duration".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        path.display().to_string(),
    ]
}

fn audio_args(path: &Path) -> Vec<String> {
    vec![
        "-v".to_string(),
        "error".to_string(),
        "-select_streams".to_string(),
        "a".to_string(),
        "-show_entries".to_string(),
        "stream=codec_type".to_string(),
        "-of".to_string(),
        "csv=p=0".to_string(),
        path.display().to_string(),
    ]
}

/// Parse a rational rate like `30000/1001`, or a plain number
fn parse_rate(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if let Some((num, den)) = raw.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        raw.parse().ok()
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, path: &Path, what: &str) -> AlphaCutResult<T> {
    raw.trim()
        .parse::<T>()
        .map_err(|_| AlphaCutError::OpenError {
            path: path.display().to_string(),
            reason: format!("invalid {what}: {raw}"),
        })
}

fn first_nonempty_line(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}
