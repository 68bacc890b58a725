//! External tool discovery
//!
//! Resolution order mirrors a portable install: a bundled `ffmpeg/`
//! directory beside the executable wins over whatever is on PATH.

use super::runner::hidden_command;
use crate::error::{AlphaCutError, AlphaCutResult};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::debug;

/// Locate the ffmpeg binary.
///
/// Checks the bundled directory first, then verifies a PATH install by
/// running `ffmpeg -version`.
pub fn find_ffmpeg() -> AlphaCutResult<PathBuf> {
    if let Some(bundled) = bundled_tool("ffmpeg") {
        debug!("Using bundled ffmpeg at {}", bundled.display());
        return Ok(bundled);
    }
    if tool_runs("ffmpeg") {
        debug!("Using ffmpeg from PATH");
        return Ok(PathBuf::from("ffmpeg"));
    }
    Err(AlphaCutError::ToolNotFound {
        tool: "ffmpeg".to_string(),
    })
}

/// Locate the ffprobe binary.
///
/// ffprobe normally ships beside ffmpeg, so a resolved ffmpeg path is the
/// best hint; falls back to the bundled directory and PATH. Returns `None`
/// instead of failing because probing degrades gracefully without it.
pub fn find_ffprobe(ffmpeg: Option<&Path>) -> Option<PathBuf> {
    if let Some(ffmpeg) = ffmpeg {
        if let Some(dir) = ffmpeg.parent() {
            if !dir.as_os_str().is_empty() {
                for name in ["ffprobe", "ffprobe.exe"] {
                    let candidate = dir.join(name);
                    if candidate.is_file() {
                        debug!("Using ffprobe beside ffmpeg at {}", candidate.display());
                        return Some(candidate);
                    }
                }
            }
        }
    }
    if let Some(bundled) = bundled_tool("ffprobe") {
        debug!("Using bundled ffprobe at {}", bundled.display());
        return Some(bundled);
    }
    if tool_runs("ffprobe") {
        debug!("Using ffprobe from PATH");
        return Some(PathBuf::from("ffprobe"));
    }
    None
}

fn bundled_tool(name: &str) -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let dir = exe.parent()?.join("ffmpeg");
    for candidate in [format!("{name}.exe"), name.to_string()] {
        let path = dir.join(candidate);
        if path.is_file() {
            return Some(path);
        }
    }
    None
}

fn tool_runs(name: &str) -> bool {
    hidden_command(Path::new(name))
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}
