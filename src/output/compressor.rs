//! Best-effort size reduction for finished videos
//!
//! Re-encodes an oversized file down to a size cap. Alpha-preserving runs
//! switch to VP9 in WebM since the lossless 4:4:4 intermediate cannot
//! reach low bitrates; flat runs use H.264 with fast-start at a bitrate
//! back-calculated from the cap. Overwrite mode copies the input to a
//! sibling backup first and only commits after the re-encode passes
//! integrity verification, so the original survives any failure intact.

use crate::config::CompressionSettings;
use crate::error::AlphaCutError;
use crate::exec::{CommandRunner, CommandSpec};
use crate::output::CompressionResult;
use crate::probe::VideoProbe;
use crate::utils;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info, warn};

pub struct Compressor {
    runner: Arc<dyn CommandRunner>,
    ffmpeg: Option<PathBuf>,
    probe: VideoProbe,
    settings: CompressionSettings,
}

impl Compressor {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        ffmpeg: Option<PathBuf>,
        probe: VideoProbe,
        settings: CompressionSettings,
    ) -> Self {
        Self {
            runner,
            ffmpeg,
            probe,
            settings,
        }
    }

    /// Video bitrate in kbps that fills the cap after the safety margin
    /// and the audio track's share, floored at the configured minimum
    pub fn calculate_target_bitrate(&self, duration_seconds: f64, max_size_mb: f64) -> u32 {
        let total_bits = max_size_mb * 1024.0 * 1024.0 * 8.0 * self.settings.safety_margin;
        let audio_bits = self.settings.audio_bitrate_kbps as f64 * 1000.0 * duration_seconds;
        let video_bitrate_kbps = ((total_bits - audio_bits) / duration_seconds / 1000.0) as i64;
        video_bitrate_kbps.max(self.settings.min_video_bitrate_kbps as i64) as u32
    }

    /// Compress only when the file exceeds the cap, overwriting in place
    pub fn compress_if_needed(
        &self,
        input: &Path,
        max_size_mb: f64,
        preserve_alpha: bool,
    ) -> CompressionResult {
        self.compress_video(input, None, max_size_mb, preserve_alpha)
    }

    /// Re-encode `input` so it fits under `max_size_mb`.
    ///
    /// `output` of `None` selects overwrite mode with the backup/restore
    /// protocol; alpha-preserving runs land beside the input as `.webm`
    /// either way. Expected failures are reported through the result, not
    /// raised, and leave the input byte-for-byte untouched.
    pub fn compress_video(
        &self,
        input: &Path,
        output: Option<&Path>,
        max_size_mb: f64,
        preserve_alpha: bool,
    ) -> CompressionResult {
        let input_str = input.display().to_string();

        if !input.exists() {
            return CompressionResult::failed(
                &input_str,
                0.0,
                format!("Input file not found: {}", input_str),
            );
        }

        let original_size_mb = match utils::file_size_mb(input) {
            Ok(size) => size,
            Err(err) => {
                return CompressionResult::failed(
                    &input_str,
                    0.0,
                    format!("Could not read input size: {}", err),
                )
            }
        };

        if original_size_mb <= max_size_mb {
            debug!(
                "{} is {:.1} MB, already within the {:.0} MB cap",
                input_str, original_size_mb, max_size_mb
            );
            return CompressionResult::unchanged(&input_str, original_size_mb);
        }

        let Some(ffmpeg) = self.ffmpeg.clone() else {
            return CompressionResult::failed(
                &input_str,
                original_size_mb,
                "FFmpeg is not available",
            );
        };

        let duration = match self.probe.duration(input) {
            Ok(duration) if duration > 0.0 => duration,
            Ok(_) => {
                return CompressionResult::failed(
                    &input_str,
                    original_size_mb,
                    "Probed duration is not positive",
                )
            }
            Err(err) => {
                return CompressionResult::failed(
                    &input_str,
                    original_size_mb,
                    format!("Could not probe duration: {}", err),
                )
            }
        };

        let target_bitrate_kbps = self.calculate_target_bitrate(duration, max_size_mb);
        let fail = |message: String| {
            let mut result = CompressionResult::failed(&input_str, original_size_mb, message);
            result.target_bitrate_kbps = Some(target_bitrate_kbps);
            result
        };

        // Overwrite mode: secure the original before anything can go wrong
        let backup = if output.is_none() {
            let backup = backup_path_for(input);
            if let Err(err) = fs::copy(input, &backup) {
                return fail(format!("Could not create backup: {}", err));
            }
            debug!("Backed up {} to {}", input_str, backup.display());
            Some(backup)
        } else {
            None
        };

        let staging = match TempDir::new() {
            Ok(dir) => dir,
            Err(err) => {
                restore_backup(backup.as_deref(), input);
                return fail(format!("Could not create staging directory: {}", err));
            }
        };

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "output".to_string());

        let (encode_target, final_output) = match output {
            None if preserve_alpha => (
                staging.path().join(format!("compressed_{}.webm", stem)),
                input.with_extension("webm"),
            ),
            None => (
                staging.path().join(format!("compressed_{}", file_name)),
                input.to_path_buf(),
            ),
            Some(explicit) => {
                let destination = if preserve_alpha {
                    explicit.with_extension("webm")
                } else {
                    explicit.to_path_buf()
                };
                (destination.clone(), destination)
            }
        };

        let args = if preserve_alpha {
            self.build_alpha_args(input, &encode_target)
        } else {
            self.build_flat_args(input, &encode_target, target_bitrate_kbps)
        };
        info!(
            "Compressing {} ({:.1} MB over the {:.0} MB cap) -> {}",
            input_str,
            original_size_mb,
            max_size_mb,
            final_output.display()
        );
        debug!("Encode: {} {}", ffmpeg.display(), args.join(" "));

        let encode_error = match self.runner.run(&CommandSpec::new(&ffmpeg, args)) {
            Ok(result) if result.success() => None,
            Ok(result) => Some(AlphaCutError::EncodeError {
                message: format!(
                    "FFmpeg exited with {:?}: {}",
                    result.status_code,
                    result.stderr.trim()
                ),
            }),
            Err(err) => Some(AlphaCutError::EncodeError {
                message: format!("FFmpeg failed to run: {}", err),
            }),
        };
        if let Some(err) = encode_error {
            remove_if_exists(&encode_target);
            restore_backup(backup.as_deref(), input);
            return fail(err.to_string());
        }

        if !self.probe.verify_integrity(&encode_target) {
            remove_if_exists(&encode_target);
            restore_backup(backup.as_deref(), input);
            return fail(AlphaCutError::IntegrityError {
                path: encode_target.display().to_string(),
            }
            .to_string());
        }

        if encode_target != final_output {
            if let Err(err) = move_file(&encode_target, &final_output) {
                remove_if_exists(&encode_target);
                restore_backup(backup.as_deref(), input);
                return fail(format!("Could not move compressed file into place: {}", err));
            }
        }

        // Moves can cross filesystems, so check the destination too
        if !self.probe.verify_integrity(&final_output) {
            if final_output != input {
                remove_if_exists(&final_output);
            }
            restore_backup(backup.as_deref(), input);
            return fail(AlphaCutError::IntegrityError {
                path: final_output.display().to_string(),
            }
            .to_string());
        }

        let compressed_size_mb = match utils::file_size_mb(&final_output) {
            Ok(size) => size,
            Err(err) => {
                if final_output != input {
                    remove_if_exists(&final_output);
                }
                restore_backup(backup.as_deref(), input);
                return fail(format!("Could not read output size: {}", err));
            }
        };

        let mut surviving_backup = None;
        if let Some(backup) = &backup {
            if let Err(err) = fs::remove_file(backup) {
                warn!("Could not remove backup {}: {}", backup.display(), err);
                surviving_backup = Some(backup.display().to_string());
            }
        }

        info!(
            "Compressed {:.1} MB -> {:.1} MB at {} kbps",
            original_size_mb, compressed_size_mb, target_bitrate_kbps
        );
        CompressionResult {
            success: true,
            input_path: input_str,
            output_path: final_output.display().to_string(),
            original_size_mb,
            compressed_size_mb,
            compression_ratio: compressed_size_mb / original_size_mb,
            target_bitrate_kbps: Some(target_bitrate_kbps),
            error_message: None,
            backup_path: surviving_backup,
        }
    }

    fn build_alpha_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c:v".to_string(),
            "libvpx-vp9".to_string(),
            "-pix_fmt".to_string(),
            "yuva420p".to_string(),
            "-b:v".to_string(),
            self.settings.vp9_bitrate.clone(),
            "-crf".to_string(),
            self.settings.vp9_crf.to_string(),
            "-deadline".to_string(),
            "realtime".to_string(),
            "-cpu-used".to_string(),
            "8".to_string(),
            "-row-mt".to_string(),
            "1".to_string(),
            "-c:a".to_string(),
            "libopus".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.settings.audio_bitrate_kbps),
            output.display().to_string(),
        ]
    }

    fn build_flat_args(&self, input: &Path, output: &Path, bitrate_kbps: u32) -> Vec<String> {
        vec![
            "-y".to_string(),
            "-i".to_string(),
            input.display().to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            "medium".to_string(),
            "-b:v".to_string(),
            format!("{}k", bitrate_kbps),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            format!("{}k", self.settings.audio_bitrate_kbps),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.display().to_string(),
        ]
    }
}

fn backup_path_for(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{}_backup.{}", stem, ext.to_string_lossy()),
        None => format!("{}_backup", stem),
    };
    input.with_file_name(name)
}

/// Rename, falling back to copy-and-remove for cross-filesystem moves
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

fn remove_if_exists(path: &Path) {
    if path.exists() {
        if let Err(err) = fs::remove_file(path) {
            warn!("Could not remove {}: {}", path.display(), err);
        }
    }
}

fn restore_backup(backup: Option<&Path>, destination: &Path) {
    let Some(backup) = backup else { return };
    if !backup.exists() {
        return;
    }
    if let Err(err) = move_file(backup, destination) {
        warn!(
            "Could not restore backup {} over {}: {}",
            backup.display(),
            destination.display(),
            err
        );
    }
}
