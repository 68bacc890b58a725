//! Final container muxing

use crate::config::EncoderSettings;
use crate::error::{AlphaCutError, AlphaCutResult};
use crate::exec::{CommandRunner, CommandSpec};
use crate::planner::OutputParams;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Zero-padded frame pattern within the intermediate directory
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// Encodes the intermediate frame sequence, plus the source audio when
/// present, into the final alpha-preserving container
pub struct Muxer {
    ffmpeg: PathBuf,
    runner: Arc<dyn CommandRunner>,
    settings: EncoderSettings,
}

impl Muxer {
    pub fn new(
        ffmpeg: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
        settings: EncoderSettings,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            runner,
            settings,
        }
    }

    /// Build the encoder argument list.
    ///
    /// The sequence is read at the original rate so frames stay 1:1 with
    /// the source; `-r` on the output side is what drops temporal
    /// resolution. The audio map is optional (`1:a:0?`) so a probe false
    /// positive cannot fail the mux.
    pub fn build_args(
        &self,
        frames_dir: &Path,
        source: &Path,
        output: &Path,
        params: &OutputParams,
        has_audio: bool,
    ) -> Vec<String> {
        let pattern = frames_dir.join(FRAME_PATTERN);
        let mut args = vec![
            "-y".to_string(),
            "-framerate".to_string(),
            format!("{}", params.original_fps),
            "-i".to_string(),
            pattern.display().to_string(),
        ];
        if has_audio {
            args.push("-i".to_string());
            args.push(source.display().to_string());
        }
        if params.resolution_adjusted() {
            args.push("-vf".to_string());
            args.push(format!("scale={}:{}", params.width, params.height));
        }
        args.push("-r".to_string());
        args.push(format!("{}", params.fps));
        args.extend([
            "-c:v".to_string(),
            self.settings.video_codec.clone(),
            "-profile:v".to_string(),
            self.settings.profile.clone(),
            "-pix_fmt".to_string(),
            self.settings.pix_fmt.clone(),
            "-q:v".to_string(),
            self.settings.quality.to_string(),
        ]);
        if has_audio {
            args.extend([
                "-c:a".to_string(),
                self.settings.audio_codec.clone(),
                "-b:a".to_string(),
                format!("{}k", self.settings.audio_bitrate_kbps),
                "-map".to_string(),
                "0:v:0".to_string(),
                "-map".to_string(),
                "1:a:0?".to_string(),
                "-shortest".to_string(),
            ]);
        }
        args.push(output.display().to_string());
        args
    }

    /// Run the mux; a non-zero exit surfaces as an encode failure carrying
    /// the tool's diagnostics
    pub fn mux(
        &self,
        frames_dir: &Path,
        source: &Path,
        output: &Path,
        params: &OutputParams,
        has_audio: bool,
    ) -> AlphaCutResult<()> {
        let args = self.build_args(frames_dir, source, output, params, has_audio);
        debug!("Muxing: {} {}", self.ffmpeg.display(), args.join(" "));

        let result = self.runner.run(&CommandSpec::new(&self.ffmpeg, args))?;
        if !result.success() {
            return Err(AlphaCutError::EncodeError {
                message: result.stderr.trim().to_string(),
            });
        }

        info!("Wrote {}", output.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::RunOutput;

    struct NullRunner;

    impl CommandRunner for NullRunner {
        fn run(&self, _spec: &CommandSpec) -> AlphaCutResult<RunOutput> {
            Ok(RunOutput {
                status_code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            })
        }
    }

    fn muxer() -> Muxer {
        Muxer::new("ffmpeg", Arc::new(NullRunner), EncoderSettings::default())
    }

    #[test]
    fn test_build_args_silent_passthrough() {
        let params = OutputParams::passthrough(1920, 1080, 30.0);
        let args = muxer().build_args(
            Path::new("/tmp/frames"),
            Path::new("in.mp4"),
            Path::new("out.mov"),
            &params,
            false,
        );
        assert_eq!(
            args,
            vec![
                "-y",
                "-framerate",
                "30",
                "-i",
                "/tmp/frames/frame_%06d.png",
                "-r",
                "30",
                "-c:v",
                "prores_ks",
                "-profile:v",
                "4444",
                "-pix_fmt",
                "yuva444p10le",
                "-q:v",
                "10",
                "out.mov",
            ]
        );
    }

    #[test]
    fn test_build_args_maps_audio_from_source() {
        let params = OutputParams::passthrough(1280, 720, 24.0);
        let args = muxer().build_args(
            Path::new("/tmp/frames"),
            Path::new("in.mp4"),
            Path::new("out.mov"),
            &params,
            true,
        );
        let joined = args.join(" ");
        assert!(joined.contains("-i in.mp4"));
        assert!(joined.contains("-c:a aac -b:a 192k"));
        assert!(joined.contains("-map 0:v:0 -map 1:a:0?"));
        assert!(joined.contains("-shortest"));
    }

    #[test]
    fn test_build_args_scales_only_when_adjusted() {
        let mut params = OutputParams::passthrough(3840, 2160, 30.0);
        params.width = 1920;
        params.height = 1080;
        params.is_adjusted = true;
        let args = muxer().build_args(
            Path::new("/tmp/frames"),
            Path::new("in.mp4"),
            Path::new("out.mov"),
            &params,
            false,
        );
        let scale_at = args.iter().position(|a| a == "-vf").unwrap();
        assert_eq!(args[scale_at + 1], "scale=1920:1080");
        let rate_at = args.iter().position(|a| a == "-r").unwrap();
        assert!(scale_at < rate_at);
    }

    #[test]
    fn test_build_args_reads_sequence_at_original_rate() {
        let mut params = OutputParams::passthrough(1920, 1080, 60.0);
        params.fps = 30.0;
        params.is_adjusted = true;
        let args = muxer().build_args(
            Path::new("/tmp/frames"),
            Path::new("in.mp4"),
            Path::new("out.mov"),
            &params,
            false,
        );
        let framerate_at = args.iter().position(|a| a == "-framerate").unwrap();
        assert_eq!(args[framerate_at + 1], "60");
        let rate_at = args.iter().position(|a| a == "-r").unwrap();
        assert_eq!(args[rate_at + 1], "30");
    }
}
