//! Integration tests for post-hoc size reduction
//!
//! The encoder and prober are scripted, so these exercise the real
//! filesystem protocol: backup, staged encode, verification, commit, and
//! rollback on every failure path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use alphacut::config::{CompressionSettings, ProbeSettings};
use alphacut::error::AlphaCutResult;
use alphacut::exec::{CommandRunner, CommandSpec, RunOutput};
use alphacut::output::Compressor;
use alphacut::probe::VideoProbe;

type Handler = Box<dyn Fn(&CommandSpec) -> AlphaCutResult<RunOutput> + Send + Sync>;

struct FakeRunner {
    handler: Handler,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeRunner {
    fn new(handler: Handler) -> Arc<Self> {
        Arc::new(Self {
            handler,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    fn encode_calls(&self) -> Vec<CommandSpec> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) == Some("-y"))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, spec: &CommandSpec) -> AlphaCutResult<RunOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        (self.handler)(spec)
    }
}

fn ok_output(stdout: &str) -> AlphaCutResult<RunOutput> {
    Ok(RunOutput {
        status_code: Some(0),
        stdout: stdout.to_string(),
        stderr: String::new(),
    })
}

fn exit_with(code: i32, stderr: &str) -> AlphaCutResult<RunOutput> {
    Ok(RunOutput {
        status_code: Some(code),
        stdout: String::new(),
        stderr: stderr.to_string(),
    })
}

/// Encoder double that writes `encoded_len` bytes to the output path and
/// reports a 9.5 s duration to every probe
fn working_tools(encoded_len: usize) -> Handler {
    Box::new(move |spec| {
        if spec.args.first().map(String::as_str) == Some("-y") {
            let output = spec.args.last().unwrap();
            fs::write(output, vec![0u8; encoded_len]).unwrap();
            ok_output("")
        } else {
            ok_output("9.5\n")
        }
    })
}

fn compressor_with(runner: Arc<FakeRunner>, ffmpeg: Option<&str>) -> Compressor {
    let probe = VideoProbe::new(
        runner.clone(),
        Some(PathBuf::from("ffprobe")),
        ProbeSettings::default(),
    );
    Compressor::new(
        runner,
        ffmpeg.map(PathBuf::from),
        probe,
        CompressionSettings::default(),
    )
}

/// 2 MB payload with a recognizable pattern so rollbacks can be checked
/// byte for byte
fn write_oversized(path: &Path) -> Vec<u8> {
    let payload: Vec<u8> = (0..2 * 1024 * 1024).map(|i| (i % 251) as u8).collect();
    fs::write(path, &payload).unwrap();
    payload
}

// No-op paths

#[test]
fn test_missing_input_reports_failure_without_side_effects() {
    let runner = FakeRunner::new(Box::new(|_| ok_output("")));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_video(Path::new("/nonexistent/clip.mov"), None, 10.0, false);
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("not found"));
    assert!(runner.calls().is_empty());
}

#[test]
fn test_file_within_cap_is_left_alone() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    fs::write(&input, vec![7u8; 1024]).unwrap();

    let runner = FakeRunner::new(Box::new(|_| ok_output("")));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 10.0, false);
    assert!(result.success);
    assert_eq!(result.compression_ratio, 1.0);
    assert_eq!(result.output_path, input.display().to_string());
    assert!(result.error_message.is_none());
    assert_eq!(fs::read(&input).unwrap(), vec![7u8; 1024]);
    assert!(runner.calls().is_empty());
}

#[test]
fn test_compress_if_needed_skips_small_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    fs::write(&input, b"tiny").unwrap();

    let runner = FakeRunner::new(Box::new(|_| ok_output("")));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_if_needed(&input, 1024.0, true);
    assert!(result.success);
    assert_eq!(result.compression_ratio, 1.0);
    assert!(runner.calls().is_empty());
}

#[test]
fn test_missing_ffmpeg_fails_before_any_probe() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    write_oversized(&input);

    let runner = FakeRunner::new(Box::new(|_| ok_output("9.5\n")));
    let compressor = compressor_with(runner.clone(), None);

    let result = compressor.compress_video(&input, None, 1.0, false);
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("FFmpeg"));
    assert!(runner.calls().is_empty());
}

// Bitrate calculation

#[test]
fn test_target_bitrate_back_calculation() {
    let runner = FakeRunner::new(Box::new(|_| ok_output("")));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    // 10 MB cap, 5 s: (10 * 1024^2 * 8 * 0.95 - 128000 * 5) / 5 / 1000
    assert_eq!(compressor.calculate_target_bitrate(5.0, 10.0), 15810);
}

#[test]
fn test_target_bitrate_never_drops_below_floor() {
    let runner = FakeRunner::new(Box::new(|_| ok_output("")));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    // An hour into 1 MB back-calculates negative; the floor wins
    assert_eq!(compressor.calculate_target_bitrate(3600.0, 1.0), 500);
}

// Overwrite mode

#[test]
fn test_overwrite_success_replaces_input_and_removes_backup() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    write_oversized(&input);

    let runner = FakeRunner::new(working_tools(512 * 1024));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 1.0, false);
    assert!(result.success);
    assert_eq!(result.output_path, input.display().to_string());
    assert!((result.original_size_mb - 2.0).abs() < 1e-9);
    assert!((result.compressed_size_mb - 0.5).abs() < 1e-9);
    assert!((result.compression_ratio - 0.25).abs() < 1e-9);
    assert_eq!(result.target_bitrate_kbps, Some(710));
    assert!(result.backup_path.is_none());

    assert_eq!(fs::metadata(&input).unwrap().len(), 512 * 1024);
    assert!(!dir.path().join("clip_backup.mov").exists());

    let encode = &runner.encode_calls()[0];
    let joined = encode.args.join(" ");
    assert!(joined.contains("libx264"));
    assert!(joined.contains("-b:v 710k"));
    assert!(joined.contains("+faststart"));
}

#[test]
fn test_alpha_overwrite_lands_beside_input_as_webm() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);

    let runner = FakeRunner::new(working_tools(512 * 1024));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 1.0, true);
    assert!(result.success);
    let webm = dir.path().join("clip.webm");
    assert_eq!(result.output_path, webm.display().to_string());
    assert_eq!(fs::metadata(&webm).unwrap().len(), 512 * 1024);

    // The lossless original stays in place untouched
    assert_eq!(fs::read(&input).unwrap(), payload);
    assert!(!dir.path().join("clip_backup.mov").exists());

    let encode = &runner.encode_calls()[0];
    let joined = encode.args.join(" ");
    assert!(joined.contains("libvpx-vp9"));
    assert!(joined.contains("yuva420p"));
    assert!(joined.contains("libopus"));
    assert!(encode.args.last().unwrap().ends_with("compressed_clip.webm"));
}

#[test]
fn test_encode_failure_rolls_back_and_keeps_input_intact() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);

    let runner = FakeRunner::new(Box::new(|spec| {
        if spec.args.first().map(String::as_str) == Some("-y") {
            exit_with(1, "boom\n")
        } else {
            ok_output("9.5\n")
        }
    }));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 1.0, false);
    assert!(!result.success);
    let message = result.error_message.as_deref().unwrap();
    assert!(message.contains("boom"));
    assert_eq!(result.target_bitrate_kbps, Some(710));
    assert_eq!(result.output_path, input.display().to_string());

    assert_eq!(fs::read(&input).unwrap(), payload);
    assert!(!dir.path().join("clip_backup.mov").exists());
}

#[test]
fn test_integrity_failure_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);

    // The encode produces a file, but the bounded integrity probe cannot
    // read a duration out of it
    let runner = FakeRunner::new(Box::new(|spec| {
        if spec.args.first().map(String::as_str) == Some("-y") {
            let output = spec.args.last().unwrap();
            fs::write(output, vec![0u8; 1024]).unwrap();
            ok_output("")
        } else if spec.timeout.is_some() {
            ok_output("N/A\n")
        } else {
            ok_output("9.5\n")
        }
    }));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 1.0, false);
    assert!(!result.success);
    assert!(result
        .error_message
        .as_deref()
        .unwrap()
        .contains("integrity"));
    assert_eq!(fs::read(&input).unwrap(), payload);
    assert!(!dir.path().join("clip_backup.mov").exists());
}

// Explicit output mode

#[test]
fn test_explicit_output_never_touches_the_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);
    let output = dir.path().join("out.mov");

    let runner = FakeRunner::new(working_tools(512 * 1024));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    let result = compressor.compress_video(&input, Some(&output), 1.0, false);
    assert!(result.success);
    assert_eq!(result.output_path, output.display().to_string());
    assert_eq!(fs::metadata(&output).unwrap().len(), 512 * 1024);
    assert_eq!(fs::read(&input).unwrap(), payload);
    assert!(!dir.path().join("clip_backup.mov").exists());
}

#[test]
fn test_explicit_alpha_output_swaps_extension_to_webm() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    write_oversized(&input);
    let output = dir.path().join("out.mov");

    let runner = FakeRunner::new(working_tools(512 * 1024));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    let result = compressor.compress_video(&input, Some(&output), 1.0, true);
    assert!(result.success);
    let webm = dir.path().join("out.webm");
    assert_eq!(result.output_path, webm.display().to_string());
    assert!(webm.exists());
    assert!(!output.exists());
}

#[test]
fn test_explicit_mode_encode_failure_cleans_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);
    let output = dir.path().join("out.mov");

    // The encoder dies after writing part of the file
    let runner = FakeRunner::new(Box::new(|spec| {
        if spec.args.first().map(String::as_str) == Some("-y") {
            let target = spec.args.last().unwrap();
            fs::write(target, b"partial").unwrap();
            exit_with(1, "disk full\n")
        } else {
            ok_output("9.5\n")
        }
    }));
    let compressor = compressor_with(runner, Some("ffmpeg"));

    let result = compressor.compress_video(&input, Some(&output), 1.0, false);
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("disk full"));
    assert!(!output.exists());
    assert_eq!(fs::read(&input).unwrap(), payload);
}

#[test]
fn test_unparseable_duration_fails_before_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("clip.mov");
    let payload = write_oversized(&input);

    let runner = FakeRunner::new(Box::new(|_| ok_output("N/A\n")));
    let compressor = compressor_with(runner.clone(), Some("ffmpeg"));

    let result = compressor.compress_video(&input, None, 1.0, false);
    assert!(!result.success);
    assert!(result.error_message.as_deref().unwrap().contains("duration"));
    assert!(runner.encode_calls().is_empty());
    assert_eq!(fs::read(&input).unwrap(), payload);
    assert!(!dir.path().join("clip_backup.mov").exists());
}
