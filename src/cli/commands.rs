//! Command implementations

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::cli::args::{CompressArgs, InspectArgs, PlanArgs, ProcessArgs};
use crate::config::AppConfig;
use crate::exec::{find_ffmpeg, find_ffprobe, CommandRunner, SystemRunner};
use crate::output::{CompressionResult, Compressor};
use crate::planner::{OutputParams, ParameterOptimizer, SizeEstimator};
use crate::probe::{VideoInfo, VideoProbe};
use crate::utils;

/// Execute the process command
pub fn process(args: ProcessArgs, config: &AppConfig) -> Result<()> {
    info!("Starting process operation");
    info!("Input: {}", args.input);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", args.input));
    }
    if !utils::is_supported_video(input) {
        return Err(anyhow::anyhow!(
            "Unsupported format: {} (expected one of {})",
            args.input,
            utils::SUPPORTED_INPUT_EXTENSIONS.join(", ")
        ));
    }

    run_matting(&args, config)
}

#[cfg(feature = "onnx")]
fn run_matting(args: &ProcessArgs, config: &AppConfig) -> Result<()> {
    use crate::decode::FfmpegDecoderFactory;
    use crate::engine::{MattingPipeline, Muxer};
    use crate::model::RvmSession;
    use indicatif::{ProgressBar, ProgressStyle};
    use tracing::warn;

    let model_path = args.model.as_deref().ok_or_else(|| {
        anyhow::anyhow!("No model file given; pass --model or set ALPHACUT_MODEL")
    })?;
    let input = Path::new(&args.input);

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ffmpeg = find_ffmpeg().context("FFmpeg is required for decoding and muxing")?;
    let ffprobe = find_ffprobe(Some(&ffmpeg));
    let probe = VideoProbe::new(runner.clone(), ffprobe.clone(), config.probe.clone());

    let mut budget = config.matting.clone();
    budget.max_size_mb = args.max_size_mb as f64;
    let optimizer = ParameterOptimizer::new(SizeEstimator::from_settings(&config.encoder), budget);

    let model = RvmSession::load(Path::new(model_path))
        .context("Failed to load matting model")?
        .with_downsample_ratio(args.downsample_ratio);
    let muxer = Muxer::new(&ffmpeg, runner.clone(), config.encoder.clone());
    let decoder_factory = FfmpegDecoderFactory::new(&ffmpeg);

    let mut pipeline = MattingPipeline::new(
        probe,
        optimizer,
        Box::new(decoder_factory),
        Box::new(model),
        muxer,
    );

    let output = args.output.as_deref().map(Path::new);
    let produced = if args.quiet {
        pipeline.process(input, output, None, None)?
    } else {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} frames ({eta})")?;
        bar.set_style(style.progress_chars("##-"));
        let sink = |done: u64, total: u64| {
            if bar.length() != Some(total) {
                bar.set_length(total);
            }
            bar.set_position(done);
        };
        let result = pipeline.process(input, output, None, Some(&sink));
        bar.finish_and_clear();
        result?
    };

    let size_mb = utils::file_size_mb(&produced)?;
    info!("Matting completed: {} ({:.1} MB)", produced.display(), size_mb);

    // The planner works from an estimate, so the finished file can still
    // land over the cap; reduce it in place when it does
    let probe = VideoProbe::new(runner.clone(), ffprobe, config.probe.clone());
    let compressor = Compressor::new(runner, Some(ffmpeg), probe, config.compression.clone());
    let result = compressor.compress_if_needed(&produced, args.max_size_mb as f64, true);
    if !result.success {
        warn!(
            "Size cap compression failed: {}",
            result.error_message.as_deref().unwrap_or("unknown error")
        );
        println!("Output: {}", produced.display());
    } else {
        if result.compression_ratio < 1.0 {
            info!(
                "Compressed output to {:.1} MB as {}",
                result.compressed_size_mb, result.output_path
            );
        }
        println!("Output: {}", result.output_path);
    }

    info!("Process operation completed successfully");
    Ok(())
}

#[cfg(not(feature = "onnx"))]
fn run_matting(_args: &ProcessArgs, _config: &AppConfig) -> Result<()> {
    Err(anyhow::anyhow!(
        "This build does not include the matting runtime; rebuild with --features onnx"
    ))
}

/// Execute the compress command
pub fn compress(args: CompressArgs, config: &AppConfig) -> Result<()> {
    info!("Starting compress operation");
    info!("Input: {}", args.input);
    info!("Size cap: {} MB", args.max_size_mb);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", args.input));
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ffmpeg = find_ffmpeg().ok();
    let ffprobe = find_ffprobe(ffmpeg.as_deref());
    let probe = VideoProbe::new(runner.clone(), ffprobe, config.probe.clone());
    let compressor = Compressor::new(runner, ffmpeg, probe, config.compression.clone());

    let output = args.output.as_deref().map(Path::new);
    let result =
        compressor.compress_video(input, output, args.max_size_mb as f64, args.preserve_alpha);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize compression result to JSON")?;
        println!("{}", json);
    } else {
        display_compression_result(&result);
    }

    if result.success {
        info!("Compress operation completed successfully");
        Ok(())
    } else {
        let message = result
            .error_message
            .unwrap_or_else(|| "unknown error".to_string());
        error!("Compression failed: {}", message);
        Err(anyhow::anyhow!("Compression failed: {}", message))
    }
}

/// Execute the plan command
pub fn plan(args: PlanArgs, config: &AppConfig) -> Result<()> {
    info!("Starting plan operation");
    info!("Input: {}", args.input);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", args.input));
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ffmpeg = find_ffmpeg().ok();
    let ffprobe = find_ffprobe(ffmpeg.as_deref());
    let probe = VideoProbe::new(runner, ffprobe, config.probe.clone());
    let info = probe
        .probe(input)
        .context("Failed to probe input file")?;

    let estimator = SizeEstimator::from_settings(&config.encoder);
    let mut budget = config.matting.clone();
    budget.max_size_mb = args.max_size_mb as f64;
    let optimizer = ParameterOptimizer::new(estimator.clone(), budget);
    let params = optimizer
        .optimize(info.width, info.height, info.fps, info.duration, info.has_audio)
        .context("Failed to plan output parameters")?;
    let estimated_mb =
        estimator.estimate(params.width, params.height, params.fps, info.duration, info.has_audio);

    if args.json {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "info": info,
            "params": params,
            "estimated_size_mb": estimated_mb,
            "max_size_mb": args.max_size_mb,
        }))
        .context("Failed to serialize plan to JSON")?;
        println!("{}", json);
    } else {
        display_plan(&info, &params, estimated_mb, args.max_size_mb);
    }

    info!("Plan operation completed successfully");
    Ok(())
}

/// Execute the inspect command
pub fn inspect(args: InspectArgs, config: &AppConfig) -> Result<()> {
    info!("Starting inspect operation");
    info!("Input: {}", args.input);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", args.input));
    }

    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let ffmpeg = find_ffmpeg().ok();
    let ffprobe = find_ffprobe(ffmpeg.as_deref());
    let probe = VideoProbe::new(runner, ffprobe, config.probe.clone());
    let info = probe
        .probe(input)
        .context("Failed to inspect input file")?;
    let size_mb = utils::file_size_mb(input)?;

    if args.json {
        let json = serde_json::to_string_pretty(&info)
            .context("Failed to serialize video info to JSON")?;
        println!("{}", json);
    } else {
        display_video_info(&args.input, &info, size_mb);
    }

    info!("Inspect operation completed successfully");
    Ok(())
}

/// Display video information in human-readable format
fn display_video_info(path: &str, info: &VideoInfo, size_mb: f64) {
    println!("Video Information");
    println!("=================");
    println!("File: {}", path);
    println!("Resolution: {}x{}", info.width, info.height);
    println!("Frame Rate: {:.2} fps", info.fps);
    println!("Frames: {}", info.frame_count);
    println!("Duration: {}", utils::format_duration(info.duration));
    println!("Audio: {}", if info.has_audio { "yes" } else { "no" });
    println!("File Size: {:.1} MB", size_mb);
}

/// Display the planned output parameters in human-readable format
fn display_plan(info: &VideoInfo, params: &OutputParams, estimated_mb: f64, max_size_mb: u64) {
    println!("Output Plan");
    println!("===========");
    println!(
        "Source: {}x{} @ {:.2} fps, {}",
        info.width,
        info.height,
        info.fps,
        utils::format_duration(info.duration)
    );
    println!(
        "Planned: {}x{} @ {:.2} fps{}",
        params.width,
        params.height,
        params.fps,
        if params.is_adjusted { " (adjusted)" } else { "" }
    );
    println!("Estimated Size: {:.1} MB (cap {} MB)", estimated_mb, max_size_mb);
}

/// Display compression results in human-readable format
fn display_compression_result(result: &CompressionResult) {
    println!("Compression Results");
    println!("===================");
    println!("Success: {}", if result.success { "✓" } else { "✗" });
    println!("Input: {}", result.input_path);
    println!("Output: {}", result.output_path);
    println!(
        "Size: {:.1} MB -> {:.1} MB (ratio {:.2})",
        result.original_size_mb, result.compressed_size_mb, result.compression_ratio
    );
    if let Some(bitrate) = result.target_bitrate_kbps {
        println!("Target Bitrate: {} kbps", bitrate);
    }
    if let Some(error) = &result.error_message {
        println!("Error: {}", error);
    }
    if let Some(backup) = &result.backup_path {
        println!("Backup: {}", backup);
    }
}
