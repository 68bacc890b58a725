//! AlphaCut
//!
//! A command-line tool that removes video backgrounds using a recurrent
//! matting model, producing alpha-capable output sized to a configurable
//! cap.
//!
//! # Features
//!
//! - Recurrent matting with per-video state reset
//! - Staged size planning (frame rate first, then resolution)
//! - Lossless-alpha ProRes 4444 output with optional source audio
//! - Best-effort post-hoc compression with backup and rollback
//!
//! # Usage
//!
//! ```bash
//! alphacut process --input video.mp4 --model rvm_mobilenetv3.onnx
//! alphacut compress --input video_nobg.mov --max-size-mb 1023
//! alphacut plan --input video.mp4
//! alphacut inspect --input video.mp4
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use alphacut::cli::{commands, Cli, Commands};
use alphacut::config::AppConfig;

/// Main entry point for the AlphaCut CLI application
fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting AlphaCut");

    // Parse command line arguments
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(cli.config.as_deref().map(Path::new))?;

    // Execute the requested command
    match cli.command {
        Commands::Process(args) => {
            info!("Executing process command");
            commands::process(args, &config)?;
        }
        Commands::Compress(args) => {
            info!("Executing compress command");
            commands::compress(args, &config)?;
        }
        Commands::Plan(args) => {
            info!("Executing plan command");
            commands::plan(args, &config)?;
        }
        Commands::Inspect(args) => {
            info!("Executing inspect command");
            commands::inspect(args, &config)?;
        }
    }

    info!("AlphaCut completed successfully");
    Ok(())
}
