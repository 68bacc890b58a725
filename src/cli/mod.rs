//! CLI module for AlphaCut
//!
//! This module handles command-line argument parsing and command execution.

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// AlphaCut video background removal
///
/// A command-line tool that strips the background from videos using a
/// recurrent matting model, producing alpha-capable output sized to fit
/// a configurable cap.
#[derive(Parser)]
#[command(name = "alphacut")]
#[command(about = "AlphaCut - video background removal with transparent output")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Remove the background from a video
    Process(args::ProcessArgs),
    /// Re-encode a finished video down to a size cap
    Compress(args::CompressArgs),
    /// Show the output parameters the size planner would pick
    Plan(args::PlanArgs),
    /// Inspect video file information
    Inspect(args::InspectArgs),
}
