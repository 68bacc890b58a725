//! Command-line argument definitions

use clap::Args;
use clap_num::number_range;

fn size_cap_mb(s: &str) -> Result<u64, String> {
    number_range(s, 1, 1_048_576)
}

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path (default: <stem>_nobg.mov beside the input)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output size cap in MB
    #[arg(long, value_parser = size_cap_mb, default_value = "1024")]
    pub max_size_mb: u64,

    /// Matting model file path
    #[arg(long, env = "ALPHACUT_MODEL")]
    pub model: Option<String>,

    /// Model downsample ratio (0.1-1.0)
    #[arg(long, default_value = "0.5")]
    pub downsample_ratio: f32,

    /// Disable the progress bar
    #[arg(long)]
    pub quiet: bool,
}

/// Arguments for the compress command
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output file path (default: overwrite the input in place)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Size cap in MB
    #[arg(long, value_parser = size_cap_mb, default_value = "1023")]
    pub max_size_mb: u64,

    /// Keep the alpha channel (switches the output to WebM)
    #[arg(long)]
    pub preserve_alpha: bool,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output size cap in MB
    #[arg(long, value_parser = size_cap_mb, default_value = "1024")]
    pub max_size_mb: u64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the inspect command
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Input video file path
    #[arg(short, long)]
    pub input: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
