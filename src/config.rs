//! Configuration for size budgets, encoder profiles, and probing
//!
//! Every numeric constant the pipeline depends on lives here so callers and
//! tests can override them per-case instead of patching globals. Defaults
//! match the shipped behavior; a TOML file can override any subset.

use crate::error::{AlphaCutError, AlphaCutResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file name looked up in the working directory when none is given
const DEFAULT_CONFIG_FILE: &str = "alphacut.toml";

/// Size budget and staged-reduction strategy for the matting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MattingBudget {
    /// Hard output size ceiling in MB
    pub max_size_mb: f64,
    /// Multiplicative discount on the ceiling absorbing estimation error
    pub safety_margin: f64,
    /// Descending fps candidates tried before touching resolution
    pub fps_candidates: Vec<f64>,
    /// Lowest allowed resolution scale factor
    pub min_scale: f64,
    /// Scale decay applied while the estimate stays over target
    pub scale_decay: f64,
    /// Iteration cap for the resolution decay loop
    pub max_iterations: u32,
}

impl Default for MattingBudget {
    fn default() -> Self {
        Self {
            max_size_mb: 1024.0,
            safety_margin: 0.95,
            fps_candidates: vec![30.0, 24.0],
            min_scale: 0.1,
            scale_decay: 0.95,
            max_iterations: 10,
        }
    }
}

/// Intermediate-profile encoder constants for the alpha-preserving output
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSettings {
    /// Empirical bits per pixel per frame for the 4:4:4 alpha profile
    pub bits_per_pixel: f64,
    /// Audio bitrate muxed into the final container, kbps
    pub audio_bitrate_kbps: u32,
    /// Video codec name
    pub video_codec: String,
    /// Codec profile selector
    pub profile: String,
    /// Pixel format carrying the alpha plane
    pub pix_fmt: String,
    /// Encoder quality level
    pub quality: u32,
    /// Audio codec name
    pub audio_codec: String,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            bits_per_pixel: 0.8,
            audio_bitrate_kbps: 192,
            video_codec: "prores_ks".to_string(),
            profile: "4444".to_string(),
            pix_fmt: "yuva444p10le".to_string(),
            quality: 10,
            audio_codec: "aac".to_string(),
        }
    }
}

/// Constants for the post-hoc compression pass
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionSettings {
    /// Default size ceiling when the caller does not supply one, MB
    pub default_max_size_mb: f64,
    /// Audio bitrate for the re-encode, kbps
    pub audio_bitrate_kbps: u32,
    /// Discount on the ceiling when back-calculating the video bitrate
    pub safety_margin: f64,
    /// Floor below which the video bitrate is never pushed, kbps
    pub min_video_bitrate_kbps: u32,
    /// Nominal VP9 bitrate for alpha-preserving re-encodes
    pub vp9_bitrate: String,
    /// VP9 constant-rate-factor for alpha-preserving re-encodes
    pub vp9_crf: u32,
}

impl Default for CompressionSettings {
    fn default() -> Self {
        Self {
            default_max_size_mb: 1023.0,
            audio_bitrate_kbps: 128,
            safety_margin: 0.95,
            min_video_bitrate_kbps: 500,
            vp9_bitrate: "2M".to_string(),
            vp9_crf: 35,
        }
    }
}

/// Probe behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Upper bound on integrity-check probe calls, seconds
    pub integrity_timeout_secs: u64,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            integrity_timeout_secs: 30,
        }
    }
}

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matting: MattingBudget,
    pub encoder: EncoderSettings,
    pub compression: CompressionSettings,
    pub probe: ProbeSettings,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> AlphaCutResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AlphaCutError::ConfigError {
            message: format!("cannot read {}: {}", path.display(), e),
        })?;
        toml::from_str(&text).map_err(|e| AlphaCutError::ConfigError {
            message: format!("cannot parse {}: {}", path.display(), e),
        })
    }

    /// Load an explicit config file, or `alphacut.toml` from the working
    /// directory if present, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> AlphaCutResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_budget_constants() {
        let budget = MattingBudget::default();
        assert_eq!(budget.max_size_mb, 1024.0);
        assert_eq!(budget.safety_margin, 0.95);
        assert_eq!(budget.fps_candidates, vec![30.0, 24.0]);
        assert_eq!(budget.max_iterations, 10);
    }

    #[test]
    fn test_default_compression_constants() {
        let settings = CompressionSettings::default();
        assert_eq!(settings.default_max_size_mb, 1023.0);
        assert_eq!(settings.audio_bitrate_kbps, 128);
        assert_eq!(settings.min_video_bitrate_kbps, 500);
    }

    #[test]
    fn test_partial_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alphacut.toml");
        std::fs::write(
            &path,
            "[matting]\nmax_size_mb = 512.0\n\n[compression]\nsafety_margin = 0.9\n",
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.matting.max_size_mb, 512.0);
        assert_eq!(config.matting.safety_margin, 0.95);
        assert_eq!(config.compression.safety_margin, 0.9);
        assert_eq!(config.encoder.video_codec, "prores_ks");
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[matting\nmax_size_mb = oops").unwrap();
        let err = AppConfig::load(&path).unwrap_err();
        assert!(matches!(err, AlphaCutError::ConfigError { .. }));
    }
}
