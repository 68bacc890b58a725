//! Encoded-size estimation

use crate::config::EncoderSettings;

/// Analytic size model for the alpha-preserving intermediate profile.
///
/// Video size is bits-per-pixel x pixels x frames, audio is a constant
/// bitrate; both converted to MB (1024 * 1024 bytes). The bits-per-pixel
/// constant is an empirical fit for the 4:4:4 profile at the fixed quality
/// level, so the result is an estimate, not a bound; callers apply their
/// own safety margin.
#[derive(Debug, Clone)]
pub struct SizeEstimator {
    bits_per_pixel: f64,
    audio_bitrate_kbps: u32,
}

impl SizeEstimator {
    pub fn new(bits_per_pixel: f64, audio_bitrate_kbps: u32) -> Self {
        Self {
            bits_per_pixel,
            audio_bitrate_kbps,
        }
    }

    pub fn from_settings(settings: &EncoderSettings) -> Self {
        Self::new(settings.bits_per_pixel, settings.audio_bitrate_kbps)
    }

    /// Estimated encoded size in MB for the given parameters
    pub fn estimate(
        &self,
        width: u32,
        height: u32,
        fps: f64,
        duration_seconds: f64,
        include_audio: bool,
    ) -> f64 {
        let bits_per_frame = width as f64 * height as f64 * self.bits_per_pixel;
        let video_bits = bits_per_frame * fps * duration_seconds;
        let mut size_mb = video_bits / 8.0 / 1024.0 / 1024.0;

        if include_audio {
            let audio_bits = self.audio_bitrate_kbps as f64 * 1000.0 * duration_seconds;
            size_mb += audio_bits / 8.0 / 1024.0 / 1024.0;
        }
        size_mb
    }
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self::from_settings(&EncoderSettings::default())
    }
}
