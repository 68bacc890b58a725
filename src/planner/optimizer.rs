//! Staged parameter reduction against the size budget

use super::estimator::SizeEstimator;
use super::OutputParams;
use crate::config::MattingBudget;
use crate::error::{AlphaCutError, AlphaCutResult};
use tracing::{debug, info};

/// Chooses output parameters that keep the estimated size under the
/// ceiling.
///
/// Reduction is staged cheapest-first: walk the fps candidate list, and
/// only if no candidate fits, shrink resolution by a square-root scale
/// factor with bounded decay. The decay loop is capped; past the cap the
/// smallest parameters reached are returned even if the estimate is still
/// over target.
#[derive(Debug, Clone)]
pub struct ParameterOptimizer {
    estimator: SizeEstimator,
    budget: MattingBudget,
}

impl ParameterOptimizer {
    pub fn new(estimator: SizeEstimator, budget: MattingBudget) -> Self {
        Self { estimator, budget }
    }

    /// The configured size ceiling and reduction strategy
    pub fn budget(&self) -> &MattingBudget {
        &self.budget
    }

    /// Compute output parameters for a source video.
    ///
    /// Only ever reduces fps and resolution, never increases them; returns
    /// the source parameters unchanged when they already fit.
    pub fn optimize(
        &self,
        width: u32,
        height: u32,
        fps: f64,
        duration_seconds: f64,
        include_audio: bool,
    ) -> AlphaCutResult<OutputParams> {
        if duration_seconds <= 0.0 {
            return Err(AlphaCutError::InvalidInput {
                message: "duration must be positive".to_string(),
            });
        }
        if width == 0 || height == 0 || fps <= 0.0 {
            return Err(AlphaCutError::InvalidInput {
                message: format!("invalid source geometry: {width}x{height} @ {fps} fps"),
            });
        }

        let target_mb = self.budget.max_size_mb * self.budget.safety_margin;
        let mut estimated =
            self.estimator
                .estimate(width, height, fps, duration_seconds, include_audio);
        debug!(
            "Estimated {:.1} MB at source parameters, target {:.1} MB",
            estimated, target_mb
        );
        if estimated <= target_mb {
            return Ok(OutputParams::passthrough(width, height, fps));
        }

        // Stage 1: frame rate. Candidates are descending; only ever reduce.
        let mut current_fps = fps;
        for &candidate in &self.budget.fps_candidates {
            if current_fps > candidate {
                current_fps = candidate;
                estimated = self.estimator.estimate(
                    width,
                    height,
                    current_fps,
                    duration_seconds,
                    include_audio,
                );
                if estimated <= target_mb {
                    info!(
                        "Reduced fps {} -> {} ({:.1} MB fits)",
                        fps, current_fps, estimated
                    );
                    return Ok(OutputParams {
                        width,
                        height,
                        fps: current_fps,
                        original_width: width,
                        original_height: height,
                        original_fps: fps,
                        is_adjusted: true,
                    });
                }
            }
        }

        // Stage 2: resolution, scaled from the original dimensions each
        // iteration so rounding does not compound.
        let mut scale = (target_mb / estimated)
            .sqrt()
            .clamp(self.budget.min_scale, 1.0);
        let (mut new_width, mut new_height) = scaled_even(width, height, scale);
        for _ in 0..self.budget.max_iterations {
            estimated = self.estimator.estimate(
                new_width,
                new_height,
                current_fps,
                duration_seconds,
                include_audio,
            );
            if estimated <= target_mb {
                break;
            }
            scale = (scale * self.budget.scale_decay).max(self.budget.min_scale);
            (new_width, new_height) = scaled_even(width, height, scale);
        }

        info!(
            "Reduced {}x{} @ {} fps -> {}x{} @ {} fps (estimate {:.1} MB)",
            width, height, fps, new_width, new_height, current_fps, estimated
        );
        Ok(OutputParams {
            width: new_width,
            height: new_height,
            fps: current_fps,
            original_width: width,
            original_height: height,
            original_fps: fps,
            is_adjusted: true,
        })
    }
}

/// Scale both dimensions, rounding down to even and never below 2
fn scaled_even(width: u32, height: u32, scale: f64) -> (u32, u32) {
    (
        even_floor(width as f64 * scale),
        even_floor(height as f64 * scale),
    )
}

fn even_floor(value: f64) -> u32 {
    (((value / 2.0).floor() as u32) * 2).max(2)
}
