//! Repeated repack passes with a tightening policy until a size target is met

use crate::error::{ConfigError, Result};
use crate::repack::{file_size, persist, staged_size, Repacker};
use crate::types::{ImageTransformPolicy, PassSummary, RepackReport, SizeOutcome};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, warn};

/// How the policy is tightened between passes, and where it stops
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TighteningSchedule {
    /// Quality points removed per pass
    pub quality_step: u8,

    /// Quality never drops below this
    pub quality_floor: u8,

    /// Multiplier applied to both maximum dimensions per pass, in (0, 1)
    pub dimension_factor: f64,

    /// Maximum width never drops below this
    pub min_width: u32,

    /// Maximum height never drops below this
    pub min_height: u32,

    /// Hard cap on passes, including the first
    pub max_passes: usize,
}

impl Default for TighteningSchedule {
    fn default() -> Self {
        Self {
            quality_step: 10,
            quality_floor: 30,
            dimension_factor: 0.8,
            min_width: 600,
            min_height: 800,
            max_passes: 8,
        }
    }
}

impl TighteningSchedule {
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.quality_step == 0 && self.dimension_factor >= 1.0 {
            return Err(ConfigError::Invalid(
                "tightening schedule never reduces quality or dimensions".to_string(),
            ));
        }
        if !(1..=100).contains(&self.quality_floor) {
            return Err(ConfigError::Invalid(format!(
                "quality floor must be between 1 and 100, got {}",
                self.quality_floor
            )));
        }
        if !(self.dimension_factor > 0.0 && self.dimension_factor <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "dimension factor must be in (0, 1], got {}",
                self.dimension_factor
            )));
        }
        if self.min_width == 0 || self.min_height == 0 {
            return Err(ConfigError::Invalid(
                "minimum dimensions must be positive".to_string(),
            ));
        }
        if self.max_passes == 0 {
            return Err(ConfigError::Invalid(
                "max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The next, strictly tighter policy, or `None` once every floor is reached
    pub fn tighten(&self, policy: &ImageTransformPolicy) -> Option<ImageTransformPolicy> {
        let quality = if policy.quality > self.quality_floor {
            policy
                .quality
                .saturating_sub(self.quality_step)
                .max(self.quality_floor)
        } else {
            policy.quality
        };
        let shrink = |side: u32, floor: u32| -> u32 {
            if side > floor {
                ((side as f64 * self.dimension_factor).floor() as u32).max(floor)
            } else {
                side
            }
        };
        let max_width = shrink(policy.max_width, self.min_width);
        let max_height = shrink(policy.max_height, self.min_height);

        if quality == policy.quality
            && max_width == policy.max_width
            && max_height == policy.max_height
        {
            return None;
        }

        Some(ImageTransformPolicy {
            max_width,
            max_height,
            quality,
            format: policy.format,
        })
    }
}

/// Repack `source` with progressively stricter policies until the output is
/// at most `target_bytes`.
///
/// Every pass is staged separately and the smallest archive produced is the
/// one written to `destination`, whether or not the target was reached.
pub fn compress_to_target(
    repacker: &Repacker,
    source: &Path,
    destination: &Path,
    initial: &ImageTransformPolicy,
    target_bytes: u64,
    schedule: &TighteningSchedule,
) -> Result<SizeOutcome> {
    schedule.validate()?;
    initial.validate()?;
    let source_size = file_size(source)?;

    let mut policy = initial.clone();
    let mut attempts = Vec::new();
    let mut best: Option<(NamedTempFile, RepackReport)> = None;

    for pass in 1..=schedule.max_passes {
        let (staged, stats) = repacker.repack_to_temp(source, destination, &policy)?;
        let output_size = staged_size(&staged, destination)?;
        info!(
            pass,
            quality = policy.quality,
            max_width = policy.max_width,
            max_height = policy.max_height,
            output_size,
            target_bytes,
            "Repack pass finished"
        );
        attempts.push(PassSummary {
            pass,
            policy: policy.clone(),
            output_size,
        });

        let improved = best
            .as_ref()
            .map_or(true, |(_, report)| output_size < report.output_size);
        if improved {
            let report = RepackReport {
                source: source.to_path_buf(),
                destination: destination.to_path_buf(),
                source_size,
                output_size,
                policy: policy.clone(),
                stats,
            };
            best = Some((staged, report));
        }

        if output_size <= target_bytes {
            break;
        }

        match schedule.tighten(&policy) {
            Some(next) => policy = next,
            None => {
                warn!(
                    quality = policy.quality,
                    max_width = policy.max_width,
                    max_height = policy.max_height,
                    "Reached the tightening floor without meeting the size target"
                );
                break;
            }
        }
    }

    // max_passes >= 1 is validated, so at least one pass has run
    let (staged, report) = best.ok_or_else(|| {
        ConfigError::Invalid("no repack pass was run".to_string())
    })?;
    persist(staged, destination)?;

    let target_met = report.output_size <= target_bytes;
    if !target_met {
        warn!(
            output_size = report.output_size,
            target_bytes, "Size target not met; keeping the smallest result"
        );
    }

    Ok(SizeOutcome {
        target_bytes,
        target_met,
        attempts,
        best: report,
    })
}
