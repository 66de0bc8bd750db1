//! CLI command implementations

mod batch;
mod compress;
mod info;

pub use batch::batch;
pub use compress::compress;
pub use info::info;

use crate::TuningArgs;
use anyhow::{Context, Result};
use epubslim_core::SlimConfig;

/// Load the config file (if any) and apply command-line overrides on top
fn resolve_config(tuning: &TuningArgs) -> Result<SlimConfig> {
    let mut config = match &tuning.config {
        Some(path) => SlimConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => SlimConfig::default(),
    };

    if let Some(width) = tuning.max_width {
        config.policy.max_width = width;
    }
    if let Some(height) = tuning.max_height {
        config.policy.max_height = height;
    }
    if let Some(quality) = tuning.quality {
        config.policy.quality = quality;
    }
    if tuning.keep_names {
        config.repack.keep_original_names = true;
    }
    if tuning.drop_os_metadata {
        config.repack.drop_os_metadata = true;
    }

    config.validate().context("Invalid settings")?;
    Ok(config)
}
