//! Configuration loading.
//!
//! All tunables live in one immutable [`SlimConfig`] value, optionally read
//! from a TOML file. Missing sections and keys fall back to the defaults
//! (1920x2560, quality 85).

use crate::adaptive::TighteningSchedule;
use crate::error::ConfigError;
use crate::repack::RepackOptions;
use crate::types::ImageTransformPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

/// Complete configuration for a compression run
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SlimConfig {
    /// Image bounds and quality for the first pass
    pub policy: ImageTransformPolicy,

    /// Entry naming and filtering
    pub repack: RepackOptions,

    /// Tightening between passes when a size target is set
    pub adaptive: TighteningSchedule,
}

impl SlimConfig {
    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: SlimConfig =
            toml::from_str(contents).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.policy.validate()?;
        self.adaptive.validate()
    }

    /// Render as TOML, e.g. to write out a starting config file
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
