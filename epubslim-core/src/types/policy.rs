//! Image transform policy

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_WIDTH: u32 = 1920;
pub const DEFAULT_MAX_HEIGHT: u32 = 2560;
pub const DEFAULT_QUALITY: u8 = 85;

/// Lossy format images are re-encoded into
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
}

impl OutputFormat {
    /// Canonical extension written for transformed entries
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
        }
    }
}

/// Bounds and quality applied to every image in one repack pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImageTransformPolicy {
    /// Maximum output width in pixels
    pub max_width: u32,

    /// Maximum output height in pixels
    pub max_height: u32,

    /// Encoder quality, 1-100
    pub quality: u8,

    /// Output encoding
    pub format: OutputFormat,
}

impl ImageTransformPolicy {
    /// Build a validated JPEG policy
    pub fn new(max_width: u32, max_height: u32, quality: u8) -> Result<Self, ConfigError> {
        let policy = Self {
            max_width,
            max_height,
            quality,
            format: OutputFormat::Jpeg,
        };
        policy.validate()?;
        Ok(policy)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_width == 0 || self.max_height == 0 {
            return Err(ConfigError::Invalid(format!(
                "maximum dimensions must be positive, got {}x{}",
                self.max_width, self.max_height
            )));
        }
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Invalid(format!(
                "quality must be between 1 and 100, got {}",
                self.quality
            )));
        }
        Ok(())
    }

    /// Whether an image of the given size needs downscaling
    pub fn exceeds(&self, width: u32, height: u32) -> bool {
        width > self.max_width || height > self.max_height
    }
}

impl Default for ImageTransformPolicy {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_WIDTH,
            max_height: DEFAULT_MAX_HEIGHT,
            quality: DEFAULT_QUALITY,
            format: OutputFormat::Jpeg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = ImageTransformPolicy::default();
        assert_eq!(policy.max_width, 1920);
        assert_eq!(policy.max_height, 2560);
        assert_eq!(policy.quality, 85);
        assert_eq!(policy.format.extension(), "jpg");
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_quality() {
        assert!(ImageTransformPolicy::new(100, 100, 0).is_err());
        assert!(ImageTransformPolicy::new(100, 100, 101).is_err());
        assert!(ImageTransformPolicy::new(100, 100, 1).is_ok());
        assert!(ImageTransformPolicy::new(100, 100, 100).is_ok());
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        assert!(ImageTransformPolicy::new(0, 100, 80).is_err());
        assert!(ImageTransformPolicy::new(100, 0, 80).is_err());
    }

    #[test]
    fn test_exceeds() {
        let policy = ImageTransformPolicy::new(100, 200, 80).unwrap();
        assert!(!policy.exceeds(100, 200));
        assert!(policy.exceeds(101, 10));
        assert!(policy.exceeds(10, 201));
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let policy: ImageTransformPolicy = serde_json::from_str(r#"{"quality": 70}"#).unwrap();
        assert_eq!(policy.quality, 70);
        assert_eq!(policy.max_width, DEFAULT_MAX_WIDTH);
    }
}
