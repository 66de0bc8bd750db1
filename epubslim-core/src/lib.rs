//! epubslim Core Library
//!
//! Shrinks image-heavy EPUB files by re-encoding their embedded raster images
//! as bounded JPEGs while copying every other entry byte for byte. The output
//! is a fresh ZIP container with `mimetype` stored first, so readers keep
//! recognizing it as an EPUB.
//!
//! The pipeline has three layers:
//! - [`archive`] reads and writes the ZIP container entry by entry
//! - [`transform`] decodes, flattens, bounds and re-encodes one image
//! - [`repack`] and [`adaptive`] drive full passes, optionally toward a size target

pub mod adaptive;
pub mod archive;
pub mod config;
pub mod error;
pub mod repack;
pub mod transform;
pub mod types;

pub use adaptive::{compress_to_target, TighteningSchedule};
pub use config::SlimConfig;
pub use error::{ArchiveError, ConfigError, ImageError, Result, SlimError};
pub use repack::{default_output_path, RepackOptions, Repacker};
pub use types::{
    ArchiveEntry, ArchiveSummary, EntryKind, ImageKind, ImageTransformPolicy, OutputFormat,
    RepackReport, RepackStats, SizeOutcome,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_policy() {
        let config = SlimConfig::default();
        assert_eq!(config.policy, ImageTransformPolicy::default());
        assert_eq!(config.policy.quality, 85);
    }
}
