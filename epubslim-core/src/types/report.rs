//! Results reported by the repack and size-target drivers

use super::ImageTransformPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Convert a byte count to megabytes (1 MB = 1024 * 1024 bytes)
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Convert megabytes to a byte count, rounding down
pub fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB).floor().max(0.0) as u64
}

/// Per-entry counters accumulated during one repack pass
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepackStats {
    /// Entries read from the source archive
    pub entries: usize,

    /// Images successfully re-encoded
    pub images_transformed: usize,

    /// Re-encoded images that were also downscaled
    pub images_resized: usize,

    /// Images written through unchanged because they failed to transform
    pub images_skipped: usize,

    /// Non-image entries copied unchanged
    pub passthrough: usize,

    /// Images whose path changed to the output extension
    pub renamed: usize,

    /// OS metadata entries dropped on request
    pub dropped: usize,

    /// Uncompressed bytes read from source entries
    pub bytes_in: u64,

    /// Uncompressed bytes written to output entries
    pub bytes_out: u64,

    /// Paths of the skipped images
    pub skipped_paths: Vec<String>,
}

/// Outcome of a single repack pass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RepackReport {
    pub source: PathBuf,
    pub destination: PathBuf,

    /// Size of the source archive on disk
    pub source_size: u64,

    /// Size of the written archive on disk
    pub output_size: u64,

    /// Policy the pass ran with
    pub policy: ImageTransformPolicy,

    pub stats: RepackStats,
}

impl RepackReport {
    /// Percentage of the source size saved (negative if the output grew)
    pub fn reduction_percent(&self) -> f64 {
        if self.source_size == 0 {
            return 0.0;
        }
        (1.0 - self.output_size as f64 / self.source_size as f64) * 100.0
    }
}

/// One attempt of the adaptive driver
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassSummary {
    pub pass: usize,
    pub policy: ImageTransformPolicy,
    pub output_size: u64,
}

/// Result of driving repack passes toward a size target
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizeOutcome {
    /// Requested upper bound in bytes
    pub target_bytes: u64,

    /// Whether the kept output is at or below the target
    pub target_met: bool,

    /// Every pass that ran, in order
    pub attempts: Vec<PassSummary>,

    /// The smallest output produced, which is the one kept at the destination
    pub best: RepackReport,
}

/// Content overview of an archive, without modifying it
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArchiveSummary {
    pub path: PathBuf,
    pub archive_size: u64,
    pub entries: usize,
    pub directories: usize,
    pub images: usize,
    pub image_bytes: u64,
    pub other_bytes: u64,
    pub os_metadata_entries: usize,
    pub has_mimetype: bool,
    pub mimetype_first: bool,
    pub mimetype_stored: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(source_size: u64, output_size: u64) -> RepackReport {
        RepackReport {
            source: PathBuf::from("in.epub"),
            destination: PathBuf::from("out.epub"),
            source_size,
            output_size,
            policy: ImageTransformPolicy::default(),
            stats: RepackStats::default(),
        }
    }

    #[test]
    fn test_reduction_percent() {
        assert!((report(200, 50).reduction_percent() - 75.0).abs() < 1e-9);
        assert!(report(100, 120).reduction_percent() < 0.0);
        assert_eq!(report(0, 10).reduction_percent(), 0.0);
    }

    #[test]
    fn test_megabyte_conversion() {
        assert_eq!(mb_to_bytes(1.0), 1_048_576);
        assert_eq!(mb_to_bytes(0.5), 524_288);
        assert_eq!(mb_to_bytes(-3.0), 0);
        assert!((bytes_to_mb(3 * 1_048_576) - 3.0).abs() < 1e-9);
    }
}
