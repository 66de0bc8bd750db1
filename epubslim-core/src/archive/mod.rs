//! ZIP container access for EPUB files

mod reader;
mod writer;

pub use reader::ArchiveReader;
pub use writer::{ArchiveWriter, MAX_DEFLATE_LEVEL};

use crate::error::ArchiveError;
use crate::types::{is_os_metadata_path, ArchiveSummary, EntryKind, MIMETYPE_ENTRY};
use std::path::Path;
use zip::CompressionMethod;

/// Summarize an archive's contents without modifying it
pub fn inspect(path: &Path) -> Result<ArchiveSummary, ArchiveError> {
    let archive_size = std::fs::metadata(path)
        .map_err(|e| ArchiveError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?
        .len();

    let mut reader = ArchiveReader::open(path)?;
    let mut summary = ArchiveSummary {
        path: path.to_path_buf(),
        archive_size,
        entries: reader.len(),
        ..Default::default()
    };

    let names = reader.names().to_vec();
    for (index, name) in names.iter().enumerate() {
        let (method, size) = reader.entry_info(index)?;

        if is_os_metadata_path(name) {
            summary.os_metadata_entries += 1;
        }

        if name.ends_with('/') {
            summary.directories += 1;
        } else if EntryKind::classify(name).is_image() {
            summary.images += 1;
            summary.image_bytes += size;
        } else {
            summary.other_bytes += size;
        }

        if name == MIMETYPE_ENTRY {
            summary.has_mimetype = true;
            summary.mimetype_first = index == 0;
            summary.mimetype_stored = method == CompressionMethod::Stored;
        }
    }

    Ok(summary)
}
