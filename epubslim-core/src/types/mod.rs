//! Core types shared by the archive, transform and repack layers

mod entry;
mod policy;
mod report;

pub use entry::{
    extension_of, is_os_metadata_path, replace_extension, ArchiveEntry, EntryKind, EntryMeta,
    ImageKind, MIMETYPE_ENTRY,
};
pub use policy::{
    ImageTransformPolicy, OutputFormat, DEFAULT_MAX_HEIGHT, DEFAULT_MAX_WIDTH, DEFAULT_QUALITY,
};
pub use report::{
    bytes_to_mb, mb_to_bytes, ArchiveSummary, PassSummary, RepackReport, RepackStats,
    SizeOutcome,
};
