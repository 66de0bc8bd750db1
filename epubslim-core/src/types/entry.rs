//! Archive entries and their classification

use serde::{Deserialize, Serialize};

/// Name of the EPUB media-type entry that must be stored first.
pub const MIMETYPE_ENTRY: &str = "mimetype";

/// Raster formats recognized by extension
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Webp,
}

impl ImageKind {
    /// Map a file extension (without the dot, any case) to an image kind
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "png" => Some(ImageKind::Png),
            "gif" => Some(ImageKind::Gif),
            "bmp" => Some(ImageKind::Bmp),
            "webp" => Some(ImageKind::Webp),
            _ => None,
        }
    }
}

/// How an entry is handled by the repack driver
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "format", rename_all = "snake_case")]
pub enum EntryKind {
    /// Raster image, routed through the image transformer
    Image(ImageKind),

    /// Everything else, copied byte for byte
    Opaque,
}

impl EntryKind {
    /// Classify an entry path by its extension.
    ///
    /// Directories and the `mimetype` entry are always opaque.
    pub fn classify(path: &str) -> Self {
        if path.ends_with('/') || path == MIMETYPE_ENTRY {
            return EntryKind::Opaque;
        }
        extension_of(path)
            .and_then(ImageKind::from_extension)
            .map(EntryKind::Image)
            .unwrap_or(EntryKind::Opaque)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, EntryKind::Image(_))
    }
}

/// ZIP attributes carried from the source entry to its output counterpart
#[derive(Debug, Clone, Copy)]
pub struct EntryMeta {
    pub last_modified: zip::DateTime,
    pub unix_mode: Option<u32>,
}

impl Default for EntryMeta {
    fn default() -> Self {
        Self {
            last_modified: zip::DateTime::default(),
            unix_mode: None,
        }
    }
}

/// One entry read from the source archive
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    /// Path inside the archive
    pub path: String,

    /// Classification decided from the path
    pub kind: EntryKind,

    /// Whether this is a directory record
    pub is_dir: bool,

    /// Uncompressed entry bytes
    pub data: Vec<u8>,

    /// Timestamp and permissions
    pub meta: EntryMeta,
}

impl ArchiveEntry {
    /// Create a file entry, classifying it from its path
    pub fn new(path: impl Into<String>, data: Vec<u8>) -> Self {
        let path = path.into();
        Self {
            kind: EntryKind::classify(&path),
            is_dir: path.ends_with('/'),
            path,
            data,
            meta: EntryMeta::default(),
        }
    }

    pub fn is_mimetype(&self) -> bool {
        self.path == MIMETYPE_ENTRY
    }

    /// Resource-fork and Finder files that macOS archivers leave behind
    pub fn is_os_metadata(&self) -> bool {
        is_os_metadata_path(&self.path)
    }
}

/// Extension of the last path segment, if any
pub fn extension_of(path: &str) -> Option<&str> {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rfind('.') {
        Some(0) | None => None,
        Some(dot) => Some(&name[dot + 1..]),
    }
}

/// Replace the extension of the last path segment.
///
/// Paths without an extension get one appended.
pub fn replace_extension(path: &str, ext: &str) -> String {
    let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
    let name = &path[name_start..];
    let stem_len = match name.rfind('.') {
        Some(0) | None => name.len(),
        Some(dot) => dot,
    };
    format!("{}.{}", &path[..name_start + stem_len], ext)
}

pub fn is_os_metadata_path(path: &str) -> bool {
    path.starts_with("__MACOSX/") || path.rsplit('/').next() == Some(".DS_Store")
}
