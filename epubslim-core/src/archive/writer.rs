//! Entry-by-entry writer producing an EPUB-compatible ZIP container

use crate::error::ArchiveError;
use crate::types::{EntryMeta, MIMETYPE_ENTRY};
use std::collections::HashSet;
use std::io::{Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Deflate level used for every compressed entry
pub const MAX_DEFLATE_LEVEL: i32 = 9;

/// Writes entries in call order.
///
/// `mimetype` may only be written as the very first entry and is always
/// stored uncompressed; everything else is deflated at the maximum level.
pub struct ArchiveWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
    written: HashSet<String>,
}

impl<W: Write + Seek> ArchiveWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            zip: ZipWriter::new(inner),
            written: HashSet::new(),
        }
    }

    /// Whether a path has already been written
    pub fn contains(&self, path: &str) -> bool {
        self.written.contains(path)
    }

    /// Number of entries written so far
    pub fn len(&self) -> usize {
        self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.written.is_empty()
    }

    /// Write the `mimetype` entry, stored and with its content unchanged
    pub fn write_mimetype(&mut self, data: &[u8], meta: &EntryMeta) -> Result<(), ArchiveError> {
        if !self.written.is_empty() {
            return Err(ArchiveError::write(
                MIMETYPE_ENTRY,
                "mimetype must be the first entry",
            ));
        }
        let options = entry_options(meta).compression_method(CompressionMethod::Stored);
        self.put(MIMETYPE_ENTRY, data, options)
    }

    /// Write a file entry at maximum compression
    pub fn write_file(
        &mut self,
        path: &str,
        data: &[u8],
        meta: &EntryMeta,
    ) -> Result<(), ArchiveError> {
        if path == MIMETYPE_ENTRY {
            return self.write_mimetype(data, meta);
        }
        let options = entry_options(meta)
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(MAX_DEFLATE_LEVEL));
        self.put(path, data, options)
    }

    /// Re-create a directory record
    pub fn write_directory(&mut self, path: &str, meta: &EntryMeta) -> Result<(), ArchiveError> {
        self.claim(path)?;
        self.zip
            .add_directory(path, entry_options(meta))
            .map_err(|e| ArchiveError::write(path, e))
    }

    /// Finish the central directory and hand back the inner writer
    pub fn finish(mut self) -> Result<W, ArchiveError> {
        self.zip
            .finish()
            .map_err(|e| ArchiveError::write("central directory", e))
    }

    fn put(&mut self, path: &str, data: &[u8], options: FileOptions) -> Result<(), ArchiveError> {
        self.claim(path)?;
        self.zip
            .start_file(path, options)
            .map_err(|e| ArchiveError::write(path, e))?;
        self.zip
            .write_all(data)
            .map_err(|e| ArchiveError::write(path, e))
    }

    fn claim(&mut self, path: &str) -> Result<(), ArchiveError> {
        if !self.written.insert(path.to_string()) {
            return Err(ArchiveError::write(path, "duplicate entry"));
        }
        Ok(())
    }
}

fn entry_options(meta: &EntryMeta) -> FileOptions {
    let options = FileOptions::default().last_modified_time(meta.last_modified);
    match meta.unix_mode {
        Some(mode) => options.unix_permissions(mode),
        None => options,
    }
}
