//! Entry-by-entry reader over a source EPUB container

use crate::error::ArchiveError;
use crate::types::{ArchiveEntry, EntryKind, EntryMeta, MIMETYPE_ENTRY};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use zip::{CompressionMethod, ZipArchive};

/// Reads entries from a ZIP container in their stored order
pub struct ArchiveReader<R: Read + Seek> {
    zip: ZipArchive<R>,
    names: Vec<String>,
}

impl ArchiveReader<BufReader<File>> {
    /// Open an archive on disk
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(|e| ArchiveError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::new(BufReader::new(file), &path.display().to_string())
    }
}

impl<R: Read + Seek> ArchiveReader<R> {
    /// Wrap any seekable reader. `label` names the source in errors.
    pub fn new(reader: R, label: &str) -> Result<Self, ArchiveError> {
        let mut zip = ZipArchive::new(reader).map_err(|e| ArchiveError::Open {
            path: label.to_string(),
            reason: e.to_string(),
        })?;

        let mut names = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let file = zip.by_index_raw(i).map_err(|e| ArchiveError::Open {
                path: label.to_string(),
                reason: format!("entry #{}: {}", i, e),
            })?;
            names.push(file.name().to_string());
        }

        Ok(Self { zip, names })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entry paths in stored order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Position of the `mimetype` entry, wherever it is stored
    pub fn mimetype_index(&self) -> Option<usize> {
        self.names.iter().position(|n| n == MIMETYPE_ENTRY)
    }

    /// Read and decompress one entry
    pub fn read_entry(&mut self, index: usize) -> Result<ArchiveEntry, ArchiveError> {
        let name = self
            .names
            .get(index)
            .cloned()
            .ok_or_else(|| ArchiveError::read(format!("#{}", index), "index out of range"))?;

        let mut file = self
            .zip
            .by_index(index)
            .map_err(|e| ArchiveError::read(&name, e))?;

        let is_dir = file.is_dir();
        let meta = EntryMeta {
            last_modified: file.last_modified(),
            unix_mode: file.unix_mode(),
        };

        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)
            .map_err(|e| ArchiveError::read(&name, e))?;

        let kind = if is_dir {
            EntryKind::Opaque
        } else {
            EntryKind::classify(&name)
        };

        Ok(ArchiveEntry {
            path: name,
            kind,
            is_dir,
            data,
            meta,
        })
    }

    /// Compression method and uncompressed size of an entry, without reading it
    pub fn entry_info(&mut self, index: usize) -> Result<(CompressionMethod, u64), ArchiveError> {
        let name = self
            .names
            .get(index)
            .cloned()
            .ok_or_else(|| ArchiveError::read(format!("#{}", index), "index out of range"))?;
        let file = self
            .zip
            .by_index_raw(index)
            .map_err(|e| ArchiveError::read(name, e))?;
        Ok((file.compression(), file.size()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::FileOptions;

    fn sample_zip() -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = FileOptions::default();
            writer.start_file("OEBPS/chapter.xhtml", options).unwrap();
            writer.write_all(b"<html/>").unwrap();
            writer.add_directory("OEBPS/images/", options).unwrap();
            writer
                .start_file(
                    "mimetype",
                    options.compression_method(CompressionMethod::Stored),
                )
                .unwrap();
            writer.write_all(b"application/epub+zip").unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_names_preserve_order() {
        let reader = ArchiveReader::new(Cursor::new(sample_zip()), "sample").unwrap();
        assert_eq!(
            reader.names(),
            &["OEBPS/chapter.xhtml", "OEBPS/images/", "mimetype"]
        );
        assert_eq!(reader.mimetype_index(), Some(2));
    }

    #[test]
    fn test_read_entry() {
        let mut reader = ArchiveReader::new(Cursor::new(sample_zip()), "sample").unwrap();
        let entry = reader.read_entry(0).unwrap();
        assert_eq!(entry.path, "OEBPS/chapter.xhtml");
        assert_eq!(entry.data, b"<html/>");
        assert_eq!(entry.kind, EntryKind::Opaque);

        let dir = reader.read_entry(1).unwrap();
        assert!(dir.is_dir);

        let (method, size) = reader.entry_info(2).unwrap();
        assert_eq!(method, CompressionMethod::Stored);
        assert_eq!(size, 20);
    }

    #[test]
    fn test_rejects_non_zip() {
        let result = ArchiveReader::new(Cursor::new(b"not a zip".to_vec()), "junk.epub");
        match result {
            Err(ArchiveError::Open { path, .. }) => assert_eq!(path, "junk.epub"),
            _ => panic!("expected open error"),
        }
    }

    #[test]
    fn test_out_of_range_index() {
        let mut reader = ArchiveReader::new(Cursor::new(sample_zip()), "sample").unwrap();
        assert!(matches!(
            reader.read_entry(99),
            Err(ArchiveError::Read { .. })
        ));
        match reader.entry_info(99) {
            Err(ArchiveError::Read { entry, reason }) => {
                assert_eq!(entry, "#99");
                assert_eq!(reason, "index out of range");
            }
            other => panic!("expected read error, got {:?}", other),
        }
    }
}
