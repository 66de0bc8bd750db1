//! Single-pass repack of an EPUB container with re-encoded images

use crate::archive::{ArchiveReader, ArchiveWriter};
use crate::error::{ArchiveError, Result};
use crate::transform::{transformer_for_format, ImageTransformer, TransformedImage};
use crate::types::{
    replace_extension, ArchiveEntry, EntryKind, ImageTransformPolicy, OutputFormat, RepackReport,
    RepackStats,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Suffix appended to the input file stem when no output path is given
pub const DEFAULT_OUTPUT_SUFFIX: &str = "_compressed";

/// Called with (entry number, total entries, entry path) as entries are processed
pub type ProgressCallback = Box<dyn Fn(usize, usize, &str) + Send + Sync>;

/// Knobs that change how entries are written, independent of image quality
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RepackOptions {
    /// Write transformed images under their source path instead of switching
    /// the extension. Keeps XHTML and OPF references valid.
    pub keep_original_names: bool,

    /// Leave out `__MACOSX/` and `.DS_Store` entries
    pub drop_os_metadata: bool,

    /// Suffix used by [`default_output_path`]
    pub output_suffix: String,
}

impl Default for RepackOptions {
    fn default() -> Self {
        Self {
            keep_original_names: false,
            drop_os_metadata: false,
            output_suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

/// `book.epub` -> `book_compressed.epub`, next to the input
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

/// Rebuilds an EPUB, re-encoding image entries and copying everything else
pub struct Repacker {
    transformer: Box<dyn ImageTransformer>,
    options: RepackOptions,
    progress: Option<ProgressCallback>,
}

impl Repacker {
    pub fn new(options: RepackOptions) -> Self {
        Self {
            transformer: transformer_for_format(OutputFormat::Jpeg),
            options,
            progress: None,
        }
    }

    /// Use a different image transformer
    pub fn with_transformer(mut self, transformer: Box<dyn ImageTransformer>) -> Self {
        self.transformer = transformer;
        self
    }

    /// Receive a callback for every entry processed
    pub fn with_progress(
        mut self,
        callback: impl Fn(usize, usize, &str) + Send + Sync + 'static,
    ) -> Self {
        self.progress = Some(Box::new(callback));
        self
    }

    pub fn options(&self) -> &RepackOptions {
        &self.options
    }

    /// Repack `source` into `destination`.
    ///
    /// The output is staged in a temporary file next to `destination` and
    /// only moved into place once the archive is complete, so a failed run
    /// never leaves a truncated file behind.
    pub fn repack(
        &self,
        source: &Path,
        destination: &Path,
        policy: &ImageTransformPolicy,
    ) -> Result<RepackReport> {
        let source_size = file_size(source)?;
        let (staged, stats) = self.repack_to_temp(source, destination, policy)?;
        let output_size = staged_size(&staged, destination)?;
        persist(staged, destination)?;

        Ok(RepackReport {
            source: source.to_path_buf(),
            destination: destination.to_path_buf(),
            source_size,
            output_size,
            policy: policy.clone(),
            stats,
        })
    }

    /// Run one pass into a temporary file in the destination's directory
    pub(crate) fn repack_to_temp(
        &self,
        source: &Path,
        destination: &Path,
        policy: &ImageTransformPolicy,
    ) -> Result<(NamedTempFile, RepackStats)> {
        policy.validate()?;
        let mut reader = ArchiveReader::open(source)?;

        let mut staged = NamedTempFile::new_in(staging_dir(destination))
            .map_err(|e| ArchiveError::write(destination.display().to_string(), e))?;

        let stats = {
            let mut writer = ArchiveWriter::new(BufWriter::new(staged.as_file_mut()));
            let stats = self.repack_entries(&mut reader, &mut writer, policy)?;
            let mut buffered = writer.finish()?;
            buffered
                .flush()
                .map_err(|e| ArchiveError::write(destination.display().to_string(), e))?;
            stats
        };

        Ok((staged, stats))
    }

    /// Copy every entry of `reader` into `writer`, `mimetype` first
    pub fn repack_entries<R: Read + Seek, W: Write + Seek>(
        &self,
        reader: &mut ArchiveReader<R>,
        writer: &mut ArchiveWriter<W>,
        policy: &ImageTransformPolicy,
    ) -> Result<RepackStats> {
        let names = reader.names().to_vec();
        let source_paths: HashSet<&str> = names.iter().map(String::as_str).collect();
        let total = names.len();
        let mut stats = RepackStats {
            entries: total,
            ..Default::default()
        };

        let mimetype_index = reader.mimetype_index();
        let mut processed = 0;

        if let Some(index) = mimetype_index {
            let entry = reader.read_entry(index)?;
            processed += 1;
            self.report_progress(processed, total, &entry.path);
            writer.write_mimetype(&entry.data, &entry.meta)?;
            stats.passthrough += 1;
            stats.bytes_in += entry.data.len() as u64;
            stats.bytes_out += entry.data.len() as u64;
        }

        for index in 0..total {
            if Some(index) == mimetype_index {
                continue;
            }
            let entry = reader.read_entry(index)?;
            processed += 1;
            self.report_progress(processed, total, &entry.path);

            if self.options.drop_os_metadata && entry.is_os_metadata() {
                debug!(path = %entry.path, "Dropping OS metadata entry");
                stats.dropped += 1;
                continue;
            }

            stats.bytes_in += entry.data.len() as u64;

            if entry.is_dir {
                writer.write_directory(&entry.path, &entry.meta)?;
                stats.passthrough += 1;
                continue;
            }

            match entry.kind {
                EntryKind::Opaque => {
                    debug!(path = %entry.path, bytes = entry.data.len(), "Copying entry");
                    writer.write_file(&entry.path, &entry.data, &entry.meta)?;
                    stats.passthrough += 1;
                    stats.bytes_out += entry.data.len() as u64;
                }
                EntryKind::Image(_) => {
                    self.write_image(&entry, &source_paths, writer, policy, &mut stats)?;
                }
            }
        }

        if stats.images_skipped > 0 {
            warn!(
                skipped = stats.images_skipped,
                "Some images could not be transformed and were kept unchanged"
            );
        }

        Ok(stats)
    }

    fn write_image<W: Write + Seek>(
        &self,
        entry: &ArchiveEntry,
        source_paths: &HashSet<&str>,
        writer: &mut ArchiveWriter<W>,
        policy: &ImageTransformPolicy,
        stats: &mut RepackStats,
    ) -> Result<()> {
        match self.transformer.transform(&entry.data, policy) {
            Ok(image) => {
                let path = self.output_path(&entry.path, image.extension, source_paths, writer);
                log_transform(&entry.path, entry.data.len(), &image);

                writer.write_file(&path, &image.data, &entry.meta)?;
                stats.images_transformed += 1;
                if image.resized {
                    stats.images_resized += 1;
                }
                if path != entry.path {
                    stats.renamed += 1;
                }
                stats.bytes_out += image.data.len() as u64;
            }
            Err(e) => {
                warn!(path = %entry.path, "Keeping original image: {}", e);
                writer.write_file(&entry.path, &entry.data, &entry.meta)?;
                stats.images_skipped += 1;
                stats.skipped_paths.push(entry.path.clone());
                stats.bytes_out += entry.data.len() as u64;
            }
        }
        Ok(())
    }

    /// Path a transformed image is written under
    fn output_path<W: Write + Seek>(
        &self,
        path: &str,
        extension: &str,
        source_paths: &HashSet<&str>,
        writer: &ArchiveWriter<W>,
    ) -> String {
        if self.options.keep_original_names {
            return path.to_string();
        }

        let renamed = replace_extension(path, extension);
        if renamed == path {
            return renamed;
        }
        if source_paths.contains(renamed.as_str()) || writer.contains(&renamed) {
            warn!(
                path = %path,
                renamed = %renamed,
                "Renamed path collides with another entry; keeping original name"
            );
            return path.to_string();
        }
        renamed
    }

    fn report_progress(&self, current: usize, total: usize, path: &str) {
        if let Some(callback) = &self.progress {
            callback(current, total, path);
        }
    }
}

impl Default for Repacker {
    fn default() -> Self {
        Self::new(RepackOptions::default())
    }
}

fn log_transform(path: &str, original_len: usize, image: &TransformedImage) {
    let saved = if original_len == 0 {
        0.0
    } else {
        (1.0 - image.data.len() as f64 / original_len as f64) * 100.0
    };
    info!(
        path = %path,
        "Optimized {}x{} -> {}x{}, {:.1}KB -> {:.1}KB ({:.1}% smaller)",
        image.original_width,
        image.original_height,
        image.width,
        image.height,
        original_len as f64 / 1024.0,
        image.data.len() as f64 / 1024.0,
        saved
    );
}

fn staging_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub(crate) fn file_size(path: &Path) -> Result<u64> {
    let metadata = std::fs::metadata(path).map_err(|e| ArchiveError::Open {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    Ok(metadata.len())
}

pub(crate) fn staged_size(staged: &NamedTempFile, destination: &Path) -> Result<u64> {
    let metadata = staged
        .as_file()
        .metadata()
        .map_err(|e| ArchiveError::write(destination.display().to_string(), e))?;
    Ok(metadata.len())
}

pub(crate) fn persist(staged: NamedTempFile, destination: &Path) -> Result<()> {
    staged
        .persist(destination)
        .map_err(|e| ArchiveError::write(destination.display().to_string(), e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/books/manga.epub"), "_compressed"),
            PathBuf::from("/books/manga_compressed.epub")
        );
        assert_eq!(
            default_output_path(Path::new("scan"), "_small"),
            PathBuf::from("scan_small")
        );
    }

    #[test]
    fn test_staging_dir_for_bare_file_name() {
        assert_eq!(staging_dir(Path::new("out.epub")), Path::new("."));
        assert_eq!(staging_dir(Path::new("dir/out.epub")), Path::new("dir"));
    }

    #[test]
    fn test_output_path_collision_keeps_original() {
        let repacker = Repacker::default();
        let writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        let sources: HashSet<&str> = ["img/a.png", "img/a.jpg", "img/b.gif"].into_iter().collect();

        assert_eq!(
            repacker.output_path("img/a.png", "jpg", &sources, &writer),
            "img/a.png"
        );
        assert_eq!(
            repacker.output_path("img/b.gif", "jpg", &sources, &writer),
            "img/b.jpg"
        );
        assert_eq!(
            repacker.output_path("img/a.jpg", "jpg", &sources, &writer),
            "img/a.jpg"
        );
    }

    #[test]
    fn test_output_path_keep_original_names() {
        let repacker = Repacker::new(RepackOptions {
            keep_original_names: true,
            ..Default::default()
        });
        let writer = ArchiveWriter::new(Cursor::new(Vec::new()));
        let sources: HashSet<&str> = ["cover.png"].into_iter().collect();
        assert_eq!(
            repacker.output_path("cover.png", "jpg", &sources, &writer),
            "cover.png"
        );
    }
}
