//! Error types for epubslim core

use thiserror::Error;

/// Result type alias using SlimError
pub type Result<T> = std::result::Result<T, SlimError>;

/// Top-level error type for all epubslim operations
#[derive(Debug, Error)]
pub enum SlimError {
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while reading the source container or writing the output.
///
/// All of these are fatal for a repack pass.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot open archive {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("Cannot read entry {entry}: {reason}")]
    Read { entry: String, reason: String },

    #[error("Cannot write {path}: {reason}")]
    Write { path: String, reason: String },
}

/// Errors raised while transforming a single embedded image.
///
/// The repack driver treats these as recoverable: the entry is written
/// through unchanged.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Errors in loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ArchiveError {
    pub(crate) fn write(path: impl Into<String>, reason: impl ToString) -> Self {
        ArchiveError::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read(entry: impl Into<String>, reason: impl ToString) -> Self {
        ArchiveError::Read {
            entry: entry.into(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_error_names_path() {
        let err: SlimError = ArchiveError::Open {
            path: "book.epub".to_string(),
            reason: "invalid Zip archive".to_string(),
        }
        .into();
        let msg = err.to_string();
        assert!(msg.contains("book.epub"));
        assert!(msg.contains("invalid Zip archive"));
    }

    #[test]
    fn test_image_error_conversion() {
        let err: SlimError = ImageError::Decode("bad header".to_string()).into();
        assert!(matches!(err, SlimError::Image(ImageError::Decode(_))));
    }
}
