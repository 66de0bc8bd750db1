//! Image transformers re-encoding embedded images into a compact format

mod geometry;
mod jpeg;

pub use geometry::{fit_within, flatten_onto, WHITE};
pub use jpeg::JpegTransformer;

use crate::error::ImageError;
use crate::types::{ImageTransformPolicy, OutputFormat};

/// A re-encoded image and what happened to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformedImage {
    /// Encoded output bytes
    pub data: Vec<u8>,
    pub original_width: u32,
    pub original_height: u32,
    pub width: u32,
    pub height: u32,
    /// Whether the image was downscaled
    pub resized: bool,
    /// Canonical extension for the output encoding, without the dot
    pub extension: &'static str,
}

/// Trait for turning one embedded image into smaller bytes
pub trait ImageTransformer: Send + Sync {
    /// Decode, normalize, bound and re-encode an image
    fn transform(
        &self,
        data: &[u8],
        policy: &ImageTransformPolicy,
    ) -> Result<TransformedImage, ImageError>;
}

/// Get a transformer for an output format
pub fn transformer_for_format(format: OutputFormat) -> Box<dyn ImageTransformer> {
    match format {
        OutputFormat::Jpeg => Box::new(JpegTransformer::new()),
    }
}
