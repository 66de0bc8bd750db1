//! JPEG re-encoding transformer

use super::geometry::{fit_within, flatten_onto, WHITE};
use super::TransformedImage;
use crate::error::ImageError;
use crate::types::{ImageTransformPolicy, OutputFormat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::Rgb;

/// Decodes any supported raster image and re-encodes it as baseline JPEG
pub struct JpegTransformer {
    /// Color transparent pixels are composited onto
    background: Rgb<u8>,
}

impl JpegTransformer {
    pub fn new() -> Self {
        Self {
            background: WHITE,
        }
    }

    /// Composite transparency onto a different background color
    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = Rgb(rgb);
        self
    }
}

impl Default for JpegTransformer {
    fn default() -> Self {
        Self::new()
    }
}

impl super::ImageTransformer for JpegTransformer {
    fn transform(
        &self,
        data: &[u8],
        policy: &ImageTransformPolicy,
    ) -> Result<TransformedImage, ImageError> {
        let decoded =
            image::load_from_memory(data).map_err(|e| ImageError::Decode(e.to_string()))?;
        let (original_width, original_height) = (decoded.width(), decoded.height());

        let mut rgb = flatten_onto(&decoded, self.background);
        drop(decoded);

        let resized = policy.exceeds(original_width, original_height);
        let (width, height) = if resized {
            let (width, height) = fit_within(
                original_width,
                original_height,
                policy.max_width,
                policy.max_height,
            );
            rgb = image::imageops::resize(&rgb, width, height, FilterType::Lanczos3);
            (width, height)
        } else {
            (original_width, original_height)
        };

        let mut out = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut out, policy.quality);
            encoder
                .encode_image(&rgb)
                .map_err(|e| ImageError::Encode(e.to_string()))?;
        }

        Ok(TransformedImage {
            data: out,
            original_width,
            original_height,
            width,
            height,
            resized,
            extension: OutputFormat::Jpeg.extension(),
        })
    }
}
