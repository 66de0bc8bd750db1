//! Pixel-level helpers: bounding-box fitting and alpha flattening

use image::{DynamicImage, Rgb, RgbImage};

/// White page background used to composite transparent pixels
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// Largest size with the same aspect ratio that fits in `max_width` x `max_height`.
///
/// Images already inside the box are returned unchanged; nothing is upscaled
/// and neither side drops below one pixel.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width <= max_width && height <= max_height {
        return (width, height);
    }

    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fit = |side: u32, bound: u32| -> u32 {
        ((side as f64 * scale).round() as u32).clamp(1, bound.max(1))
    };

    (fit(width, max_width), fit(height, max_height))
}

/// Convert to 8-bit RGB, compositing any alpha channel over `background`.
///
/// Palette images arrive here already expanded by the decoder, so checking
/// the color type for alpha covers indexed transparency as well.
pub fn flatten_onto(image: &DynamicImage, background: Rgb<u8>) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }

    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in out.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            dst[c] = blend(src[c], background[c], alpha);
        }
    }
    out
}

fn blend(fg: u8, bg: u8, alpha: u32) -> u8 {
    ((fg as u32 * alpha + bg as u32 * (255 - alpha) + 127) / 255) as u8
}
