//! Shared test utilities: synthetic source images and output probes.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let source = png_bytes(120, 80);
//! let result = process(&source, "gradient.png", &ProcessingOptions::default()).unwrap();
//! assert_eq!(decoded_dimensions(&result.sizes["original"].data), (120, 80));
//! ```

use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;

// =========================================================================
// Synthetic sources
// =========================================================================

/// Deterministic RGB gradient, so crops and resizes produce non-uniform pixels.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) % 256) as u8,
        ])
    });
    DynamicImage::ImageRgb8(img)
}

fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// PNG-encoded gradient.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

/// JPEG-encoded gradient.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Jpeg)
}

// =========================================================================
// Output probes
// =========================================================================

/// Decode encoded bytes and return their pixel dimensions. Panics on failure.
pub fn decoded_dimensions(data: &[u8]) -> (u32, u32) {
    let img = image::load_from_memory(data)
        .unwrap_or_else(|e| panic!("output does not decode: {e}"));
    (img.width(), img.height())
}
