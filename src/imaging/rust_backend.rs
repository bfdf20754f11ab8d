//! Pure Rust image engine built on the `image` crate.
//!
//! Everything is statically linked into the binary.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Probe | `image::ImageReader::with_guessed_format` + `into_dimensions` (header only) |
//! | Decode (JPEG, PNG, TIFF, WebP, GIF) | `image` crate (pure Rust decoders); JPEG must reach its EOI marker |
//! | Extract | `image::DynamicImage::crop_imm` |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3`, planned by [`resize_plan`] |
//! | Pad (`contain`) | `image::imageops::overlay` on a transparent canvas |
//! | Blur | `image::DynamicImage::blur` (Gaussian) |
//! | Encode → WebP | `webp::Encoder` (libwebp, lossy at the requested quality) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → JPEG / PNG / GIF / TIFF | `image` crate encoders |
//!
//! The `image` crate can only write lossless WebP, so WebP goes through
//! libwebp instead.
//!
//! AVIF is an output-only format: the `image` crate's `"avif"` feature enables
//! the rav1e **encoder** but no decoder, so AVIF sources fail to probe.

use super::backend::{BackendError, ImageBackend, Rendered, SourceInfo};
use super::calculations::resize_plan;
use super::jpeg;
use super::params::{OutputFormat, Quality, RenderParams, ResizeDirective};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// rav1e speed preset (0 = slowest/best, 10 = fastest).
const AVIF_SPEED: u8 = 6;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase name for a detected container format, matching the names
/// `OutputFormat` uses where the two overlap.
fn format_name(format: ImageFormat) -> String {
    match format {
        ImageFormat::Jpeg => "jpeg".to_string(),
        ImageFormat::Png => "png".to_string(),
        ImageFormat::WebP => "webp".to_string(),
        ImageFormat::Gif => "gif".to_string(),
        ImageFormat::Tiff => "tiff".to_string(),
        ImageFormat::Avif => "avif".to_string(),
        other => format!("{other:?}").to_lowercase(),
    }
}

fn reader(source: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, BackendError> {
    ImageReader::new(Cursor::new(source))
        .with_guessed_format()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Scale, crop and pad according to the planned resize.
fn apply_resize(img: DynamicImage, directive: &ResizeDirective) -> DynamicImage {
    let plan = resize_plan((img.width(), img.height()), directive);

    let mut out = if plan.scaled == (img.width(), img.height()) {
        img
    } else {
        img.resize_exact(plan.scaled.0, plan.scaled.1, FilterType::Lanczos3)
    };

    if let Some(crop) = plan.crop {
        out = out.crop_imm(crop.left, crop.top, crop.width, crop.height);
    }

    if let Some((canvas_w, canvas_h)) = plan.canvas {
        let mut canvas = RgbaImage::new(canvas_w, canvas_h);
        let x = (canvas_w - out.width()) / 2;
        let y = (canvas_h - out.height()) / 2;
        image::imageops::overlay(&mut canvas, &out.to_rgba8(), x as i64, y as i64);
        out = DynamicImage::ImageRgba8(canvas);
    }

    out
}

/// Reduce any decoded pixel layout to 8-bit RGB or RGBA, which every encoder accepts.
fn to_8bit(img: &DynamicImage) -> DynamicImage {
    if img.color().has_alpha() {
        DynamicImage::ImageRgba8(img.to_rgba8())
    } else {
        DynamicImage::ImageRgb8(img.to_rgb8())
    }
}

/// Lossy WebP through libwebp, keeping alpha when the image has it.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let (width, height) = (img.width(), img.height());
    let q = quality.value() as f32;
    let encoded = if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(&rgba, width, height).encode_simple(false, q)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(&rgb, width, height).encode_simple(false, q)
    };
    encoded
        .map(|memory| memory.to_vec())
        .map_err(|e| BackendError::Encode {
            format: OutputFormat::Webp,
            message: format!("{e:?}"),
        })
}

/// Encode into an in-memory buffer.
fn encode(img: &DynamicImage, format: OutputFormat, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let q = quality.value() as u8;
    let mut buf = Cursor::new(Vec::new());

    let result = match format {
        // JPEG has no alpha channel
        OutputFormat::Jpeg => DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut buf, q)),
        OutputFormat::Webp => return encode_webp(img, quality),
        OutputFormat::Png => to_8bit(img).write_with_encoder(PngEncoder::new(&mut buf)),
        OutputFormat::Avif => to_8bit(img)
            .write_with_encoder(AvifEncoder::new_with_speed_quality(&mut buf, AVIF_SPEED, q)),
        OutputFormat::Gif => {
            DynamicImage::ImageRgba8(img.to_rgba8()).write_to(&mut buf, ImageFormat::Gif)
        }
        OutputFormat::Tiff => to_8bit(img).write_to(&mut buf, ImageFormat::Tiff),
    };

    result.map_err(|e| BackendError::Encode {
        format,
        message: e.to_string(),
    })?;
    Ok(buf.into_inner())
}

impl ImageBackend for RustBackend {
    type Image = DynamicImage;

    fn probe(&self, source: &[u8]) -> Result<SourceInfo, BackendError> {
        let reader = reader(source)?;
        let format = reader.format().map(format_name);
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        Ok(SourceInfo {
            width,
            height,
            format,
            size: source.len() as u64,
        })
    }

    fn decode(&self, source: &[u8]) -> Result<DynamicImage, BackendError> {
        let reader = reader(source)?;
        if reader.format() == Some(ImageFormat::Jpeg) && !jpeg::is_complete(source) {
            return Err(BackendError::Decode(
                "JPEG data ends before the end-of-image marker".to_string(),
            ));
        }
        reader
            .decode()
            .map_err(|e| BackendError::Decode(e.to_string()))
    }

    fn render(&self, image: &DynamicImage, params: &RenderParams) -> Result<Rendered, BackendError> {
        // The output format only matters at encode time; pixels are converted there.
        let mut img = match params.extract {
            Some(region) if region.width == 0 || region.height == 0 => {
                return Err(BackendError::ProcessingFailed(format!(
                    "Extract region {}x{} has no area",
                    region.width, region.height
                )));
            }
            Some(region) => image.crop_imm(region.left, region.top, region.width, region.height),
            None => image.clone(),
        };

        if let Some(directive) = params.resize {
            if directive.is_degenerate() {
                return Err(BackendError::ProcessingFailed(format!(
                    "Resize dimensions must be positive, got {:?}x{:?}",
                    directive.width, directive.height
                )));
            }
            img = apply_resize(img, &directive);
        }

        if let Some(sigma) = params.blur {
            img = img.blur(sigma);
        }

        let data = encode(&img, params.format, params.quality)?;
        Ok(Rendered {
            data,
            width: img.width(),
            height: img.height(),
        })
    }
}
