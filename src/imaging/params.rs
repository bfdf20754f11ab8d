//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides what each derivative looks like) and the
//! [`backend`](super::backend) (which does the actual pixel work). This
//! separation allows swapping backends (e.g. for testing with a mock) without
//! changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.
//! - [`OutputFormat`]: Encoded format of a derivative or preview.
//! - [`Region`]: Extract rectangle in source-pixel coordinates.
//! - [`ResizeDirective`]: Target box, fit mode and the no-enlargement flag.
//! - [`RenderParams`]: Everything one backend render needs: format, extract, resize, blur.
//! - [`PreviewSettings`]: Bounding edge and blur strength of the inline preview.

use crate::sizes::Fit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Encoded output format.
///
/// [`Quality`] applies to the lossy encoders: WebP, JPEG and AVIF.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Webp,
    Png,
    #[serde(alias = "jpg")]
    Jpeg,
    Avif,
    Gif,
    Tiff,
}

impl OutputFormat {
    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Webp => "webp",
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Avif => "avif",
            OutputFormat::Gif => "gif",
            OutputFormat::Tiff => "tiff",
        }
    }

    /// File extension used when writing derivatives to disk.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            other => other.name(),
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Png => "image/png",
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Avif => "image/avif",
            OutputFormat::Gif => "image/gif",
            OutputFormat::Tiff => "image/tiff",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "webp" => Ok(OutputFormat::Webp),
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "avif" => Ok(OutputFormat::Avif),
            "gif" => Ok(OutputFormat::Gif),
            "tiff" | "tif" => Ok(OutputFormat::Tiff),
            other => Err(format!(
                "unknown output format '{other}'. Expected webp, png, jpeg, avif, gif, or tiff"
            )),
        }
    }
}

/// Rectangle in source-pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

/// How to resize: a target box (either axis may be open), the fit policy,
/// and whether upscaling is forbidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeDirective {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fit: Fit,
    pub without_enlargement: bool,
}

impl ResizeDirective {
    /// A directive that never enlarges beyond the source resolution.
    pub fn new(width: Option<u32>, height: Option<u32>, fit: Fit) -> Self {
        Self {
            width,
            height,
            fit,
            without_enlargement: true,
        }
    }

    /// True when a requested axis is zero; no backend can honour that.
    pub fn is_degenerate(&self) -> bool {
        self.width == Some(0) || self.height == Some(0)
    }
}

/// Full specification for a single render: applied as format selection,
/// extract, resize, blur, then encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderParams {
    pub format: OutputFormat,
    pub quality: Quality,
    pub extract: Option<Region>,
    pub resize: Option<ResizeDirective>,
    /// Gaussian blur sigma, applied after resizing.
    pub blur: Option<f32>,
}

/// Preview (LQIP) settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PreviewSettings {
    /// The preview fits inside a `max_edge × max_edge` box.
    pub max_edge: u32,
    /// Gaussian blur sigma applied to the shrunken preview.
    pub blur_sigma: f32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            max_edge: 15,
            blur_sigma: 10.0,
        }
    }
}
