//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Region, ResizeDirective};
use crate::sizes::{Fit, Hotspot};

/// Compute the largest `target`-shaped rectangle inside `source`, centered on
/// `hotspot` and clamped to the source bounds.
///
/// # Arguments
/// * `source` - Source dimensions (width, height)
/// * `target` - Target box (width, height); only its aspect ratio matters
/// * `hotspot` - Focal point in source pixels; may lie outside the source
///
/// # Examples
/// ```
/// # use pictor::imaging::{compute_region, Region};
/// # use pictor::sizes::Hotspot;
/// // 400x200 source, square target, focal point near the right edge
/// let region = compute_region((400, 200), (100, 100), Hotspot::new(300.0, 100.0));
/// assert_eq!(region, Region { left: 200, top: 0, width: 200, height: 200 });
/// ```
pub fn compute_region(source: (u32, u32), target: (u32, u32), hotspot: Hotspot) -> Region {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_ratio = src_w as f64 / src_h as f64;
    let tgt_ratio = tgt_w as f64 / tgt_h as f64;

    let (width, height) = if src_ratio > tgt_ratio {
        // Source is wider: keep full height, take a vertical strip
        ((src_h as f64 * tgt_ratio).round() as u32, src_h)
    } else {
        // Source is taller (or equal): keep full width, take a horizontal strip
        (src_w, (src_w as f64 / tgt_ratio).round() as u32)
    };
    let width = width.clamp(1, src_w.max(1));
    let height = height.clamp(1, src_h.max(1));

    Region {
        left: centered_offset(hotspot.x, width, src_w),
        top: centered_offset(hotspot.y, height, src_h),
        width,
        height,
    }
}

/// Start offset of a span of `extent` centered on `center`, clamped to `0..=bound - extent`.
fn centered_offset(center: f64, extent: u32, bound: u32) -> u32 {
    let max = bound.saturating_sub(extent) as f64;
    // NaN survives clamp and casts to 0
    (center - extent as f64 / 2.0).round().clamp(0.0, max) as u32
}

/// Concrete pixel work for one [`ResizeDirective`] on a given source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    /// Dimensions after scaling.
    pub scaled: (u32, u32),
    /// Crop applied to the scaled image (`cover`).
    pub crop: Option<Region>,
    /// Canvas the scaled image is centered on (`contain`).
    pub canvas: Option<(u32, u32)>,
}

impl ResizePlan {
    /// Final output dimensions.
    pub fn output_dimensions(&self) -> (u32, u32) {
        if let Some(canvas) = self.canvas {
            canvas
        } else if let Some(crop) = self.crop {
            (crop.width, crop.height)
        } else {
            self.scaled
        }
    }
}

/// Translate a resize directive into scale/crop/pad steps.
///
/// With only one axis given every fit mode scales uniformly by that axis.
/// With `without_enlargement` the scale factor is capped at 1, so no output
/// axis ever exceeds the source.
pub fn resize_plan(source: (u32, u32), directive: &ResizeDirective) -> ResizePlan {
    let (src_w, src_h) = source;
    let cap = |scale: f64| {
        if directive.without_enlargement {
            scale.min(1.0)
        } else {
            scale
        }
    };
    let scale_x = directive.width.map(|w| w as f64 / src_w as f64);
    let scale_y = directive.height.map(|h| h as f64 / src_h as f64);

    let uniform = |scale: f64| ResizePlan {
        scaled: scale_dimensions(source, cap(scale)),
        crop: None,
        canvas: None,
    };

    let (sx, sy) = match (scale_x, scale_y) {
        (None, None) => return uniform(1.0),
        (Some(s), None) | (None, Some(s)) => return uniform(s),
        (Some(sx), Some(sy)) => (sx, sy),
    };
    let (box_w, box_h) = (directive.width.unwrap_or(src_w), directive.height.unwrap_or(src_h));

    match directive.fit {
        Fit::Inside => uniform(sx.min(sy)),
        Fit::Outside => uniform(sx.max(sy)),
        Fit::Cover => {
            let scaled = scale_dimensions(source, cap(sx.max(sy)));
            let crop_w = box_w.min(scaled.0);
            let crop_h = box_h.min(scaled.1);
            let crop = (crop_w, crop_h) != scaled;
            ResizePlan {
                scaled,
                crop: crop.then(|| Region {
                    left: (scaled.0 - crop_w) / 2,
                    top: (scaled.1 - crop_h) / 2,
                    width: crop_w,
                    height: crop_h,
                }),
                canvas: None,
            }
        }
        Fit::Contain => {
            let scaled = scale_dimensions(source, cap(sx.min(sy)));
            let canvas = if directive.without_enlargement {
                (box_w.min(src_w), box_h.min(src_h))
            } else {
                (box_w, box_h)
            };
            let canvas = (canvas.0.max(scaled.0), canvas.1.max(scaled.1));
            ResizePlan {
                scaled,
                crop: None,
                canvas: (canvas != scaled).then_some(canvas),
            }
        }
        Fit::Fill => {
            let scaled = if directive.without_enlargement {
                (box_w.min(src_w), box_h.min(src_h))
            } else {
                (box_w, box_h)
            };
            ResizePlan {
                scaled: (scaled.0.max(1), scaled.1.max(1)),
                crop: None,
                canvas: None,
            }
        }
    }
}

fn scale_dimensions(source: (u32, u32), scale: f64) -> (u32, u32) {
    let w = (source.0 as f64 * scale).round() as u32;
    let h = (source.1 as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}
