//! Image processing on top of a pluggable engine.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Probe** | `image::ImageReader` header read |
//! | **Extract** | `crop_imm` around a hotspot-centered [`Region`] |
//! | **Resize** | Lanczos3 with `inside`/`outside`/`cover`/`contain`/`fill` fits |
//! | **Encode** | `image` encoders, lossy WebP through libwebp |
//! | **Preview** | 15px WebP + Gaussian blur, base64 `data:` URL |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for region and resize math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
mod jpeg;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, ImageBackend, Rendered, SourceInfo};
pub use calculations::{ResizePlan, compute_region, resize_plan};
pub use operations::{
    DerivativePlan, build_derivative, build_preview, plan_derivative, plan_preview,
};
pub use params::{OutputFormat, PreviewSettings, Quality, Region, RenderParams, ResizeDirective};
pub use rust_backend::RustBackend;
