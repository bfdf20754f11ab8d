//! # Pictor
//!
//! Turns one source image into a fixed set of named, resized, re-encoded
//! derivatives, plus a tiny blurred inline preview ("LQIP") and descriptive
//! metadata. Content pipelines get thumbnails and responsive breakpoints
//! without re-implementing crop and resize policy at every call site.
//!
//! ```no_run
//! use pictor::process::{process, ProcessingOptions};
//!
//! let source = std::fs::read("dawn.jpg")?;
//! let result = process(&source, "dawn.jpg", &ProcessingOptions::default())?;
//!
//! println!("{}x{}", result.metadata.width, result.metadata.height);
//! for (label, derivative) in &result.sizes {
//!     println!("{label}: {}x{}", derivative.width, derivative.height);
//! }
//! assert!(result.lqip.starts_with("data:image/webp;base64,"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Named Sizes
//!
//! A size set maps labels to geometry. Four shapes are accepted in config
//! files and JSON, each mapped onto one [`sizes::NamedSize`] variant:
//!
//! ```text
//! "original"                       re-encode, same pixels
//! 1200                             fit in 1200x1200 along the source's long axis
//! [400, 300, [820, 310], "cover"]  positional box, optional hotspot and fit
//! { width = 400, height = 300 }    the same as a table
//! ```
//!
//! A box with a hotspot is cut out of the source around that point first
//! (the largest box-shaped region that stays inside the image) and then
//! scaled to exactly the box. Nothing is ever upscaled.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`process`] | Entry point: metadata, decode, preview and every size in parallel |
//! | [`sizes`] | `NamedSize`, `Hotspot`, `Fit` and their serde shapes |
//! | [`imaging`] | Region and resize math, engine trait, `image`-crate backend |
//! | [`metadata`] | Source metadata; the single validation gate |
//! | [`types`] | Result types: `Derivative`, `ProcessedImage` |
//! | [`config`] | `pictor.toml` loading, validation and merging |
//! | [`export`] | Writes derivatives and a JSON manifest to disk (CLI) |
//! | [`naming`] | `<stem>-<label>.<ext>` output file names |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Engine Behind a Trait
//!
//! All pixel work goes through [`imaging::ImageBackend`]. Size planning and
//! region math never see pixels, so they are tested against a recording mock
//! while [`imaging::RustBackend`] does the real decoding and encoding with the
//! pure-Rust `image` crate (Lanczos3 resampling, rav1e for AVIF).
//!
//! ## No Partial Results
//!
//! Either every size and the preview are produced, or the call fails. Sources
//! the engine cannot read fail with `INVALID_IMAGE`; engine failures after
//! that propagate unchanged as `ENGINE_FAILURE`.
//!
//! ## Clamped Hotspots
//!
//! A hotspot outside the image is pulled back to the nearest valid crop rather
//! than rejected. Focal points often come from other tools and from images
//! that have since been resized.

pub mod config;
pub mod export;
pub mod imaging;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod process;
pub mod sizes;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
