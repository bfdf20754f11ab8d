//! Image engine trait and shared types.
//!
//! The [`ImageBackend`] trait defines the three operations every engine must
//! support: probe, decode, and render. A render composes format selection,
//! extract, resize, blur, and encoding in a single call on a decoded handle.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), pure Rust with no
//! system libraries. Tests use the recording mock in [`tests`].

use super::params::{OutputFormat, RenderParams};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Failed to decode image: {0}")]
    Decode(String),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("{format} encode failed: {message}")]
    Encode {
        format: OutputFormat,
        message: String,
    },
}

/// What the engine can tell about a source without decoding pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub width: u32,
    pub height: u32,
    /// Lowercase container format (`"png"`, `"jpeg"`, …), if recognized.
    pub format: Option<String>,
    /// Size of the encoded source in bytes.
    pub size: u64,
}

/// One encoded image produced by [`ImageBackend::render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Trait for image engines.
///
/// `Image` is the engine's decoded handle. It is shared read-only across the
/// concurrent renders of one processing call, hence `Sync`.
pub trait ImageBackend: Sync {
    type Image: Sync;

    /// Read dimensions and format from the encoded source.
    fn probe(&self, source: &[u8]) -> Result<SourceInfo, BackendError>;

    /// Decode the source into a reusable handle.
    fn decode(&self, source: &[u8]) -> Result<Self::Image, BackendError>;

    /// Execute one render and return the encoded bytes.
    fn render(&self, image: &Self::Image, params: &RenderParams) -> Result<Rendered, BackendError>;
}
