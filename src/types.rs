//! Result types returned to callers of the processing pipeline.
//!
//! Everything here is created per call and fully owned by the caller.

use crate::imaging::OutputFormat;
use crate::metadata::SourceMetadata;
use std::collections::BTreeMap;

/// One encoded derivative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivative {
    /// Encoded bytes in `format`.
    pub data: Vec<u8>,
    pub format: OutputFormat,
    /// Encoded output dimensions as reported by the engine.
    pub width: u32,
    pub height: u32,
}

/// Complete result of processing one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedImage {
    /// One derivative per configured label.
    pub sizes: BTreeMap<String, Derivative>,
    pub metadata: SourceMetadata,
    /// `data:image/webp;base64,…` preview.
    pub lqip: String,
}
