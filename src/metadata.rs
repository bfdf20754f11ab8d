//! Source image metadata.
//!
//! [`extract_metadata`] is the single validation gate of the pipeline: a source
//! the engine cannot probe, or one that reports zero dimensions or no
//! recognizable format, is rejected here as
//! [`ProcessError::InvalidImage`] before any pixel work starts.
//!
//! Nothing beyond what the engine reports is inspected. No EXIF, no IPTC, no
//! content sniffing of our own.

use crate::imaging::ImageBackend;
use crate::process::ProcessError;
use serde::{Deserialize, Serialize};

/// Descriptive facts about the source, created once per processing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub width: u32,
    pub height: u32,
    /// `width / height`.
    pub ratio: f64,
    /// Lowercase engine format name (`"png"`, `"jpeg"`, …).
    pub format: String,
    /// Size of the encoded source in bytes.
    pub filesize: u64,
    /// Caller-supplied name, passed through unchanged.
    pub filename: String,
    /// `image/<format>`.
    pub mimetype: String,
}

/// Probe the source and describe it.
pub fn extract_metadata(
    backend: &impl ImageBackend,
    source: &[u8],
    filename: &str,
) -> Result<SourceMetadata, ProcessError> {
    let info = backend
        .probe(source)
        .map_err(|e| ProcessError::invalid_with_cause("could not read image header", e))?;

    if info.width == 0 || info.height == 0 {
        return Err(ProcessError::invalid(format!(
            "image has no area ({}x{})",
            info.width, info.height
        )));
    }
    let Some(format) = info.format else {
        return Err(ProcessError::invalid("image format not recognized"));
    };

    Ok(SourceMetadata {
        width: info.width,
        height: info.height,
        ratio: info.width as f64 / info.height as f64,
        mimetype: format!("image/{format}"),
        format,
        filesize: info.size,
        filename: filename.to_string(),
    })
}
