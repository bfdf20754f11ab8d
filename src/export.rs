//! Writing a processed image to disk.
//!
//! The library itself never touches the filesystem; this module is what the
//! CLI uses to persist a [`ProcessedImage`]. Each derivative becomes one file
//! named by [`naming::derivative_filename`], and a JSON manifest with the
//! metadata, the preview and per-size details is written alongside:
//!
//! ```json
//! {
//!   "metadata": { "width": 1200, "height": 800, "ratio": 1.5, "format": "jpeg", ... },
//!   "lqip": "data:image/webp;base64,...",
//!   "sizes": {
//!     "large": { "path": "dawn-large.webp", "format": "webp", "width": 1200, "height": 800, "bytes": 81234 }
//!   }
//! }
//! ```

use crate::imaging::OutputFormat;
use crate::metadata::SourceMetadata;
use crate::naming;
use crate::types::ProcessedImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Labels '{first}' and '{second}' both map to file {filename}")]
    NameCollision {
        first: String,
        second: String,
        filename: String,
    },
}

/// One derivative as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedSize {
    /// File name relative to the output directory.
    pub path: String,
    pub format: OutputFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: usize,
}

/// Contents of the `<stem>.json` manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportManifest {
    pub metadata: SourceMetadata,
    pub lqip: String,
    pub sizes: BTreeMap<String, ExportedSize>,
}

/// Write every derivative and the manifest into `dir`, creating it if needed.
///
/// File names are checked for collisions before anything is written.
pub fn write_outputs(
    result: &ProcessedImage,
    dir: &Path,
    stem: &str,
) -> Result<ExportManifest, ExportError> {
    let mut claimed: BTreeMap<String, &str> = BTreeMap::new();
    let mut sizes = BTreeMap::new();

    for (label, derivative) in &result.sizes {
        let filename = naming::derivative_filename(stem, label, derivative.format);
        if let Some(first) = claimed.insert(filename.clone(), label.as_str()) {
            return Err(ExportError::NameCollision {
                first: first.to_string(),
                second: label.clone(),
                filename,
            });
        }
        sizes.insert(
            label.clone(),
            ExportedSize {
                path: filename,
                format: derivative.format,
                width: derivative.width,
                height: derivative.height,
                bytes: derivative.data.len(),
            },
        );
    }

    fs::create_dir_all(dir)?;
    for (label, exported) in &sizes {
        fs::write(dir.join(&exported.path), &result.sizes[label].data)?;
    }

    let manifest = ExportManifest {
        metadata: result.metadata.clone(),
        lqip: result.lqip.clone(),
        sizes,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    fs::write(dir.join(naming::manifest_filename(stem)), json)?;

    Ok(manifest)
}
