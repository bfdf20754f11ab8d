//! File names for derivatives written to disk.
//!
//! Every derivative of `photos/Sunset Beach.jpg` lands next to its siblings as
//! `<stem>-<label>.<ext>`:
//!
//! ```text
//! sunset-beach-original.webp
//! sunset-beach-large.webp
//! sunset-beach-thumb.webp
//! sunset-beach.json          # manifest
//! ```
//!
//! Stems and labels are reduced to lowercase ASCII alphanumerics, `-` and `_`
//! so the names are safe in URLs and on every filesystem.

use crate::imaging::OutputFormat;
use std::path::Path;

/// Stem used when a filename has nothing usable left after sanitizing.
const FALLBACK_STEM: &str = "image";

/// Reduce a label to `[a-z0-9_-]`, mapping every other run of characters to a
/// single `-` and trimming dashes at both ends.
///
/// - `"Large"` → `"large"`
/// - `"hero 16:9"` → `"hero-16-9"`
/// - `"--x--"` → `"x"`
pub fn sanitize_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for c in label.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}

/// Sanitized stem of a caller-supplied filename, falling back to `"image"`.
///
/// - `"photos/Sunset Beach.jpg"` → `"sunset-beach"`
/// - `"archive.tar.gz"` → `"archive-tar"`
/// - `""` → `"image"`
pub fn file_stem(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| sanitize_label(&s.to_string_lossy()))
        .unwrap_or_default();
    if stem.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        stem
    }
}

/// `<stem>-<label>.<ext>` for one derivative.
pub fn derivative_filename(stem: &str, label: &str, format: OutputFormat) -> String {
    let label = sanitize_label(label);
    if label.is_empty() {
        format!("{}.{}", stem, format.extension())
    } else {
        format!("{}-{}.{}", stem, label, format.extension())
    }
}

/// `<stem>.json` manifest describing every derivative.
pub fn manifest_filename(stem: &str) -> String {
    format!("{stem}.json")
}
