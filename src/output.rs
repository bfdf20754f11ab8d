//! CLI output formatting.
//!
//! Output leads with the source image, then lists one indented line per
//! derivative. Sizes are shown as `label: WxH, bytes` so the effect of each
//! named size is visible at a glance.
//!
//! # Output Format
//!
//! ## Process (streamed while encoding)
//!
//! ```text
//! dawn.jpg (2400x1600 jpeg)
//!     preview: 412 B
//!     thumb: 160x107, 6.1 KB
//!     large: 1200x800, 88.4 KB
//! ```
//!
//! Derivative lines appear in completion order.
//!
//! ## Export summary
//!
//! ```text
//! Wrote 5 sizes to out/
//!     large → dawn-large.webp (1200x800, 88.4 KB)
//!     thumb → dawn-thumb.webp (160x107, 6.1 KB)
//!     manifest → dawn.json
//! ```
//!
//! ## Inspect
//!
//! ```text
//! dawn.jpg
//!     Dimensions: 2400x1600 (ratio 1.500)
//!     Format: jpeg (image/jpeg)
//!     Size: 1.2 MB
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::export::ExportManifest;
use crate::metadata::SourceMetadata;
use crate::naming;
use crate::process::ProcessEvent;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Human-readable byte count with one decimal above 1 KB.
fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

// ============================================================================
// Process output
// ============================================================================

/// Format a single process progress event as display lines.
pub fn format_process_event(event: &ProcessEvent) -> Vec<String> {
    match event {
        ProcessEvent::Probed {
            filename,
            width,
            height,
            format,
        } => vec![format!("{} ({}x{} {})", filename, width, height, format)],
        ProcessEvent::PreviewReady { bytes } => {
            vec![format!("{}preview: {}", indent(1), format_bytes(*bytes as u64))]
        }
        ProcessEvent::DerivativeReady {
            label,
            width,
            height,
            bytes,
        } => vec![format!(
            "{}{}: {}x{}, {}",
            indent(1),
            label,
            width,
            height,
            format_bytes(*bytes as u64)
        )],
    }
}

// ============================================================================
// Export summary
// ============================================================================

/// Format the files written by an export.
pub fn format_export_summary(manifest: &ExportManifest, dir: &Path, stem: &str) -> Vec<String> {
    let count = manifest.sizes.len();
    let noun = if count == 1 { "size" } else { "sizes" };
    let mut lines = vec![format!("Wrote {} {} to {}/", count, noun, dir.display())];

    for (label, size) in &manifest.sizes {
        lines.push(format!(
            "{}{} \u{2192} {} ({}x{}, {})",
            indent(1),
            label,
            size.path,
            size.width,
            size.height,
            format_bytes(size.bytes as u64)
        ));
    }
    lines.push(format!(
        "{}manifest \u{2192} {}",
        indent(1),
        naming::manifest_filename(stem)
    ));
    lines
}

/// Print the export summary to stdout.
pub fn print_export_summary(manifest: &ExportManifest, dir: &Path, stem: &str) {
    for line in format_export_summary(manifest, dir, stem) {
        println!("{}", line);
    }
}

// ============================================================================
// Inspect output
// ============================================================================

/// Format source metadata for the `inspect` command.
pub fn format_metadata(metadata: &SourceMetadata) -> Vec<String> {
    vec![
        metadata.filename.clone(),
        format!(
            "{}Dimensions: {}x{} (ratio {:.3})",
            indent(1),
            metadata.width,
            metadata.height,
            metadata.ratio
        ),
        format!(
            "{}Format: {} ({})",
            indent(1),
            metadata.format,
            metadata.mimetype
        ),
        format!("{}Size: {}", indent(1), format_bytes(metadata.filesize)),
    ]
}

/// Print source metadata to stdout.
pub fn print_metadata(metadata: &SourceMetadata) {
    for line in format_metadata(metadata) {
        println!("{}", line);
    }
}
