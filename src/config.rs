//! Processing configuration.
//!
//! Handles loading, validating, and merging `pictor.toml`. Stock defaults are
//! the base layer; a user file overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! format = "webp"           # webp, png, jpeg, avif, gif, tiff
//! quality = 90              # JPEG/AVIF quality (1-100)
//! # hotspot = [640, 360]    # Default focal point for box sizes
//!
//! [sizes]                   # Replaces the stock set entirely when present
//! original = "original"
//! large = 1200
//! medium = 600
//! small = 300
//! thumb = 160
//!
//! [preview]
//! max_edge = 15             # Preview fits in a 15x15 box
//! blur_sigma = 10.0         # Gaussian blur strength
//!
//! [processing]
//! max_processes = 4         # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. `[preview]` and `[processing]` merge key by key
//! with the defaults. `[sizes]` is different: a user size set is the complete
//! list of derivatives, so it replaces the stock set instead of extending it.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, PreviewSettings};
use crate::sizes::{Hotspot, NamedSizeSet, default_sizes};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pictor.toml";

/// Top-level tables that a user file replaces instead of merging into.
const REPLACED_TABLES: &[&str] = &["sizes"];

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `pictor.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PictorConfig {
    /// Encoded format of every derivative.
    pub format: OutputFormat,
    /// Lossy quality (1-100).
    pub quality: u32,
    /// Focal point applied to box sizes without their own hotspot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
    /// Named derivative sizes.
    pub sizes: NamedSizeSet,
    /// Inline preview settings.
    pub preview: PreviewSettings,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PictorConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: 90,
            hotspot: None,
            sizes: default_sizes(),
            preview: PreviewSettings::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PictorConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.sizes.is_empty() {
            return Err(ConfigError::Validation("sizes must not be empty".into()));
        }
        if self.preview.max_edge == 0 {
            return Err(ConfigError::Validation(
                "preview.max_edge must be non-zero".into(),
            ));
        }
        if !(self.preview.blur_sigma.is_finite() && self.preview.blur_sigma > 0.0) {
            return Err(ConfigError::Validation(
                "preview.blur_sigma must be a positive number".into(),
            ));
        }
        Ok(())
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel encoding workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PictorConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
/// - Top-level `sizes` in overlay replaces the base table wholesale.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for key in REPLACED_TABLES {
                if overlay_table.contains_key(*key) {
                    base_table.remove(*key);
                }
            }
            toml::Value::Table(merge_tables(base_table, overlay_table))
        }
        (_, overlay) => overlay,
    }
}

fn merge_tables(mut base: toml::Table, overlay: toml::Table) -> toml::Table {
    for (key, overlay_val) in overlay {
        let merged = match (base.remove(&key), overlay_val) {
            (Some(toml::Value::Table(b)), toml::Value::Table(o)) => {
                toml::Value::Table(merge_tables(b, o))
            }
            (_, overlay_val) => overlay_val,
        };
        base.insert(key, merged);
    }
    base
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PictorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PictorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. A missing file yields the stock defaults.
pub fn load_config(path: &Path) -> Result<PictorConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `pictor.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Pictor Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Encoded format of every derivative: webp, png, jpeg (or jpg), avif, gif, tiff.
# The preview is always WebP.
format = "webp"

# Lossy quality (1-100). Applies to WebP, JPEG and AVIF.
quality = 90

# Default focal point [x, y] in source pixels. Box sizes without their own
# hotspot are cropped around it. Points outside the image are pulled in.
# hotspot = [640, 360]

# ---------------------------------------------------------------------------
# Derivative sizes
# ---------------------------------------------------------------------------
# One derivative per label. When this table is present it replaces the
# default set entirely. Each value is one of:
#
#   "original"                             Re-encode only, same dimensions
#   1200                                   Fit in a 1200x1200 box, never upscale
#   [400, 300]                             Fit inside a 400x300 box
#   [400, 400, [820, 310]]                 Crop around a hotspot, then 400x400
#   [400, 300, [820, 310], "cover"]        Same, with an explicit fit
#   { width = 1600, height = 900, fit = "cover", hotspot = [800, 300] }
#
# Fit modes: inside (default), outside, cover, contain, fill.
[sizes]
original = "original"
large = 1200
medium = 600
small = 300
thumb = 160

# ---------------------------------------------------------------------------
# Inline preview (LQIP)
# ---------------------------------------------------------------------------
# A tiny blurred WebP embedded as a base64 data URL.
[preview]
# Longest edge of the preview in pixels.
max_edge = 15
# Gaussian blur sigma.
blur_sigma = 10.0

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel encoding workers.
# Omit or comment out to auto-detect (uses all CPU cores).
# Values larger than the number of cores are clamped down.
# max_processes = 4
"##
}
