//! Derivative generation for a single source image.
//!
//! Takes the encoded bytes of one image and produces every configured named
//! size, the inline preview, and the source metadata.
//!
//! ## Pipeline
//!
//! ```text
//! probe ──► metadata ──► decode ──┬──► preview (15px WebP, blurred, data URL)
//!                                 └──► sizes (one render per label, in parallel)
//! ```
//!
//! Metadata extraction is the validation gate: anything the engine cannot
//! probe or decode fails with [`ProcessError::InvalidImage`]. After that,
//! engine failures propagate unchanged as [`ProcessError::Imaging`]. The
//! first failure fails the whole call; there are no partial results.
//!
//! ## Default Configuration
//!
//! ```text
//! Format:  webp
//! Quality: 90
//! Sizes:   original, large (1200), medium (600), small (300), thumb (160)
//! Preview: 15px box, blur sigma 10
//! ```
//!
//! ## Parallel Processing
//!
//! The preview and each derivative are independent renders of the same
//! decoded image and run on the [rayon](https://docs.rs/rayon) global pool.
//! They share only immutable inputs.

use crate::config::PictorConfig;
use crate::imaging::{
    BackendError, ImageBackend, OutputFormat, PreviewSettings, Quality, RustBackend,
    build_derivative, build_preview,
};
use crate::metadata::extract_metadata;
use crate::sizes::{Hotspot, NamedSizeSet, default_sizes};
use crate::types::{Derivative, ProcessedImage};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    /// The source is not an image the engine can read.
    #[error("Invalid image: {message}")]
    InvalidImage {
        message: String,
        #[source]
        source: Option<BackendError>,
    },
    /// The engine failed while producing a derivative or the preview.
    #[error("Image processing failed: {0}")]
    Imaging(#[from] BackendError),
}

impl ProcessError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ProcessError::InvalidImage {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn invalid_with_cause(message: impl Into<String>, cause: BackendError) -> Self {
        ProcessError::InvalidImage {
            message: message.into(),
            source: Some(cause),
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ProcessError::InvalidImage { .. } => "INVALID_IMAGE",
            ProcessError::Imaging(_) => "ENGINE_FAILURE",
        }
    }
}

/// What to produce for one source image.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingOptions {
    pub format: OutputFormat,
    pub quality: Quality,
    pub sizes: NamedSizeSet,
    /// Focal point for box sizes that carry none of their own.
    pub hotspot: Option<Hotspot>,
    pub preview: PreviewSettings,
}

impl ProcessingOptions {
    /// Build options from a resolved config.
    pub fn from_config(config: &PictorConfig) -> Self {
        Self {
            format: config.format,
            quality: Quality::new(config.quality),
            sizes: config.sizes.clone(),
            hotspot: config.hotspot,
            preview: config.preview,
        }
    }
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            quality: Quality::default(),
            sizes: default_sizes(),
            hotspot: None,
            preview: PreviewSettings::default(),
        }
    }
}

/// Progress events emitted while processing.
///
/// Derivative events arrive in completion order, which varies between runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// The source was probed and accepted.
    Probed {
        filename: String,
        width: u32,
        height: u32,
        format: String,
    },
    /// The inline preview was encoded.
    PreviewReady { bytes: usize },
    /// One named size was encoded.
    DerivativeReady {
        label: String,
        width: u32,
        height: u32,
        bytes: usize,
    },
}

/// Process a source image with the pure Rust engine.
pub fn process(
    source: &[u8],
    filename: &str,
    options: &ProcessingOptions,
) -> Result<ProcessedImage, ProcessError> {
    process_with_backend(&RustBackend::new(), source, filename, options, None)
}

/// Process a source image with a custom backend (allows testing with mock).
pub fn process_with_backend<B: ImageBackend>(
    backend: &B,
    source: &[u8],
    filename: &str,
    options: &ProcessingOptions,
    events: Option<Sender<ProcessEvent>>,
) -> Result<ProcessedImage, ProcessError> {
    let metadata = extract_metadata(backend, source, filename)?;
    if let Some(tx) = &events {
        tx.send(ProcessEvent::Probed {
            filename: metadata.filename.clone(),
            width: metadata.width,
            height: metadata.height,
            format: metadata.format.clone(),
        })
        .ok();
    }

    let image = backend
        .decode(source)
        .map_err(|e| ProcessError::invalid_with_cause("could not decode image", e))?;
    let dims = (metadata.width, metadata.height);
    let events = events.as_ref();

    let (lqip, sizes) = rayon::join(
        || {
            let lqip = build_preview(backend, &image, &options.preview)?;
            if let Some(tx) = events {
                tx.send(ProcessEvent::PreviewReady { bytes: lqip.len() }).ok();
            }
            Ok::<_, BackendError>(lqip)
        },
        || {
            options
                .sizes
                .par_iter()
                .map(|(label, size)| {
                    let derivative = build_derivative(
                        backend,
                        &image,
                        size,
                        options.format,
                        options.quality,
                        dims,
                        options.hotspot,
                    )?;
                    if let Some(tx) = events {
                        tx.send(ProcessEvent::DerivativeReady {
                            label: label.clone(),
                            width: derivative.width,
                            height: derivative.height,
                            bytes: derivative.data.len(),
                        })
                        .ok();
                    }
                    Ok::<_, BackendError>((label.clone(), derivative))
                })
                .collect::<Result<BTreeMap<String, Derivative>, BackendError>>()
        },
    );

    Ok(ProcessedImage {
        sizes: sizes?,
        metadata,
        lqip: lqip?,
    })
}

/// Run [`process_with_backend`] on the rayon pool without blocking the caller.
///
/// The single result arrives on the returned channel.
pub fn spawn_process<B>(
    backend: Arc<B>,
    source: Vec<u8>,
    filename: String,
    options: ProcessingOptions,
) -> Receiver<Result<ProcessedImage, ProcessError>>
where
    B: ImageBackend + Send + 'static,
{
    let (tx, rx) = std::sync::mpsc::channel();
    rayon::spawn(move || {
        let result = process_with_backend(backend.as_ref(), &source, &filename, &options, None);
        tx.send(result).ok();
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{Region, ResizeDirective};
    use crate::sizes::{BoxSize, Fit, NamedSize};
    use std::error::Error;

    fn single_size(label: &str, size: NamedSize) -> ProcessingOptions {
        ProcessingOptions {
            sizes: NamedSizeSet::from([(label.to_string(), size)]),
            ..ProcessingOptions::default()
        }
    }

    #[test]
    fn default_options() {
        let options = ProcessingOptions::default();
        assert_eq!(options.format, OutputFormat::Webp);
        assert_eq!(options.quality.value(), 90);
        assert_eq!(options.sizes.len(), 5);
        assert_eq!(options.hotspot, None);
    }

    #[test]
    fn options_from_config() {
        let config = PictorConfig {
            format: OutputFormat::Avif,
            quality: 60,
            hotspot: Some(Hotspot::new(5.0, 6.0)),
            ..PictorConfig::default()
        };
        let options = ProcessingOptions::from_config(&config);
        assert_eq!(options.format, OutputFormat::Avif);
        assert_eq!(options.quality.value(), 60);
        assert_eq!(options.hotspot, Some(Hotspot::new(5.0, 6.0)));
        assert_eq!(options.sizes, config.sizes);
    }

    #[test]
    fn error_codes() {
        assert_eq!(ProcessError::invalid("x").code(), "INVALID_IMAGE");
        let engine = ProcessError::from(BackendError::ProcessingFailed("boom".into()));
        assert_eq!(engine.code(), "ENGINE_FAILURE");
    }

    #[test]
    fn process_with_mock_generates_every_default_size() {
        let backend = MockBackend::with_source(120, 80, "png");

        let result =
            process_with_backend(&backend, b"source", "photo.png", &ProcessingOptions::default(), None)
                .unwrap();

        let labels: Vec<&str> = result.sizes.keys().map(String::as_str).collect();
        assert_eq!(labels, vec!["large", "medium", "original", "small", "thumb"]);
        for derivative in result.sizes.values() {
            assert_eq!(derivative.format, OutputFormat::Webp);
            // Every default size is larger than the source
            assert_eq!((derivative.width, derivative.height), (120, 80));
            assert!(!derivative.data.is_empty());
        }
        assert_eq!(result.metadata.ratio, 1.5);
        assert_eq!(result.metadata.filename, "photo.png");
        assert!(result.lqip.starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn process_with_mock_probes_and_decodes_once() {
        let backend = MockBackend::with_source(640, 480, "jpeg");

        process_with_backend(&backend, b"abcd", "a.jpg", &ProcessingOptions::default(), None)
            .unwrap();

        let ops = backend.get_operations();
        assert_eq!(ops[0], RecordedOp::Probe(4));
        assert_eq!(ops[1], RecordedOp::Decode(4));
        // One render per size plus the preview
        assert_eq!(backend.renders().len(), 6);
        let blurred = backend
            .renders()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Render { blur: Some(_), .. }))
            .count();
        assert_eq!(blurred, 1);
    }

    #[test]
    fn process_with_mock_scales_down_large_sources() {
        let backend = MockBackend::with_source(2400, 1600, "jpeg");

        let result =
            process_with_backend(&backend, b"x", "big.jpg", &ProcessingOptions::default(), None)
                .unwrap();

        let dims = |label: &str| (result.sizes[label].width, result.sizes[label].height);
        assert_eq!(dims("original"), (2400, 1600));
        assert_eq!(dims("large"), (1200, 800));
        assert_eq!(dims("medium"), (600, 400));
        assert_eq!(dims("small"), (300, 200));
        assert_eq!(dims("thumb"), (160, 107));
    }

    #[test]
    fn process_with_mock_hotspot_box_is_exact() {
        let backend = MockBackend::with_source(400, 200, "png");
        let options = single_size(
            "square",
            NamedSize::ExplicitBox(BoxSize {
                width: 100,
                height: 100,
                fit: None,
                hotspot: Some(Hotspot::new(300.0, 100.0)),
            }),
        );

        let result = process_with_backend(&backend, b"x", "wide.png", &options, None).unwrap();

        let square = &result.sizes["square"];
        assert_eq!((square.width, square.height), (100, 100));
        assert!(backend.renders().iter().any(|op| matches!(
            op,
            RecordedOp::Render {
                extract: Some(Region {
                    left: 200,
                    top: 0,
                    width: 200,
                    height: 200
                }),
                ..
            }
        )));
    }

    #[test]
    fn process_with_mock_applies_default_hotspot() {
        let backend = MockBackend::with_source(400, 200, "png");
        let options = ProcessingOptions {
            hotspot: Some(Hotspot::new(0.0, 0.0)),
            ..single_size("square", NamedSize::Tuple(50, 50, None, None))
        };

        process_with_backend(&backend, b"x", "wide.png", &options, None).unwrap();

        let extracts: Vec<Option<Region>> = backend
            .renders()
            .into_iter()
            .filter_map(|op| match op {
                RecordedOp::Render {
                    extract,
                    blur: None,
                    ..
                } => Some(extract),
                _ => None,
            })
            .collect();
        assert_eq!(
            extracts,
            vec![Some(Region {
                left: 0,
                top: 0,
                width: 200,
                height: 200
            })]
        );
    }

    #[test]
    fn process_with_mock_box_without_hotspot_resizes_only() {
        let backend = MockBackend::with_source(800, 600, "png");
        let options = single_size("card", NamedSize::Tuple(400, 400, None, Some(Fit::Cover)));

        let result = process_with_backend(&backend, b"x", "c.png", &options, None).unwrap();

        assert_eq!((result.sizes["card"].width, result.sizes["card"].height), (400, 400));
        assert!(backend.renders().iter().any(|op| matches!(
            op,
            RecordedOp::Render {
                extract: None,
                resize: Some(ResizeDirective { fit: Fit::Cover, .. }),
                ..
            }
        )));
    }

    #[test]
    fn process_with_mock_uses_requested_format_and_quality() {
        let backend = MockBackend::with_source(100, 100, "png");
        let options = ProcessingOptions {
            format: OutputFormat::Jpeg,
            quality: Quality::new(55),
            ..single_size("original", NamedSize::Original)
        };

        let result = process_with_backend(&backend, b"x", "p.png", &options, None).unwrap();

        assert_eq!(result.sizes["original"].format, OutputFormat::Jpeg);
        assert!(backend.renders().iter().any(|op| matches!(
            op,
            RecordedOp::Render {
                format: OutputFormat::Jpeg,
                quality: 55,
                ..
            }
        )));
        // Preview stays WebP regardless of the derivative format
        assert!(backend.renders().iter().any(|op| matches!(
            op,
            RecordedOp::Render {
                format: OutputFormat::Webp,
                blur: Some(_),
                ..
            }
        )));
    }

    #[test]
    fn process_unreadable_source_is_invalid_image() {
        let backend = MockBackend::new();

        let err = process_with_backend(&backend, b"", "empty", &ProcessingOptions::default(), None)
            .unwrap_err();

        assert_eq!(err.code(), "INVALID_IMAGE");
        assert!(err.source().is_some());
        // Nothing is decoded or rendered after a failed probe
        assert_eq!(backend.get_operations(), vec![RecordedOp::Probe(0)]);
    }

    #[test]
    fn process_undecodable_source_is_invalid_image() {
        let backend = MockBackend {
            fail_decode: true,
            ..MockBackend::with_source(10, 10, "png")
        };

        let err = process_with_backend(&backend, b"xx", "bad.png", &ProcessingOptions::default(), None)
            .unwrap_err();

        assert!(matches!(err, ProcessError::InvalidImage { source: Some(_), .. }));
        assert!(backend.renders().is_empty());
    }

    #[test]
    fn process_engine_failure_propagates_without_partial_result() {
        let backend = MockBackend::with_source(100, 100, "png").failing_on(OutputFormat::Avif);
        let options = ProcessingOptions {
            format: OutputFormat::Avif,
            ..ProcessingOptions::default()
        };

        let err = process_with_backend(&backend, b"x", "p.png", &options, None).unwrap_err();

        assert!(matches!(err, ProcessError::Imaging(BackendError::Encode { .. })));
        assert_eq!(err.code(), "ENGINE_FAILURE");
    }

    #[test]
    fn one_failing_size_fails_the_whole_call() {
        // 2400x1600 is landscape, so each max-dimension size resizes by width
        let backend = MockBackend::with_source(2400, 1600, "jpeg").failing_on_width(600);
        let (tx, rx) = std::sync::mpsc::channel();

        let result =
            process_with_backend(&backend, b"x", "p.jpg", &ProcessingOptions::default(), Some(tx));

        let err = result.unwrap_err();
        assert!(matches!(err, ProcessError::Imaging(BackendError::ProcessingFailed(_))));
        assert_eq!(err.code(), "ENGINE_FAILURE");

        // The failure is in "medium" alone; other renders still ran
        let succeeded: Vec<String> = rx
            .iter()
            .filter_map(|e| match e {
                ProcessEvent::DerivativeReady { label, .. } => Some(label),
                _ => None,
            })
            .collect();
        assert!(!succeeded.contains(&"medium".to_string()));
        assert!(backend.renders().len() > 1);
    }

    #[test]
    fn process_emits_progress_events() {
        let backend = MockBackend::with_source(120, 80, "png");
        let (tx, rx) = std::sync::mpsc::channel();

        process_with_backend(&backend, b"x", "photo.png", &ProcessingOptions::default(), Some(tx))
            .unwrap();

        let events: Vec<ProcessEvent> = rx.iter().collect();
        assert_eq!(
            events[0],
            ProcessEvent::Probed {
                filename: "photo.png".into(),
                width: 120,
                height: 80,
                format: "png".into(),
            }
        );
        let previews = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::PreviewReady { .. }))
            .count();
        let derivatives = events
            .iter()
            .filter(|e| matches!(e, ProcessEvent::DerivativeReady { .. }))
            .count();
        assert_eq!(previews, 1);
        assert_eq!(derivatives, 5);
    }

    #[test]
    fn spawn_process_delivers_result_on_channel() {
        let backend = Arc::new(MockBackend::with_source(300, 300, "png"));

        let rx = spawn_process(
            Arc::clone(&backend),
            b"abc".to_vec(),
            "s.png".into(),
            ProcessingOptions::default(),
        );

        let result = rx.recv().unwrap().unwrap();
        assert_eq!(result.sizes.len(), 5);
        assert_eq!(result.sizes["thumb"].width, 160);
    }

    #[test]
    fn spawn_process_delivers_errors_too() {
        let rx = spawn_process(
            Arc::new(MockBackend::new()),
            Vec::new(),
            "none".into(),
            ProcessingOptions::default(),
        );
        let err = rx.recv().unwrap().unwrap_err();
        assert_eq!(err.code(), "INVALID_IMAGE");
    }
}
