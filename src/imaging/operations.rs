//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take a named size or preview settings, compute render parameters,
//! and call the backend.

use super::backend::{BackendError, ImageBackend};
use super::calculations::compute_region;
use super::params::{OutputFormat, PreviewSettings, Quality, Region, RenderParams, ResizeDirective};
use crate::sizes::{BoxSize, Fit, Hotspot, NamedSize};
use crate::types::Derivative;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Geometry of one derivative: an optional extract followed by an optional resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivativePlan {
    pub extract: Option<Region>,
    pub resize: Option<ResizeDirective>,
}

/// Plan a derivative without executing it.
///
/// `default_hotspot` applies to box sizes that carry no hotspot of their own.
pub fn plan_derivative(
    size: &NamedSize,
    source: (u32, u32),
    default_hotspot: Option<Hotspot>,
) -> DerivativePlan {
    let (src_w, src_h) = source;

    match *size {
        NamedSize::Original => DerivativePlan {
            extract: None,
            resize: None,
        },
        NamedSize::MaxDimension(n) => {
            // Landscape sources are bounded by width, everything else by height
            let landscape = src_w as f64 / src_h as f64 > 1.0;
            let resize = if landscape {
                ResizeDirective::new(Some(n), None, Fit::Inside)
            } else {
                ResizeDirective::new(None, Some(n), Fit::Inside)
            };
            DerivativePlan {
                extract: None,
                resize: Some(resize),
            }
        }
        NamedSize::ExplicitBox(b) => plan_box(b, source, default_hotspot),
        NamedSize::Tuple(width, height, hotspot, fit) => plan_box(
            BoxSize {
                width,
                height,
                fit,
                hotspot,
            },
            source,
            default_hotspot,
        ),
    }
}

/// With a hotspot the box is cut out around it first, so the final resize is an
/// exact `cover` of an already aspect-matched region.
fn plan_box(b: BoxSize, source: (u32, u32), default_hotspot: Option<Hotspot>) -> DerivativePlan {
    match b.hotspot.or(default_hotspot) {
        Some(hotspot) => DerivativePlan {
            extract: Some(compute_region(source, (b.width, b.height), hotspot)),
            resize: Some(ResizeDirective::new(Some(b.width), Some(b.height), Fit::Cover)),
        },
        None => DerivativePlan {
            extract: None,
            resize: Some(ResizeDirective::new(
                Some(b.width),
                Some(b.height),
                b.fit.unwrap_or_default(),
            )),
        },
    }
}

/// Render one derivative of a decoded source.
pub fn build_derivative<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    size: &NamedSize,
    format: OutputFormat,
    quality: Quality,
    source: (u32, u32),
    default_hotspot: Option<Hotspot>,
) -> Result<Derivative> {
    let plan = plan_derivative(size, source, default_hotspot);
    let rendered = backend.render(
        image,
        &RenderParams {
            format,
            quality,
            extract: plan.extract,
            resize: plan.resize,
            blur: None,
        },
    )?;

    Ok(Derivative {
        data: rendered.data,
        format,
        width: rendered.width,
        height: rendered.height,
    })
}

/// Render parameters of the inline preview.
pub fn plan_preview(settings: &PreviewSettings) -> RenderParams {
    RenderParams {
        format: OutputFormat::Webp,
        quality: Quality::default(),
        extract: None,
        resize: Some(ResizeDirective::new(
            Some(settings.max_edge),
            Some(settings.max_edge),
            Fit::Inside,
        )),
        blur: Some(settings.blur_sigma),
    }
}

/// Render the blurred preview and wrap it as a `data:` URL.
pub fn build_preview<B: ImageBackend>(
    backend: &B,
    image: &B::Image,
    settings: &PreviewSettings,
) -> Result<String> {
    let params = plan_preview(settings);
    let rendered = backend.render(image, &params)?;
    Ok(format!(
        "data:{};base64,{}",
        params.format.mime_type(),
        STANDARD.encode(&rendered.data)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};

    fn hotspot_box(width: u32, height: u32, hotspot: Option<Hotspot>) -> NamedSize {
        NamedSize::ExplicitBox(BoxSize {
            width,
            height,
            fit: None,
            hotspot,
        })
    }

    #[test]
    fn plan_original_is_a_plain_reencode() {
        let plan = plan_derivative(&NamedSize::Original, (640, 480), Some(Hotspot::new(1.0, 1.0)));
        assert_eq!(plan.extract, None);
        assert_eq!(plan.resize, None);
    }

    #[test]
    fn plan_max_dimension_landscape_constrains_width() {
        let plan = plan_derivative(&NamedSize::MaxDimension(300), (1200, 800), None);
        let resize = plan.resize.unwrap();
        assert_eq!((resize.width, resize.height), (Some(300), None));
        assert_eq!(resize.fit, Fit::Inside);
        assert!(resize.without_enlargement);
    }

    #[test]
    fn plan_max_dimension_portrait_and_square_constrain_height() {
        for source in [(800, 1200), (500, 500)] {
            let resize = plan_derivative(&NamedSize::MaxDimension(300), source, None)
                .resize
                .unwrap();
            assert_eq!((resize.width, resize.height), (None, Some(300)), "{source:?}");
        }
    }

    #[test]
    fn plan_max_dimension_ignores_default_hotspot() {
        let plan = plan_derivative(
            &NamedSize::MaxDimension(100),
            (400, 200),
            Some(Hotspot::new(10.0, 10.0)),
        );
        assert_eq!(plan.extract, None);
    }

    #[test]
    fn plan_box_without_hotspot_uses_fit() {
        let plan = plan_derivative(&NamedSize::Tuple(300, 200, None, Some(Fit::Fill)), (800, 600), None);
        assert_eq!(plan.extract, None);
        let resize = plan.resize.unwrap();
        assert_eq!((resize.width, resize.height), (Some(300), Some(200)));
        assert_eq!(resize.fit, Fit::Fill);
    }

    #[test]
    fn plan_box_fit_defaults_to_inside() {
        let plan = plan_derivative(&hotspot_box(300, 200, None), (800, 600), None);
        assert_eq!(plan.resize.unwrap().fit, Fit::Inside);
    }

    #[test]
    fn plan_box_with_hotspot_extracts_then_covers() {
        let plan = plan_derivative(
            &hotspot_box(100, 100, Some(Hotspot::new(300.0, 100.0))),
            (400, 200),
            None,
        );
        assert_eq!(
            plan.extract,
            Some(Region {
                left: 200,
                top: 0,
                width: 200,
                height: 200
            })
        );
        let resize = plan.resize.unwrap();
        assert_eq!((resize.width, resize.height), (Some(100), Some(100)));
        assert_eq!(resize.fit, Fit::Cover);
    }

    #[test]
    fn plan_box_falls_back_to_default_hotspot() {
        let plan = plan_derivative(
            &NamedSize::Tuple(100, 100, None, None),
            (400, 200),
            Some(Hotspot::new(0.0, 0.0)),
        );
        assert_eq!(plan.extract.map(|r| (r.left, r.top)), Some((0, 0)));
    }

    #[test]
    fn plan_own_hotspot_wins_over_default() {
        let plan = plan_derivative(
            &NamedSize::Tuple(100, 100, Some(Hotspot::new(400.0, 100.0)), None),
            (400, 200),
            Some(Hotspot::new(0.0, 0.0)),
        );
        assert_eq!(plan.extract.map(|r| r.left), Some(200));
    }

    #[test]
    fn build_derivative_renders_once_with_plan() {
        let backend = MockBackend::with_source(400, 200, "png");
        let image = backend.decode(b"src").unwrap();

        let derivative = build_derivative(
            &backend,
            &image,
            &hotspot_box(100, 100, Some(Hotspot::new(300.0, 100.0))),
            OutputFormat::Jpeg,
            Quality::new(70),
            (400, 200),
            None,
        )
        .unwrap();

        assert_eq!(derivative.format, OutputFormat::Jpeg);
        assert_eq!((derivative.width, derivative.height), (100, 100));

        let renders = backend.renders();
        assert_eq!(renders.len(), 1);
        assert!(matches!(
            &renders[0],
            RecordedOp::Render {
                format: OutputFormat::Jpeg,
                quality: 70,
                extract: Some(Region { left: 200, .. }),
                blur: None,
                ..
            }
        ));
    }

    #[test]
    fn build_derivative_max_dimension_never_exceeds_source() {
        let backend = MockBackend::with_source(120, 80, "png");
        let image = backend.decode(b"src").unwrap();
        let derivative = build_derivative(
            &backend,
            &image,
            &NamedSize::MaxDimension(1200),
            OutputFormat::Webp,
            Quality::default(),
            (120, 80),
            None,
        )
        .unwrap();
        assert_eq!((derivative.width, derivative.height), (120, 80));
    }

    #[test]
    fn build_derivative_propagates_engine_error() {
        let backend = MockBackend::with_source(100, 100, "png").failing_on(OutputFormat::Avif);
        let image = backend.decode(b"src").unwrap();
        let result = build_derivative(
            &backend,
            &image,
            &NamedSize::Original,
            OutputFormat::Avif,
            Quality::default(),
            (100, 100),
            None,
        );
        assert!(matches!(result, Err(BackendError::Encode { .. })));
    }

    #[test]
    fn plan_preview_shrinks_and_blurs_as_webp() {
        let params = plan_preview(&PreviewSettings::default());
        assert_eq!(params.format, OutputFormat::Webp);
        assert_eq!(params.blur, Some(10.0));
        let resize = params.resize.unwrap();
        assert_eq!((resize.width, resize.height), (Some(15), Some(15)));
        assert_eq!(resize.fit, Fit::Inside);
    }

    #[test]
    fn build_preview_wraps_render_as_data_url() {
        let backend = MockBackend::with_source(120, 80, "png");
        let image = backend.decode(b"src").unwrap();

        let lqip = build_preview(&backend, &image, &PreviewSettings::default()).unwrap();

        // Mock payload for a 15x10 webp render
        assert_eq!(
            lqip,
            format!("data:image/webp;base64,{}", STANDARD.encode("webp:15x10"))
        );
    }

    #[test]
    fn build_preview_is_deterministic() {
        let backend = MockBackend::with_source(64, 64, "jpeg");
        let image = backend.decode(b"src").unwrap();
        let settings = PreviewSettings {
            max_edge: 8,
            blur_sigma: 2.5,
        };
        let a = build_preview(&backend, &image, &settings).unwrap();
        let b = build_preview(&backend, &image, &settings).unwrap();
        assert_eq!(a, b);
    }
}
