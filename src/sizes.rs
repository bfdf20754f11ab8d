//! Named size specifications.
//!
//! A [`NamedSizeSet`] maps caller-chosen labels (`"large"`, `"thumb"`, …) to a
//! [`NamedSize`] describing the geometry of one derivative. In config files and
//! JSON a size can be written in four shapes, each mapping onto exactly one
//! variant:
//!
//! ```toml
//! [sizes]
//! original = "original"                        # NamedSize::Original
//! large = 1200                                 # NamedSize::MaxDimension(1200)
//! square = [400, 400, [820, 310], "cover"]     # NamedSize::Tuple(..)
//! hero = { width = 1600, height = 900, hotspot = [800, 300] }  # NamedSize::ExplicitBox(..)
//! ```
//!
//! Anything else (unknown keywords, zero or negative dimensions, extra array
//! elements) is rejected at deserialization time.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Unexpected, Visitor};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Keyword selecting the [`NamedSize::Original`] variant.
pub const ORIGINAL: &str = "original";

/// Mapping from a caller-defined label to the size to produce for it.
pub type NamedSizeSet = BTreeMap<String, NamedSize>;

/// Focal point in source-pixel coordinates, written `[x, y]`.
///
/// No bounds are enforced here: a hotspot outside the source is pulled back in
/// bounds when the extract region is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hotspot {
    pub x: f64,
    pub y: f64,
}

impl Hotspot {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Serialize for Hotspot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (self.x, self.y).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Hotspot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (x, y) = <(f64, f64)>::deserialize(deserializer)?;
        Ok(Hotspot { x, y })
    }
}

/// Resize policy when both box dimensions are given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Scale to fit inside the box, preserving aspect ratio. No cropping.
    #[default]
    Inside,
    /// Scale until the box is covered, preserving aspect ratio. No cropping.
    Outside,
    /// Scale until the box is covered, then center-crop to the box.
    Cover,
    /// Scale to fit inside, then pad to the box with transparent pixels.
    Contain,
    /// Stretch to the box, ignoring aspect ratio.
    Fill,
}

impl fmt::Display for Fit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Fit::Inside => "inside",
            Fit::Outside => "outside",
            Fit::Cover => "cover",
            Fit::Contain => "contain",
            Fit::Fill => "fill",
        })
    }
}

/// Explicit target box, optionally biased toward a focal point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit: Option<Fit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotspot: Option<Hotspot>,
}

/// Geometry of one derivative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NamedSize {
    /// Re-encode only; pixel dimensions are untouched.
    Original,
    /// Fit inside an `n × n` box along the source's constraining axis.
    MaxDimension(u32),
    /// Fit or cover an exact box.
    ExplicitBox(BoxSize),
    /// Positional form of [`NamedSize::ExplicitBox`]: `(width, height, hotspot, fit)`.
    ///
    /// A fit with no hotspot has no positional slot, so that combination
    /// serializes as a table and parses back as `ExplicitBox` with the same
    /// [`as_box`](NamedSize::as_box) geometry.
    Tuple(u32, u32, Option<Hotspot>, Option<Fit>),
}

impl NamedSize {
    /// Box geometry of the box variants; `None` for `Original` and `MaxDimension`.
    pub fn as_box(&self) -> Option<BoxSize> {
        match *self {
            NamedSize::Original | NamedSize::MaxDimension(_) => None,
            NamedSize::ExplicitBox(b) => Some(b),
            NamedSize::Tuple(width, height, hotspot, fit) => Some(BoxSize {
                width,
                height,
                fit,
                hotspot,
            }),
        }
    }
}

impl fmt::Display for NamedSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = match *self {
            NamedSize::Original => return f.write_str(ORIGINAL),
            NamedSize::MaxDimension(n) => return write!(f, "max {n}px"),
            NamedSize::ExplicitBox(b) => b,
            NamedSize::Tuple(width, height, hotspot, fit) => BoxSize {
                width,
                height,
                fit,
                hotspot,
            },
        };
        write!(f, "{}x{} {}", b.width, b.height, b.fit.unwrap_or_default())?;
        if let Some(h) = b.hotspot {
            write!(f, " @ ({}, {})", h.x, h.y)?;
        }
        Ok(())
    }
}

/// The stock size set: a passthrough plus four conventional breakpoints.
pub fn default_sizes() -> NamedSizeSet {
    [
        (ORIGINAL, NamedSize::Original),
        ("large", NamedSize::MaxDimension(1200)),
        ("medium", NamedSize::MaxDimension(600)),
        ("small", NamedSize::MaxDimension(300)),
        ("thumb", NamedSize::MaxDimension(160)),
    ]
    .into_iter()
    .map(|(label, size)| (label.to_string(), size))
    .collect()
}

impl Serialize for NamedSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            NamedSize::Original => serializer.serialize_str(ORIGINAL),
            NamedSize::MaxDimension(n) => serializer.serialize_u32(n),
            NamedSize::ExplicitBox(b) => b.serialize(serializer),
            // A fit without a hotspot has no positional slot; the table form is equivalent.
            NamedSize::Tuple(width, height, None, Some(fit)) => BoxSize {
                width,
                height,
                fit: Some(fit),
                hotspot: None,
            }
            .serialize(serializer),
            NamedSize::Tuple(width, height, hotspot, fit) => {
                let len = 2 + usize::from(hotspot.is_some()) + usize::from(fit.is_some());
                let mut seq = serializer.serialize_seq(Some(len))?;
                seq.serialize_element(&width)?;
                seq.serialize_element(&height)?;
                if let Some(h) = hotspot {
                    seq.serialize_element(&h)?;
                }
                if let Some(f) = fit {
                    seq.serialize_element(&f)?;
                }
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for NamedSize {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NamedSizeVisitor)
    }
}

struct NamedSizeVisitor;

fn positive<E: de::Error>(value: u32) -> Result<u32, E> {
    if value == 0 {
        Err(E::invalid_value(
            Unexpected::Unsigned(0),
            &"a positive pixel dimension",
        ))
    } else {
        Ok(value)
    }
}

impl<'de> Visitor<'de> for NamedSizeVisitor {
    type Value = NamedSize;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(
            "\"original\", a positive integer, [width, height, hotspot?, fit?], \
             or a table with width and height",
        )
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<NamedSize, E> {
        if value == ORIGINAL {
            Ok(NamedSize::Original)
        } else {
            Err(E::invalid_value(Unexpected::Str(value), &self))
        }
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<NamedSize, E> {
        let n = u32::try_from(value)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))?;
        Ok(NamedSize::MaxDimension(positive(n)?))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<NamedSize, E> {
        match u64::try_from(value) {
            Ok(v) => self.visit_u64(v),
            Err(_) => Err(E::invalid_value(Unexpected::Signed(value), &self)),
        }
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<NamedSize, A::Error> {
        let width: u32 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(0, &self))?;
        let height: u32 = seq
            .next_element()?
            .ok_or_else(|| de::Error::invalid_length(1, &self))?;
        let hotspot = seq.next_element::<Option<Hotspot>>()?.flatten();
        let fit = seq.next_element::<Option<Fit>>()?.flatten();
        if seq.next_element::<de::IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(5, &self));
        }
        Ok(NamedSize::Tuple(
            positive(width)?,
            positive(height)?,
            hotspot,
            fit,
        ))
    }

    fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<NamedSize, A::Error> {
        let b = BoxSize::deserialize(de::value::MapAccessDeserializer::new(map))?;
        positive::<A::Error>(b.width)?;
        positive::<A::Error>(b.height)?;
        Ok(NamedSize::ExplicitBox(b))
    }
}
