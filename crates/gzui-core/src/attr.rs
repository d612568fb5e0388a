#![forbid(unsafe_code)]

//! Attribute grammar decoding.
//!
//! UI-script attribute values are untyped text. Each attribute name maps to
//! one [`AttrKind`] through a single dispatch table ([`attribute_kind`]),
//! and [`decode`] turns the raw text into a typed [`AttrValue`].
//!
//! # Grammar
//!
//! - Tuples: `(10,20,110,70)`, parentheses optional, signed decimal
//!   integers separated by commas.
//! - Colors: `(r,g,b)` with each channel in `0..=255`.
//! - Booleans: the exact, case-sensitive literals `yes` and `no`.
//! - Enums: `align` and `blttype` keywords.
//! - Resource references: `{group,instance}` in hexadecimal.
//! - Window params: `id,type,value`, e.g. `0x0300d422,uint32,1`.
//!
//! Decoding never aborts an element. [`decode_soft`] substitutes the
//! documented default of the attribute's kind and logs the failure.
//!
//! # Example
//! ```
//! use gzui_core::attr::{decode, decode_soft, AttrValue, Align};
//!
//! assert_eq!(decode("align", "center").unwrap(), AttrValue::align(Align::Center));
//! assert!(decode("area", "(1,2,x,4)").is_err());
//! assert_eq!(decode_soft("area", "(1,2,x,4)"), Some(AttrValue::tuple([0, 0, 0, 0])));
//! ```

use std::fmt;

use smallvec::SmallVec;

use crate::color::Rgb;
use crate::resource::{ResourceKey, parse_hex};

/// Integer tuple storage; every tuple in the format has at most four items.
pub type Tuple = SmallVec<[i32; 4]>;

/// How an attribute value is decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrKind {
    /// Integer tuple accepting any of the listed arities.
    Tuple { arities: &'static [usize] },
    /// `(r,g,b)` color triplet.
    Color,
    /// `yes`/`no` flag with the value assumed when absent or unrecognized.
    Bool { default: bool },
    /// Caption alignment keyword.
    Align,
    /// Bitmap blit mode keyword.
    Blit,
    /// `{group,instance}` bitmap reference.
    ResourceRef,
    /// `id,type,value` window parameter.
    Param,
    /// Anything else, kept verbatim.
    Text,
}

const AREA_ARITY: &[usize] = &[4];
const GUTTER_ARITY: &[usize] = &[2, 4];

/// The dispatch table: map an attribute name to its decoding kind.
#[must_use]
pub fn attribute_kind(name: &str) -> AttrKind {
    match name {
        "area" => AttrKind::Tuple {
            arities: AREA_ARITY,
        },
        "gutters" => AttrKind::Tuple {
            arities: GUTTER_ARITY,
        },
        "showcaption" => AttrKind::Bool { default: true },
        "edgeimage" => AttrKind::Bool { default: false },
        "align" => AttrKind::Align,
        "blttype" => AttrKind::Blit,
        "image" => AttrKind::ResourceRef,
        "wparam" | "lparam" => AttrKind::Param,
        _ if name.starts_with("winflag_") => AttrKind::Bool { default: false },
        _ if name.ends_with("color") => AttrKind::Color,
        _ => AttrKind::Text,
    }
}

impl AttrKind {
    /// The value an attribute of this kind takes when it is malformed.
    ///
    /// `None` means "absent": colors, references, and params have no
    /// meaningful stand-in.
    #[must_use]
    pub fn default_value(self) -> Option<AttrValue> {
        match self {
            Self::Tuple { arities } => {
                let len = arities.iter().copied().max().unwrap_or(0);
                Some(AttrValue::Tuple(SmallVec::from_elem(0, len)))
            }
            Self::Bool { default } => Some(AttrValue::Bool(default)),
            Self::Align => Some(AttrValue::Enum(EnumValue::Align(Align::default()))),
            Self::Blit => Some(AttrValue::Enum(EnumValue::Blit(BlitMode::default()))),
            Self::Text => Some(AttrValue::Text(String::new())),
            Self::Color | Self::ResourceRef | Self::Param => None,
        }
    }
}

/// Caption alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Align {
    #[default]
    Left,
    Right,
    Center,
    LeftTop,
}

impl Align {
    /// Parse an `align` keyword (ASCII case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            "center" => Some(Self::Center),
            "lefttop" | "left-top" => Some(Self::LeftTop),
            _ => None,
        }
    }

    /// Resolve a possibly absent keyword, falling back to [`Align::Left`].
    #[must_use]
    pub fn resolve(raw: Option<&str>) -> Self {
        raw.and_then(Self::parse).unwrap_or_default()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
            Self::LeftTop => "left-top",
        }
    }
}

/// How a bitmap is mapped onto an element's area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlitMode {
    /// Native size at the origin, clipped to the target.
    #[default]
    Normal,
    /// Repeated across both axes without scaling.
    Tile,
    /// Fixed border bands with a stretched center.
    Edge,
}

impl BlitMode {
    /// Parse a `blttype` keyword (ASCII case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "normal" => Some(Self::Normal),
            "tile" => Some(Self::Tile),
            "edge" => Some(Self::Edge),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Tile => "tile",
            Self::Edge => "edge",
        }
    }
}

/// A decoded keyword attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumValue {
    Align(Align),
    Blit(BlitMode),
}

/// A window parameter such as `wparam=0x0300d422,uint32,1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WinParam {
    pub id: u32,
    pub kind: String,
    pub value: i64,
}

impl WinParam {
    /// Parse the `id,type,value` triple. The value may be decimal or `0x` hex.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut parts = raw.trim().splitn(3, ',');
        let id = parse_hex(parts.next()?)?;
        let kind = parts.next()?.trim().to_string();
        let value = parse_int(parts.next()?)?;
        if kind.is_empty() {
            return None;
        }
        Some(Self { id, kind, value })
    }
}

fn parse_int(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        return i64::from_str_radix(hex, 16).ok();
    }
    raw.parse().ok()
}

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Tuple(Tuple),
    Color(Rgb),
    Bool(bool),
    Enum(EnumValue),
    ResourceRef(ResourceKey),
    Param(WinParam),
    Text(String),
}

impl AttrValue {
    /// Convenience constructor for tuples.
    #[must_use]
    pub fn tuple<const N: usize>(items: [i32; N]) -> Self {
        Self::Tuple(items.iter().copied().collect())
    }

    #[must_use]
    pub const fn align(align: Align) -> Self {
        Self::Enum(EnumValue::Align(align))
    }

    #[must_use]
    pub const fn blit(mode: BlitMode) -> Self {
        Self::Enum(EnumValue::Blit(mode))
    }

    #[must_use]
    pub fn as_tuple(&self) -> Option<&[i32]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_color(&self) -> Option<Rgb> {
        match self {
            Self::Color(color) => Some(*color),
            _ => None,
        }
    }
}

/// Why a raw value failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    /// A tuple item is not a signed integer.
    NotNumeric { token: String },
    /// The tuple has an unsupported number of items.
    Arity { expected: &'static [usize], found: usize },
    /// A color channel is outside `0..=255`.
    ChannelRange { value: i32 },
    /// A boolean or keyword literal is not recognized.
    UnknownLiteral,
    /// A resource reference is not `{group,instance}` hex.
    BadReference,
    /// A window parameter is not `id,type,value`.
    BadParam,
}

/// Soft decode failure for one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttrDecodeError {
    pub attribute: String,
    pub raw: String,
    pub reason: DecodeReason,
}

impl AttrDecodeError {
    fn new(attribute: &str, raw: &str, reason: DecodeReason) -> Self {
        Self {
            attribute: attribute.to_string(),
            raw: raw.to_string(),
            reason,
        }
    }
}

impl fmt::Display for AttrDecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot decode {}={:?}: ", self.attribute, self.raw)?;
        match &self.reason {
            DecodeReason::NotNumeric { token } => write!(f, "{token:?} is not an integer"),
            DecodeReason::Arity { expected, found } => {
                write!(f, "expected {expected:?} items, found {found}")
            }
            DecodeReason::ChannelRange { value } => {
                write!(f, "color channel {value} out of range")
            }
            DecodeReason::UnknownLiteral => write!(f, "unrecognized literal"),
            DecodeReason::BadReference => write!(f, "expected {{group,instance}}"),
            DecodeReason::BadParam => write!(f, "expected id,type,value"),
        }
    }
}

impl std::error::Error for AttrDecodeError {}

/// Decode one attribute using the dispatch table.
pub fn decode(name: &str, raw: &str) -> Result<AttrValue, AttrDecodeError> {
    decode_as(attribute_kind(name), name, raw)
}

/// Decode one attribute as an explicit kind.
pub fn decode_as(kind: AttrKind, name: &str, raw: &str) -> Result<AttrValue, AttrDecodeError> {
    let fail = |reason| AttrDecodeError::new(name, raw, reason);
    match kind {
        AttrKind::Tuple { arities } => {
            let items = parse_tuple(raw).map_err(fail)?;
            if arities.contains(&items.len()) {
                Ok(AttrValue::Tuple(items))
            } else {
                Err(fail(DecodeReason::Arity {
                    expected: arities,
                    found: items.len(),
                }))
            }
        }
        AttrKind::Color => parse_color(raw).map(AttrValue::Color).map_err(fail),
        AttrKind::Bool { .. } => match raw {
            "yes" => Ok(AttrValue::Bool(true)),
            "no" => Ok(AttrValue::Bool(false)),
            _ => Err(fail(DecodeReason::UnknownLiteral)),
        },
        AttrKind::Align => Align::parse(raw)
            .map(AttrValue::align)
            .ok_or_else(|| fail(DecodeReason::UnknownLiteral)),
        AttrKind::Blit => BlitMode::parse(raw)
            .map(AttrValue::blit)
            .ok_or_else(|| fail(DecodeReason::UnknownLiteral)),
        AttrKind::ResourceRef => ResourceKey::parse_image_ref(raw)
            .map(AttrValue::ResourceRef)
            .ok_or_else(|| fail(DecodeReason::BadReference)),
        AttrKind::Param => WinParam::parse(raw)
            .map(AttrValue::Param)
            .ok_or_else(|| fail(DecodeReason::BadParam)),
        AttrKind::Text => Ok(AttrValue::Text(raw.to_string())),
    }
}

/// Decode, substituting the kind's documented default on failure.
///
/// Failures are logged at `debug` and never propagated.
#[must_use]
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn decode_soft(name: &str, raw: &str) -> Option<AttrValue> {
    let kind = attribute_kind(name);
    match decode_as(kind, name, raw) {
        Ok(value) => Some(value),
        Err(err) => {
            crate::debug!(attribute = name, raw = raw, "{err}; using default");
            kind.default_value()
        }
    }
}

/// Split a parenthesised, comma-separated list of signed integers.
pub fn parse_tuple(raw: &str) -> Result<Tuple, DecodeReason> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('(')
        .map(|s| s.strip_suffix(')').unwrap_or(s))
        .unwrap_or(trimmed);
    if inner.trim().is_empty() {
        return Ok(Tuple::new());
    }
    inner
        .split(',')
        .map(|token| {
            let token = token.trim();
            token.parse::<i32>().map_err(|_| DecodeReason::NotNumeric {
                token: token.to_string(),
            })
        })
        .collect()
}

/// Parse an `(r,g,b)` triplet.
pub fn parse_color(raw: &str) -> Result<Rgb, DecodeReason> {
    let items = parse_tuple(raw)?;
    if items.len() != 3 {
        return Err(DecodeReason::Arity {
            expected: &[3],
            found: items.len(),
        });
    }
    let channel = |value: i32| {
        u8::try_from(value).map_err(|_| DecodeReason::ChannelRange { value })
    };
    Ok(Rgb::new(channel(items[0])?, channel(items[1])?, channel(items[2])?))
}
