//! Attribute listing for the property view.
//!
//! Each attribute becomes a [`Property`]. Structured attributes get child
//! rows:
//! - `area` → X, Y, Width, Height
//! - `image` → Group ID, Instance ID; flagged missing when not in the package
//! - `font` → the resolved style's fields, when the style is known
//!
//! Color triplets carry a swatch. Attributes whose name repeats within the
//! record are flagged duplicated, once per occurrence.

use std::collections::BTreeMap;

use gzui_core::attr::{self, AttrValue};
use gzui_core::font_style::FontStyle;
use gzui_core::{Record, Rect, ResourceKey, Rgb};

/// One row of the property view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Property {
    pub name: String,
    pub value: String,
    /// The name occurs more than once in the record.
    pub duplicated: bool,
    /// Image reference that did not resolve.
    pub missing: bool,
    pub swatch: Option<Rgb>,
    pub children: Vec<Property>,
}

impl Property {
    fn leaf(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
            ..Self::default()
        }
    }
}

/// List `record`'s attributes in source order.
///
/// `fonts` resolves `font` style names; `has_image` reports whether an image
/// key is in the package.
pub fn properties(
    record: &Record,
    fonts: &BTreeMap<String, FontStyle>,
    has_image: impl Fn(&ResourceKey) -> bool,
) -> Vec<Property> {
    record
        .attributes
        .iter()
        .map(|(name, value)| {
            let mut property = Property {
                duplicated: record.is_duplicated(name),
                ..Property::leaf(name, value)
            };
            match name.as_str() {
                "area" => property.children = area_rows(value),
                "image" => match ResourceKey::parse_image_ref(value) {
                    Some(key) => {
                        property.missing = !has_image(&key);
                        property.children = vec![
                            Property::leaf("Group ID", format!("{:#x}", key.group)),
                            Property::leaf("Instance ID", format!("{:#x}", key.instance)),
                        ];
                    }
                    None => property.missing = true,
                },
                "font" => {
                    if let Some(style) = fonts.get(value.as_str()) {
                        property.children = font_rows(style);
                    }
                }
                _ => {}
            }
            if name.contains("color") {
                property.swatch = attr::parse_color(value).ok();
            }
            property
        })
        .collect()
}

fn area_rows(raw: &str) -> Vec<Property> {
    let Some(AttrValue::Tuple(items)) = attr::decode_soft("area", raw) else {
        return Vec::new();
    };
    let &[x1, y1, x2, y2] = items.as_slice() else {
        return Vec::new();
    };
    let rect = Rect::from_corners(x1, y1, x2, y2);
    vec![
        Property::leaf("X", rect.x),
        Property::leaf("Y", rect.y),
        Property::leaf("Width", rect.width),
        Property::leaf("Height", rect.height),
    ]
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn font_rows(style: &FontStyle) -> Vec<Property> {
    vec![
        Property::leaf("Font Face", &style.face),
        Property::leaf("Font Size", style.size),
        Property::leaf("Bold", yes_no(style.bold)),
        Property::leaf("Underline", yes_no(style.underline)),
        Property::leaf("Line Spacing", style.line_spacing),
        Property::leaf("Antialiasing Mode", &style.antialiasing),
        Property::leaf("Horizontal Scaling", format!("{:?}", style.xscale)),
    ]
}
