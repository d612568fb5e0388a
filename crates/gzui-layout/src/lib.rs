#![forbid(unsafe_code)]

//! Layout resolution for UI-script elements.
//!
//! - [`resolve`] - area + gutters + container → [`Layout`]
//! - [`caption`] - caption text decoding and visibility rules
//!
//! Area tuples are `(startX, startY, endX, endY)` relative to the
//! container. Malformed or missing values resolve to a zero-area rectangle
//! at the origin; nothing here fails.
//!
//! # Example
//! ```
//! use gzui_layout::{resolve, Rect, Gutters};
//!
//! let layout = resolve(Some("(10,20,110,70)"), Some("(5,5,5,5)"), &Rect::new(100, 100, 640, 480));
//! assert_eq!(layout.local, Rect::new(10, 20, 100, 50));
//! assert_eq!(layout.absolute, Rect::new(110, 120, 100, 50));
//! assert_eq!(layout.gutters, Gutters::all(5));
//! ```

pub mod caption;

use gzui_core::attr::{self, AttrValue};
pub use gzui_core::geometry::{Gutters, Rect};

pub use caption::{Caption, CaptionPolicy};

/// Resolved geometry of one element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    /// Rectangle relative to the container, as written in the script.
    pub local: Rect,
    /// Rectangle in document space.
    pub absolute: Rect,
    /// Inner padding.
    pub gutters: Gutters,
    /// Document-space rectangle inside the gutters.
    pub content: Rect,
}

/// Resolve an element's geometry inside `parent` (document space).
#[must_use]
pub fn resolve(raw_area: Option<&str>, raw_gutters: Option<&str>, parent: &Rect) -> Layout {
    let local = resolve_area(raw_area);
    let gutters = resolve_gutters(raw_gutters);
    let absolute = local.offset_by(parent);
    Layout {
        local,
        absolute,
        gutters,
        content: absolute.inner(gutters),
    }
}

/// Decode an `area` attribute; absent or malformed gives [`Rect::ZERO`].
#[must_use]
pub fn resolve_area(raw: Option<&str>) -> Rect {
    let Some(raw) = raw else {
        return Rect::ZERO;
    };
    match attr::decode("area", raw) {
        Ok(AttrValue::Tuple(items)) if items.len() == 4 => {
            Rect::from_corners(items[0], items[1], items[2], items[3])
        }
        Ok(_) => Rect::ZERO,
        Err(err) => {
            tracing::debug!(raw, "{err}; using zero area");
            Rect::ZERO
        }
    }
}

/// Decode a `gutters` attribute.
///
/// Four items are `(left, top, right, bottom)`; two items are
/// `(horizontal, vertical)` broadcast to their paired edges. Anything else
/// gives [`Gutters::ZERO`].
#[must_use]
pub fn resolve_gutters(raw: Option<&str>) -> Gutters {
    let Some(raw) = raw else {
        return Gutters::ZERO;
    };
    match attr::decode("gutters", raw) {
        Ok(AttrValue::Tuple(items)) => match items.as_slice() {
            &[h, v] => Gutters::symmetric(h, v),
            &[left, top, right, bottom] => Gutters::new(left, top, right, bottom),
            _ => Gutters::ZERO,
        },
        Ok(_) => Gutters::ZERO,
        Err(err) => {
            tracing::debug!(raw, "{err}; using zero gutters");
            Gutters::ZERO
        }
    }
}
