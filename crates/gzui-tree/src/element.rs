//! Element descriptors.

use gzui_core::{BlitMode, ElementId, Rect, ResourceKey, Rgb};
use gzui_layout::{Caption, Layout};

/// An image placed on an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImagePaint {
    pub key: ResourceKey,
    pub blit: BlitMode,
    /// Numeric `wparam` value, for slice rules.
    pub param: Option<i64>,
}

/// Paint properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paint {
    /// Background fill (`fillcolor`, else `bkgcolor`) on background-capable types.
    pub fill: Option<Rgb>,
    /// Border / text color (`forecolor`).
    pub fore: Option<Rgb>,
    pub image: Option<ImagePaint>,
}

/// One visual node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UIElement {
    pub id: ElementId,
    /// `clsid` tag.
    pub class_id: Option<String>,
    /// `iid` tag; drives caption and background rules.
    pub interface_id: Option<String>,
    /// The record's own `id` attribute, if any. Not unique.
    pub source_id: Option<String>,
    pub layout: Layout,
    pub paint: Paint,
    pub caption: Option<Caption>,
    /// Caption attribute as written, for tree views.
    pub raw_caption: Option<String>,
    /// `font` style name.
    pub font: Option<String>,
    /// Built from a record lacking its interface tag: zero geometry, no paint.
    pub placeholder: bool,
    pub children: Vec<UIElement>,
}

impl UIElement {
    pub(crate) fn empty(id: ElementId) -> Self {
        Self {
            id,
            class_id: None,
            interface_id: None,
            source_id: None,
            layout: Layout::default(),
            paint: Paint::default(),
            caption: None,
            raw_caption: None,
            font: None,
            placeholder: false,
            children: Vec::new(),
        }
    }

    /// Rectangle relative to the parent.
    #[must_use]
    pub fn geometry(&self) -> Rect {
        self.layout.local
    }

    /// Rectangle in document space.
    #[must_use]
    pub fn absolute(&self) -> Rect {
        self.layout.absolute
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.id.is_root()
    }

    /// This element and its descendants in paint order (parents before
    /// children, earlier siblings before later ones).
    pub fn paint_order(&self) -> impl Iterator<Item = &UIElement> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let element = stack.pop()?;
            stack.extend(element.children.iter().rev());
            Some(element)
        })
    }
}
