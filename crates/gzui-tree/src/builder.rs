//! Document → element tree.
//!
//! One depth-first pass over the records. Every record becomes an element,
//! in source order; nothing in a single record can fail the build:
//! - a record without `iid` becomes a zero-geometry placeholder whose
//!   children are still built;
//! - a malformed attribute falls back to its default;
//! - an image that is not in the package, or whose reference is
//!   malformed, marks the element [`MISSING_IMAGE`](PresentationFlags::MISSING_IMAGE).
//!
//! Present images are not fetched here. They become [`ImageRequest`]s for
//! the caller to dispatch.

use gzui_core::attr::{self, AttrValue, EnumValue};
use gzui_core::{BlitMode, Document, ElementId, Gutters, Record, Rect, ResourceKey, Rgb};
use gzui_layout::{CaptionPolicy, Layout};
use gzui_resource::{ImageRequest, Resolver};

use crate::element::{ImagePaint, Paint, UIElement};
use crate::flags::PresentationFlags;
use crate::index::ElementTree;

/// Interface tags whose background color is painted.
pub const DEFAULT_BACKGROUND_TYPES: &[&str] =
    &["IGZWinGen", "IGZWinFlatRect", "IGZWinText", "IGZWinTextEdit"];

/// Rules that vary by game or by taste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub captions: CaptionPolicy,
    pub background_types: Vec<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            captions: CaptionPolicy::default(),
            background_types: DEFAULT_BACKGROUND_TYPES.iter().map(|t| (*t).to_string()).collect(),
        }
    }
}

/// A built tree and the images it is waiting for.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    pub tree: ElementTree,
    pub requests: Vec<ImageRequest>,
}

/// Build the element tree for `document`.
///
/// `resolver` answers whether image keys exist; without one every image is
/// missing. The root is synthetic: its geometry is the union of the
/// top-level elements.
#[must_use]
pub fn build(document: &Document, resolver: Option<&Resolver>, options: &BuildOptions) -> BuildOutput {
    let _span = tracing::debug_span!("build_document", records = document.records.len()).entered();

    let mut builder = Builder {
        resolver,
        options,
        requests: Vec::new(),
        missing: Vec::new(),
    };
    let mut root = UIElement::empty(ElementId::root());
    root.children = builder.children(&root.id, &document.records, &Rect::ZERO);
    let bounds = root
        .children
        .iter()
        .map(UIElement::absolute)
        .reduce(|a, b| a.union(&b))
        .unwrap_or(Rect::ZERO);
    root.layout = Layout {
        local: bounds,
        absolute: bounds,
        gutters: Gutters::ZERO,
        content: bounds,
    };

    let mut tree = ElementTree::new(root);
    for id in &builder.missing {
        tree.mark_missing(id);
    }
    tracing::debug!(
        elements = tree.len(),
        requests = builder.requests.len(),
        missing = builder.missing.len(),
        "document built"
    );
    BuildOutput {
        tree,
        requests: builder.requests,
    }
}

struct Builder<'a> {
    resolver: Option<&'a Resolver>,
    options: &'a BuildOptions,
    requests: Vec<ImageRequest>,
    missing: Vec<ElementId>,
}

impl Builder<'_> {
    fn children(&mut self, parent: &ElementId, records: &[Record], container: &Rect) -> Vec<UIElement> {
        records
            .iter()
            .enumerate()
            .map(|(index, record)| self.element(parent.child(index), record, container))
            .collect()
    }

    fn element(&mut self, id: ElementId, record: &Record, container: &Rect) -> UIElement {
        let mut element = UIElement::empty(id);
        element.class_id = record.get("clsid").map(str::to_string);
        element.source_id = record.get("id").map(str::to_string);
        element.raw_caption = record.get("caption").map(str::to_string);

        let Some(iid) = record.get("iid") else {
            tracing::warn!(id = %element.id, tag = %record.tag, "record has no interface tag; using placeholder");
            element.placeholder = true;
            element.layout = gzui_layout::resolve(None, None, container);
            element.children = self.children(&element.id, &record.children, &element.layout.absolute);
            return element;
        };
        element.interface_id = Some(iid.to_string());
        element.font = record.get("font").map(str::to_string);
        element.layout = gzui_layout::resolve(record.get("area"), record.get("gutters"), container);
        element.caption = self.options.captions.resolve(
            Some(iid),
            record.get("caption"),
            record.get("showcaption"),
            record.get("align"),
        );
        element.paint = Paint {
            fill: self.fill(iid, record),
            fore: color(record, "forecolor"),
            image: self.image(&element, record),
        };

        element.children = self.children(&element.id, &record.children, &element.layout.absolute);
        element
    }

    /// `fillcolor` wins over `bkgcolor`, and only background-capable types
    /// paint either.
    fn fill(&self, iid: &str, record: &Record) -> Option<Rgb> {
        if !self.options.background_types.iter().any(|t| t == iid) {
            return None;
        }
        color(record, "fillcolor").or_else(|| color(record, "bkgcolor"))
    }

    fn image(&mut self, element: &UIElement, record: &Record) -> Option<ImagePaint> {
        let raw = record.get("image")?;
        let Some(AttrValue::ResourceRef(key)) = attr::decode_soft("image", raw) else {
            tracing::warn!(id = %element.id, raw, "malformed image reference");
            self.missing.push(element.id.clone());
            return None;
        };
        let paint = ImagePaint {
            key,
            blit: blit_mode(record),
            param: record
                .get("wparam")
                .and_then(|raw| match attr::decode_soft("wparam", raw) {
                    Some(AttrValue::Param(param)) => Some(param.value),
                    _ => None,
                }),
        };

        if !self.has(&key) {
            tracing::warn!(id = %element.id, key = %key, "image not in package");
            self.missing.push(element.id.clone());
        } else if !element.layout.absolute.is_empty() {
            self.requests.push(ImageRequest {
                element: element.id.clone(),
                key,
                blit: paint.blit,
                width: element.layout.absolute.width,
                height: element.layout.absolute.height,
                param: paint.param,
            });
        }
        Some(paint)
    }

    fn has(&self, key: &ResourceKey) -> bool {
        self.resolver.is_some_and(|resolver| resolver.contains(key))
    }
}

fn color(record: &Record, name: &str) -> Option<Rgb> {
    record
        .get(name)
        .and_then(|raw| attr::decode_soft(name, raw))
        .and_then(|value| value.as_color())
}

/// `edgeimage=yes` is the same as `blttype=edge`.
fn blit_mode(record: &Record) -> BlitMode {
    let edge = record
        .get("edgeimage")
        .and_then(|raw| attr::decode_soft("edgeimage", raw))
        .and_then(|value| value.as_bool())
        .unwrap_or(false);
    if edge {
        return BlitMode::Edge;
    }
    match record.get("blttype").and_then(|raw| attr::decode_soft("blttype", raw)) {
        Some(AttrValue::Enum(EnumValue::Blit(mode))) => mode,
        _ => BlitMode::Normal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gzui_resource::MemoryPackage;
    use std::sync::Arc;
    use tracing_test::traced_test;

    fn legacy() -> Record {
        Record::new("LEGACY")
    }

    fn resolver_with(keys: &[ResourceKey]) -> Resolver {
        let mut package = MemoryPackage::new();
        for key in keys {
            package.insert(*key, vec![0u8]);
        }
        Resolver::new(Arc::new(package))
    }

    fn build_one(record: Record, resolver: Option<&Resolver>) -> BuildOutput {
        build(&Document::new(vec![record]), resolver, &BuildOptions::default())
    }

    fn id(raw: &str) -> ElementId {
        ElementId::from(raw)
    }

    #[test]
    fn geometry_and_gutters() {
        let out = build_one(
            legacy()
                .attr("iid", "IGZWinGen")
                .attr("area", "(10,20,110,70)")
                .attr("gutters", "(5,5,5,5)"),
            None,
        );
        let element = out.tree.get(&id("e0")).unwrap();
        assert_eq!(element.geometry(), Rect::new(10, 20, 100, 50));
        assert_eq!(element.layout.gutters, Gutters::all(5));
        assert_eq!(out.tree.root().geometry(), Rect::new(10, 20, 100, 50));
    }

    #[test]
    fn children_are_offset_by_container() {
        let out = build_one(
            legacy()
                .attr("iid", "IGZWinGen")
                .attr("area", "(100,100,300,300)")
                .child(legacy().attr("iid", "IGZWinText").attr("area", "(5,5,15,15)")),
            None,
        );
        let child = out.tree.get(&id("e0.0")).unwrap();
        assert_eq!(child.geometry(), Rect::new(5, 5, 10, 10));
        assert_eq!(child.absolute(), Rect::new(105, 105, 10, 10));
    }

    #[traced_test]
    #[test]
    fn placeholder_keeps_children() {
        let out = build_one(
            legacy()
                .attr("area", "(10,10,50,50)")
                .attr("fillcolor", "(1,2,3)")
                .child(legacy().attr("iid", "IGZWinText").attr("area", "(1,1,2,2)")),
            None,
        );
        let placeholder = out.tree.get(&id("e0")).unwrap();
        assert!(placeholder.placeholder);
        assert_eq!(placeholder.geometry(), Rect::ZERO);
        assert_eq!(placeholder.paint, Paint::default());
        assert_eq!(out.tree.get(&id("e0.0")).unwrap().absolute(), Rect::new(1, 1, 1, 1));
        assert!(logs_contain("no interface tag"));
    }

    #[test]
    fn fill_precedence_and_gate() {
        let out = build(
            &Document::new(vec![
                legacy()
                    .attr("iid", "IGZWinGen")
                    .attr("bkgcolor", "(9,9,9)")
                    .attr("fillcolor", "(1,2,3)")
                    .attr("forecolor", "(4,5,6)"),
                legacy().attr("iid", "IGZWinGen").attr("bkgcolor", "(9,9,9)"),
                legacy().attr("iid", "IGZWinBtn").attr("fillcolor", "(1,2,3)"),
                legacy().attr("iid", "IGZWinGen").attr("fillcolor", "(300,0,0)"),
            ]),
            None,
            &BuildOptions::default(),
        );
        let paint = |raw: &str| out.tree.get(&id(raw)).unwrap().paint.clone();
        assert_eq!(paint("e0").fill, Some(Rgb::new(1, 2, 3)));
        assert_eq!(paint("e0").fore, Some(Rgb::new(4, 5, 6)));
        assert_eq!(paint("e1").fill, Some(Rgb::new(9, 9, 9)));
        assert_eq!(paint("e2").fill, None);
        assert_eq!(paint("e3").fill, None);
    }

    #[test]
    fn caption_rules_apply() {
        let out = build(
            &Document::new(vec![
                legacy().attr("iid", "IGZWinText").attr("caption", "Hello").attr("showcaption", "no"),
                legacy().attr("iid", "IGZWinText").attr("caption", "kCollapsedRows=1"),
                legacy().attr("iid", "IGZWinText").attr("caption", "Line\\r\\nTwo").attr("align", "center"),
            ]),
            None,
            &BuildOptions::default(),
        );
        assert!(out.tree.get(&id("e0")).unwrap().caption.is_none());
        assert!(out.tree.get(&id("e1")).unwrap().caption.is_none());
        let caption = out.tree.get(&id("e2")).unwrap().caption.clone().unwrap();
        assert_eq!(caption.text, "Line\nTwo");
        assert_eq!(caption.align, gzui_core::Align::Center);
    }

    #[test]
    fn image_requests_and_missing() {
        let present = ResourceKey::image(0x499d_b772, 0xa950_0615);
        let resolver = resolver_with(&[present]);
        let out = build(
            &Document::new(vec![
                legacy()
                    .attr("iid", "IGZWinGen")
                    .attr("area", "(0,0,90,186)")
                    .attr("image", "{499db772,a9500615}")
                    .attr("edgeimage", "yes")
                    .attr("wparam", "0x0300d422,uint32,7"),
                legacy().attr("iid", "IGZWinBMP").attr("area", "(0,0,10,10)").attr("image", "{1,2}"),
                legacy().attr("iid", "IGZWinBMP").attr("area", "(0,0,10,10)").attr("image", "garbage"),
                legacy().attr("iid", "IGZWinBMP").attr("image", "{499db772,a9500615}").attr("blttype", "tile"),
            ]),
            Some(&resolver),
            &BuildOptions::default(),
        );

        assert_eq!(out.requests.len(), 1);
        let request = &out.requests[0];
        assert_eq!(request.element, id("e0"));
        assert_eq!(request.key, present);
        assert_eq!(request.blit, BlitMode::Edge);
        assert_eq!((request.width, request.height), (90, 186));
        assert_eq!(request.param, Some(7));

        let missing: Vec<_> = out.tree.missing().map(ElementId::as_str).collect();
        assert_eq!(missing, ["e1", "e2"]);
        assert_eq!(
            out.tree.get(&id("e3")).unwrap().paint.image.map(|i| i.blit),
            Some(BlitMode::Tile)
        );
    }

    #[test]
    fn no_resolver_means_missing() {
        let out = build_one(legacy().attr("iid", "IGZWinBMP").attr("image", "{1,2}"), None);
        assert!(out.requests.is_empty());
        assert_eq!(out.tree.missing().count(), 1);
    }

    #[test]
    fn source_order_preserved() {
        let out = build(
            &Document::new(vec![
                legacy().attr("iid", "IGZWinGen").attr("id", "back").attr("area", "(0,0,50,50)"),
                legacy().attr("iid", "IGZWinGen").attr("id", "front").attr("area", "(25,25,75,75)"),
            ]),
            None,
            &BuildOptions::default(),
        );
        let order: Vec<_> = out
            .tree
            .paint_order()
            .filter_map(|e| e.source_id.as_deref())
            .collect();
        assert_eq!(order, ["back", "front"]);
        assert_eq!(out.tree.hit_test(30, 30), Some(&id("e1")));
        assert_eq!(out.tree.root().geometry(), Rect::new(0, 0, 75, 75));
    }
}
