//! Element tree filtering.

use gzui_core::ElementId;
use rustc_hash::FxHashSet;

use crate::element::UIElement;
use crate::index::ElementTree;

/// Which elements a filter matched and which stay listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    /// Elements matching the criteria, in paint order.
    pub matched: Vec<ElementId>,
    shown: Option<FxHashSet<ElementId>>,
}

impl FilterOutcome {
    /// No criteria: everything is listed, nothing is highlighted.
    #[must_use]
    pub fn unfiltered() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_filtered(&self) -> bool {
        self.shown.is_some()
    }

    /// Listed because it matched or because a descendant did.
    #[must_use]
    pub fn is_shown(&self, id: &ElementId) -> bool {
        self.shown.as_ref().is_none_or(|shown| shown.contains(id))
    }

    #[must_use]
    pub fn is_matched(&self, id: &ElementId) -> bool {
        self.matched.contains(id)
    }
}

/// Match `criteria` case-insensitively against each element's interface
/// tag, raw caption and source id.
///
/// Ancestors of a match are shown so it stays reachable; an element that
/// neither matches nor contains a match is hidden. Empty criteria clear
/// the filter.
#[must_use]
pub fn filter(tree: &ElementTree, criteria: &str) -> FilterOutcome {
    if criteria.is_empty() {
        return FilterOutcome::unfiltered();
    }
    let needle = criteria.to_lowercase();
    let mut matched = Vec::new();
    let mut shown = FxHashSet::default();
    for element in tree.paint_order().filter(|e| !e.is_root()) {
        if !matches(element, &needle) {
            continue;
        }
        matched.push(element.id.clone());
        let mut cursor = Some(&element.id);
        while let Some(id) = cursor {
            if !shown.insert(id.clone()) {
                break;
            }
            cursor = tree.parent_of(id);
        }
    }
    tracing::debug!(criteria, matched = matched.len(), "tree filtered");
    FilterOutcome {
        matched,
        shown: Some(shown),
    }
}

fn matches(element: &UIElement, needle: &str) -> bool {
    [
        element.interface_id.as_deref(),
        element.raw_caption.as_deref(),
        element.source_id.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{BuildOptions, build};
    use gzui_core::{Document, Record};

    fn tree() -> ElementTree {
        let source = r#"
<LEGACY iid=IGZWinGen id=0x1000 caption="Options">
<CHILDREN>
<LEGACY iid=IGZWinBtn id=0x1001 caption="Cancel">
<LEGACY iid=IGZWinText caption="Sound Volume">
</CHILDREN>
<LEGACY iid=IGZWinSlider id=0x2000>
"#;
        let document = Document::parse(source).unwrap();
        build(&document, None, &BuildOptions::default()).tree
    }

    fn id(raw: &str) -> ElementId {
        ElementId::from(raw)
    }

    #[test]
    fn empty_criteria_shows_all() {
        let tree = tree();
        let outcome = filter(&tree, "");
        assert!(!outcome.is_filtered());
        assert!(tree.ids().all(|id| outcome.is_shown(id)));
        assert!(outcome.matched.is_empty());
    }

    #[test]
    fn match_keeps_ancestors() {
        let tree = tree();
        let outcome = filter(&tree, "volume");
        assert_eq!(outcome.matched, vec![id("e0.1")]);
        assert!(outcome.is_shown(&id("e0.1")));
        assert!(outcome.is_shown(&id("e0")));
        assert!(outcome.is_shown(&ElementId::root()));
        assert!(!outcome.is_shown(&id("e0.0")));
        assert!(!outcome.is_shown(&id("e1")));
        assert!(!outcome.is_matched(&id("e0")));
    }

    #[test]
    fn matches_interface_and_source_id() {
        let tree = tree();
        assert_eq!(filter(&tree, "igzwinslider").matched, vec![id("e1")]);
        assert_eq!(filter(&tree, "0x100").matched, vec![id("e0"), id("e0.0")]);
    }

    #[test]
    fn no_match_hides_everything() {
        let tree = build(
            &Document::new(vec![Record::new("LEGACY").attr("iid", "IGZWinGen")]),
            None,
            &BuildOptions::default(),
        )
        .tree;
        let outcome = filter(&tree, "zzz");
        assert!(outcome.is_filtered());
        assert!(tree.ids().all(|id| !outcome.is_shown(id)));
    }
}
