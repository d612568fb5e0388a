//! Id index and presentation state over a built tree.
//!
//! Nodes are stored in paint order (pre-order), so a subtree is a
//! contiguous range and hit-testing walks the range backwards.

use gzui_core::ElementId;
use rustc_hash::FxHashMap;

use crate::element::UIElement;
use crate::flags::PresentationFlags;

#[derive(Debug, Clone)]
struct Node {
    id: ElementId,
    path: Vec<usize>,
    parent: Option<usize>,
    /// One past the last node of this subtree.
    end: usize,
    flags: PresentationFlags,
}

/// A built element tree with lookup by id.
#[derive(Debug, Clone)]
pub struct ElementTree {
    root: UIElement,
    nodes: Vec<Node>,
    index: FxHashMap<ElementId, usize>,
    selected: Option<usize>,
    hovered: Option<usize>,
}

impl ElementTree {
    /// Index `root` and every descendant. All start visible.
    #[must_use]
    pub fn new(root: UIElement) -> Self {
        let mut nodes = Vec::new();
        let mut stack: Vec<(&UIElement, Vec<usize>, Option<usize>)> = vec![(&root, Vec::new(), None)];
        while let Some((element, path, parent)) = stack.pop() {
            let slot = nodes.len();
            for (i, child) in element.children.iter().enumerate().rev() {
                let mut child_path = path.clone();
                child_path.push(i);
                stack.push((child, child_path, Some(slot)));
            }
            nodes.push(Node {
                id: element.id.clone(),
                path,
                parent,
                end: slot + 1,
                flags: PresentationFlags::default(),
            });
        }
        // Children follow their parent, so a reverse sweep settles subtree ends.
        for slot in (1..nodes.len()).rev() {
            if let Some(parent) = nodes[slot].parent {
                nodes[parent].end = nodes[parent].end.max(nodes[slot].end);
            }
        }
        let index = nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (node.id.clone(), slot))
            .collect();
        Self {
            root,
            nodes,
            index,
            selected: None,
            hovered: None,
        }
    }

    #[must_use]
    pub fn root(&self) -> &UIElement {
        &self.root
    }

    /// Number of elements, the root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.index.contains_key(id)
    }

    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&UIElement> {
        let slot = *self.index.get(id)?;
        self.nodes[slot]
            .path
            .iter()
            .try_fold(&self.root, |element, i| element.children.get(*i))
    }

    /// Ids in paint order, the root first.
    pub fn ids(&self) -> impl Iterator<Item = &ElementId> {
        self.nodes.iter().map(|node| &node.id)
    }

    /// Elements in paint order, the root first.
    pub fn paint_order(&self) -> impl Iterator<Item = &UIElement> {
        self.root.paint_order()
    }

    #[must_use]
    pub fn flags(&self, id: &ElementId) -> Option<PresentationFlags> {
        self.index.get(id).map(|slot| self.nodes[*slot].flags)
    }

    #[must_use]
    pub fn parent_of(&self, id: &ElementId) -> Option<&ElementId> {
        let slot = *self.index.get(id)?;
        self.nodes[slot].parent.map(|parent| &self.nodes[parent].id)
    }

    /// Show or hide an element and everything inside it.
    ///
    /// Returns `false` if `id` is unknown.
    pub fn set_visible(&mut self, id: &ElementId, visible: bool) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        let end = self.nodes[slot].end;
        for node in &mut self.nodes[slot..end] {
            node.flags.set(PresentationFlags::VISIBLE, visible);
        }
        true
    }

    /// Visible itself and through every ancestor.
    #[must_use]
    pub fn is_effectively_visible(&self, id: &ElementId) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        self.effectively_visible(slot)
    }

    fn effectively_visible(&self, mut slot: usize) -> bool {
        loop {
            let node = &self.nodes[slot];
            if !node.flags.contains(PresentationFlags::VISIBLE) {
                return false;
            }
            match node.parent {
                Some(parent) => slot = parent,
                None => return true,
            }
        }
    }

    /// Let pointer events pass through an element.
    pub fn set_ignored(&mut self, id: &ElementId, ignored: bool) -> bool {
        self.update(id, |flags| flags.set(PresentationFlags::IGNORED, ignored))
    }

    /// Flag an element whose image is unavailable.
    pub fn mark_missing(&mut self, id: &ElementId) -> bool {
        self.update(id, |flags| flags.insert(PresentationFlags::MISSING_IMAGE))
    }

    /// Ids of elements with unavailable images, in paint order.
    pub fn missing(&self) -> impl Iterator<Item = &ElementId> {
        self.nodes
            .iter()
            .filter(|node| node.flags.contains(PresentationFlags::MISSING_IMAGE))
            .map(|node| &node.id)
    }

    /// Select one element, deselecting the previous one.
    pub fn select(&mut self, id: &ElementId) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        Self::move_marker(&mut self.nodes, &mut self.selected, Some(slot), PresentationFlags::SELECTED);
        true
    }

    pub fn clear_selection(&mut self) {
        Self::move_marker(&mut self.nodes, &mut self.selected, None, PresentationFlags::SELECTED);
    }

    #[must_use]
    pub fn selected(&self) -> Option<&ElementId> {
        self.selected.map(|slot| &self.nodes[slot].id)
    }

    /// Move the selection to the selected element's parent.
    ///
    /// Top-level elements have no selectable parent; the selection stays.
    pub fn select_parent(&mut self) -> Option<&ElementId> {
        let parent = self.nodes[self.selected?].parent?;
        if self.nodes[parent].parent.is_none() {
            return None;
        }
        Self::move_marker(&mut self.nodes, &mut self.selected, Some(parent), PresentationFlags::SELECTED);
        Some(&self.nodes[parent].id)
    }

    /// Hover one element, clearing the previous hover.
    pub fn hover(&mut self, id: &ElementId) -> bool {
        let Some(&slot) = self.index.get(id) else {
            return false;
        };
        Self::move_marker(&mut self.nodes, &mut self.hovered, Some(slot), PresentationFlags::HOVERED);
        true
    }

    pub fn clear_hover(&mut self) {
        Self::move_marker(&mut self.nodes, &mut self.hovered, None, PresentationFlags::HOVERED);
    }

    #[must_use]
    pub fn hovered(&self) -> Option<&ElementId> {
        self.hovered.map(|slot| &self.nodes[slot].id)
    }

    /// Topmost visible, non-ignored element under a document-space point.
    #[must_use]
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&ElementId> {
        (1..self.nodes.len()).rev().find_map(|slot| {
            let node = &self.nodes[slot];
            if node.flags.contains(PresentationFlags::IGNORED) || !self.effectively_visible(slot) {
                return None;
            }
            let element = self.get(&node.id)?;
            element.absolute().contains(x, y).then_some(&node.id)
        })
    }

    fn update(&mut self, id: &ElementId, f: impl FnOnce(&mut PresentationFlags)) -> bool {
        match self.index.get(id) {
            Some(&slot) => {
                f(&mut self.nodes[slot].flags);
                true
            }
            None => false,
        }
    }

    fn move_marker(
        nodes: &mut [Node],
        marker: &mut Option<usize>,
        next: Option<usize>,
        flag: PresentationFlags,
    ) {
        if let Some(previous) = marker.take() {
            nodes[previous].flags.remove(flag);
        }
        if let Some(slot) = next {
            nodes[slot].flags.insert(flag);
        }
        *marker = next;
    }
}
