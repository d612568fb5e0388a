//! Path-based element identifiers.
//!
//! Records carry no identity of their own and siblings often share class
//! and interface tags, so an element is named by its position: the
//! synthetic document root is `root`, top-level records are `e0`, `e1`, …,
//! and children append their index (`e0.2.1`). Ids are reproducible for the
//! same input and meaningless across documents.

use std::fmt;

const ROOT: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    #[must_use]
    pub fn root() -> Self {
        Self(ROOT.to_string())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == ROOT
    }

    /// Id of the `index`th child of this element.
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        if self.is_root() {
            Self(format!("e{index}"))
        } else {
            Self(format!("{}.{index}", self.0))
        }
    }

    /// Id of the containing element; `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rsplit_once('.') {
            Some((parent, _)) => Some(Self(parent.to_string())),
            None => Some(Self::root()),
        }
    }

    /// Child indices from the root down.
    ///
    /// Returns `None` for strings that are not element ids.
    #[must_use]
    pub fn path(&self) -> Option<Vec<usize>> {
        if self.is_root() {
            return Some(Vec::new());
        }
        let rest = self.0.strip_prefix('e')?;
        rest.split('.').map(|part| part.parse().ok()).collect()
    }

    /// Nesting depth; top-level records are depth 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches('.').count() + 1
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_and_parents() {
        let root = ElementId::root();
        let first = root.child(0);
        let nested = first.child(2).child(1);
        assert_eq!(first.as_str(), "e0");
        assert_eq!(nested.as_str(), "e0.2.1");
        assert_eq!(nested.parent(), Some(ElementId::from("e0.2")));
        assert_eq!(first.parent(), Some(root.clone()));
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn paths() {
        assert_eq!(ElementId::from("e3.0.12").path(), Some(vec![3, 0, 12]));
        assert_eq!(ElementId::root().path(), Some(vec![]));
        assert_eq!(ElementId::from("x3").path(), None);
        assert_eq!(ElementId::from("e3.a").path(), None);
    }

    #[test]
    fn depth() {
        assert_eq!(ElementId::root().depth(), 0);
        assert_eq!(ElementId::from("e4").depth(), 1);
        assert_eq!(ElementId::from("e4.1.1").depth(), 3);
    }
}
