//! Caption hints: a short human-readable label for a whole document.
//!
//! Interface tags are tried in the caption policy's order. The first tag
//! with at least one usable caption wins, and its captions are the hints in
//! document order. A caption is unusable when it is empty, a `key=value`
//! assignment, or single-cased (`OK_BUTTON`, `tooltip`), which marks
//! identifiers rather than text.

use gzui_core::Document;
use gzui_layout::CaptionPolicy;

/// All usable captions of the first interface tag that has any.
#[must_use]
pub fn caption_hints(document: &Document, policy: &CaptionPolicy) -> Vec<String> {
    for iid in policy.types() {
        let hints: Vec<String> = document
            .records_with("iid", iid)
            .filter(|record| !record.is_duplicated("caption"))
            .filter_map(|record| record.get("caption"))
            .filter(|caption| usable(caption))
            .map(|caption| caption.replace("\\r\\n", " "))
            .collect();
        if !hints.is_empty() {
            return hints;
        }
    }
    Vec::new()
}

/// The first hint, if any.
#[must_use]
pub fn caption_hint(document: &Document, policy: &CaptionPolicy) -> Option<String> {
    caption_hints(document, policy).into_iter().next()
}

/// Hint for a group of documents: the longest hint, the earliest on ties.
#[must_use]
pub fn group_hint<'a>(hints: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    hints
        .into_iter()
        .fold(None, |best: Option<&str>, hint| match best {
            Some(best) if best.chars().count() >= hint.chars().count() => Some(best),
            _ => Some(hint),
        })
}

fn usable(caption: &str) -> bool {
    !caption.is_empty()
        && !gzui_layout::caption::is_key_value(caption)
        && !single_cased(caption)
}

/// Has cased letters, all in one case.
fn single_cased(text: &str) -> bool {
    let upper = text.chars().any(char::is_uppercase);
    let lower = text.chars().any(char::is_lowercase);
    upper != lower
}
