//! Attribute search across documents.

use gzui_core::{Document, ElementId, ResourceKey};

/// Lowercased search terms. At least one is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    attribute: Option<String>,
    value: Option<String>,
}

impl SearchQuery {
    /// Build a query from an attribute-name and a value substring.
    ///
    /// Empty terms are ignored; returns `None` when both are empty.
    #[must_use]
    pub fn new(attribute: &str, value: &str) -> Option<Self> {
        let term = |raw: &str| (!raw.is_empty()).then(|| raw.to_lowercase());
        let query = Self {
            attribute: term(attribute),
            value: term(value),
        };
        (query.attribute.is_some() || query.value.is_some()).then_some(query)
    }

    #[must_use]
    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Which terms hit, or `None` when the pair is not a result.
    ///
    /// With both terms set, both must hit.
    fn test(&self, name: &str, value: &str) -> Option<(bool, bool)> {
        let hit = |term: &Option<String>, text: &str| {
            term.as_deref().is_some_and(|t| text.to_lowercase().contains(t))
        };
        let by_name = hit(&self.attribute, name);
        let by_value = hit(&self.value, value);
        let both = self.attribute.is_some() && self.value.is_some();
        match (both, by_name, by_value) {
            (true, true, true) | (false, true, _) | (false, _, true) => Some((by_name, by_value)),
            _ => None,
        }
    }
}

/// One matching attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub document: ResourceKey,
    pub element: ElementId,
    pub attribute: String,
    pub value: String,
    pub matched_attribute: bool,
    pub matched_value: bool,
}

/// Search every attribute of every record, duplicates included.
///
/// Hits are in document order, then element paint order, then attribute
/// source order.
pub fn search<'a, I>(documents: I, query: &SearchQuery) -> Vec<SearchHit>
where
    I: IntoIterator<Item = (ResourceKey, &'a Document)>,
{
    let mut hits = Vec::new();
    for (key, document) in documents {
        for (element, record) in document.walk() {
            for (name, value) in &record.attributes {
                let Some((matched_attribute, matched_value)) = query.test(name, value) else {
                    continue;
                };
                hits.push(SearchHit {
                    document: key,
                    element: element.clone(),
                    attribute: name.clone(),
                    value: value.clone(),
                    matched_attribute,
                    matched_value,
                });
            }
        }
    }
    tracing::debug!(
        attribute = query.attribute(),
        value = query.value(),
        hits = hits.len(),
        "search finished"
    );
    hits
}

#[cfg(test)]
mod tests {
    use super::*;
    use gzui_core::Record;

    fn documents() -> Vec<(ResourceKey, Document)> {
        vec![
            (
                ResourceKey::ui_script(1, 0x10),
                Document::new(vec![
                    Record::new("LEGACY")
                        .attr("iid", "IGZWinBtn")
                        .attr("caption", "Cancel")
                        .child(Record::new("LEGACY").attr("iid", "IGZWinText").attr("tipText", "Close")),
                ]),
            ),
            (
                ResourceKey::ui_script(1, 0x20),
                Document::new(vec![
                    Record::new("LEGACY")
                        .attr("iid", "IGZWinText")
                        .attr("caption", "cancel all")
                        .attr("caption", "Again"),
                ]),
            ),
        ]
    }

    fn run(attribute: &str, value: &str) -> Vec<SearchHit> {
        let docs = documents();
        let query = SearchQuery::new(attribute, value).unwrap();
        search(docs.iter().map(|(key, doc)| (*key, doc)), &query)
    }

    #[test]
    fn empty_query_is_rejected() {
        assert!(SearchQuery::new("", "").is_none());
        assert_eq!(SearchQuery::new("CAPTION", "").unwrap().attribute(), Some("caption"));
    }

    #[test]
    fn value_only() {
        let hits = run("", "CANCEL");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document, ResourceKey::ui_script(1, 0x10));
        assert_eq!(hits[0].element, ElementId::from("e0"));
        assert!(hits[0].matched_value && !hits[0].matched_attribute);
        assert_eq!(hits[1].value, "cancel all");
    }

    #[test]
    fn attribute_only_includes_duplicates() {
        let hits = run("caption", "");
        let values: Vec<_> = hits.iter().map(|h| h.value.as_str()).collect();
        assert_eq!(values, ["Cancel", "cancel all", "Again"]);
    }

    #[test]
    fn both_terms_must_match() {
        let hits = run("tip", "close");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].element, ElementId::from("e0.0"));
        assert!(hits[0].matched_attribute && hits[0].matched_value);
        assert!(run("iid", "cancel").is_empty());
    }
}
