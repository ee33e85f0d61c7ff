//! Citation to reference correlation

use crate::{CitationSpan, CitedWork, Fragment, ReferenceIndex};
use std::collections::BTreeSet;
use std::ops::Range;

/// A span piece after lookup; `anchor` is set for resolved citations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedItem {
    pub text: String,
    pub anchor: Option<String>,
}

impl CorrelatedItem {
    pub fn is_link(&self) -> bool {
        self.anchor.is_some()
    }
}

fn overlaps_any(range: &Range<usize>, others: &[Range<usize>]) -> bool {
    others.iter().any(|other| range.start < other.end && other.start < range.end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrelatedSpan {
    pub range: Range<usize>,
    pub items: Vec<CorrelatedItem>,
}

impl CorrelatedSpan {
    pub fn has_links(&self) -> bool {
        self.items.iter().any(CorrelatedItem::is_link)
    }
}

/// Tracks which keys were cited and which citations failed to resolve
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    linked: BTreeSet<String>,
    unresolved: Vec<String>,
    lookups: usize,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up one citation, recording a hit or a miss
    pub fn resolve(&mut self, work: &CitedWork, index: &ReferenceIndex) -> Option<String> {
        self.lookups += 1;
        let key = work.key();
        match index.anchor_for(&key) {
            Some(anchor) => {
                tracing::debug!("Citation {:?} resolved to {}", work.text, anchor);
                let anchor = anchor.to_string();
                self.linked.insert(key);
                Some(anchor)
            }
            None => {
                tracing::debug!("Citation {:?} has no reference ({})", work.text, key);
                self.unresolved.push(work.text.clone());
                None
            }
        }
    }

    /// Resolve every citation of a span; delimiters and annotations pass through
    pub fn correlate(&mut self, span: &CitationSpan, index: &ReferenceIndex) -> CorrelatedSpan {
        self.correlate_outside(span, index, &[])
    }

    /// Like [`Correlator::correlate`], but citations overlapping a `protected`
    /// byte range are passed through without a lookup. Used for text that is
    /// already inside a hyperlink.
    pub fn correlate_outside(
        &mut self,
        span: &CitationSpan,
        index: &ReferenceIndex,
        protected: &[Range<usize>],
    ) -> CorrelatedSpan {
        let mut offset = span.range.start;
        let mut items = Vec::with_capacity(span.fragments.len());

        for fragment in &span.fragments {
            let text = fragment.text();
            let range = offset..offset + text.len();
            offset = range.end;

            let anchor = match fragment {
                Fragment::Citation(work) if !overlaps_any(&range, protected) => self.resolve(work, index),
                _ => None,
            };
            items.push(CorrelatedItem {
                text: text.to_string(),
                anchor,
            });
        }

        CorrelatedSpan {
            range: span.range.clone(),
            items,
        }
    }

    /// Count an existing link to a known anchor as a hit
    pub fn mark_linked(&mut self, key: &str) {
        self.linked.insert(key.to_string());
    }

    /// Keys with at least one resolved citation
    pub fn linked(&self) -> &BTreeSet<String> {
        &self.linked
    }

    /// Unresolved citation texts, one per occurrence
    pub fn unresolved(&self) -> &[String] {
        &self.unresolved
    }

    /// Number of lookups attempted
    pub fn lookups(&self) -> usize {
        self.lookups
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CitationLocator, ReferenceEntry};
    use doc_model::NodeId;

    fn index_with(keys: &[(&str, &str)]) -> ReferenceIndex {
        let mut index = ReferenceIndex::new();
        for (key, anchor) in keys {
            index.record(ReferenceEntry {
                key: key.to_string(),
                anchor: anchor.to_string(),
                paragraph: NodeId::new(),
            });
        }
        index
    }

    #[test]
    fn test_grouped_citation_splits_lookups() {
        let index = index_with(&[("Smith_2020", "REF_Smith2020_0")]);
        let locator = CitationLocator::new().unwrap();
        let mut correlator = Correlator::new();

        let spans = locator.locate("(Smith, 2020; Lee, 2019)");
        let correlated = correlator.correlate(&spans[0], &index);

        assert_eq!(correlator.lookups(), 2);
        assert!(correlated.has_links());
        assert_eq!(correlated.items[1].anchor.as_deref(), Some("REF_Smith2020_0"));
        assert_eq!(correlated.items[3].anchor, None);
        assert_eq!(correlator.unresolved(), &["Lee, 2019".to_string()]);
        assert!(correlator.linked().contains("Smith_2020"));
    }

    #[test]
    fn test_annotation_is_never_looked_up() {
        let index = index_with(&[]);
        let locator = CitationLocator::new().unwrap();
        let mut correlator = Correlator::new();

        let spans = locator.locate("(see Fig. 1)");
        let correlated = correlator.correlate(&spans[0], &index);

        assert_eq!(correlator.lookups(), 0);
        assert!(correlator.unresolved().is_empty());
        assert!(!correlated.has_links());
    }

    #[test]
    fn test_protected_citation_is_not_looked_up() {
        let index = index_with(&[("Smith_2020", "REF_Smith2020_0")]);
        let locator = CitationLocator::new().unwrap();
        let mut correlator = Correlator::new();

        let text = "(Smith, 2020; Lee, 2019)";
        let spans = locator.locate(text);
        let correlated = correlator.correlate_outside(&spans[0], &index, &[1..12]);

        assert_eq!(correlator.lookups(), 1);
        assert!(!correlated.has_links());
        assert!(correlator.linked().is_empty());
        assert_eq!(correlator.unresolved(), &["Lee, 2019".to_string()]);
        let rebuilt: String = correlated.items.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_repeated_hits_link_key_once() {
        let index = index_with(&[("Smith_2020", "REF_Smith2020_0")]);
        let locator = CitationLocator::new().unwrap();
        let mut correlator = Correlator::new();

        for span in locator.locate("Smith (2020) and again (Smith, 2020).") {
            correlator.correlate(&span, &index);
        }

        assert_eq!(correlator.lookups(), 2);
        assert_eq!(correlator.linked().len(), 1);
    }

    #[test]
    fn test_misses_are_kept_per_occurrence() {
        let index = index_with(&[]);
        let locator = CitationLocator::new().unwrap();
        let mut correlator = Correlator::new();

        for span in locator.locate("(Lee, 2019) then (Lee, 2019)") {
            correlator.correlate(&span, &index);
        }

        assert_eq!(correlator.unresolved().len(), 2);
        correlator.reset();
        assert!(correlator.unresolved().is_empty());
    }
}
