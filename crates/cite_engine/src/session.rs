//! Correlation session
//!
//! A session owns all state shared by the two passes: the section tracker,
//! the reference index with its anchor counter, and the correlator's linked
//! keys and unresolved citations. References must be scanned before any
//! citation is linked, because the key map is only complete once the whole
//! reference list has been read.

use crate::{
    CiteError, CitationLocator, Correlator, CorrelatedSpan, HeadingPredicate, LinkerConfig,
    ParagraphRewriter, ReferenceIndex, ReferenceScanner, Result, SectionTracker, ShortHeading,
    ValidationReport,
};
use doc_model::DocumentTree;
use std::ops::Range;

/// Counts from the citation-linking pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// Body paragraphs that were searched for citations
    pub paragraphs_scanned: usize,
    pub paragraphs_rewritten: usize,
    pub links_created: usize,
    /// Links to known reference anchors that were already in the document
    pub existing_links: usize,
}

pub struct CorrelationSession {
    config: LinkerConfig,
    tracker: SectionTracker,
    scanner: ReferenceScanner,
    locator: CitationLocator,
    rewriter: ParagraphRewriter,
    references: ReferenceIndex,
    correlator: Correlator,
    anchor_counter: usize,
    scanned: bool,
}

impl CorrelationSession {
    /// Session detecting the reference heading with the configured marker
    pub fn new(config: LinkerConfig) -> Result<Self> {
        let heading = ShortHeading::new(config.heading_marker.as_str(), config.heading_max_len);
        Self::with_heading(config, Box::new(heading))
    }

    /// Session with a custom reference-heading rule
    pub fn with_heading(config: LinkerConfig, heading: Box<dyn HeadingPredicate>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: SectionTracker::new(heading),
            scanner: ReferenceScanner::new(config.anchor_prefix.as_str())?,
            locator: CitationLocator::new()?,
            rewriter: ParagraphRewriter::new(&config),
            references: ReferenceIndex::new(),
            correlator: Correlator::new(),
            anchor_counter: 0,
            scanned: false,
            config,
        })
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    pub fn references(&self) -> &ReferenceIndex {
        &self.references
    }

    pub fn correlator(&self) -> &Correlator {
        &self.correlator
    }

    /// Forget everything learned from a previous document
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.references = ReferenceIndex::new();
        self.correlator.reset();
        self.anchor_counter = 0;
        self.scanned = false;
    }

    /// First pass: index and anchor the reference entries.
    ///
    /// Returns the number of distinct keys found.
    pub fn scan_references(&mut self, tree: &mut DocumentTree) -> Result<usize> {
        self.tracker.reset();
        self.anchor_counter = 0;
        self.references = self.scanner.scan(tree, &mut self.tracker, &mut self.anchor_counter)?;
        self.scanned = true;
        Ok(self.references.len())
    }

    /// Second pass: link citations in the body, up to the reference heading
    pub fn link_citations(&mut self, tree: &mut DocumentTree) -> Result<LinkSummary> {
        if !self.scanned {
            return Err(CiteError::InvalidOperation(
                "references must be scanned before citations are linked".to_string(),
            ));
        }

        let mut summary = LinkSummary::default();
        self.tracker.reset();

        for para_id in tree.paragraph_ids() {
            let text = tree.paragraph_text(para_id);
            if self.tracker.observe(&text) {
                break;
            }
            summary.paragraphs_scanned += 1;

            let mut protected: Vec<Range<usize>> = Vec::new();
            for (range, link) in tree.paragraph_link_ranges(para_id) {
                if let Some(key) = link.target.anchor().and_then(|a| self.references.key_for_anchor(a)) {
                    self.correlator.mark_linked(key);
                    summary.existing_links += 1;
                }
                protected.push(range);
            }

            let spans = self.locator.locate(&text);
            if spans.is_empty() {
                continue;
            }
            let correlated: Vec<CorrelatedSpan> = spans
                .iter()
                .map(|span| self.correlator.correlate_outside(span, &self.references, &protected))
                .collect();
            if !correlated.iter().any(CorrelatedSpan::has_links) {
                continue;
            }

            let created = self.rewriter.rewrite(tree, para_id, &correlated)?;
            tracing::debug!("Rewrote paragraph {} with {} links", para_id, created);
            summary.paragraphs_rewritten += 1;
            summary.links_created += created;
        }

        tracing::info!(
            "Linked {} citations in {} paragraphs ({} unresolved, {} existing links)",
            summary.links_created,
            summary.paragraphs_rewritten,
            self.correlator.unresolved().len(),
            summary.existing_links
        );
        Ok(summary)
    }

    /// Report built from the current session state
    pub fn report(&self) -> ValidationReport {
        ValidationReport::build(
            self.references.keys(),
            self.correlator.linked(),
            self.correlator.unresolved(),
        )
        .with_duplicates(self.references.duplicates())
    }

    /// Both passes in order on a fresh state
    pub fn run(&mut self, tree: &mut DocumentTree) -> Result<ValidationReport> {
        self.reset();
        self.scan_references(tree)?;
        self.link_citations(tree)?;
        Ok(self.report())
    }
}

impl std::fmt::Debug for CorrelationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CorrelationSession")
            .field("config", &self.config)
            .field("tracker", &self.tracker)
            .field("references", &self.references.len())
            .field("anchor_counter", &self.anchor_counter)
            .field("scanned", &self.scanned)
            .finish()
    }
}

/// Link all citations of a document with a fresh session
pub fn link_document(tree: &mut DocumentTree, config: LinkerConfig) -> Result<ValidationReport> {
    CorrelationSession::new(config)?.run(tree)
}
