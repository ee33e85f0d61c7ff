//! Reference-list scanning
//!
//! Every paragraph after the reference heading that starts with a word token
//! and contains a four-digit year is a reference entry. Each entry gets a
//! bookmark spanning its paragraph, and the index maps the entry's key to the
//! bookmark name.

use crate::{anchor_safe, citation_key, clean_surname, Result, SectionState, SectionTracker};
use doc_model::{DocumentTree, NodeId, MAX_BOOKMARK_NAME_LENGTH};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const ENTRY_PATTERN: &str = r"^([\w\-']+).*?\(?(\d{4})\)?";

/// A bibliography paragraph that was given an anchor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub key: String,
    pub anchor: String,
    pub paragraph: NodeId,
}

/// Two entries that normalized to the same key; the later one wins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateKey {
    pub key: String,
    pub previous_anchor: String,
    pub anchor: String,
}

/// Key to anchor map built from the reference section
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    anchors: HashMap<String, String>,
    keys_by_anchor: HashMap<String, String>,
    entries: Vec<ReferenceEntry>,
    duplicates: Vec<DuplicateKey>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an entry. A repeated key overwrites the earlier anchor.
    pub fn record(&mut self, entry: ReferenceEntry) {
        if let Some(previous_anchor) = self.anchors.insert(entry.key.clone(), entry.anchor.clone()) {
            tracing::warn!(
                "Duplicate reference key {}: {} replaces {}",
                entry.key,
                entry.anchor,
                previous_anchor
            );
            self.duplicates.push(DuplicateKey {
                key: entry.key.clone(),
                previous_anchor,
                anchor: entry.anchor.clone(),
            });
        }
        self.keys_by_anchor.insert(entry.anchor.clone(), entry.key.clone());
        self.entries.push(entry);
    }

    /// Anchor a key resolves to
    pub fn anchor_for(&self, key: &str) -> Option<&str> {
        self.anchors.get(key).map(String::as_str)
    }

    /// Key of the entry an anchor was created for
    pub fn key_for_anchor(&self, anchor: &str) -> Option<&str> {
        self.keys_by_anchor.get(anchor).map(String::as_str)
    }

    /// All distinct keys
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.anchors.keys().map(String::as_str)
    }

    /// Entries in document order, including overwritten duplicates
    pub fn entries(&self) -> &[ReferenceEntry] {
        &self.entries
    }

    pub fn duplicates(&self) -> &[DuplicateKey] {
        &self.duplicates
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

/// Surname and year read from a reference entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMatch {
    pub surname: String,
    pub year: String,
}

impl EntryMatch {
    pub fn key(&self) -> String {
        citation_key(&self.surname, &self.year)
    }
}

/// Finds reference entries and anchors them
#[derive(Debug, Clone)]
pub struct ReferenceScanner {
    pattern: Regex,
    prefix: String,
}

impl ReferenceScanner {
    pub fn new(anchor_prefix: impl Into<String>) -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(ENTRY_PATTERN)?,
            prefix: anchor_prefix.into(),
        })
    }

    /// Match a paragraph's text against the reference-entry shape
    pub fn parse_entry(&self, text: &str) -> Option<EntryMatch> {
        let caps = self.pattern.captures(text.trim())?;
        Some(EntryMatch {
            surname: clean_surname(&caps[1]),
            year: caps[2].to_string(),
        })
    }

    /// Bookmark name for a key, shortened to fit the name limit
    pub fn anchor_name(&self, key: &str, counter: usize) -> String {
        let suffix = format!("_{}", counter);
        let room = MAX_BOOKMARK_NAME_LENGTH.saturating_sub(self.prefix.len() + suffix.len());
        let mut safe = anchor_safe(key);
        safe.truncate(room);
        format!("{}{}{}", self.prefix, safe, suffix)
    }

    /// Scan every paragraph after the heading and bookmark the entries found.
    ///
    /// `counter` is the next anchor number and is advanced once per entry.
    pub fn scan(
        &self,
        tree: &mut DocumentTree,
        tracker: &mut SectionTracker,
        counter: &mut usize,
    ) -> Result<ReferenceIndex> {
        let mut index = ReferenceIndex::new();

        for para_id in tree.paragraph_ids() {
            let text = tree.paragraph_text(para_id);
            if tracker.observe(&text) || tracker.state() != SectionState::InReferences {
                continue;
            }
            let Some(found) = self.parse_entry(&text) else {
                tracing::debug!("Skipping unrecognized reference entry: {:?}", text.trim());
                continue;
            };

            let key = found.key();
            let anchor = self.anchor_paragraph(tree, para_id, &key, counter)?;
            tracing::debug!("Reference {} anchored as {}", key, anchor);
            index.record(ReferenceEntry {
                key,
                anchor,
                paragraph: para_id,
            });
        }

        if tracker.state() == SectionState::BeforeReferences {
            tracing::warn!("No reference heading found; no entries were indexed");
        }
        tracing::info!(
            "Indexed {} reference keys from {} entries",
            index.len(),
            index.entries().len()
        );
        Ok(index)
    }

    /// Reuse the paragraph's own prefixed bookmark, or add a fresh one
    fn anchor_paragraph(
        &self,
        tree: &mut DocumentTree,
        para_id: NodeId,
        key: &str,
        counter: &mut usize,
    ) -> Result<String> {
        let existing = tree
            .bookmarks_in_paragraph(para_id)
            .into_iter()
            .map(|bookmark| bookmark.name().to_string())
            .find(|name| name.starts_with(&self.prefix));
        if let Some(name) = existing {
            *counter += 1;
            return Ok(name);
        }

        let mut name = self.anchor_name(key, *counter);
        while tree.has_bookmark(&name) {
            *counter += 1;
            name = self.anchor_name(key, *counter);
        }
        *counter += 1;

        tree.insert_paragraph_bookmark(name.clone(), para_id)?;
        Ok(name)
    }
}
