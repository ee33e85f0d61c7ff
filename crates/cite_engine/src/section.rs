//! Reference-section detection

use serde::{Deserialize, Serialize};

/// Where a pass currently is relative to the reference heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionState {
    BeforeReferences,
    InReferences,
}

/// Decides whether a paragraph is the reference-section heading
pub trait HeadingPredicate: Send + Sync {
    fn is_heading(&self, text: &str) -> bool;
}

/// A short paragraph containing a marker word, e.g. "References"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortHeading {
    pub marker: String,
    /// Exclusive upper bound on the paragraph length in characters
    pub max_len: usize,
}

impl ShortHeading {
    pub fn new(marker: impl Into<String>, max_len: usize) -> Self {
        Self {
            marker: marker.into(),
            max_len,
        }
    }
}

impl Default for ShortHeading {
    fn default() -> Self {
        Self::new("References", 50)
    }
}

impl HeadingPredicate for ShortHeading {
    fn is_heading(&self, text: &str) -> bool {
        text.trim().contains(self.marker.as_str()) && text.chars().count() < self.max_len
    }
}

/// Two-state machine flipped once by the heading predicate
pub struct SectionTracker {
    state: SectionState,
    predicate: Box<dyn HeadingPredicate>,
}

impl SectionTracker {
    pub fn new(predicate: Box<dyn HeadingPredicate>) -> Self {
        Self {
            state: SectionState::BeforeReferences,
            predicate,
        }
    }

    pub fn state(&self) -> SectionState {
        self.state
    }

    /// Whether `text` is a heading paragraph, without changing state
    pub fn is_heading(&self, text: &str) -> bool {
        self.predicate.is_heading(text)
    }

    /// Feed one paragraph. Returns true when it is a heading, which also
    /// moves the tracker into the reference section.
    pub fn observe(&mut self, text: &str) -> bool {
        if self.predicate.is_heading(text) {
            if self.state == SectionState::BeforeReferences {
                tracing::debug!("Reference heading found: {:?}", text.trim());
            }
            self.state = SectionState::InReferences;
            true
        } else {
            false
        }
    }

    /// Back to the body, for another pass
    pub fn reset(&mut self) {
        self.state = SectionState::BeforeReferences;
    }
}

impl std::fmt::Debug for SectionTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionTracker").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_heading() {
        let heading = ShortHeading::default();
        assert!(heading.is_heading("References"));
        assert!(heading.is_heading("  References  "));
        assert!(heading.is_heading("7. References"));
        assert!(!heading.is_heading("references"));
        assert!(!heading.is_heading(
            "References to earlier work are collected in the appendix at the end."
        ));
    }

    #[test]
    fn test_length_is_counted_in_characters() {
        let heading = ShortHeading::new("Références", 11);
        assert!(heading.is_heading("Références"));
        assert!(!heading.is_heading("Références  ."));
    }

    #[test]
    fn test_tracker_transitions_once() {
        let mut tracker = SectionTracker::new(Box::new(ShortHeading::default()));
        assert_eq!(tracker.state(), SectionState::BeforeReferences);

        assert!(!tracker.observe("Smith (2020) argued otherwise."));
        assert_eq!(tracker.state(), SectionState::BeforeReferences);

        assert!(tracker.observe("References"));
        assert_eq!(tracker.state(), SectionState::InReferences);

        assert!(!tracker.observe("Smith, J. (2020). Title."));
        assert_eq!(tracker.state(), SectionState::InReferences);

        tracker.reset();
        assert_eq!(tracker.state(), SectionState::BeforeReferences);
    }

    struct Exact(&'static str);

    impl HeadingPredicate for Exact {
        fn is_heading(&self, text: &str) -> bool {
            text.trim() == self.0
        }
    }

    #[test]
    fn test_custom_predicate() {
        let mut tracker = SectionTracker::new(Box::new(Exact("Works Cited")));
        assert!(!tracker.observe("References"));
        assert!(tracker.observe("Works Cited"));
        assert_eq!(tracker.state(), SectionState::InReferences);
    }
}
