//! Validation report
//!
//! The report is derived entirely from the reference keys, the linked keys and
//! the unresolved citation texts, so it can be rebuilt at any time.

use crate::{display_key, DuplicateKey};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Broken citations and unused references of one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Number of unresolved citation occurrences
    pub broken_count: usize,
    /// Distinct unresolved citation texts, sorted
    pub broken: Vec<String>,
    /// Reference keys no citation resolved to, sorted
    pub unused: Vec<String>,
    #[serde(default)]
    pub duplicates: Vec<DuplicateKey>,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub fn build<'a>(
        all_keys: impl IntoIterator<Item = &'a str>,
        linked_keys: &BTreeSet<String>,
        unresolved: &[String],
    ) -> Self {
        let unused: BTreeSet<&str> = all_keys
            .into_iter()
            .filter(|key| !linked_keys.contains(*key))
            .collect();
        let broken: BTreeSet<&str> = unresolved.iter().map(String::as_str).collect();

        Self {
            broken_count: unresolved.len(),
            broken: broken.into_iter().map(str::to_string).collect(),
            unused: unused.into_iter().map(str::to_string).collect(),
            duplicates: Vec::new(),
            generated_at: Utc::now(),
        }
    }

    /// Attach the key collisions found while scanning references
    pub fn with_duplicates(mut self, duplicates: &[DuplicateKey]) -> Self {
        self.duplicates = duplicates.to_vec();
        self
    }

    pub fn is_clean(&self) -> bool {
        self.broken.is_empty() && self.unused.is_empty()
    }

    /// Plain-text form written next to the linked document
    pub fn render(&self, source_name: &str) -> String {
        let mut out = String::new();
        out.push_str(&format!("VALIDATION REPORT FOR: {}\n", source_name));
        out.push_str(&format!("{}\n", "=".repeat(50)));
        out.push('\n');

        out.push_str(&format!("BROKEN CITATIONS ({}):\n", self.broken_count));
        for citation in &self.broken {
            out.push_str(&format!(" [x] {}\n", citation));
        }
        out.push('\n');

        out.push_str(&format!("UNUSED REFERENCES ({}):\n", self.unused.len()));
        for key in &self.unused {
            out.push_str(&format!(" [?] {}\n", display_key(key)));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked(keys: &[&str]) -> BTreeSet<String> {
        keys.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_unused_is_all_minus_linked() {
        let report = ValidationReport::build(
            ["Smith_2020", "Lee_2019", "Kim_2018"],
            &linked(&["Smith_2020"]),
            &[],
        );
        assert_eq!(report.unused, vec!["Kim_2018", "Lee_2019"]);
        assert_eq!(report.broken_count, 0);
    }

    #[test]
    fn test_broken_is_deduplicated_and_sorted() {
        let unresolved = vec![
            "Lee, 2019".to_string(),
            "Adams (2001)".to_string(),
            "Lee, 2019".to_string(),
        ];
        let report = ValidationReport::build(std::iter::empty(), &linked(&[]), &unresolved);

        assert_eq!(report.broken_count, 3);
        assert_eq!(report.broken, vec!["Adams (2001)", "Lee, 2019"]);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_render() {
        let unresolved = vec!["Lee, 2019".to_string(), "Lee, 2019".to_string()];
        let report = ValidationReport::build(
            ["Smith_2020", "Park_2021"],
            &linked(&["Smith_2020"]),
            &unresolved,
        );

        let expected = "\
VALIDATION REPORT FOR: paper.docx
==================================================

BROKEN CITATIONS (2):
 [x] Lee, 2019

UNUSED REFERENCES (1):
 [?] Park, 2021
";
        assert_eq!(report.render("paper.docx"), expected);
    }

    #[test]
    fn test_render_empty() {
        let report = ValidationReport::build(std::iter::empty(), &linked(&[]), &[]);
        assert!(report.is_clean());
        assert_eq!(
            report.render("a.docx"),
            "VALIDATION REPORT FOR: a.docx\n==================================================\n\nBROKEN CITATIONS (0):\n\nUNUSED REFERENCES (0):\n"
        );
    }
}
