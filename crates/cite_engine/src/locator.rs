//! In-text citation location
//!
//! Two surface forms are recognized, left to right and without overlap:
//!
//! - parenthetical: `(Smith, 2020; Lee & Park, 2019)`, one group that may hold
//!   several citations separated by `;`;
//! - narrative: `Smith and Lee (2020)` or `Smith et al. (2020)`.
//!
//! A span is broken into fragments whose texts concatenate back to exactly the
//! matched text, so a rewrite built from them cannot lose or add characters.

use crate::{citation_key, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::ops::Range;

const CITATION_PATTERN: &str = r"(?P<paren>\([^()]+\))|(?P<narrative>\p{Lu}[\w\-']+(?:\s+(?:&|and)\s+\p{Lu}[\w\-']+)?(?:\s+et\s+al\.?)?\s*\(\d{4}\))";

/// Author text, a comma, then anything up to a year
const INNER_PATTERN: &str = r"(.*),\s.*?(\d{4})";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CitationForm {
    Parenthetical,
    Narrative,
}

/// A citation that can be looked up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitedWork {
    /// Text shown for the citation
    pub text: String,
    pub author: String,
    pub year: String,
}

impl CitedWork {
    pub fn key(&self) -> String {
        citation_key(&self.author, &self.year)
    }
}

/// One piece of a located span
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// Brackets, separators and the whitespace around them
    Delimiter(String),
    Citation(CitedWork),
    /// Parenthetical text that is not a citation, e.g. "see Fig. 1"
    Annotation(String),
}

impl Fragment {
    pub fn text(&self) -> &str {
        match self {
            Fragment::Delimiter(text) | Fragment::Annotation(text) => text,
            Fragment::Citation(work) => &work.text,
        }
    }
}

/// A located citation occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSpan {
    /// Byte range in the paragraph text
    pub range: Range<usize>,
    pub form: CitationForm,
    pub fragments: Vec<Fragment>,
}

impl CitationSpan {
    /// The span's text rebuilt from its fragments
    pub fn text(&self) -> String {
        self.fragments.iter().map(Fragment::text).collect()
    }

    pub fn citations(&self) -> impl Iterator<Item = &CitedWork> {
        self.fragments.iter().filter_map(|fragment| match fragment {
            Fragment::Citation(work) => Some(work),
            _ => None,
        })
    }
}

/// Finds citation spans in paragraph text
#[derive(Debug, Clone)]
pub struct CitationLocator {
    pattern: Regex,
    inner: Regex,
}

impl CitationLocator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(CITATION_PATTERN)?,
            inner: Regex::new(INNER_PATTERN)?,
        })
    }

    /// All citation spans in `text`, in order
    pub fn locate(&self, text: &str) -> Vec<CitationSpan> {
        if !text.contains('(') {
            return Vec::new();
        }

        self.pattern
            .captures_iter(text)
            .filter_map(|caps| {
                if let Some(m) = caps.name("paren") {
                    Some(CitationSpan {
                        range: m.range(),
                        form: CitationForm::Parenthetical,
                        fragments: self.split_group(m.as_str()),
                    })
                } else {
                    caps.name("narrative").map(|m| CitationSpan {
                        range: m.range(),
                        form: CitationForm::Narrative,
                        fragments: vec![narrative_fragment(m.as_str())],
                    })
                }
            })
            .collect()
    }

    /// Split `( a ; b )` into delimiters and the pieces between them
    fn split_group(&self, group: &str) -> Vec<Fragment> {
        let interior = &group[1..group.len() - 1];
        let pieces: Vec<&str> = interior.split(';').collect();
        let mut fragments = Vec::new();
        let mut delimiter = String::from("(");

        for (i, piece) in pieces.iter().enumerate() {
            let core = piece.trim();
            let lead = piece.len() - piece.trim_start().len();
            let trail_start = lead + core.len();

            delimiter.push_str(&piece[..lead]);
            if !core.is_empty() {
                if !delimiter.is_empty() {
                    fragments.push(Fragment::Delimiter(std::mem::take(&mut delimiter)));
                }
                fragments.push(self.classify(core));
            }
            delimiter.push_str(&piece[trail_start..]);
            if i + 1 < pieces.len() {
                delimiter.push(';');
            }
        }

        delimiter.push(')');
        fragments.push(Fragment::Delimiter(delimiter));
        fragments
    }

    fn classify(&self, piece: &str) -> Fragment {
        match self.inner.captures(piece) {
            Some(caps) => Fragment::Citation(CitedWork {
                text: piece.to_string(),
                author: caps[1].to_string(),
                year: caps[2].to_string(),
            }),
            None => Fragment::Annotation(piece.to_string()),
        }
    }
}

/// `Smith et al. (2020)` keeps its whole text; the author is what precedes `(`
fn narrative_fragment(text: &str) -> Fragment {
    let Some((name, rest)) = text.split_once('(') else {
        return Fragment::Annotation(text.to_string());
    };
    let name = name.trim();
    let year = rest.replace(')', "");
    let year = year.trim();
    if name.is_empty() || year.is_empty() {
        return Fragment::Annotation(text.to_string());
    }
    Fragment::Citation(CitedWork {
        text: text.to_string(),
        author: name.to_string(),
        year: year.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> CitationLocator {
        CitationLocator::new().unwrap()
    }

    fn work(text: &str, author: &str, year: &str) -> Fragment {
        Fragment::Citation(CitedWork {
            text: text.to_string(),
            author: author.to_string(),
            year: year.to_string(),
        })
    }

    fn delim(text: &str) -> Fragment {
        Fragment::Delimiter(text.to_string())
    }

    #[test]
    fn test_no_parenthesis_no_spans() {
        assert!(locator().locate("Smith 2020 found nothing.").is_empty());
        assert!(locator().locate("").is_empty());
    }

    #[test]
    fn test_single_parenthetical() {
        let text = "This was shown (Smith, 2020).";
        let spans = locator().locate(text);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].form, CitationForm::Parenthetical);
        assert_eq!(&text[spans[0].range.clone()], "(Smith, 2020)");
        assert_eq!(
            spans[0].fragments,
            vec![delim("("), work("Smith, 2020", "Smith", "2020"), delim(")")]
        );
    }

    #[test]
    fn test_grouped_parenthetical_keeps_separators() {
        let spans = locator().locate("(Smith, 2020; Lee & Park, 2019)");

        assert_eq!(
            spans[0].fragments,
            vec![
                delim("("),
                work("Smith, 2020", "Smith", "2020"),
                delim("; "),
                work("Lee & Park, 2019", "Lee & Park", "2019"),
                delim(")"),
            ]
        );
        assert_eq!(spans[0].text(), "(Smith, 2020; Lee & Park, 2019)");
    }

    #[test]
    fn test_irregular_spacing_is_preserved() {
        let text = "( Smith, 2020 ;Lee, 2019  )";
        let spans = locator().locate(text);

        assert_eq!(spans[0].text(), text);
        assert_eq!(spans[0].citations().count(), 2);
        assert_eq!(spans[0].fragments[0], delim("( "));
        assert_eq!(spans[0].fragments[2], delim(" ;"));
        assert_eq!(spans[0].fragments[4], delim("  )"));
    }

    #[test]
    fn test_author_is_text_before_last_comma() {
        let spans = locator().locate("(Smith, Jones, and Lee, 2021)");
        let cited: Vec<_> = spans[0].citations().collect();
        assert_eq!(cited[0].author, "Smith, Jones, and Lee");
        assert_eq!(cited[0].key(), "Smith_2021");
    }

    #[test]
    fn test_page_numbers_after_year() {
        let spans = locator().locate("(Smith, 2020, p. 14)");
        let cited: Vec<_> = spans[0].citations().collect();
        assert_eq!(cited[0].year, "2020");
        assert_eq!(cited[0].text, "Smith, 2020, p. 14");
    }

    #[test]
    fn test_annotation_is_not_a_citation() {
        let spans = locator().locate("As plotted (see Fig. 1), values rise.");

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].citations().count(), 0);
        assert_eq!(
            spans[0].fragments,
            vec![delim("("), Fragment::Annotation("see Fig. 1".to_string()), delim(")")]
        );
    }

    #[test]
    fn test_mixed_group() {
        let spans = locator().locate("(e.g., Smith, 2020; see also appendix)");
        assert_eq!(spans[0].citations().count(), 1);
        assert!(matches!(spans[0].fragments[3], Fragment::Annotation(ref t) if t == "see also appendix"));
    }

    #[test]
    fn test_narrative_forms() {
        let text = "Dikmenli (2010) found that Smith and Lee (2019) and Park et al. (2021) agree.";
        let spans = locator().locate(text);

        assert_eq!(spans.len(), 3);
        assert!(spans.iter().all(|s| s.form == CitationForm::Narrative));
        assert_eq!(spans[0].fragments, vec![work("Dikmenli (2010)", "Dikmenli", "2010")]);
        assert_eq!(spans[1].fragments, vec![work("Smith and Lee (2019)", "Smith and Lee", "2019")]);
        assert_eq!(spans[2].fragments, vec![work("Park et al. (2021)", "Park et al.", "2021")]);
        assert_eq!(&text[spans[2].range.clone()], "Park et al. (2021)");
    }

    #[test]
    fn test_narrative_with_unicode_capital() {
        let spans = locator().locate("Özdemir (2015) disagreed.");
        let cited: Vec<_> = spans[0].citations().collect();
        assert_eq!(cited[0].key(), "Özdemir_2015");
    }

    #[test]
    fn test_lowercase_name_is_not_narrative() {
        let spans = locator().locate("as smith (2020) notes");
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].form, CitationForm::Parenthetical);
        assert_eq!(spans[0].citations().count(), 0);
    }

    #[test]
    fn test_nested_parenthesis_uses_innermost_group() {
        let text = "(see (Smith, 2020))";
        let spans = locator().locate(text);
        assert_eq!(spans.len(), 1);
        assert_eq!(&text[spans[0].range.clone()], "(Smith, 2020)");
    }

    #[test]
    fn test_spans_rebuild_matched_text() {
        let text = "Lee (2019) and others (Smith, 2020;Kim, 2018; n.d.) differ (ibid.).";
        for span in locator().locate(text) {
            assert_eq!(span.text(), &text[span.range.clone()]);
        }
    }
}
