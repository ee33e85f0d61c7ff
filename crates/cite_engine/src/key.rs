//! Correlation keys
//!
//! A reference entry and a citation meet on the key `Surname_Year`, where the
//! surname is the first whitespace-separated token of the author text with
//! everything but letters, digits, `_`, `-` and `'` removed.

/// Characters kept in a cleaned surname
fn is_key_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '\''
}

/// Reduce author text to the cleaned surname it is keyed by.
///
/// `"Smith, J."` becomes `"Smith"`; empty or all-symbol input gives `""`.
pub fn clean_surname(raw: &str) -> String {
    raw.split_whitespace()
        .next()
        .map(|token| token.chars().filter(|&c| is_key_char(c)).collect())
        .unwrap_or_default()
}

/// Correlation key for an author text and year
pub fn citation_key(author: &str, year: &str) -> String {
    format!("{}_{}", clean_surname(author), year)
}

/// The key reduced to ASCII letters and digits, for use in anchor names
pub fn anchor_safe(key: &str) -> String {
    key.chars().filter(char::is_ascii_alphanumeric).collect()
}

/// Human-readable `Surname, Year` form of a key
pub fn display_key(key: &str) -> String {
    match key.rsplit_once('_') {
        Some((surname, year)) => format!("{}, {}", surname, year),
        None => key.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_surname() {
        assert_eq!(clean_surname("Smith, J."), "Smith");
        assert_eq!(clean_surname("  Cantón-López"), "Cantón-López");
        assert_eq!(clean_surname("O'Brien & Lee"), "O'Brien");
        assert_eq!(clean_surname("Smith et al."), "Smith");
        assert_eq!(clean_surname(""), "");
        assert_eq!(clean_surname("..."), "");
    }

    #[test]
    fn test_citation_key() {
        assert_eq!(citation_key("Smith, J.", "2020"), "Smith_2020");
        assert_eq!(citation_key("Dikmenli", "2010"), "Dikmenli_2010");
        assert_eq!(citation_key("", "2020"), "_2020");
    }

    #[test]
    fn test_anchor_safe() {
        assert_eq!(anchor_safe("Smith_2020"), "Smith2020");
        assert_eq!(anchor_safe("Cantón-López_2018"), "CantnLpez2018");
        assert_eq!(anchor_safe("O'Brien_1999"), "OBrien1999");
    }

    #[test]
    fn test_display_key() {
        assert_eq!(display_key("Smith_2020"), "Smith, 2020");
        assert_eq!(display_key("de_Vries_2001"), "de_Vries, 2001");
        assert_eq!(display_key("_2020"), ", 2020");
        assert_eq!(display_key("plain"), "plain");
    }

    proptest! {
        #[test]
        fn prop_key_is_idempotent(author in "\\PC{0,30}", year in "[0-9]{4}") {
            prop_assert_eq!(
                citation_key(&clean_surname(&author), &year),
                citation_key(&author, &year)
            );
        }

        #[test]
        fn prop_anchor_safe_is_ascii_alphanumeric(key in "\\PC{0,30}") {
            prop_assert!(anchor_safe(&key).chars().all(|c| c.is_ascii_alphanumeric()));
        }
    }
}
