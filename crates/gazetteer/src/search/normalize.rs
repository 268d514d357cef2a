//! Query and name normalization.
//!
//! Matching happens on two representations of every string: the raw form
//! (lowercased, trimmed) and the normalized form produced here. Normalization
//! strips diacritics and punctuation so that `"Île-de-France"`, `"ile de
//! france"` and `"ILE DE FRANCE"` all collapse to the same text.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Apostrophe-like characters removed outright rather than folded to a space,
/// so `"N'Djamena"` normalizes to `"ndjamena"` and not `"n djamena"`.
const APOSTROPHES: [char; 3] = ['\'', '\u{2019}', '\u{02BC}'];

/// Normalize a string for accent- and punctuation-insensitive matching.
///
/// The steps, in order: Unicode NFD decomposition, removal of combining
/// marks, removal of apostrophes, folding every other non-alphanumeric run
/// into a single ASCII space, trimming, and lowercasing. Alphanumeric is the
/// Unicode class, so Arabic, CJK and Cyrillic names survive normalization
/// intact.
///
/// The function is idempotent: `normalize(normalize(s)) == normalize(s)`.
///
/// ```rust
/// use gazetteer::normalize;
///
/// assert_eq!(normalize("Île-de-France"), "ile de france");
/// assert_eq!(normalize("  Sant  Julià de Lòria "), "sant julia de loria");
/// assert_eq!(normalize("N'Djamena"), "ndjamena");
/// assert_eq!(normalize("بيروت"), "بيروت");
/// ```
#[must_use]
pub fn normalize(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_space = false;
    for c in input.nfd() {
        if is_combining_mark(c) || APOSTROPHES.contains(&c) {
            continue;
        }
        if c.is_alphanumeric() {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            for lower in c.to_lowercase() {
                out.push(lower);
            }
        } else {
            pending_space = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_diacritics() {
        assert_eq!(normalize("Île-de-France"), "ile de france");
        assert_eq!(normalize("Zürich"), "zurich");
        assert_eq!(normalize("São Paulo"), "sao paulo");
        assert_eq!(normalize("Baalbek-Hermel"), "baalbek hermel");
    }

    #[test]
    fn test_collapses_punctuation_and_whitespace() {
        assert_eq!(normalize("  New   York  "), "new york");
        assert_eq!(normalize("Provence-Alpes-Côte d'Azur"), "provence alpes cote dazur");
        assert_eq!(normalize("a--b__c"), "a b c");
    }

    #[test]
    fn test_removes_apostrophes_without_splitting() {
        assert_eq!(normalize("N'Djamena"), "ndjamena");
        assert_eq!(normalize("L\u{2019}Aquila"), "laquila");
    }

    #[test]
    fn test_preserves_non_latin_scripts() {
        assert_eq!(normalize("بيروت"), "بيروت");
        assert_eq!(normalize("東京都"), "東京都");
        assert_eq!(normalize("Київ"), "київ");
    }

    #[test]
    fn test_punctuation_only_input_is_empty() {
        assert_eq!(normalize("!!! --- ???"), "");
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("'"), "");
    }

    #[test]
    fn test_idempotent() {
        for s in ["Île-de-France", "  a -- b ", "بيروت", "N'Djamena", "Zürich"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once, "normalize should be idempotent for {s:?}");
        }
    }

    #[test]
    fn test_no_leading_or_trailing_space() {
        assert_eq!(normalize("--Beirut--"), "beirut");
        assert_eq!(normalize(" Beirut "), "beirut");
    }
}
