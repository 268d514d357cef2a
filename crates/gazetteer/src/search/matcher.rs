//! Edit-distance matching policy.
//!
//! Fuzzy matching compares individual tokens of a normalized name against the
//! whole normalized query. A candidate only counts when the Levenshtein
//! distance stays within half the longer string and both sides are at least
//! two characters, which keeps one-letter inputs from matching everything.

use rapidfuzz::distance::levenshtein;

/// A token matches when `distance / max_len` does not exceed this ratio.
pub(crate) const MAX_DISTANCE_RATIO: f64 = 0.5;

/// Both strings must be at least this many characters for fuzzy matching.
pub(crate) const MIN_FUZZY_LEN: usize = 2;

/// Levenshtein edit distance over Unicode code points.
///
/// `"café"` and `"cafe"` are one edit apart, not two bytes apart.
///
/// ```rust
/// use gazetteer::distance;
///
/// assert_eq!(distance("beirut", "beirt"), 1);
/// assert_eq!(distance("café", "cafe"), 1);
/// assert_eq!(distance("", "abc"), 3);
/// ```
#[must_use]
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }
    levenshtein::distance(a.chars(), b.chars())
}

/// Distance ratio between a name token and the query, if the pair qualifies
/// for fuzzy matching at all.
///
/// Returns `distance / max(len)` when both strings have at least
/// [`MIN_FUZZY_LEN`] characters and the ratio is within
/// [`MAX_DISTANCE_RATIO`], `None` otherwise.
pub(crate) fn fuzzy_ratio(token: &str, query: &str) -> Option<f64> {
    let token_len = token.chars().count();
    let query_len = query.chars().count();
    if token_len < MIN_FUZZY_LEN || query_len < MIN_FUZZY_LEN {
        return None;
    }
    let max_len = token_len.max(query_len);
    let ratio = distance(token, query) as f64 / max_len as f64;
    (ratio <= MAX_DISTANCE_RATIO).then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_basic() {
        assert_eq!(distance("kitten", "sitting"), 3);
        assert_eq!(distance("sitting", "kitten"), 3);
        assert_eq!(distance("beirut", "beirut"), 0);
        assert_eq!(distance("beirut", "beirt"), 1);
        assert_eq!(distance("", ""), 0);
        assert_eq!(distance("abc", ""), 3);
        assert_eq!(distance("", "abc"), 3);
    }

    #[test]
    fn test_distance_counts_code_points() {
        assert_eq!(distance("café", "cafe"), 1);
        assert_eq!(distance("бейрут", "бейрт"), 1);
        assert_eq!(distance("東京", "京"), 1);
    }

    #[test]
    fn test_fuzzy_ratio_within_threshold() {
        let ratio = fuzzy_ratio("beirut", "beirt").expect("Should match within threshold");
        assert!((ratio - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_fuzzy_ratio_rejects_far_strings() {
        assert!(fuzzy_ratio("tokyo", "beirut").is_none());
        assert!(fuzzy_ratio("ab", "xy").is_none());
    }

    #[test]
    fn test_fuzzy_ratio_requires_min_length() {
        assert!(fuzzy_ratio("a", "ab").is_none());
        assert!(fuzzy_ratio("ab", "b").is_none());
        assert!(fuzzy_ratio("", "beirut").is_none());
        // Two characters each is enough.
        assert!(fuzzy_ratio("ab", "ac").is_some());
    }

    #[test]
    fn test_fuzzy_ratio_boundary_is_inclusive() {
        // Distance 2 over max length 4 is exactly the 0.5 limit.
        let ratio = fuzzy_ratio("abcd", "abxy").expect("Should match at the exact threshold");
        assert!((ratio - 0.5).abs() < 1e-9);
    }
}
