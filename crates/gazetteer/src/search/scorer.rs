//! Match scoring.
//!
//! Every searchable text is compared against the query through a ladder of
//! tiers, cheapest and most exact first. Lower scores are better. A place is
//! scored per field, each field adds a fixed penalty on top of the tier
//! score, and the place keeps the minimum over its fields. Places with no
//! matching field are dropped entirely.

use super::matcher;
use super::normalize::normalize;
use crate::index::Place;

// Tier scores, best to worst. Raw-string tiers interleave with the
// normalized ones: a raw prefix outranks a normalized exact match.
const TIER_RAW_EXACT: f64 = 0.0;
const TIER_RAW_PREFIX: f64 = 0.2;
const TIER_NORM_EXACT: f64 = 0.3;
const TIER_RAW_SUBSTRING: f64 = 0.4;
const TIER_NORM_PREFIX: f64 = 0.45;
const TIER_NORM_SUBSTRING: f64 = 0.6;
const TIER_FUZZY_BASE: f64 = 1.0;

// Substring tiers need a minimum query length or one letter would match
// half the index.
const MIN_SUBSTRING_LEN: usize = 3;

// Field penalties. Matching a region name or code should never outrank a
// direct name hit at the same tier.
pub(crate) const PENALTY_NAME: f64 = 0.0;
pub(crate) const PENALTY_TRANSLATED_NAME: f64 = 0.1;
pub(crate) const PENALTY_REGION_NAME: f64 = 0.5;
pub(crate) const PENALTY_REGION_CODE: f64 = 0.75;

/// Per-search scoring switches, derived from the active `SearchConfig`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScorerOptions {
    /// Skip fuzzy comparison for tokens whose first normalized letter
    /// differs from the query's.
    pub first_letter_prune: bool,
}

/// The query in every representation scoring needs, computed once per search.
#[derive(Debug, Clone)]
pub(crate) struct QueryTerms {
    /// Trimmed, lowercased query.
    pub raw_lower: String,
    pub normalized: String,
    /// Character count of `raw_lower`.
    pub raw_len: usize,
    /// Character count of `normalized`.
    pub norm_len: usize,
}

impl QueryTerms {
    pub fn new(query: &str) -> Self {
        let raw = query.trim();
        let raw_lower = raw.to_lowercase();
        let normalized = normalize(raw);
        let raw_len = raw_lower.chars().count();
        let norm_len = normalized.chars().count();
        Self { raw_lower, normalized, raw_len, norm_len }
    }

    /// The query part of the result cache key. Falls back to the lowercased
    /// raw query when normalization leaves nothing, so punctuation-only
    /// queries still get distinct cache entries.
    pub fn cache_key_part(&self) -> &str {
        if self.normalized.is_empty() { &self.raw_lower } else { &self.normalized }
    }
}

/// Score a single text against the query. Returns the tier score of the
/// first tier that matches, or the best token-level fuzzy score, or `None`.
pub(crate) fn match_text(text: &str, terms: &QueryTerms, opts: &ScorerOptions) -> Option<f64> {
    if text.is_empty() {
        return None;
    }

    let text_lower = text.to_lowercase();
    if text_lower == terms.raw_lower {
        return Some(TIER_RAW_EXACT);
    }
    if text_lower.starts_with(&terms.raw_lower) {
        return Some(TIER_RAW_PREFIX);
    }
    if terms.raw_len >= MIN_SUBSTRING_LEN && text_lower.contains(&terms.raw_lower) {
        return Some(TIER_RAW_SUBSTRING);
    }

    if terms.normalized.is_empty() {
        return None;
    }
    let text_norm = normalize(text);
    if text_norm.is_empty() {
        return None;
    }
    if text_norm == terms.normalized {
        return Some(TIER_NORM_EXACT);
    }
    if text_norm.starts_with(&terms.normalized) {
        return Some(TIER_NORM_PREFIX);
    }
    if terms.norm_len >= MIN_SUBSTRING_LEN && text_norm.contains(&terms.normalized) {
        return Some(TIER_NORM_SUBSTRING);
    }

    let query_first = terms.normalized.chars().next();
    let mut best: Option<f64> = None;
    for token in text_norm.split(' ') {
        if opts.first_letter_prune && token.chars().next() != query_first {
            continue;
        }
        if let Some(ratio) = matcher::fuzzy_ratio(token, &terms.normalized) {
            let score = TIER_FUZZY_BASE + ratio;
            if best.is_none_or(|b| score < b) {
                best = Some(score);
            }
        }
    }
    best
}

/// Score a place across all of its searchable fields, keeping the minimum.
///
/// The translated display name only participates when the request language is
/// not English; the canonical dataset names are already English.
pub(crate) fn score_place(
    place: &Place,
    translated_name: Option<&str>,
    terms: &QueryTerms,
    language: &str,
    opts: &ScorerOptions,
) -> Option<f64> {
    let mut best = f64::INFINITY;

    if let Some(score) = match_text(&place.name, terms, opts) {
        best = best.min(score + PENALTY_NAME);
    }
    if language != "en" {
        if let Some(name) = translated_name {
            if let Some(score) = match_text(name, terms, opts) {
                best = best.min(score + PENALTY_TRANSLATED_NAME);
            }
        }
    }
    if let Some(score) = match_text(&place.state_name, terms, opts) {
        best = best.min(score + PENALTY_REGION_NAME);
    }
    if let Some(code) = place.state_code.as_deref() {
        if let Some(score) = match_text(code, terms, opts) {
            best = best.min(score + PENALTY_REGION_CODE);
        }
    }

    best.is_finite().then_some(best)
}
