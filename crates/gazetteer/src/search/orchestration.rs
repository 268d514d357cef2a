//! The search pipeline.
//!
//! A search runs through fixed steps: validate the query, resolve the scope,
//! consult the cache, score candidates, sort, optionally retry a zero-result
//! query through translation, localize display names, and write the result
//! back to the cache. Everything after validation is infallible; cache and
//! translation problems degrade the result instead of erroring.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use gazetteer_data::{CountryRecord, Dataset, is_supported_language};

use super::error::{Result, SearchError};
use super::scorer::{self, QueryTerms, ScorerOptions};
use crate::cache::SearchCache;
use crate::index::{IndexHandle, NameTranslation, Place};
use crate::translate::TranslationGateway;

/// Tuning knobs for a search. Construct via [`SearchConfig::builder`] or use
/// the defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of places in a result.
    pub limit: usize,
    /// Skip fuzzy comparison for name tokens whose first normalized letter
    /// differs from the query's. Cheap and rarely wrong, but it does hide
    /// typos in the first letter.
    pub fuzzy_first_letter_prune: bool,
    /// Retry a zero-result search with the query translated to English.
    pub query_translation_fallback: bool,
    /// Localize display names of results when the request language is not
    /// English.
    pub translate_display_names: bool,
    /// Candidate count from which scoring runs on the rayon pool.
    pub parallel_scoring_threshold: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        let default_limit = 20;
        Self {
            limit: default_limit,
            fuzzy_first_letter_prune: true,
            query_translation_fallback: true,
            translate_display_names: true,
            parallel_scoring_threshold: 2048,
        }
    }
}

impl SearchConfig {
    #[must_use]
    pub fn builder() -> crate::config::SearchConfigBuilder {
        crate::config::SearchConfigBuilder::new()
    }
}

/// Where a search looks: the whole dataset or one country.
///
/// Country codes are accepted in any ISO 3166-1 form (alpha-2, alpha-3 or
/// numeric) and any case; results and cache entries always use the canonical
/// alpha-2 code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    Global,
    Country(String),
}

impl Scope {
    pub fn country(code: impl Into<String>) -> Self {
        Self::Country(code.into())
    }

    #[must_use]
    pub fn is_global(&self) -> bool {
        matches!(self, Self::Global)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Country(code) => f.write_str(code),
        }
    }
}

/// Outcome of one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The query as submitted, trimmed.
    pub query: String,
    /// The query the places were actually matched with. Differs from
    /// [`SearchResult::query`] when the translation fallback produced the
    /// results.
    pub resolved_query: String,
    /// The original query, set only when the translation fallback was used.
    pub alternate_query: Option<String>,
    /// Normalized request language tag.
    pub language: String,
    /// Canonicalized scope of the search.
    pub scope: Scope,
    /// Matching places, best first.
    pub places: Vec<Place>,
    /// Whether this result was served from the cache.
    #[serde(default)]
    pub from_cache: bool,
}

impl SearchResult {
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    #[must_use]
    pub fn first(&self) -> Option<&Place> {
        self.places.first()
    }

    /// Whether the translation fallback produced these results.
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.alternate_query.is_some()
    }
}

/// A country matched by [`search_countries_inner`], with the name localized
/// to the request language where the dataset carries one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountrySummary {
    pub id: u32,
    pub alpha2: String,
    pub alpha3: String,
    /// Canonical English name.
    pub name: String,
    /// Name in the request language, when known and not English.
    pub localized_name: Option<String>,
    pub subdivisions: usize,
}

impl CountrySummary {
    pub(crate) fn from_record(country: &CountryRecord, language: &str) -> Self {
        let localized_name = (language != "en")
            .then(|| country.localized_name(language))
            .flatten()
            .map(str::to_owned);
        Self {
            id: country.id,
            alpha2: country.alpha2.clone(),
            alpha3: country.alpha3.clone(),
            name: country.name().to_owned(),
            localized_name,
            subdivisions: country.subdivisions.len(),
        }
    }
}

/// Trim and lowercase a language tag, defaulting empty input to English.
fn normalize_language(language: &str) -> String {
    let tag = language.trim().to_lowercase();
    if tag.is_empty() { "en".to_owned() } else { tag }
}

fn resolve_scope<'a>(
    scope: &Scope,
    dataset: &'a Dataset,
) -> Result<(Scope, String, Option<&'a CountryRecord>)> {
    match scope {
        Scope::Global => Ok((Scope::Global, "global".to_owned(), None)),
        Scope::Country(code) => {
            let country = dataset
                .find_country(code)
                .ok_or_else(|| SearchError::CountryNotFound(code.clone()))?;
            Ok((
                Scope::Country(country.alpha2.clone()),
                country.alpha2.to_lowercase(),
                Some(country),
            ))
        }
    }
}

struct Scored {
    idx: usize,
    score: f64,
}

fn score_candidates(
    candidates: &[Place],
    known_translations: Option<&[Option<String>]>,
    terms: &QueryTerms,
    language: &str,
    opts: &ScorerOptions,
    config: &SearchConfig,
) -> Vec<Scored> {
    let score_one = |idx: usize, place: &Place| -> Option<Scored> {
        let translated = known_translations.and_then(|known| known[idx].as_deref());
        scorer::score_place(place, translated, terms, language, opts)
            .map(|score| Scored { idx, score })
    };

    let mut scored: Vec<Scored> = if candidates.len() >= config.parallel_scoring_threshold {
        candidates
            .par_iter()
            .enumerate()
            .filter_map(|(idx, place)| score_one(idx, place))
            .collect()
    } else {
        candidates
            .iter()
            .enumerate()
            .filter_map(|(idx, place)| score_one(idx, place))
            .collect()
    };

    scored.sort_unstable_by(|a, b| {
        a.score
            .partial_cmp(&b.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| candidates[a.idx].name.cmp(&candidates[b.idx].name))
    });
    scored
}

fn translate_display_names(places: &mut [Place], language: &str, translator: &TranslationGateway) {
    let pending: Vec<usize> = places
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.translation.is_source().then_some(i))
        .collect();
    if pending.is_empty() {
        return;
    }
    let names: Vec<String> = pending.iter().map(|&i| places[i].name.clone()).collect();
    let translated = translator.translate_names(&names, language);
    for (&i, value) in pending.iter().zip(translated) {
        match value {
            Some(name) => {
                let original = std::mem::replace(&mut places[i].name, name);
                places[i].translation = NameTranslation::Translated { original };
            }
            None => places[i].translation = NameTranslation::Failed,
        }
    }
}

#[instrument(
    name = "Place Search",
    level = "debug",
    skip_all,
    fields(query = %query, language = %language, scope = %scope)
)]
pub(crate) fn search_inner(
    query: &str,
    language: &str,
    scope: &Scope,
    handle: &IndexHandle,
    cache: &SearchCache,
    translator: &TranslationGateway,
    config: &SearchConfig,
) -> Result<SearchResult> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidQuery);
    }
    let language = normalize_language(language);
    if !is_supported_language(&language) {
        debug!(%language, "Language tag outside the supported list, proceeding anyway");
    }

    let (scope, scope_tag, country) = resolve_scope(scope, handle.dataset())?;

    let terms = QueryTerms::new(trimmed);
    let cache_key = SearchCache::result_key(&scope_tag, &language, terms.cache_key_part());
    if let Some(mut hit) = cache.get_json::<SearchResult>(&cache_key) {
        debug!(key = %cache_key, "Serving search from cache");
        hit.from_cache = true;
        return Ok(hit);
    }

    let index = handle.get_or_build();
    let candidates = match country {
        Some(country) => index.places_for_country(&country.alpha2).unwrap_or_default(),
        None => index.all_places(),
    };

    let opts = ScorerOptions { first_letter_prune: config.fuzzy_first_letter_prune };
    // Cached display-name translations participate in matching, so a place
    // already translated for this language is findable under that name.
    let known = (language != "en").then(|| {
        let names: Vec<&str> = candidates.iter().map(|p| p.name.as_str()).collect();
        translator.cached_names(&names, &language)
    });

    let mut ranked = score_candidates(candidates, known.as_deref(), &terms, &language, &opts, config);

    let mut resolved_query = trimmed.to_owned();
    let mut alternate_query = None;
    if ranked.is_empty() && config.query_translation_fallback && translator.is_configured() {
        if let Some(translated) = translator.translate_query(trimmed, "en") {
            if translated.to_lowercase() == trimmed.to_lowercase() {
                debug!(%translated, "Fallback translation matches the original query, keeping empty result");
            } else {
                debug!(original = %trimmed, %translated, "Retrying zero-result search with translated query");
                let fallback_terms = QueryTerms::new(&translated);
                ranked = score_candidates(candidates, None, &fallback_terms, "en", &opts, config);
                if !ranked.is_empty() {
                    resolved_query = translated;
                    alternate_query = Some(trimmed.to_owned());
                }
            }
        }
    }

    let limit = config.limit.max(1);
    let mut places = Vec::with_capacity(ranked.len().min(limit));
    for scored in ranked.iter().take(limit) {
        let mut place = candidates[scored.idx].clone();
        if let Some(translated) = known.as_ref().and_then(|k| k[scored.idx].clone()) {
            let original = std::mem::replace(&mut place.name, translated);
            place.translation = NameTranslation::Translated { original };
        }
        places.push(place);
    }

    if language != "en" && config.translate_display_names && translator.is_configured() {
        translate_display_names(&mut places, &language, translator);
    }

    let result = SearchResult {
        query: trimmed.to_owned(),
        resolved_query,
        alternate_query,
        language,
        scope,
        places,
        from_cache: false,
    };
    cache.put_json(&cache_key, &result);
    cache.register_key(&scope_tag, &result.language, &cache_key);
    info!(
        query = %result.query,
        language = %result.language,
        scope = %result.scope,
        matches = result.places.len(),
        fallback = result.used_fallback(),
        "Search complete"
    );
    Ok(result)
}

fn score_country(
    country: &CountryRecord,
    terms: &QueryTerms,
    language: &str,
    opts: &ScorerOptions,
) -> Option<f64> {
    let mut best = f64::INFINITY;
    if let Some(score) = scorer::match_text(country.name(), terms, opts) {
        best = best.min(score + scorer::PENALTY_NAME);
    }
    if language != "en" {
        if let Some(name) = country.localized_name(language) {
            if let Some(score) = scorer::match_text(name, terms, opts) {
                best = best.min(score + scorer::PENALTY_TRANSLATED_NAME);
            }
        }
    }
    if let Some(score) = scorer::match_text(&country.alpha2, terms, opts) {
        best = best.min(score + scorer::PENALTY_REGION_CODE);
    }
    if let Some(score) = scorer::match_text(&country.alpha3, terms, opts) {
        best = best.min(score + scorer::PENALTY_REGION_CODE);
    }
    best.is_finite().then_some(best)
}

/// Match countries by canonical name, localized name or ISO codes. Uncached;
/// the country list is small enough to score on every call.
#[instrument(
    name = "Country Search",
    level = "debug",
    skip_all,
    fields(query = %query, language = %language)
)]
pub(crate) fn search_countries_inner(
    query: &str,
    language: &str,
    dataset: &Dataset,
    config: &SearchConfig,
) -> Result<Vec<CountrySummary>> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return Err(SearchError::InvalidQuery);
    }
    let language = normalize_language(language);
    let terms = QueryTerms::new(trimmed);
    let opts = ScorerOptions { first_letter_prune: config.fuzzy_first_letter_prune };

    let summaries = dataset
        .countries
        .iter()
        .filter_map(|country| {
            score_country(country, &terms, &language, &opts)
                .map(|score| (score, CountrySummary::from_record(country, &language)))
        })
        .sorted_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.1.name.cmp(&b.1.name))
        })
        .take(config.limit.max(1))
        .map(|(_, summary)| summary)
        .collect();
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CacheStore, MemoryCache};
    use crate::translate::{StaticTranslator, TranslationProvider};
    use gazetteer_data::{TestDataConfig, test_data};
    use std::sync::Arc;

    struct Harness {
        handle: IndexHandle,
        cache: SearchCache,
        translator: TranslationGateway,
        config: SearchConfig,
    }

    impl Harness {
        fn new(provider: Option<Arc<dyn TranslationProvider>>) -> Self {
            let store: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());
            Self {
                handle: IndexHandle::new(Arc::new(test_data::dataset(&TestDataConfig::default()))),
                cache: SearchCache::new(Arc::clone(&store)),
                translator: TranslationGateway::new(provider, store),
                config: SearchConfig::default(),
            }
        }

        fn search(&self, query: &str, language: &str, scope: &Scope) -> Result<SearchResult> {
            search_inner(
                query,
                language,
                scope,
                &self.handle,
                &self.cache,
                &self.translator,
                &self.config,
            )
        }
    }

    fn lebanon_translator() -> Arc<dyn TranslationProvider> {
        Arc::new(
            StaticTranslator::new()
                .with_entry("en", "بيروت", "Beirut")
                .with_entry("fr", "Beirut", "Beyrouth"),
        )
    }

    #[test]
    fn test_empty_query_is_invalid() {
        let h = Harness::new(None);
        assert_eq!(h.search("", "en", &Scope::Global), Err(SearchError::InvalidQuery));
        assert_eq!(h.search("   ", "en", &Scope::Global), Err(SearchError::InvalidQuery));
    }

    #[test]
    fn test_unknown_country_errors() {
        let h = Harness::new(None);
        assert_eq!(
            h.search("beirut", "en", &Scope::country("ZZ")),
            Err(SearchError::CountryNotFound("ZZ".to_owned()))
        );
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let h = Harness::new(None);
        let result = h
            .search("beirut", "en", &Scope::country("LB"))
            .expect("Should search");
        assert!(!result.from_cache);
        assert_eq!(result.resolved_query, "beirut");
        assert_eq!(result.alternate_query, None);
        assert_eq!(result.scope, Scope::country("LB"));
        assert_eq!(result.first().expect("Should match Beirut").name, "Beirut");
    }

    #[test]
    fn test_alpha3_scope_canonicalizes_to_alpha2() {
        let h = Harness::new(None);
        let result = h
            .search("beirut", "en", &Scope::country("lbn"))
            .expect("Should resolve alpha-3 codes");
        assert_eq!(result.scope, Scope::country("LB"));
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let h = Harness::new(None);
        let result = h
            .search("t", "en", &Scope::country("LB"))
            .expect("Should search");
        let names: Vec<&str> = result.places.iter().map(|p| p.name.as_str()).collect();
        // Both are raw-prefix matches at the same score.
        assert_eq!(names, ["Tripoli", "Tyre"]);
    }

    #[test]
    fn test_typo_matches_fuzzily() {
        let h = Harness::new(None);
        let result = h
            .search("beirt", "en", &Scope::country("LB"))
            .expect("Should search");
        let top: Vec<&str> = result.places.iter().take(3).map(|p| p.name.as_str()).collect();
        assert!(top.contains(&"Beirut"), "expected Beirut in the top results, got {top:?}");
    }

    #[test]
    fn test_nonsense_query_is_empty_not_an_error() {
        let h = Harness::new(None);
        let result = h
            .search("xyz123notaplace", "en", &Scope::Global)
            .expect("Should search");
        assert!(result.is_empty());
        assert!(!result.from_cache);
    }

    #[test]
    fn test_second_search_hits_the_cache() {
        let h = Harness::new(None);
        let first = h.search("sidon", "en", &Scope::country("LB")).expect("Should search");
        assert!(!first.from_cache);
        let second = h.search("sidon", "en", &Scope::country("LB")).expect("Should search");
        assert!(second.from_cache);
        assert_eq!(first.places, second.places);
    }

    #[test]
    fn test_cache_key_uses_normalized_query() {
        let h = Harness::new(None);
        h.search("Mount Lebanon", "en", &Scope::country("LB")).expect("Should search");
        // Different raw spelling, same normalized form, same cache entry.
        let second = h
            .search("mount   lebanon", "en", &Scope::country("LB"))
            .expect("Should search");
        assert!(second.from_cache);
    }

    #[test]
    fn test_scopes_do_not_share_cache_entries() {
        let h = Harness::new(None);
        h.search("paris", "en", &Scope::Global).expect("Should search");
        let scoped = h.search("paris", "en", &Scope::country("FR")).expect("Should search");
        assert!(!scoped.from_cache);
    }

    #[test]
    fn test_translation_fallback_resolves_foreign_query() {
        let h = Harness::new(Some(lebanon_translator()));
        let result = h
            .search("بيروت", "ar", &Scope::country("LB"))
            .expect("Should search");
        assert_eq!(result.query, "بيروت");
        assert_eq!(result.resolved_query, "Beirut");
        assert_eq!(result.alternate_query.as_deref(), Some("بيروت"));
        assert!(result.used_fallback());

        let first = result.first().expect("Should match Beirut via fallback");
        assert_eq!(first.name, "Beirut");
        // The fixture has no Arabic display names, so localization failed.
        assert!(first.translation.is_failed());
    }

    #[test]
    fn test_translation_fallback_in_global_scope() {
        let h = Harness::new(Some(lebanon_translator()));
        let result = h.search("بيروت", "ar", &Scope::Global).expect("Should search");
        assert_eq!(result.resolved_query, "Beirut");
        assert_eq!(result.alternate_query.as_deref(), Some("بيروت"));
        assert!(result.used_fallback());

        let first = result.first().expect("Should match Beirut without a country hint");
        assert_eq!(first.name, "Beirut");
        assert_eq!(first.country_code, "LB");
    }

    #[test]
    fn test_no_fallback_without_provider() {
        let h = Harness::new(None);
        let result = h
            .search("بيروت", "ar", &Scope::country("LB"))
            .expect("Should search");
        assert!(result.is_empty());
        assert!(!result.used_fallback());
    }

    #[test]
    fn test_display_names_are_localized() {
        let h = Harness::new(Some(lebanon_translator()));
        let result = h
            .search("beirut", "fr", &Scope::country("LB"))
            .expect("Should search");
        let first = result.first().expect("Should match Beirut");
        assert_eq!(first.name, "Beyrouth");
        assert_eq!(first.translation.original(), Some("Beirut"));
        assert_eq!(first.canonical_name(), "Beirut");
    }

    #[test]
    fn test_cached_translations_become_searchable() {
        let h = Harness::new(Some(lebanon_translator()));
        // First search translates and caches the French name.
        h.search("beirut", "fr", &Scope::country("LB")).expect("Should search");
        // Now the French spelling matches through the translated-name field.
        let result = h
            .search("beyrouth", "fr", &Scope::country("LB"))
            .expect("Should search");
        assert!(!result.from_cache);
        let first = result.first().expect("Should match via the cached translation");
        assert_eq!(first.name, "Beyrouth");
        assert_eq!(first.canonical_name(), "Beirut");
    }

    #[test]
    fn test_english_requests_skip_translation() {
        let h = Harness::new(Some(lebanon_translator()));
        let result = h
            .search("beirut", "en", &Scope::country("LB"))
            .expect("Should search");
        let first = result.first().expect("Should match Beirut");
        assert_eq!(first.name, "Beirut");
        assert!(first.translation.is_source());
    }

    #[test]
    fn test_limit_caps_results() {
        let mut h = Harness::new(None);
        h.config.limit = 2;
        let result = h.search("s", "en", &Scope::Global).expect("Should search");
        assert!(result.len() <= 2);
    }

    #[test]
    fn test_language_normalization() {
        assert_eq!(normalize_language("  FR "), "fr");
        assert_eq!(normalize_language(""), "en");
        assert_eq!(normalize_language("zh-TW"), "zh-tw");
    }

    #[test]
    fn test_language_defaults_share_cache_with_en() {
        let h = Harness::new(None);
        h.search("sidon", "en", &Scope::country("LB")).expect("Should search");
        let defaulted = h.search("sidon", "", &Scope::country("LB")).expect("Should search");
        assert!(defaulted.from_cache);
        assert_eq!(defaulted.language, "en");
    }

    #[test]
    fn test_scope_serde_round_trip() {
        for scope in [Scope::Global, Scope::country("LB")] {
            let json = serde_json::to_string(&scope).expect("Should serialize");
            let back: Scope = serde_json::from_str(&json).expect("Should deserialize");
            assert_eq!(back, scope);
        }
    }

    #[test]
    fn test_country_search_matches_localized_names() {
        let h = Harness::new(None);
        let dataset = h.handle.dataset();
        let results = search_countries_inner("liban", "fr", dataset, &h.config)
            .expect("Should search countries");
        assert_eq!(results.first().expect("Should match Lebanon").alpha2, "LB");
        assert_eq!(
            results.first().expect("Should match Lebanon").localized_name.as_deref(),
            Some("Liban")
        );
    }

    #[test]
    fn test_country_search_matches_codes() {
        let h = Harness::new(None);
        let results = search_countries_inner("fra", "en", h.handle.dataset(), &h.config)
            .expect("Should search countries");
        assert!(results.iter().any(|c| c.alpha2 == "FR"));
    }

    #[test]
    fn test_country_search_rejects_empty_query() {
        let h = Harness::new(None);
        assert_eq!(
            search_countries_inner("  ", "en", h.handle.dataset(), &h.config),
            Err(SearchError::InvalidQuery)
        );
    }
}
