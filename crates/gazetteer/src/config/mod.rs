//! Builder and presets for [`SearchConfig`].

use crate::search::SearchConfig;

/// Fluent builder for [`SearchConfig`].
///
/// ```rust
/// use gazetteer::SearchConfig;
///
/// let config = SearchConfig::builder()
///     .limit(5)
///     .query_translation_fallback(false)
///     .build();
/// assert_eq!(config.limit, 5);
/// assert!(!config.query_translation_fallback);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset for latency-sensitive callers: fewer results and no
    /// translation round-trips.
    #[must_use]
    pub fn fast() -> Self {
        Self::new()
            .limit(10)
            .query_translation_fallback(false)
            .translate_display_names(false)
    }

    /// Preset for recall-heavy callers: more results and fuzzy matching
    /// without the first-letter prune, so first-letter typos still match.
    #[must_use]
    pub fn comprehensive() -> Self {
        Self::new().limit(50).fuzzy_first_letter_prune(false)
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit;
        self
    }

    #[must_use]
    pub fn fuzzy_first_letter_prune(mut self, enabled: bool) -> Self {
        self.config.fuzzy_first_letter_prune = enabled;
        self
    }

    #[must_use]
    pub fn query_translation_fallback(mut self, enabled: bool) -> Self {
        self.config.query_translation_fallback = enabled;
        self
    }

    #[must_use]
    pub fn translate_display_names(mut self, enabled: bool) -> Self {
        self.config.translate_display_names = enabled;
        self
    }

    #[must_use]
    pub fn parallel_scoring_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_scoring_threshold = threshold;
        self
    }

    #[must_use]
    pub fn build(self) -> SearchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert_eq!(config.limit, 20);
        assert!(config.fuzzy_first_letter_prune);
        assert!(config.query_translation_fallback);
        assert!(config.translate_display_names);
    }

    #[test]
    fn test_builder_matches_default() {
        assert_eq!(SearchConfigBuilder::new().build(), SearchConfig::default());
    }

    #[test]
    fn test_fast_preset() {
        let config = SearchConfigBuilder::fast().build();
        assert_eq!(config.limit, 10);
        assert!(!config.query_translation_fallback);
        assert!(!config.translate_display_names);
        assert!(config.fuzzy_first_letter_prune);
    }

    #[test]
    fn test_comprehensive_preset() {
        let config = SearchConfigBuilder::comprehensive().build();
        assert_eq!(config.limit, 50);
        assert!(!config.fuzzy_first_letter_prune);
        assert!(config.query_translation_fallback);
    }

    #[test]
    fn test_chained_overrides() {
        let config = SearchConfigBuilder::fast()
            .limit(3)
            .translate_display_names(true)
            .build();
        assert_eq!(config.limit, 3);
        assert!(config.translate_display_names);
        assert!(!config.query_translation_fallback, "fast preset should persist");
    }
}
