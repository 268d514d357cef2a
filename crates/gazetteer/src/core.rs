//! The [`Gazetteer`] facade: construction, search entry points and cache
//! administration in one place.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use gazetteer_data::{Dataset, DatasetSource, SUPPORTED_LANGUAGES};

use crate::cache::{CacheStore, MemoryCache, NoopCache, SearchCache};
use crate::error::{GazetteerError, Result};
use crate::index::IndexHandle;
use crate::search::{self, CountrySummary, Scope, SearchConfig, SearchError, SearchResult};
use crate::translate::{TranslationGateway, TranslationProvider};

#[cfg(feature = "http-translator")]
use crate::translate::{HttpTranslator, TranslationError};

/// Multilingual fuzzy place-name search over a static dataset.
///
/// The dataset is loaded once at construction; the searchable index is
/// flattened lazily on first use and rebuilt from the retained dataset after
/// invalidation. Cloning is cheap and clones share the dataset, index and
/// cache.
///
/// ```rust
/// use gazetteer::{Gazetteer, Scope};
///
/// let gazetteer = Gazetteer::new_embedded()?;
/// let results = gazetteer.search("beirut", "en", &Scope::country("LB"))?;
/// assert_eq!(results.first().expect("Should match Beirut").name, "Beirut");
/// # Ok::<(), gazetteer::error::GazetteerError>(())
/// ```
#[derive(Clone)]
pub struct Gazetteer {
    handle: Arc<IndexHandle>,
    cache: SearchCache,
    translator: TranslationGateway,
    config: SearchConfig,
}

impl Gazetteer {
    /// Create a gazetteer over the bundled dataset with default settings.
    #[instrument(name = "Create Gazetteer", level = "info")]
    pub fn new_embedded() -> Result<Self> {
        Self::builder().build()
    }

    /// Create a gazetteer over a caller-supplied dataset source.
    pub fn with_source(source: DatasetSource) -> Result<Self> {
        Self::builder().dataset_source(source).build()
    }

    #[must_use]
    pub fn builder() -> GazetteerBuilder {
        GazetteerBuilder::new()
    }

    /// Search for places matching `query`.
    ///
    /// `language` is a lowercase tag like `"en"` or `"fr"`; empty defaults
    /// to English. Results come back best match first.
    ///
    /// # Errors
    ///
    /// [`SearchError::InvalidQuery`] for empty queries and
    /// [`SearchError::CountryNotFound`] for unresolvable country scopes,
    /// both wrapped in [`GazetteerError::Search`]. Cache or translation
    /// trouble never errors a search.
    #[instrument(name = "Search", level = "debug", skip(self))]
    pub fn search(&self, query: &str, language: &str, scope: &Scope) -> Result<SearchResult> {
        Ok(search::search_inner(
            query,
            language,
            scope,
            &self.handle,
            &self.cache,
            &self.translator,
            &self.config,
        )?)
    }

    /// [`Gazetteer::search`] with a one-off configuration.
    #[instrument(name = "Search With Config", level = "debug", skip(self, config))]
    pub fn search_with_config(
        &self,
        query: &str,
        language: &str,
        scope: &Scope,
        config: &SearchConfig,
    ) -> Result<SearchResult> {
        Ok(search::search_inner(
            query,
            language,
            scope,
            &self.handle,
            &self.cache,
            &self.translator,
            config,
        )?)
    }

    /// Match countries by name, localized name or ISO code.
    pub fn search_countries(&self, query: &str, language: &str) -> Result<Vec<CountrySummary>> {
        Ok(search::search_countries_inner(
            query,
            language,
            self.handle.dataset(),
            &self.config,
        )?)
    }

    /// Look up one country by alpha-2, alpha-3 or numeric ISO code.
    ///
    /// ```rust
    /// use gazetteer::Gazetteer;
    ///
    /// let gazetteer = Gazetteer::new_embedded()?;
    /// assert_eq!(gazetteer.country("LBN")?.alpha2, "LB");
    /// assert_eq!(gazetteer.country("422")?.name, "Lebanon");
    /// # Ok::<(), gazetteer::error::GazetteerError>(())
    /// ```
    pub fn country(&self, code: &str) -> Result<CountrySummary> {
        self.handle
            .dataset()
            .find_country(code)
            .map(|country| CountrySummary::from_record(country, "en"))
            .ok_or_else(|| SearchError::CountryNotFound(code.to_owned()).into())
    }

    /// Drop cached results and the index slice for one country.
    ///
    /// Returns `false` when the code does not resolve. Deletion is
    /// best-effort: a failing cache backend leaves stale entries behind but
    /// the in-memory index is always reset.
    #[instrument(name = "Invalidate Scope", level = "info", skip(self))]
    pub fn invalidate_scope(&self, country_code: &str) -> bool {
        let Some(country) = self.handle.dataset().find_country(country_code) else {
            warn!(code = %country_code, "Cannot invalidate unknown country");
            return false;
        };
        let removed = self.cache.invalidate_scope(&country.alpha2.to_lowercase());
        self.handle.invalidate();
        info!(country = %country.alpha2, removed, "Invalidated country scope");
        true
    }

    /// Drop every cached search and the in-memory index. Returns the number
    /// of cache entries removed.
    #[instrument(name = "Invalidate All", level = "info", skip(self))]
    pub fn invalidate_all(&self) -> usize {
        let scope_tags: Vec<String> = self
            .handle
            .dataset()
            .countries
            .iter()
            .map(|c| c.alpha2.to_lowercase())
            .chain(std::iter::once("global".to_owned()))
            .collect();
        let cleared = self.cache.clear(&scope_tags);
        self.handle.invalidate();
        info!(cleared, "Invalidated all cached searches");
        cleared
    }

    /// Language tags display names can be requested in.
    #[must_use]
    pub fn supported_languages(&self) -> &'static [&'static str] {
        &SUPPORTED_LANGUAGES
    }

    /// Dataset and runtime statistics.
    #[must_use]
    pub fn info(&self) -> GazetteerInfo {
        let stats = self.handle.dataset().stats();
        GazetteerInfo {
            countries: stats.countries,
            places: stats.subdivisions,
            languages: stats.languages,
            index_built: self.handle.is_built(),
            translation_configured: self.translator.is_configured(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        self.handle.dataset()
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::new_embedded().expect("Failed to create Gazetteer from the embedded dataset")
    }
}

/// Statistics reported by [`Gazetteer::info`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GazetteerInfo {
    pub countries: usize,
    pub places: usize,
    /// Distinct language tags in the dataset's name tables.
    pub languages: usize,
    pub index_built: bool,
    pub translation_configured: bool,
}

impl GazetteerInfo {
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} places across {} countries ({} dataset languages), index {}, translation {}",
            self.places,
            self.countries,
            self.languages,
            if self.index_built { "built" } else { "not built" },
            if self.translation_configured { "configured" } else { "disabled" },
        )
    }
}

/// Builder for [`Gazetteer`].
///
/// ```rust
/// use gazetteer::{Gazetteer, SearchConfig};
///
/// let gazetteer = Gazetteer::builder()
///     .config(SearchConfig::builder().limit(5).build())
///     .no_cache()
///     .build()?;
/// assert_eq!(gazetteer.config().limit, 5);
/// # Ok::<(), gazetteer::error::GazetteerError>(())
/// ```
#[derive(Default)]
pub struct GazetteerBuilder {
    source: DatasetSource,
    store: Option<Arc<dyn CacheStore>>,
    provider: Option<Arc<dyn TranslationProvider>>,
    config: SearchConfig,
}

impl GazetteerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn dataset_source(mut self, source: DatasetSource) -> Self {
        self.source = source;
        self
    }

    /// Load the dataset from a JSON file instead of the bundled asset.
    #[must_use]
    pub fn dataset_path(self, path: impl Into<PathBuf>) -> Self {
        self.dataset_source(DatasetSource::path(path))
    }

    #[must_use]
    pub fn cache_store(mut self, store: Arc<dyn CacheStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Disable caching entirely; every search runs fresh.
    #[must_use]
    pub fn no_cache(self) -> Self {
        self.cache_store(Arc::new(NoopCache))
    }

    #[must_use]
    pub fn translation_provider(mut self, provider: Arc<dyn TranslationProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Attach the HTTP translator when its API key environment variable is
    /// set, and quietly run without translation when it is not.
    #[cfg(feature = "http-translator")]
    #[must_use]
    pub fn translation_from_env(mut self) -> Self {
        match HttpTranslator::from_env() {
            Ok(translator) => self.provider = Some(Arc::new(translator)),
            Err(TranslationError::Unavailable) => {
                info!("No translation API key in the environment, translation disabled");
            }
            Err(error) => warn!(%error, "Could not build the HTTP translator"),
        }
        self
    }

    #[must_use]
    pub fn config(mut self, config: SearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the dataset and assemble the gazetteer.
    ///
    /// # Errors
    ///
    /// [`GazetteerError::Dataset`] when the dataset cannot be loaded or
    /// fails validation, [`GazetteerError::Config`] for unusable settings.
    /// Construction is the only fatal path; a gazetteer that built
    /// successfully serves every search.
    #[instrument(name = "Build Gazetteer", level = "info", skip_all)]
    pub fn build(self) -> Result<Gazetteer> {
        if self.config.limit == 0 {
            return Err(GazetteerError::Config("search limit must be at least 1".to_owned()));
        }

        let start = Instant::now();
        let dataset = Arc::new(Dataset::load(&self.source)?);
        let stats = dataset.stats();
        let store = self.store.unwrap_or_else(|| Arc::new(MemoryCache::new()));
        let cache = SearchCache::new(Arc::clone(&store));
        let translator = TranslationGateway::new(self.provider, store);

        info!(
            countries = stats.countries,
            places = stats.subdivisions,
            languages = stats.languages,
            elapsed = ?start.elapsed(),
            "Gazetteer ready"
        );
        Ok(Gazetteer {
            handle: Arc::new(IndexHandle::new(dataset)),
            cache,
            translator,
            config: self.config,
        })
    }
}
