//! # Gazetteer
//!
//! Multilingual fuzzy place-name search over a static reference dataset.
//!
//! A [`Gazetteer`] resolves free-text queries for countries, cities and
//! subdivisions in any of 37 languages. Matching is accent- and
//! punctuation-insensitive, tolerates typos through Levenshtein distance,
//! and ranks by a tiered score where an exact hit always beats a fuzzy one.
//! Results are cached per scope and language, and a pluggable translation
//! backend localizes display names and rescues queries written in another
//! language.
//!
//! ## Quick Start
//!
//! ```rust
//! use gazetteer::{Gazetteer, Scope};
//!
//! let gazetteer = Gazetteer::new_embedded()?;
//!
//! // Scoped to one country, typo and all.
//! let results = gazetteer.search("beirt", "en", &Scope::country("LB"))?;
//! assert_eq!(results.first().expect("Should match Beirut").name, "Beirut");
//!
//! // Or across the whole dataset.
//! let global = gazetteer.search("paris", "en", &Scope::Global)?;
//! assert!(global.places.iter().any(|p| p.country_code == "FR"));
//! # Ok::<(), gazetteer::error::GazetteerError>(())
//! ```
//!
//! ## Translation
//!
//! Attach a [`TranslationProvider`] to localize result names and to retry
//! zero-result queries through English. [`HttpTranslator`] talks to a
//! Google-Translate-shaped REST endpoint (feature `http-translator`, on by
//! default); [`StaticTranslator`] serves fixed entries for tests and
//! offline use. Translation is best-effort: providers may fail per name,
//! never per search.
//!
//! ```rust
//! use std::sync::Arc;
//! use gazetteer::{Gazetteer, Scope, StaticTranslator};
//!
//! let gazetteer = Gazetteer::builder()
//!     .translation_provider(Arc::new(
//!         StaticTranslator::new().with_entry("fr", "Beirut", "Beyrouth"),
//!     ))
//!     .build()?;
//!
//! let results = gazetteer.search("beirut", "fr", &Scope::country("LB"))?;
//! let first = results.first().expect("Should match Beirut");
//! assert_eq!(first.name, "Beyrouth");
//! assert_eq!(first.canonical_name(), "Beirut");
//! # Ok::<(), gazetteer::error::GazetteerError>(())
//! ```
//!
//! ## Caching
//!
//! Searches are cached through the [`CacheStore`] trait
//! ([`MemoryCache`] by default, [`NoopCache`] to disable, or your own
//! backend). Cached entries never expire on their own; dataset updates are
//! pushed out with [`Gazetteer::invalidate_scope`] and
//! [`Gazetteer::invalidate_all`].

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

pub mod error;

mod cache;
mod config;
mod core;
mod index;
mod search;
mod translate;

pub use cache::{CacheStore, MemoryCache, NoopCache};
pub use config::SearchConfigBuilder;
pub use core::{Gazetteer, GazetteerBuilder, GazetteerInfo};
pub use error::{GazetteerError, Result};
pub use index::{NameTranslation, Place, PlaceKind};
pub use search::{
    CountrySummary, Scope, SearchConfig, SearchError, SearchResult, distance, normalize,
};
#[cfg(feature = "http-translator")]
pub use translate::{API_KEY_ENV, HttpTranslator};
pub use translate::{StaticTranslator, TranslationError, TranslationProvider};

pub use gazetteer_data as data;
pub use gazetteer_data::{DatasetSource, SUPPORTED_LANGUAGES};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize the global tracing subscriber once.
///
/// `RUST_LOG` takes precedence when set; otherwise `level` applies, with the
/// HTTP client internals capped at warn. Repeat calls are no-ops.
///
/// ```rust
/// gazetteer::init_logging(tracing::Level::INFO).expect("Should init logging");
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static ()> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("reqwest=warn".parse()?)
            .add_directive("hyper_util=warn".parse()?);

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::DEBUG);
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        setup_test_env();
        init_logging(tracing::Level::INFO).expect("Should tolerate repeat initialization");
    }

    #[test]
    fn test_search_through_public_surface() {
        setup_test_env();
        let gazetteer = Gazetteer::new_embedded().expect("Should build");
        let results = gazetteer
            .search("Tripoli", "en", &Scope::country("LB"))
            .expect("Should search");
        assert_eq!(results.first().expect("Should match Tripoli").state_name, "North");
    }

    #[test]
    fn test_text_primitives_are_exported() {
        assert_eq!(normalize("Côte d'Ivoire"), "cote divoire");
        assert_eq!(distance("tripoli", "tripol"), 1);
    }

    #[test]
    fn test_supported_languages_table() {
        assert_eq!(SUPPORTED_LANGUAGES.len(), 37);
        assert!(SUPPORTED_LANGUAGES.contains(&"ar"));
        assert!(!SUPPORTED_LANGUAGES.contains(&"xx"));
    }
}
