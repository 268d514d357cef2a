//! Pluggable translation with cache-backed read-through.
//!
//! Translation serves two spots in a search: re-running a zero-result query
//! through English, and localizing display names of results. Both are
//! best-effort; a missing or failing provider degrades the search instead of
//! failing it.
//!
//! Translated texts are effectively static, so the gateway caches every
//! provider response without expiry and consults the cache before the
//! provider. Display-name translations cached here also feed matching: a
//! cached French name of a place is searchable in French afterwards.

use std::sync::Arc;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::cache::CacheStore;

#[cfg(feature = "http-translator")]
mod http;
#[cfg(feature = "http-translator")]
pub use http::{API_KEY_ENV, HttpTranslator};

pub use error::TranslationError;

mod error {
    use thiserror::Error;

    /// Errors a translation provider can produce. The search pipeline
    /// absorbs these; they surface only through logs and
    /// [`NameTranslation::Failed`](crate::NameTranslation::Failed) markers.
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum TranslationError {
        #[error("no translation provider is configured")]
        Unavailable,
        #[error("translation request failed: {0}")]
        Failed(String),
    }
}

/// A backend that translates text between languages.
///
/// `source` of `None` asks the provider to detect the source language.
pub trait TranslationProvider: Send + Sync {
    fn translate(
        &self,
        text: &str,
        target: &str,
        source: Option<&str>,
    ) -> Result<String, TranslationError>;

    /// Translate several texts at once. The result must line up with the
    /// input order. The default forwards to [`TranslationProvider::translate`]
    /// per text; backends with a batch API should override it.
    fn translate_batch(
        &self,
        texts: &[String],
        target: &str,
        source: Option<&str>,
    ) -> Result<Vec<String>, TranslationError> {
        texts
            .iter()
            .map(|text| self.translate(text, target, source))
            .collect()
    }
}

/// Fixed-table translator for tests and offline use.
///
/// ```rust
/// use gazetteer::{StaticTranslator, TranslationProvider};
///
/// let translator = StaticTranslator::new().with_entry("fr", "Beirut", "Beyrouth");
/// assert_eq!(translator.translate("Beirut", "fr", None).as_deref(), Ok("Beyrouth"));
/// assert!(translator.translate("Sidon", "fr", None).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticTranslator {
    entries: AHashMap<(String, String), String>,
}

impl StaticTranslator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one translation of `text` into `target`.
    #[must_use]
    pub fn with_entry(
        mut self,
        target: impl Into<String>,
        text: impl Into<String>,
        translated: impl Into<String>,
    ) -> Self {
        self.entries.insert((target.into(), text.into()), translated.into());
        self
    }
}

impl TranslationProvider for StaticTranslator {
    fn translate(
        &self,
        text: &str,
        target: &str,
        _source: Option<&str>,
    ) -> Result<String, TranslationError> {
        self.entries
            .get(&(target.to_owned(), text.to_owned()))
            .cloned()
            .ok_or_else(|| {
                TranslationError::Failed(format!("no fixture translation of {text:?} into {target}"))
            })
    }
}

/// Cache-first façade over an optional provider.
#[derive(Clone)]
pub(crate) struct TranslationGateway {
    provider: Option<Arc<dyn TranslationProvider>>,
    cache: Arc<dyn CacheStore>,
}

impl TranslationGateway {
    pub fn new(provider: Option<Arc<dyn TranslationProvider>>, cache: Arc<dyn CacheStore>) -> Self {
        Self { provider, cache }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    fn cache_key(source: &str, target: &str, text: &str) -> String {
        format!("translation:{source}:{target}:{text}")
    }

    fn get_cached(&self, key: &str) -> Option<String> {
        match self.cache.get(key) {
            Ok(value) => value,
            Err(error) => {
                warn!(%key, %error, "Translation cache read failed");
                None
            }
        }
    }

    fn put_cached(&self, key: &str, value: &str) {
        if let Err(error) = self.cache.set(key, value, 0) {
            warn!(%key, %error, "Translation cache write failed");
        }
    }

    /// Previously cached display-name translations for a batch of canonical
    /// names, without calling the provider. Order lines up with `names`.
    pub fn cached_names(&self, names: &[&str], target: &str) -> Vec<Option<String>> {
        names
            .iter()
            .map(|name| self.get_cached(&Self::cache_key("en", target, name)))
            .collect()
    }

    /// Translate a query into `target` with source-language detection.
    /// Returns `None` when no provider is configured or the provider fails.
    pub fn translate_query(&self, text: &str, target: &str) -> Option<String> {
        let key = Self::cache_key("auto", target, text);
        if let Some(hit) = self.get_cached(&key) {
            debug!(%text, %target, "Query translation served from cache");
            return Some(hit);
        }
        let provider = self.provider.as_ref()?;
        match provider.translate(text, target, None) {
            Ok(translated) => {
                self.put_cached(&key, &translated);
                Some(translated)
            }
            Err(error) => {
                warn!(%text, %target, %error, "Query translation failed");
                None
            }
        }
    }

    /// Translate display names into `target`, cache-first and batched.
    ///
    /// The output lines up with `names`. Names that cannot be translated
    /// come back as `None`; a provider failure degrades the whole remainder
    /// of the batch rather than the search.
    pub fn translate_names(&self, names: &[String], target: &str) -> Vec<Option<String>> {
        let mut results: Vec<Option<String>> = names
            .iter()
            .map(|name| self.get_cached(&Self::cache_key("en", target, name)))
            .collect();

        let missing: Vec<usize> = results
            .iter()
            .enumerate()
            .filter_map(|(i, r)| r.is_none().then_some(i))
            .collect();
        if missing.is_empty() {
            return results;
        }
        let Some(provider) = self.provider.as_ref() else {
            return results;
        };

        let batch: Vec<String> = missing.iter().map(|&i| names[i].clone()).collect();
        match provider.translate_batch(&batch, target, Some("en")) {
            Ok(translated) if translated.len() == batch.len() => {
                for (&i, value) in missing.iter().zip(translated) {
                    self.put_cached(&Self::cache_key("en", target, &names[i]), &value);
                    results[i] = Some(value);
                }
            }
            Ok(translated) => {
                warn!(
                    expected = batch.len(),
                    got = translated.len(),
                    %target,
                    "Provider returned a misaligned batch, dropping it"
                );
            }
            Err(error) => {
                warn!(count = batch.len(), %target, %error, "Display-name translation failed");
            }
        }
        results
    }
}
