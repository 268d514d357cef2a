//! Result and translation caching.
//!
//! The engine treats the cache as an optional accelerator behind the
//! [`CacheStore`] trait: every failure is logged and swallowed, a broken
//! backend degrades to uncached searches and never to a search error.
//! [`MemoryCache`] is the default backend; [`NoopCache`] disables caching
//! without touching any call site.
//!
//! Cached search results are indexed per scope and language through small
//! registry entries, so invalidating one country removes exactly the keys
//! that belong to it even on backends that cannot enumerate keys.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

use ahash::AHashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use gazetteer_data::SUPPORTED_LANGUAGES;

/// A string key-value store with per-entry expiry.
///
/// Implementations must be cheap to share across threads; the engine calls
/// them concurrently from parallel searches.
pub trait CacheStore: Send + Sync {
    /// Fetch a value. `Ok(None)` means absent or expired.
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store a value. A `ttl_seconds` of zero means the entry never expires.
    fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()>;

    /// Remove a single entry, reporting whether it existed.
    fn delete(&self, key: &str) -> anyhow::Result<bool>;

    /// Remove every entry, returning the removed count when the backend can
    /// enumerate its keys. Backends that cannot return `Ok(None)` and the
    /// engine falls back to registry-driven deletion.
    fn clear(&self) -> anyhow::Result<Option<usize>> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.is_none_or(|at| now < at)
    }
}

/// Thread-safe in-process cache with lazy expiry.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<AHashMap<String, Entry>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, including any not yet expired lazily.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.is_live(Instant::now()) => {
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
            }
        }
        // Expired: drop it so the map does not accumulate dead entries.
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(None)
    }

    fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> anyhow::Result<()> {
        let expires_at = (ttl_seconds > 0).then(|| Instant::now() + Duration::from_secs(ttl_seconds));
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_owned(), Entry { value: value.to_owned(), expires_at });
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<bool> {
        Ok(self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some())
    }

    fn clear(&self) -> anyhow::Result<Option<usize>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let removed = entries.len();
        entries.clear();
        Ok(Some(removed))
    }
}

/// A cache that stores nothing. Every search runs fresh.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl CacheStore for NoopCache {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        Ok(None)
    }

    fn set(&self, _key: &str, _value: &str, _ttl_seconds: u64) -> anyhow::Result<()> {
        Ok(())
    }

    fn delete(&self, _key: &str) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn clear(&self) -> anyhow::Result<Option<usize>> {
        Ok(Some(0))
    }
}

/// JSON view over the cache store for search results, plus the per-scope
/// key registry that makes targeted invalidation possible.
#[derive(Clone)]
pub(crate) struct SearchCache {
    store: Arc<dyn CacheStore>,
}

impl SearchCache {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    /// Key of one cached search result.
    pub fn result_key(scope_tag: &str, language: &str, query_key: &str) -> String {
        format!("search:{scope_tag}:{language}:{query_key}")
    }

    /// Key of the registry listing all result keys of one scope and language.
    fn registry_key(scope_tag: &str, language: &str) -> String {
        format!("search-keys:{scope_tag}:{language}")
    }

    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                warn!(%key, %error, "Cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(%key, %error, "Discarding undecodable cache entry");
                if let Err(error) = self.store.delete(key) {
                    debug!(%key, %error, "Could not drop undecodable cache entry");
                }
                None
            }
        }
    }

    pub fn put_json<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                warn!(%key, %error, "Could not encode cache entry");
                return;
            }
        };
        if let Err(error) = self.store.set(key, &raw, 0) {
            warn!(%key, %error, "Cache write failed, result stays uncached");
        }
    }

    /// Record `result_key` in the scope's registry so invalidation can find
    /// it later.
    pub fn register_key(&self, scope_tag: &str, language: &str, result_key: &str) {
        let registry = Self::registry_key(scope_tag, language);
        let mut keys: Vec<String> = self.get_json(&registry).unwrap_or_default();
        if keys.iter().any(|k| k == result_key) {
            return;
        }
        keys.push(result_key.to_owned());
        self.put_json(&registry, &keys);
    }

    /// Drop every cached result of one scope and language. Returns the
    /// number of result entries actually removed.
    pub fn invalidate_language(&self, scope_tag: &str, language: &str) -> usize {
        let registry = Self::registry_key(scope_tag, language);
        let keys: Vec<String> = self.get_json(&registry).unwrap_or_default();
        let mut removed = 0;
        for key in &keys {
            match self.store.delete(key) {
                Ok(true) => removed += 1,
                Ok(false) => {}
                Err(error) => warn!(%key, %error, "Cache delete failed"),
            }
        }
        if let Err(error) = self.store.delete(&registry) {
            warn!(key = %registry, %error, "Cache registry delete failed");
        }
        removed
    }

    /// Drop every cached result of one scope across all supported languages.
    pub fn invalidate_scope(&self, scope_tag: &str) -> usize {
        let removed = SUPPORTED_LANGUAGES
            .iter()
            .map(|language| self.invalidate_language(scope_tag, language))
            .sum();
        debug!(scope = %scope_tag, removed, "Invalidated cached searches for scope");
        removed
    }

    /// Drop everything. Prefers the backend's own `clear`, falling back to
    /// registry-driven deletion over the given scope tags when the backend
    /// cannot enumerate.
    pub fn clear(&self, scope_tags: &[String]) -> usize {
        match self.store.clear() {
            Ok(Some(removed)) => removed,
            Ok(None) => scope_tags.iter().map(|tag| self.invalidate_scope(tag)).sum(),
            Err(error) => {
                warn!(%error, "Cache clear failed, falling back to per-scope invalidation");
                scope_tags.iter().map(|tag| self.invalidate_scope(tag)).sum()
            }
        }
    }
}
