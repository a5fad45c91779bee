//! Caching for master data snapshots
//!
//! Building master data segments and mines every recipe, so callers keep
//! the last snapshot keyed by [`corpus_fingerprint`] and only rebuild when
//! the recipe corpus changes.
//!
//! ## Usage Examples
//!
//! ```rust
//! use just_cocktails::cache::MasterDataCache;
//!
//! let cache = MasterDataCache::new();
//! let corpus = vec!["2 cl Rum, 1 cl Limettensaft".to_string()];
//!
//! let first = cache.get_or_build(&corpus);
//! let second = cache.get_or_build(&corpus);
//! assert!(std::sync::Arc::ptr_eq(&first, &second));
//! assert_eq!(cache.stats().hits, 1);
//! ```

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};

use crate::config::ParserConfig;
use crate::master_data::{build_master_data_with, corpus_fingerprint, IngredientSource, MasterData};
use crate::vocabulary::BaseVocabulary;

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Number of lookups served from the cached snapshot
    pub hits: u64,
    /// Number of lookups that had to build
    pub misses: u64,
    /// Number of snapshots published
    pub rebuilds: u64,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// When the current snapshot was published
    pub last_rebuild_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct CachedSnapshot {
    key: String,
    master_data: Arc<MasterData>,
}

/// Single-entry cache of the latest master data snapshot
///
/// Readers share the snapshot through an `Arc`; a rebuild never mutates a
/// snapshot somebody else holds. Concurrent misses may build twice, the last
/// one published wins.
pub struct MasterDataCache {
    current: RwLock<Option<CachedSnapshot>>,
    stats: Mutex<CacheStats>,
    vocabulary: BaseVocabulary,
    config: ParserConfig,
}

impl MasterDataCache {
    /// Cache building with the built-in vocabulary and default thresholds
    pub fn new() -> Self {
        Self::with_config(BaseVocabulary::builtin(), ParserConfig::default())
    }

    /// Cache building with an explicit vocabulary and configuration
    pub fn with_config(vocabulary: BaseVocabulary, config: ParserConfig) -> Self {
        Self {
            current: RwLock::new(None),
            stats: Mutex::new(CacheStats::default()),
            vocabulary,
            config,
        }
    }

    /// Return the snapshot for `corpus`, building it when the corpus changed
    pub fn get_or_build<R: IngredientSource>(&self, corpus: &[R]) -> Arc<MasterData> {
        let key = corpus_fingerprint(corpus);

        if let Some(snapshot) = self.current.read().as_ref() {
            if snapshot.key == key {
                self.stats.lock().hits += 1;
                crate::observability::record_master_data_cache_metrics(true);
                tracing::trace!(key = %key, "Master data cache hit");
                return Arc::clone(&snapshot.master_data);
            }
        }

        self.stats.lock().misses += 1;
        crate::observability::record_master_data_cache_metrics(false);
        tracing::debug!(key = %key, "Master data cache miss, rebuilding");

        // Build without holding the lock so readers keep the old snapshot.
        let master_data = Arc::new(build_master_data_with(&self.vocabulary, corpus, &self.config));

        *self.current.write() = Some(CachedSnapshot {
            key,
            master_data: Arc::clone(&master_data),
        });

        let mut stats = self.stats.lock();
        stats.rebuilds += 1;
        stats.last_rebuild_at = Some(Utc::now());
        tracing::info!(rebuilds = stats.rebuilds, "Published new master data snapshot");

        master_data
    }

    /// Drop the cached snapshot; the next lookup rebuilds
    pub fn invalidate(&self) {
        if self.current.write().take().is_some() {
            tracing::debug!("Master data cache invalidated");
        }
    }

    /// Fingerprint of the cached corpus, if any
    pub fn current_key(&self) -> Option<String> {
        self.current.read().as_ref().map(|s| s.key.clone())
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.lock().clone();

        let total_requests = stats.hits + stats.misses;
        if total_requests > 0 {
            stats.hit_rate = stats.hits as f64 / total_requests as f64;
        }

        stats
    }
}

impl Default for MasterDataCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_hit_returns_same_snapshot() {
        let cache = MasterDataCache::new();
        let corpus = ["2 cl Havana Club"];

        let first = cache.get_or_build(&corpus);
        let second = cache.get_or_build(&corpus);

        assert!(Arc::ptr_eq(&first, &second));
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.rebuilds, 1);
        assert_eq!(stats.hit_rate, 0.5);
        assert!(stats.last_rebuild_at.is_some());
    }

    #[test]
    fn test_corpus_change_rebuilds() {
        let cache = MasterDataCache::new();
        let first = cache.get_or_build(&["2 cl Havana Club"]);
        let second = cache.get_or_build(&["2 cl Havana Club", "1 cl Falernum"]);

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(first.ingredient_record("Falernum").is_none());
        assert!(second.ingredient_record("Falernum").is_some());
        assert_eq!(cache.stats().rebuilds, 2);
    }

    #[test]
    fn test_invalidate_forces_rebuild() {
        let cache = MasterDataCache::new();
        let corpus = ["2 cl Gin"];
        let first = cache.get_or_build(&corpus);
        assert!(cache.current_key().is_some());

        cache.invalidate();
        assert_eq!(cache.current_key(), None);

        let second = cache.get_or_build(&corpus);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().hits, 0);
    }

    #[test]
    fn test_empty_stats() {
        let stats = MasterDataCache::default().stats();
        assert_eq!(stats, CacheStats::default());
    }
}
