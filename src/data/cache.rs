//! In-memory TTL cache
//!
//! Volatile, cleared on restart. Entries carry an absolute expiry and are
//! only dropped lazily when read after expiring, or on explicit
//! `delete`/`clear`. There is no background sweeper: the key space is one
//! key per district/year and stays small.

use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::metrics::{CACHE_HITS_TOTAL, CACHE_MISSES_TOTAL, CACHE_SIZE};

/// Default TTL for cached entries (5 minutes)
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

/// Cache of raw upstream response bodies
pub type ResponseCache = TtlCache<serde_json::Value>;

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now > self.expires_at
    }
}

/// Key/value cache with per-entry expiry
///
/// Concurrent writers to the same key race with last-write-wins; values are
/// replaced wholesale so no reader ever observes a partial value.
pub struct TtlCache<V> {
    /// Label used for metrics
    name: &'static str,
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create new cache
    ///
    /// # Arguments
    /// * `name` - Metrics label
    /// * `default_ttl` - TTL applied by [`TtlCache::set_default`]
    pub fn new(name: &'static str, default_ttl: Duration) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Store a value; overwrites any existing entry for `key`
    pub async fn set(&self, key: &str, value: V, ttl: Duration) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        CACHE_SIZE
            .with_label_values(&[self.name])
            .set(entries.len() as i64);
    }

    /// Store a value with the cache's default TTL
    pub async fn set_default(&self, key: &str, value: V) {
        self.set(key, value, self.default_ttl).await;
    }

    /// Get a live value
    ///
    /// An expired entry is removed as a side effect and reported as absent.
    pub async fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_expired(now) => {
                    CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
                    tracing::debug!(cache = self.name, key, "Cache hit");
                    return Some(entry.value.clone());
                }
                Some(_) => {}
                None => {
                    CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
                    tracing::debug!(cache = self.name, key, "Cache miss");
                    return None;
                }
            }
        }

        // Expired: re-check under the write lock, a writer may have refreshed it.
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get(key) {
            if !entry.is_expired(now) {
                CACHE_HITS_TOTAL.with_label_values(&[self.name]).inc();
                return Some(entry.value.clone());
            }
            entries.remove(key);
            tracing::debug!(cache = self.name, key, "Cache entry expired");
        }
        CACHE_MISSES_TOTAL.with_label_values(&[self.name]).inc();
        CACHE_SIZE
            .with_label_values(&[self.name])
            .set(entries.len() as i64);
        None
    }

    /// Remove a single entry
    pub async fn delete(&self, key: &str) {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        CACHE_SIZE
            .with_label_values(&[self.name])
            .set(entries.len() as i64);
    }

    /// Remove all entries
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        CACHE_SIZE.with_label_values(&[self.name]).set(0);
        tracing::info!(cache = self.name, removed, "Cache cleared");
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> TtlCache<String> {
        TtlCache::new("test", DEFAULT_TTL)
    }

    #[tokio::test(start_paused = true)]
    async fn get_within_ttl_returns_stored_value() {
        let cache = cache();
        cache
            .set("district-pune-all", "payload".to_string(), Duration::from_secs(60))
            .await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(
            cache.get("district-pune-all").await.as_deref(),
            Some("payload")
        );
    }

    #[tokio::test(start_paused = true)]
    async fn get_after_expiry_returns_none_and_removes_entry() {
        let cache = cache();
        cache
            .set("district-pune-all", "payload".to_string(), Duration::from_millis(100))
            .await;
        assert_eq!(cache.len().await, 1);

        tokio::time::advance(Duration::from_millis(150)).await;

        assert!(cache.get("district-pune-all").await.is_none());
        assert_eq!(cache.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_linger_until_read() {
        let cache = cache();
        cache.set("a", "1".to_string(), Duration::from_millis(10)).await;
        cache.set("b", "2".to_string(), Duration::from_millis(10)).await;

        tokio::time::advance(Duration::from_millis(50)).await;
        assert_eq!(cache.len().await, 2);

        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn set_twice_keeps_latest_value() {
        let cache = cache();
        cache.set_default("k", "first".to_string()).await;
        cache.set_default("k", "second".to_string()).await;

        assert_eq!(cache.get("k").await.as_deref(), Some("second"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn set_refreshes_expiry() {
        let cache = cache();
        cache.set("k", "old".to_string(), Duration::from_secs(1)).await;
        tokio::time::advance(Duration::from_millis(800)).await;
        cache.set("k", "new".to_string(), Duration::from_secs(1)).await;
        tokio::time::advance(Duration::from_millis(800)).await;

        assert_eq!(cache.get("k").await.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_and_clear_invalidate() {
        let cache = cache();
        cache.set_default("a", "1".to_string()).await;
        cache.set_default("b", "2".to_string()).await;

        cache.delete("a").await;
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.get("b").await.as_deref(), Some("2"));

        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn missing_key_is_absent() {
        assert!(cache().get("nope").await.is_none());
    }
}
