//! Time-boxed cache for identity and profile fetches.
//!
//! Entries older than their ttl read as absent and force a refetch. `clear()`
//! moves the cache to a new epoch; a fetch that began before the clear still
//! hands its result to the caller but never writes it back.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Staleness and retry policy for one kind of query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub stale_time: Duration,
    pub retry: u32,
}

impl QueryPolicy {
    pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

    /// Identity lookups never retry; a failure must surface as "not logged in" immediately
    pub fn session() -> Self {
        Self {
            stale_time: Self::DEFAULT_STALE_TIME,
            retry: 0,
        }
    }

    pub fn profile() -> Self {
        Self {
            stale_time: Self::DEFAULT_STALE_TIME,
            retry: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.fetched_at) < self.ttl
    }
}

#[derive(Debug)]
pub struct QueryCache<V> {
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
    epoch: AtomicU64,
}

impl<V: Clone> QueryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            epoch: AtomicU64::new(0),
        }
    }

    /// Fresh cached value for `key`, dropping it if it has expired
    pub fn get(&self, key: &str) -> Option<V> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some(entry) if entry.is_fresh(Instant::now()) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, key: impl Into<String>, value: V, ttl: Duration) {
        self.entries.lock().insert(
            key.into(),
            CacheEntry {
                value,
                fetched_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn invalidate(&self, key: &str) {
        self.entries.lock().remove(key);
    }

    pub fn clear(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .lock()
            .values()
            .filter(|entry| entry.is_fresh(now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cached value for `key`, or run `fetcher` up to `1 + policy.retry` times.
    ///
    /// Errors are returned from the last attempt and are never cached.
    pub async fn fetch<F, Fut, E>(&self, key: &str, policy: &QueryPolicy, mut fetcher: F) -> Result<V, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: std::fmt::Display,
    {
        if let Some(value) = self.get(key) {
            tracing::debug!("Query cache hit for '{}'", key);
            return Ok(value);
        }

        let epoch = self.epoch.load(Ordering::SeqCst);
        let mut attempt = 0;
        loop {
            match fetcher().await {
                Ok(value) => {
                    if self.epoch.load(Ordering::SeqCst) == epoch {
                        self.insert(key, value.clone(), policy.stale_time);
                    } else {
                        tracing::debug!("Cache cleared while '{}' was in flight, not storing result", key);
                    }
                    return Ok(value);
                }
                Err(e) if attempt < policy.retry => {
                    attempt += 1;
                    tracing::debug!("Query '{}' failed ({}), retry {}/{}", key, e, attempt, policy.retry);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl<V: Clone> Default for QueryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test(start_paused = true)]
    async fn test_entry_expires_after_ttl() {
        let cache = QueryCache::new();
        cache.insert("identity", 7u32, Duration::from_secs(60));
        assert_eq!(cache.get("identity"), Some(7));

        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.get("identity"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_uses_cache_until_stale() {
        let cache = QueryCache::new();
        let calls = AtomicUsize::new(0);
        let policy = QueryPolicy::session();

        for _ in 0..3 {
            let value: Result<usize, String> = cache
                .fetch("profile:u-1", &policy, || async {
                    Ok(calls.fetch_add(1, Ordering::SeqCst))
                })
                .await;
            assert_eq!(value.unwrap(), 0);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(policy.stale_time).await;
        let value: Result<usize, String> = cache
            .fetch("profile:u-1", &policy, || async {
                Ok(calls.fetch_add(1, Ordering::SeqCst))
            })
            .await;
        assert_eq!(value.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_session_policy_does_not_retry() {
        let cache: QueryCache<u32> = QueryCache::new();
        let calls = AtomicUsize::new(0);

        let result: Result<u32, String> = cache
            .fetch("identity", &QueryPolicy::session(), || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.get("identity").is_none());
    }

    #[tokio::test]
    async fn test_profile_policy_retries_once() {
        let cache: QueryCache<u32> = QueryCache::new();
        let calls = AtomicUsize::new(0);

        let result: Result<u32, String> = cache
            .fetch("profile", &QueryPolicy::profile(), || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err("transient".to_string())
                } else {
                    Ok(9)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_clear_during_fetch_discards_write() {
        let cache: QueryCache<u32> = QueryCache::new();

        let result: Result<u32, String> = cache
            .fetch("profile", &QueryPolicy::profile(), || async {
                cache.clear();
                Ok(3)
            })
            .await;

        assert_eq!(result.unwrap(), 3);
        assert!(cache.get("profile").is_none());
    }
}
