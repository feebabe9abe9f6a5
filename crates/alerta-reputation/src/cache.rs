//! Cache entries (§3 "Cache entries") and the single-flight TTL cache
//! shared by C6–C8.
//!
//! Grounded on the pack's webfetch `cache.rs` TTL-entry shape
//! (`fetched_at`/`expires_at`, atomic write guarantees) but reimplemented
//! in-memory over `moka::future::Cache` rather than on disk: these
//! payloads are small structured JSON, not page bodies, so there is no
//! benefit to persisting them across process restarts. `moka`'s
//! `get_with` gives the thundering-herd guarantee §9 requires for free —
//! concurrent misses on the same key share one in-flight upstream call.

use moka::future::Cache;
use moka::Expiry;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

/// A single cached answer (§3 "Cache entries"): `{value, fetched_at,
/// source, ok}`. `ok = false` marks a negative (failed-lookup) entry,
/// which expires sooner than a positive one.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub fetched_at: SystemTime,
    pub source: &'static str,
    pub ok: bool,
}

impl<T> CacheEntry<T> {
    pub fn positive(value: T, source: &'static str) -> Self {
        Self { value, fetched_at: SystemTime::now(), source, ok: true }
    }

    pub fn negative(value: T, source: &'static str) -> Self {
        Self { value, fetched_at: SystemTime::now(), source, ok: false }
    }
}

/// Positive/negative TTL pair (§4.6: e.g. Tranco 7d/1d, VirusTotal
/// 6h/1h, WHOIS 24h/6h).
#[derive(Debug, Clone, Copy)]
pub struct Ttl {
    pub positive: Duration,
    pub negative: Duration,
}

struct TtlExpiry<T> {
    ttl: Ttl,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Expiry<String, Arc<CacheEntry<T>>> for TtlExpiry<T> {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Arc<CacheEntry<T>>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(if value.ok { self.ttl.positive } else { self.ttl.negative })
    }
}

/// A bounded, single-flight, per-key-TTL cache. One instance per
/// reputation source (Tranco rank, VirusTotal verdict, WHOIS age).
pub struct TtlCache<T> {
    cache: Cache<String, Arc<CacheEntry<T>>>,
}

impl<T: Clone + Send + Sync + 'static> TtlCache<T> {
    pub fn new(ttl: Ttl, max_capacity: u64) -> Self {
        let expiry = TtlExpiry { ttl, _marker: PhantomData };
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(expiry)
            .build();
        Self { cache }
    }

    /// Cache-through lookup (§4.6): on hit, return immediately; on miss,
    /// `init` runs exactly once even under concurrent callers racing on
    /// the same `key` — `moka::get_with`'s single-flight guarantee.
    pub async fn get_with<F>(&self, key: &str, init: F) -> Arc<CacheEntry<T>>
    where
        F: Future<Output = CacheEntry<T>>,
    {
        self.cache
            .get_with(key.to_string(), async move { Arc::new(init.await) })
            .await
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn concurrent_misses_on_one_key_fire_a_single_upstream_call() {
        let cache: TtlCache<u32> = TtlCache::new(
            Ttl { positive: Duration::from_secs(60), negative: Duration::from_secs(1) },
            100,
        );
        let calls = Arc::new(AtomicU32::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache_ref = &cache;
            let calls_ref = calls.clone();
            handles.push(async move {
                cache_ref
                    .get_with("example.com", async {
                        calls_ref.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        CacheEntry::positive(42u32, "test")
                    })
                    .await
            });
        }
        let results = futures_util::future::join_all(handles).await;
        assert!(results.iter().all(|r| r.value == 42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn negative_entries_are_marked_not_ok() {
        let cache: TtlCache<Option<u32>> = TtlCache::new(
            Ttl { positive: Duration::from_secs(60), negative: Duration::from_secs(1) },
            100,
        );
        let entry = cache
            .get_with("missing.example", async { CacheEntry::negative(None, "test") })
            .await;
        assert!(!entry.ok);
    }
}
