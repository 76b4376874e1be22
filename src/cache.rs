//! Result cache for fetch-and-normalize
//!
//! Outcomes are memoized under a key built from every input: date, regions
//! (in order), resolution, a digest of the API token and the cache epoch the
//! dashboard page sends. Bumping the epoch is how Refresh forces a new
//! upstream query without touching any other input; the epoch is scoped to
//! the browser session so refreshes of different sessions never collide.
//!
//! Production uses Workers KV with an expiration TTL; [`MemoryCache`] is the
//! in-process variant used by tests and local runs.

use std::cell::RefCell;
use std::collections::HashMap;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use worker::Env;
use worker::kv::KvStore;

use crate::error::{DashboardError, Result};
use crate::fetch::{PriceSource, fetch_and_normalize};
use crate::types::{FetchOutcome, FetchRequest};

/// KV namespace binding holding cached outcomes
pub const CACHE_BINDING: &str = "PRICE_CACHE";

/// Bump when the cached `FetchOutcome` layout changes
const KEY_VERSION: &str = "v1";

/// Refresh state held by one dashboard session.
///
/// The first load (`counter == 0`) shares entries across sessions. Once a
/// session refreshes, its keys carry the session id, so a counter value
/// another session already used can never be served back to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CacheEpoch {
    pub session: Option<String>,
    pub counter: u64,
}

impl CacheEpoch {
    pub fn new(session: Option<String>, counter: u64) -> Self {
        Self { session, counter }
    }

    fn key_part(&self) -> String {
        match (&self.session, self.counter) {
            (_, 0) => "e0".to_string(),
            (Some(session), counter) => format!("e{counter}.{session}"),
            (None, counter) => format!("e{counter}"),
        }
    }
}

impl std::fmt::Display for CacheEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.key_part())
    }
}

/// Cache key covering every input of a fetch
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(request: &FetchRequest, credential: &str, epoch: &CacheEpoch) -> Self {
        // The token itself never lands in KV, only a short digest of it
        let digest = Sha256::digest(credential.as_bytes());
        let token_tag = URL_SAFE_NO_PAD.encode(&digest[..12]);

        Self(format!(
            "prices:{KEY_VERSION}:{}:{}:{}:{token_tag}:{}",
            request.date.format("%Y-%m-%d"),
            request.resolution,
            request.regions.join(","),
            epoch.key_part(),
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Storage for memoized outcomes
#[allow(async_fn_in_trait)] // Workers run single-threaded; no Send bound wanted
pub trait PriceCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<FetchOutcome>>;
    async fn put(&self, key: &CacheKey, outcome: &FetchOutcome) -> Result<()>;
}

/// Where a returned outcome came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

/// Outcome plus cache bookkeeping for logging at the edge
#[derive(Debug)]
pub struct CachedFetch {
    pub outcome: FetchOutcome,
    pub status: CacheStatus,
    /// Storage failures are not fatal; the request continues uncached
    pub storage_errors: Vec<String>,
}

/// Return the cached outcome for `key`, or fetch, store and return a fresh one
pub async fn fetch_cached<C, S>(
    cache: &C,
    source: &S,
    key: &CacheKey,
    request: &FetchRequest,
) -> CachedFetch
where
    C: PriceCache,
    S: PriceSource,
{
    let mut storage_errors = Vec::new();

    match cache.get(key).await {
        Ok(Some(outcome)) => {
            return CachedFetch { outcome, status: CacheStatus::Hit, storage_errors };
        }
        Ok(None) => {}
        Err(e) => storage_errors.push(format!("cache read failed: {e}")),
    }

    let outcome = fetch_and_normalize(source, request).await;

    if let Err(e) = cache.put(key, &outcome).await {
        storage_errors.push(format!("cache write failed: {e}"));
    }

    CachedFetch { outcome, status: CacheStatus::Miss, storage_errors }
}

/// Workers KV backed cache
pub struct KvCache {
    kv: KvStore,
    ttl_seconds: u64,
}

impl KvCache {
    pub fn from_env(env: &Env, ttl_seconds: u64) -> Result<Self> {
        Ok(Self { kv: env.kv(CACHE_BINDING)?, ttl_seconds })
    }
}

fn storage_error(err: worker::kv::KvError) -> DashboardError {
    DashboardError::Storage(worker::Error::from(err).to_string())
}

impl PriceCache for KvCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<FetchOutcome>> {
        self.kv
            .get(key.as_str())
            .json::<FetchOutcome>()
            .await
            .map_err(storage_error)
    }

    async fn put(&self, key: &CacheKey, outcome: &FetchOutcome) -> Result<()> {
        self.kv
            .put(key.as_str(), outcome)
            .map_err(storage_error)?
            .expiration_ttl(self.ttl_seconds)
            .execute()
            .await
            .map_err(storage_error)
    }
}

/// In-process cache with the same TTL semantics as KV.
///
/// Entries are stored serialized, so a hit goes through the same JSON round
/// trip as a KV hit.
pub struct MemoryCache {
    ttl: Duration,
    entries: RefCell<HashMap<String, (DateTime<Utc>, String)>>,
}

impl MemoryCache {
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            ttl: Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX)),
            entries: RefCell::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl PriceCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<FetchOutcome>> {
        let mut entries = self.entries.borrow_mut();
        let expired = match entries.get(key.as_str()) {
            None => return Ok(None),
            Some((stored_at, _)) => Utc::now() - *stored_at >= self.ttl,
        };

        if expired {
            entries.remove(key.as_str());
            return Ok(None);
        }

        match entries.get(key.as_str()) {
            Some((_, json)) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &CacheKey, outcome: &FetchOutcome) -> Result<()> {
        let json = serde_json::to_string(outcome)?;
        self.entries
            .borrow_mut()
            .insert(key.as_str().to_string(), (Utc::now(), json));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::{MockSource, Scripted, flat_day, request};
    use crate::types::Resolution;

    /// Cache whose storage is unavailable
    struct BrokenCache;

    impl PriceCache for BrokenCache {
        async fn get(&self, _key: &CacheKey) -> Result<Option<FetchOutcome>> {
            Err(DashboardError::Storage("KV unavailable".into()))
        }

        async fn put(&self, _key: &CacheKey, _outcome: &FetchOutcome) -> Result<()> {
            Err(DashboardError::Storage("KV unavailable".into()))
        }
    }

    fn epoch(session: Option<&str>, counter: u64) -> CacheEpoch {
        CacheEpoch::new(session.map(String::from), counter)
    }

    #[test]
    fn test_key_covers_all_inputs() {
        let base = request(&["CZ", "DE_LU"], Resolution::Hourly);
        let first = CacheEpoch::default();
        let key = CacheKey::new(&base, "token-a", &first);

        assert!(key.as_str().starts_with("prices:v1:2025-06-01:60min:CZ,DE_LU:"));
        assert!(key.as_str().ends_with(":e0"));
        assert!(!key.as_str().contains("token-a"));

        assert_ne!(key, CacheKey::new(&base, "token-b", &first));
        assert_ne!(key, CacheKey::new(&base, "token-a", &epoch(Some("a"), 1)));
        assert_ne!(key, CacheKey::new(&request(&["DE_LU", "CZ"], Resolution::Hourly), "token-a", &first));
        assert_ne!(key, CacheKey::new(&request(&["CZ", "DE_LU"], Resolution::QuarterHourly), "token-a", &first));
        assert_eq!(key, CacheKey::new(&base, "token-a", &first));
    }

    #[test]
    fn test_epoch_key_part() {
        assert_eq!(epoch(None, 0).to_string(), "e0");
        assert_eq!(epoch(Some("a1"), 0).to_string(), "e0");
        assert_eq!(epoch(Some("a1"), 3).to_string(), "e3.a1");
        assert_eq!(epoch(None, 3).to_string(), "e3");

        let req = request(&["CZ"], Resolution::Hourly);
        assert_ne!(
            CacheKey::new(&req, "token", &epoch(Some("a1"), 1)),
            CacheKey::new(&req, "token", &epoch(Some("b2"), 1)),
        );
    }

    #[tokio::test]
    async fn test_refresh_is_scoped_to_session() {
        let req = request(&["CZ"], Resolution::Hourly);
        let cache = MemoryCache::new(3600);

        // Session A loads and refreshes while CZ is failing
        let failing = MockSource::default().with("CZ", Scripted::Fails("HTTP 503".into()));
        for counter in [0, 1] {
            let key = CacheKey::new(&req, "token", &epoch(Some("session-a"), counter));
            fetch_cached(&cache, &failing, &key, &req).await;
        }
        assert_eq!(failing.call_count(), 2);

        // Upstream recovers; session B's first load shares A's entry
        let healthy = MockSource::default().with("CZ", Scripted::Prices(flat_day(60.0)));
        let key = CacheKey::new(&req, "token", &epoch(Some("session-b"), 0));
        let first = fetch_cached(&cache, &healthy, &key, &req).await;
        assert_eq!(first.status, CacheStatus::Hit);
        assert_eq!(first.outcome.failed_regions, vec!["CZ"]);

        // B's own first refresh must reach upstream
        let key = CacheKey::new(&req, "token", &epoch(Some("session-b"), 1));
        let refreshed = fetch_cached(&cache, &healthy, &key, &req).await;
        assert_eq!(refreshed.status, CacheStatus::Miss);
        assert_eq!(healthy.call_count(), 1);
        assert!(refreshed.outcome.failed_regions.is_empty());
        assert_eq!(refreshed.outcome.table.regions(), vec!["CZ"]);
    }

    #[tokio::test]
    async fn test_repeat_call_is_served_from_cache() {
        let source = MockSource::default()
            .with("CZ", Scripted::Prices((0..24).map(|h| -3.7 + f64::from(h) * 1.1).collect()))
            .with("DE_LU", Scripted::Fails("HTTP 500".into()));
        let cache = MemoryCache::new(3600);
        let req = request(&["CZ", "DE_LU"], Resolution::Hourly);
        let key = CacheKey::new(&req, "token", &CacheEpoch::default());

        let first = fetch_cached(&cache, &source, &key, &req).await;
        assert_eq!(first.status, CacheStatus::Miss);
        assert_eq!(source.call_count(), 2);

        let second = fetch_cached(&cache, &source, &key, &req).await;
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(source.call_count(), 2, "cache hit must not query upstream");
        assert_eq!(first.outcome, second.outcome);
        assert_eq!(
            serde_json::to_string(&first.outcome).expect("serialize"),
            serde_json::to_string(&second.outcome).expect("serialize"),
        );
    }

    #[tokio::test]
    async fn test_new_epoch_forces_upstream_call() {
        let source = MockSource::default().with("CZ", Scripted::Prices(flat_day(60.0)));
        let cache = MemoryCache::new(3600);
        let req = request(&["CZ"], Resolution::Hourly);

        fetch_cached(&cache, &source, &CacheKey::new(&req, "token", &CacheEpoch::default()), &req).await;
        let refresh_key = CacheKey::new(&req, "token", &epoch(Some("a"), 1));
        let refreshed = fetch_cached(&cache, &source, &refresh_key, &req).await;

        assert_eq!(refreshed.status, CacheStatus::Miss);
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let source = MockSource::default().with("CZ", Scripted::Prices(flat_day(60.0)));
        let cache = MemoryCache::new(0);
        let req = request(&["CZ"], Resolution::Hourly);
        let key = CacheKey::new(&req, "token", &CacheEpoch::default());

        fetch_cached(&cache, &source, &key, &req).await;
        let again = fetch_cached(&cache, &source, &key, &req).await;

        assert_eq!(again.status, CacheStatus::Miss);
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn test_storage_failure_does_not_break_fetch() {
        let source = MockSource::default().with("CZ", Scripted::Prices(flat_day(60.0)));
        let req = request(&["CZ"], Resolution::Hourly);
        let key = CacheKey::new(&req, "token", &CacheEpoch::default());

        let result = fetch_cached(&BrokenCache, &source, &key, &req).await;

        assert_eq!(result.status, CacheStatus::Miss);
        assert_eq!(result.outcome.table.regions(), vec!["CZ"]);
        assert_eq!(result.storage_errors.len(), 2);
    }
}
