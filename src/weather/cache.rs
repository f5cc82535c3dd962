//! TTL cache for per-city weather display strings.
//!
//! Stores one entry per normalized city name, including negative entries for
//! confirmed failures. Singleflight per key: concurrent callers for the same
//! city attach to one shared in-flight lookup, so at most one provider call
//! is outstanding per city at any instant.

use crate::weather::client::FetchWeather;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Entries older than this are treated as absent by lookups.
pub const TTL: Duration = Duration::from_secs(10 * 60);

/// Cache size bound. Oldest-by-write-timestamp entries are evicted beyond it.
pub const CAPACITY: usize = 100;

/// How often the background sweeper drops expired entries.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// city → cached display string. `data: None` is a confirmed negative result
/// (city not found or provider failure), distinct from key absence.
struct CacheEntry {
    data: Option<String>,
    cached_at: Instant,
}

/// An in-flight lookup all concurrent callers for one key await together.
type InflightLookup = Shared<BoxFuture<'static, Option<String>>>;

/// Read-only cache snapshot for the status endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherCacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub entries_with_data: usize,
    pub inflight: usize,
    /// `valid_entries / total_entries`, 0 when the cache is empty.
    pub valid_ratio: f64,
}

/// Shared weather cache. Clone-cheap (all `Arc`-wrapped internals).
#[derive(Clone)]
pub struct WeatherCache {
    fetcher: Arc<dyn FetchWeather>,
    entries: Arc<DashMap<String, CacheEntry>>,
    inflight: Arc<DashMap<String, InflightLookup>>,
    ttl: Duration,
    capacity: usize,
    sweeper: Arc<Mutex<Option<CancellationToken>>>,
}

impl WeatherCache {
    pub fn new(fetcher: Arc<dyn FetchWeather>) -> Self {
        Self::with_limits(fetcher, TTL, CAPACITY)
    }

    /// Construct with explicit expiry window and capacity.
    pub fn with_limits(fetcher: Arc<dyn FetchWeather>, ttl: Duration, capacity: usize) -> Self {
        Self {
            fetcher,
            entries: Arc::new(DashMap::new()),
            inflight: Arc::new(DashMap::new()),
            ttl,
            capacity,
            sweeper: Arc::new(Mutex::new(None)),
        }
    }

    /// Resolve a display string for `city`, from cache if possible.
    ///
    /// Never fails: provider errors degrade to `None` after being written to
    /// the cache as negative entries. An empty city is `None` with no side
    /// effects.
    pub async fn get(&self, city: &str) -> Option<String> {
        let key = normalize_city(city)?;

        if let Some(entry) = self.entries.get(&key) {
            if entry.cached_at.elapsed() < self.ttl {
                return entry.data.clone();
            }
            // Expired: fall through to a fresh lookup. The stale entry is
            // overwritten on settlement or removed by the sweeper.
        }

        let lookup = match self.inflight.entry(key.clone()) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => {
                let lookup = self.start_lookup(key);
                slot.insert(lookup.clone());
                lookup
            }
        };
        lookup.await
    }

    /// Build the shared lookup future for `key`. The in-flight marker is
    /// removed on settlement, success or failure, so a key can never wedge.
    fn start_lookup(&self, key: String) -> InflightLookup {
        let cache = self.clone();
        async move {
            let outcome = cache.fetch_and_store(&key).await;
            cache.inflight.remove(&key);
            outcome
        }
        .boxed()
        .shared()
    }

    async fn fetch_and_store(&self, key: &str) -> Option<String> {
        let outcome = match self.fetcher.fetch(key).await {
            Ok(record) => Some(record.display()),
            Err(err) => {
                if err.is_soft() {
                    debug!(city = key, error = %err, "weather unavailable");
                } else {
                    warn!(city = key, error = %err, "weather lookup failed");
                }
                None
            }
        };
        self.entries.insert(
            key.to_owned(),
            CacheEntry {
                data: outcome.clone(),
                cached_at: Instant::now(),
            },
        );
        self.evict_over_capacity();
        outcome
    }

    /// Drop oldest-by-write-timestamp entries until the count is at the cap.
    /// Recency-biased, not strict LRU: reads do not refresh timestamps.
    fn evict_over_capacity(&self) {
        let excess = self.entries.len().saturating_sub(self.capacity);
        if excess == 0 {
            return;
        }
        let mut stamped: Vec<(String, Instant)> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().cached_at))
            .collect();
        stamped.sort_by_key(|(_, cached_at)| *cached_at);
        for (key, _) in stamped.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        debug!(evicted = excess, "weather cache over capacity");
    }

    /// Empty the cache and the in-flight registry unconditionally.
    pub fn clear_all(&self) {
        self.entries.clear();
        self.inflight.clear();
    }

    /// Remove only entries older than the expiry window.
    pub fn clear_expired(&self) {
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| entry.cached_at.elapsed() < self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(removed, "expired weather entries swept");
        }
    }

    pub fn stats(&self) -> WeatherCacheStats {
        let total_entries = self.entries.len();
        let mut valid_entries = 0;
        let mut entries_with_data = 0;
        for entry in self.entries.iter() {
            if entry.cached_at.elapsed() < self.ttl {
                valid_entries += 1;
                if entry.data.is_some() {
                    entries_with_data += 1;
                }
            }
        }
        let valid_ratio = if total_entries == 0 {
            0.0
        } else {
            valid_entries as f64 / total_entries as f64
        };
        WeatherCacheStats {
            total_entries,
            valid_entries,
            entries_with_data,
            inflight: self.inflight.len(),
            valid_ratio,
        }
    }

    /// Best-effort warm-up: resolve every city, waiting for all to settle.
    /// Individual failures are already absorbed by `get`.
    pub async fn preload(&self, cities: &[String]) {
        futures::future::join_all(cities.iter().map(|city| self.get(city))).await;
        info!(cities = cities.len(), "weather cache preload settled");
    }

    /// Spawn the periodic expiry sweep. Idempotent while running.
    pub fn start_sweeper(&self, interval: Duration) {
        let mut guard = self.sweeper.lock().expect("sweeper lock poisoned");
        if guard.is_some() {
            return;
        }
        let token = CancellationToken::new();
        let stop = token.clone();
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await; // skip the immediate first tick
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = ticker.tick() => cache.clear_expired(),
                }
            }
            debug!("weather cache sweeper stopped");
        });
        *guard = Some(token);
    }

    /// Stop the sweep task. Safe to call when not running.
    pub fn stop_sweeper(&self) {
        if let Some(token) = self.sweeper.lock().expect("sweeper lock poisoned").take() {
            token.cancel();
        }
    }
}

/// Cache/registry key: lowercased, trimmed, internal whitespace collapsed.
/// `None` for inputs that are empty after trimming.
fn normalize_city(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.to_lowercase())
}
