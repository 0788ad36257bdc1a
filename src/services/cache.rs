use crate::core::QueryPlan;
use crate::models::{AmenityBuckets, AmenityCategory, BoundingBox, ProximityRequest};
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of the current time for expiry decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to; used for deterministic expiry tests
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        self.start + elapsed
    }
}

/// Full shape of an amenity query
///
/// Two searches naming different subtypes in the same category never share
/// an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AmenityCacheKey {
    bbox: [String; 4],
    labels: Vec<AmenityCategory>,
    worship: Vec<String>,
    stores: Vec<String>,
    gyms: Vec<String>,
    sports: Vec<String>,
}

impl AmenityCacheKey {
    /// Build a key from the expanded bbox, the query plan and the request
    ///
    /// Coordinates are rounded to 5 decimal places; subtype lists are
    /// already sorted and deduplicated by `SubtypeSelection`.
    pub fn new(bbox: &BoundingBox, plan: &QueryPlan, request: &ProximityRequest) -> Self {
        let round = |v: f64| format!("{:.5}", v);
        let mut labels = plan.labels.clone();
        labels.sort();

        Self {
            bbox: [round(bbox.west), round(bbox.south), round(bbox.east), round(bbox.north)],
            labels,
            worship: request.subtypes(AmenityCategory::Worship).to_vec(),
            stores: request.subtypes(AmenityCategory::Stores).to_vec(),
            gyms: request.subtypes(AmenityCategory::Gyms).to_vec(),
            sports: request.subtypes(AmenityCategory::Sports).to_vec(),
        }
    }
}

struct CacheEntry {
    inserted_at: Instant,
    value: Arc<AmenityBuckets>,
}

/// TTL + size bounded cache of classified amenity buckets
///
/// Lookups and inserts lock briefly and never across the fetch, so two
/// concurrent misses on the same key may both fetch. A poisoned lock or a
/// zero capacity turns the cache into a pass-through.
pub struct AmenityCache {
    entries: Option<Mutex<LruCache<AmenityCacheKey, CacheEntry>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl AmenityCache {
    /// Create a new cache using the wall clock
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self::with_clock(max_entries, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(max_entries: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let entries = match NonZeroUsize::new(max_entries) {
            Some(capacity) => Some(Mutex::new(LruCache::new(capacity))),
            None => {
                tracing::warn!("Amenity cache capacity is zero, caching disabled");
                None
            }
        };

        Self {
            entries,
            ttl,
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached buckets for `key`, or fetch, store and return them
    ///
    /// Fetch errors are returned as-is and nothing is stored.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: AmenityCacheKey,
        fetch: F,
    ) -> Result<Arc<AmenityBuckets>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AmenityBuckets, E>>,
    {
        if let Some(value) = self.lookup(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Amenity cache hit: {:?}", key.labels);
            return Ok(value);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!("Amenity cache miss: {:?}", key.labels);

        let value = Arc::new(fetch().await?);
        self.store(key, Arc::clone(&value));
        Ok(value)
    }

    fn lookup(&self, key: &AmenityCacheKey) -> Option<Arc<AmenityBuckets>> {
        let mut entries = self.lock()?;
        let now = self.clock.now();

        let expired = match entries.get(key) {
            Some(entry) if now.duration_since(entry.inserted_at) < self.ttl => {
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(key);
        }
        None
    }

    fn store(&self, key: AmenityCacheKey, value: Arc<AmenityBuckets>) {
        let Some(mut entries) = self.lock() else {
            return;
        };
        let entry = CacheEntry {
            inserted_at: self.clock.now(),
            value,
        };
        if let Some((evicted, _)) = entries.push(key, entry) {
            tracing::trace!("Evicted amenity cache entry: {:?}", evicted.labels);
        }
    }

    fn lock(&self) -> Option<std::sync::MutexGuard<'_, LruCache<AmenityCacheKey, CacheEntry>>> {
        match self.entries.as_ref()?.lock() {
            Ok(guard) => Some(guard),
            Err(_) => {
                tracing::warn!("Amenity cache lock poisoned, bypassing cache");
                None
            }
        }
    }

    /// Number of stored entries, expired ones included until touched
    pub fn len(&self) -> usize {
        self.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}
