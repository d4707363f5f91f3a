//! TTL cache over a pluggable storage backend.
//!
//! Entries are stored as a JSON envelope `{data, stored_at}` under string
//! keys. Expiry is lazy: there is no background sweep, a stale entry is
//! detected and removed on the read that finds it. Malformed entries are
//! removed the same way. Writes never fail observably — a storage or
//! serialization failure is logged and counted, and the operation is a
//! no-op from the caller's perspective (the next read is a miss).

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::store::KvStore;
use crate::telemetry;

/// Short TTL: search results and pet detail records. Listing data can
/// shift between visits within a session.
pub const SHORT_TTL: Duration = Duration::from_secs(5 * 60);

/// Long TTL: recommendations. A generated recommendation costs an
/// upstream completion call and is deterministic enough to keep longer.
pub const LONG_TTL: Duration = Duration::from_secs(30 * 60);

/// TTL overrides for the two cache classes.
///
/// ```rust
/// # use petmatch::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .search_ttl(Duration::from_secs(60))
///     .recommendation_ttl(Duration::from_secs(600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for search results and pet details. Default: 5 minutes.
    pub search_ttl: Duration,
    /// TTL for recommendations. Default: 30 minutes.
    pub recommendation_ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            search_ttl: SHORT_TTL,
            recommendation_ttl: LONG_TTL,
        }
    }
}

impl CacheConfig {
    /// Create a new config with the default TTLs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the TTL for search results and pet details.
    pub fn search_ttl(mut self, ttl: Duration) -> Self {
        self.search_ttl = ttl;
        self
    }

    /// Set the TTL for recommendations.
    pub fn recommendation_ttl(mut self, ttl: Duration) -> Self {
        self.recommendation_ttl = ttl;
        self
    }
}

/// Stored envelope. `stored_at` is ms since the Unix epoch, set at write
/// time.
#[derive(serde::Serialize, serde::Deserialize)]
struct Entry<T> {
    data: T,
    stored_at: u64,
}

/// An entry is valid strictly less than one TTL after it was stored.
fn is_fresh(stored_at_ms: u64, now_ms: u64, ttl: Duration) -> bool {
    now_ms.saturating_sub(stored_at_ms) < ttl.as_millis() as u64
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// TTL cache for one namespace over one backend.
///
/// Instances are cheap handles; several may share a backend (search
/// results and pet details both live in the ephemeral store).
#[derive(Clone)]
pub struct TtlCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
    namespace: &'static str,
}

impl TtlCache {
    /// Create a cache over `store` for `namespace`, expiring entries
    /// after `ttl`.
    pub fn new(store: Arc<dyn KvStore>, namespace: &'static str, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            namespace,
        }
    }

    /// Read a cached payload. Misses on absence, expiry, or a malformed
    /// entry; the latter two are removed on detection.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Some(raw) => raw,
            None => {
                self.record_miss();
                return None;
            }
        };

        let entry: Entry<T> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(key, error = %e, "removing malformed cache entry");
                self.store.remove(key);
                self.record_miss();
                return None;
            }
        };

        if !is_fresh(entry.stored_at, now_ms(), self.ttl) {
            debug!(key, "removing expired cache entry");
            self.store.remove(key);
            self.record_miss();
            return None;
        }

        metrics::counter!(telemetry::CACHE_HITS_TOTAL, "namespace" => self.namespace).increment(1);
        Some(entry.data)
    }

    /// Write a payload, overwriting any prior entry. Storage failures are
    /// swallowed: logged, counted, and invisible to the caller.
    pub fn set<T: Serialize>(&self, key: &str, payload: &T) {
        let envelope = Entry {
            data: payload,
            stored_at: now_ms(),
        };
        let raw = match serde_json::to_string(&envelope) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key, error = %e, "cache write skipped: serialization failed");
                self.record_write_failure();
                return;
            }
        };
        if let Err(e) = self.store.set(key, &raw) {
            warn!(key, error = %e, "cache write skipped: storage failed");
            self.record_write_failure();
        }
    }

    /// Remove every entry in this cache's namespace.
    pub fn clear(&self) {
        let prefix = format!("{}_", self.namespace);
        let mut removed = 0usize;
        for key in self.store.keys() {
            if key.starts_with(&prefix) {
                self.store.remove(&key);
                removed += 1;
            }
        }
        debug!(namespace = self.namespace, removed, "cleared cache namespace");
    }

    fn record_miss(&self) {
        metrics::counter!(telemetry::CACHE_MISSES_TOTAL, "namespace" => self.namespace)
            .increment(1);
    }

    fn record_write_failure(&self) {
        metrics::counter!(telemetry::CACHE_WRITE_FAILURES_TOTAL, "namespace" => self.namespace)
            .increment(1);
    }
}
