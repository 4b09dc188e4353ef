//! Process-local outline cache.
//!
//! Memoizes the detector + builder pipeline keyed by a content fingerprint
//! so repeated runs over the same documents skip recomputation. The cache is
//! an explicit instance passed to pipeline entry points, never a hidden
//! global, so tests construct isolated instances per case.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::debug;
use md5::{Digest, Md5};

use crate::error::{Error, Result};
use crate::model::OutlineTree;

/// Content fingerprint: MD5 over document bytes and the classifier
/// configuration version, so a config change invalidates stale results.
pub type Fingerprint = [u8; 16];

/// A single in-flight computation shared by its leader and all waiters.
struct Flight {
    done: Mutex<Option<std::result::Result<Arc<OutlineTree>, String>>>,
    cond: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self {
            done: Mutex::new(None),
            cond: Condvar::new(),
        }
    }

    fn publish(&self, result: std::result::Result<Arc<OutlineTree>, String>) {
        let mut done = self.done.lock().expect("flight lock poisoned");
        *done = Some(result);
        self.cond.notify_all();
    }

    fn wait(&self) -> Result<Arc<OutlineTree>> {
        let mut done = self.done.lock().expect("flight lock poisoned");
        while done.is_none() {
            done = self.cond.wait(done).expect("flight lock poisoned");
        }
        match done.as_ref().expect("checked above") {
            Ok(outline) => Ok(Arc::clone(outline)),
            Err(msg) => Err(Error::CacheCompute(msg.clone())),
        }
    }
}

enum Slot {
    Ready {
        outline: Arc<OutlineTree>,
        created_at: DateTime<Utc>,
    },
    InFlight(Arc<Flight>),
}

enum Claim {
    Hit(Arc<OutlineTree>),
    Wait(Arc<Flight>),
    Leader(Arc<Flight>),
}

/// TTL cache over computed outlines with single-flight computation.
///
/// Concurrent `get_or_compute` calls for the same fingerprint trigger
/// exactly one underlying computation; distinct fingerprints compute fully
/// in parallel. Entries expire lazily on lookup or via `sweep`. Nothing
/// persists across process restarts.
pub struct OutlineCache {
    entries: Mutex<HashMap<Fingerprint, Slot>>,
    ttl: Duration,
    config_version: String,
}

impl OutlineCache {
    /// Open a cache with the given TTL and classifier config version.
    pub fn open(ttl: Duration, config_version: impl Into<String>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            config_version: config_version.into(),
        }
    }

    /// Fingerprint for a document's bytes under the active configuration.
    pub fn fingerprint(&self, bytes: &[u8]) -> Fingerprint {
        let mut hasher = Md5::new();
        hasher.update(bytes);
        hasher.update(self.config_version.as_bytes());
        hasher.finalize().into()
    }

    /// Return the cached outline for `bytes`, computing it if absent or
    /// expired.
    ///
    /// Callers receive a shared immutable view (`Arc`); the cached tree is
    /// never mutated in place. The leader of a failed computation gets the
    /// original error; concurrent waiters get `Error::CacheCompute` carrying
    /// the same message, no entry is written, and the next lookup retries
    /// from scratch.
    pub fn get_or_compute<F>(&self, bytes: &[u8], compute: F) -> Result<Arc<OutlineTree>>
    where
        F: FnOnce() -> Result<OutlineTree>,
    {
        let fp = self.fingerprint(bytes);

        let claim = {
            let mut entries = self.entries.lock().expect("cache lock poisoned");
            match entries.get(&fp) {
                Some(Slot::Ready {
                    outline,
                    created_at,
                }) if !self.expired(created_at) => Claim::Hit(Arc::clone(outline)),
                Some(Slot::InFlight(flight)) => Claim::Wait(Arc::clone(flight)),
                _ => {
                    // Absent or expired: claim leadership for this key.
                    let flight = Arc::new(Flight::new());
                    entries.insert(fp, Slot::InFlight(Arc::clone(&flight)));
                    Claim::Leader(flight)
                }
            }
        };

        match claim {
            Claim::Hit(outline) => Ok(outline),
            Claim::Wait(flight) => flight.wait(),
            Claim::Leader(flight) => {
                // If compute unwinds, the guard removes the in-flight slot
                // and publishes a failure so waiters are released instead of
                // blocking on the condvar forever.
                let mut guard = LeaderGuard {
                    cache: self,
                    fp,
                    flight: Arc::clone(&flight),
                    armed: true,
                };
                let result = compute();
                guard.armed = false;

                let mut entries = self.entries.lock().expect("cache lock poisoned");
                match result {
                    Ok(tree) => {
                        let outline = Arc::new(tree);
                        // Last-writer-wins on a recompute race.
                        entries.insert(
                            fp,
                            Slot::Ready {
                                outline: Arc::clone(&outline),
                                created_at: Utc::now(),
                            },
                        );
                        drop(entries);
                        flight.publish(Ok(Arc::clone(&outline)));
                        Ok(outline)
                    }
                    Err(err) => {
                        entries.remove(&fp);
                        drop(entries);
                        debug!("cache computation failed: {}", err);
                        flight.publish(Err(err.to_string()));
                        Err(err)
                    }
                }
            }
        }
    }

    /// Drop the entry for a document, if present.
    pub fn invalidate(&self, bytes: &[u8]) {
        let fp = self.fingerprint(bytes);
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        if matches!(entries.get(&fp), Some(Slot::Ready { .. })) {
            entries.remove(&fp);
        }
    }

    /// Drop all expired entries.
    pub fn sweep(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.retain(|_, slot| match slot {
            Slot::Ready { created_at, .. } => !self.expired(created_at),
            Slot::InFlight(_) => true,
        });
    }

    /// Drop all completed entries.
    pub fn clear(&self) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.retain(|_, slot| matches!(slot, Slot::InFlight(_)));
    }

    /// Number of completed entries currently held.
    pub fn len(&self) -> usize {
        let entries = self.entries.lock().expect("cache lock poisoned");
        entries
            .values()
            .filter(|slot| matches!(slot, Slot::Ready { .. }))
            .count()
    }

    /// Whether the cache holds no completed entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn expired(&self, created_at: &DateTime<Utc>) -> bool {
        let age = Utc::now().signed_duration_since(*created_at);
        age.to_std().map(|age| age >= self.ttl).unwrap_or(false)
    }
}

/// Unwind cleanup for a computation leader.
struct LeaderGuard<'a> {
    cache: &'a OutlineCache,
    fp: Fingerprint,
    flight: Arc<Flight>,
    armed: bool,
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        // Running during a panic: avoid expect so a poisoned lock cannot
        // turn the unwind into an abort.
        if let Ok(mut entries) = self.cache.entries.lock() {
            entries.remove(&self.fp);
        }
        self.flight
            .publish(Err("outline computation panicked".to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> OutlineCache {
        OutlineCache::open(Duration::from_secs(60), "test")
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(OutlineTree::titled("Doc", 3))
        };
        let first = cache.get_or_compute(b"doc-bytes", compute).unwrap();
        assert_eq!(first.title, "Doc");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let second = cache
            .get_or_compute(b"doc-bytes", || {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(OutlineTree::titled("Recomputed", 3))
            })
            .unwrap();
        assert_eq!(second.title, "Doc");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_config_version_changes_fingerprint() {
        let a = OutlineCache::open(Duration::from_secs(60), "v1");
        let b = OutlineCache::open(Duration::from_secs(60), "v2");
        assert_ne!(a.fingerprint(b"same bytes"), b.fingerprint(b"same bytes"));
    }

    #[test]
    fn test_failure_not_cached() {
        let cache = cache();
        let result = cache.get_or_compute(b"doc", || {
            Err(Error::Other("detector exploded".into()))
        });
        assert!(result.is_err());
        assert!(cache.is_empty());

        // Next lookup retries from scratch.
        let ok = cache.get_or_compute(b"doc", || Ok(OutlineTree::titled("Doc", 1)));
        assert!(ok.is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = OutlineCache::open(Duration::from_millis(10), "test");
        cache
            .get_or_compute(b"doc", || Ok(OutlineTree::titled("Old", 1)))
            .unwrap();
        std::thread::sleep(Duration::from_millis(25));

        let fresh = cache
            .get_or_compute(b"doc", || Ok(OutlineTree::titled("New", 1)))
            .unwrap();
        assert_eq!(fresh.title, "New");
    }

    #[test]
    fn test_sweep_drops_expired() {
        let cache = OutlineCache::open(Duration::from_millis(10), "test");
        cache
            .get_or_compute(b"doc", || Ok(OutlineTree::titled("Doc", 1)))
            .unwrap();
        assert_eq!(cache.len(), 1);

        std::thread::sleep(Duration::from_millis(25));
        cache.sweep();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = cache();
        cache
            .get_or_compute(b"a", || Ok(OutlineTree::titled("A", 1)))
            .unwrap();
        cache
            .get_or_compute(b"b", || Ok(OutlineTree::titled("B", 1)))
            .unwrap();
        assert_eq!(cache.len(), 2);

        cache.invalidate(b"a");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }
}
