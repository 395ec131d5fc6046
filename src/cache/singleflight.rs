//! Single-flight TTL cache for async loaders.
//!
//! Every key maps to one shared computation. Callers that miss the cache while
//! a computation for the same key is already registered receive a handle to
//! that computation instead of starting another one, so a burst of requests
//! results in a single upstream call.
//!
//! - Registration happens under the `DashMap` shard lock and nothing else: the
//!   loader is spawned onto the runtime and awaited outside of any lock.
//! - Entries expire `ttl` after they were registered. An entry whose loader is
//!   still running is always live, so a zero TTL still coalesces concurrent
//!   callers while retaining nothing after completion.
//! - A failed load evicts its own entry before the failure becomes visible to
//!   any waiter. Failures are never replayed from the cache.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace, warn};

/// Upper bound for deadlines when `now + ttl` overflows.
const MAX_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// A shared handle to a (possibly still running) load.
///
/// Cloning is cheap and every clone resolves to the same outcome.
pub type Loading<V, E> = Shared<BoxFuture<'static, Result<V, LoadError<E>>>>;

/// Failure of a shared load, observed identically by every waiter.
pub enum LoadError<E> {
    /// The loader returned an error. The original error is shared, not copied.
    Failed(Arc<E>),
    /// The loader panicked.
    Panicked,
    /// The loader task was cancelled before finishing (runtime shutdown).
    Cancelled,
}

impl<E> LoadError<E> {
    /// The error returned by the loader, if it returned one.
    pub fn inner(&self) -> Option<&E> {
        match self {
            LoadError::Failed(error) => Some(error),
            LoadError::Panicked | LoadError::Cancelled => None,
        }
    }
}

impl<E> Clone for LoadError<E> {
    fn clone(&self) -> Self {
        match self {
            LoadError::Failed(error) => LoadError::Failed(Arc::clone(error)),
            LoadError::Panicked => LoadError::Panicked,
            LoadError::Cancelled => LoadError::Cancelled,
        }
    }
}

impl<E: fmt::Debug> fmt::Debug for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
            LoadError::Panicked => f.write_str("Panicked"),
            LoadError::Cancelled => f.write_str("Cancelled"),
        }
    }
}

impl<E: fmt::Display> fmt::Display for LoadError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Failed(error) => fmt::Display::fmt(error, f),
            LoadError::Panicked => f.write_str("cache loader panicked"),
            LoadError::Cancelled => f.write_str("cache loader was cancelled"),
        }
    }
}

impl<E> std::error::Error for LoadError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Failed(error) => std::error::Error::source(error.as_ref()),
            LoadError::Panicked | LoadError::Cancelled => None,
        }
    }
}

struct CacheEntry<V, E> {
    /// Distinguishes this registration from later ones for the same key.
    generation: u64,
    deadline: Instant,
    /// Set by the loader task once it has finished, whether or not anyone awaited it.
    completed: Arc<AtomicBool>,
    result: Loading<V, E>,
}

impl<V, E> CacheEntry<V, E> {
    fn is_live(&self, now: Instant) -> bool {
        now < self.deadline || !self.completed.load(Ordering::Acquire)
    }
}

/// Request-coalescing cache mapping keys to shared, time-bounded loads.
pub struct SingleFlightCache<K, V, E> {
    entries: Arc<DashMap<K, CacheEntry<V, E>>>,
    next_generation: Arc<AtomicU64>,
}

impl<K, V, E> Clone for SingleFlightCache<K, V, E>
where
    K: Hash + Eq,
{
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_generation: Arc::clone(&self.next_generation),
        }
    }
}

impl<K, V, E> Default for SingleFlightCache<K, V, E>
where
    K: Hash + Eq,
{
    fn default() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            next_generation: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl<K, V, E> fmt::Debug for SingleFlightCache<K, V, E>
where
    K: Hash + Eq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlightCache")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<K, V, E> SingleFlightCache<K, V, E>
where
    K: Hash + Eq + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    E: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the shared load for `key`, starting `loader` only if there is no live entry.
    ///
    /// The entry is registered before this returns, so the load runs to completion
    /// (and stays shareable) even if the returned handle is dropped. `loader` is
    /// invoked at most once per miss and never while another load for `key` is live.
    pub fn get_or_load<F, Fut>(&self, key: K, ttl: Duration, loader: F) -> Loading<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let now = Instant::now();
        match self.entries.entry(key) {
            Entry::Occupied(occupied) if occupied.get().is_live(now) => {
                trace!(key = ?occupied.key(), "cache hit");
                occupied.get().result.clone()
            }
            Entry::Occupied(mut occupied) => {
                debug!(key = ?occupied.key(), "cache entry expired, reloading");
                let entry = self.start(occupied.key().clone(), now, ttl, loader());
                let result = entry.result.clone();
                occupied.insert(entry);
                result
            }
            Entry::Vacant(vacant) => {
                trace!(key = ?vacant.key(), "cache miss");
                let entry = self.start(vacant.key().clone(), now, ttl, loader());
                let result = entry.result.clone();
                vacant.insert(entry);
                result
            }
        }
    }

    /// Spawn the load and build the entry describing it.
    ///
    /// Called with the shard lock held; the spawned task may contend for that
    /// lock when evicting, which only delays it until registration finishes.
    fn start<Fut>(&self, key: K, now: Instant, ttl: Duration, load: Fut) -> CacheEntry<V, E>
    where
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let completed = Arc::new(AtomicBool::new(false));
        let entries = Arc::clone(&self.entries);
        let task_completed = Arc::clone(&completed);

        let task = tokio::spawn(async move {
            let result = match AssertUnwindSafe(load).catch_unwind().await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(error)) => Err(LoadError::Failed(Arc::new(error))),
                Err(_) => {
                    warn!(key = ?key, "cache loader panicked");
                    Err(LoadError::Panicked)
                }
            };

            if result.is_err() {
                // A newer registration for the same key must survive.
                let evicted = entries
                    .remove_if(&key, |_, entry| entry.generation == generation)
                    .is_some();
                debug!(key = ?key, evicted, "cache load failed");
            }

            task_completed.store(true, Ordering::Release);
            result
        });

        let result = async move {
            match task.await {
                Ok(result) => result,
                Err(_) => Err(LoadError::Cancelled),
            }
        }
        .boxed()
        .shared();

        CacheEntry {
            generation,
            deadline: now.checked_add(ttl).unwrap_or(now + MAX_TTL),
            completed,
            result,
        }
    }

    /// Drop the entry for `key`, returning whether one was present.
    ///
    /// Waiters already holding the handle still observe its outcome.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Remove completed entries whose deadline has passed. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_live(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of registered entries, including stale ones not yet purged.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
