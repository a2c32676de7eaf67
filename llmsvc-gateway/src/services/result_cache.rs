//! Bounded LRU memoization for deterministic results
//!
//! Each key maps to a shared [`OnceCell`]. A miss inserts an empty cell under
//! the index lock, then computes outside it, so slow computes for different
//! keys run side by side while concurrent misses on the same key all await
//! the one cell. Inserting past capacity evicts the least recently used key.
//!
//! A failed compute leaves nothing behind: its cell is removed (if it is still
//! the one in the index) and the error propagates to every waiter that ran
//! the compute; the next caller starts fresh.

use lru::LruCache;
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OnceCell};

/// Cache statistics snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub capacity: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

pub struct ResultCache<V> {
    entries: Mutex<LruCache<String, Arc<OnceCell<V>>>>,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache holding at most `capacity` entries
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let cell = {
            let mut entries = self.entries.lock().await;
            match entries.get(key) {
                Some(cell) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Arc::clone(cell)
                }
                None => {
                    self.misses.fetch_add(1, Ordering::Relaxed);
                    let cell = Arc::new(OnceCell::new());
                    entries.push(key.to_string(), Arc::clone(&cell));
                    cell
                }
            }
        };

        match cell.get_or_try_init(compute).await {
            Ok(value) => Ok(value.clone()),
            Err(e) => {
                let mut entries = self.entries.lock().await;
                if entries.peek(key).is_some_and(|current| Arc::ptr_eq(current, &cell)) {
                    entries.pop(key);
                }
                Err(e)
            }
        }
    }

    /// Whether `key` currently has an entry (does not touch recency)
    pub async fn contains(&self, key: &str) -> bool {
        self.entries.lock().await.contains(key)
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            capacity: self.capacity.get(),
            entries: self.entries.lock().await.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
