// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Time-boxed in-memory memoization of analyzer results.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::debug;

struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

/// URL-keyed cache whose entries go stale after a fixed revalidation window
pub struct TtlCache<T> {
    tag: &'static str,
    ttl: Duration,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
    /// One lock per key being computed, so concurrent misses wait instead of recomputing
    in_flight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(tag: &'static str, ttl: Duration) -> Self {
        Self {
            tag,
            ttl,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn tag(&self) -> &'static str {
        self.tag
    }

    /// Fresh value for `key`, or `None` if absent or stale
    pub async fn get(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            debug!(tag = self.tag, "cache hit");
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Store `value` and drop every expired entry
    pub async fn insert(&self, key: &str, value: T) {
        let mut entries = self.entries.write().await;
        let ttl = self.ttl;
        entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    /// Fresh value for `key`, or the output of `compute`.
    ///
    /// Concurrent callers for the same key run `compute` one at a time and
    /// re-check the cache first, so a stored value is computed once.
    /// Values rejected by `cacheable` are returned but not stored.
    pub async fn get_or_compute<F>(&self, key: &str, compute: F, cacheable: fn(&T) -> bool) -> T
    where
        F: Future<Output = T>,
    {
        if let Some(hit) = self.get(key).await {
            return hit;
        }

        let flight = self
            .in_flight
            .lock()
            .await
            .entry(key.to_string())
            .or_default()
            .clone();

        let value = {
            let _guard = flight.lock().await;
            match self.get(key).await {
                Some(hit) => hit,
                None => {
                    let value = compute.await;
                    if cacheable(&value) {
                        self.insert(key, value.clone()).await;
                    }
                    value
                }
            }
        };

        let mut in_flight = self.in_flight.lock().await;
        drop(flight);
        // Clones are only taken under this lock, so a count of one means nobody is waiting
        if in_flight
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            in_flight.remove(key);
        }
        value
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
