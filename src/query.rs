// ABOUTME: Keyed, de-duplicated async query layer
// ABOUTME: Shares one in-flight request per cache key and exposes loading/error/data state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Query Layer
//!
//! Wraps fetchers behind string cache keys composed of (entity, parameters).
//! Identical concurrent calls under one key share a single in-flight request;
//! callers observe a three-state [`QueryState`] through a `watch` channel, so
//! loader errors are captured into state rather than propagating. Calling
//! [`QueryCache::fetch`] again after completion replaces the entry, which is
//! the only implicit retry mechanism in the engine.

use crate::errors::AppResult;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::future::Future;
use tokio::sync::watch;

/// Three-state result exposed to consumers
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    /// The request is in flight
    Loading,
    /// The loader completed successfully
    Ready(T),
    /// The loader failed; the message is displayable
    Failed(String),
}

impl<T> QueryState<T> {
    /// Whether the request is still in flight
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// De-duplicating query cache for one result type
pub struct QueryCache<T> {
    entries: DashMap<String, watch::Receiver<QueryState<T>>>,
}

impl<T> Default for QueryCache<T> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch under a key, sharing any in-flight request for the same key.
    ///
    /// Returns a receiver whose current value is the query state. If a
    /// previous request under this key already completed, a fresh one is
    /// started and replaces it.
    pub fn fetch<F>(&self, key: &str, loader: F) -> watch::Receiver<QueryState<T>>
    where
        F: Future<Output = AppResult<T>> + Send + 'static,
    {
        match self.entries.entry(key.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().borrow().is_loading() {
                    return occupied.get().clone();
                }
                let receiver = spawn_loader(loader);
                occupied.insert(receiver.clone());
                receiver
            }
            Entry::Vacant(vacant) => {
                let receiver = spawn_loader(loader);
                vacant.insert(receiver.clone());
                receiver
            }
        }
    }

    /// Drop one entry so the next fetch starts fresh
    pub fn invalidate(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of tracked keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no keys are tracked
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn spawn_loader<T, F>(loader: F) -> watch::Receiver<QueryState<T>>
where
    T: Clone + Send + Sync + 'static,
    F: Future<Output = AppResult<T>> + Send + 'static,
{
    let (sender, receiver) = watch::channel(QueryState::Loading);
    tokio::spawn(async move {
        let state = match loader.await {
            Ok(value) => QueryState::Ready(value),
            Err(err) => QueryState::Failed(err.to_string()),
        };
        // Receivers may all have gone away; that's fine.
        let _ = sender.send(state);
    });
    receiver
}

/// Await the terminal state of a query, cloning it out of the channel
///
/// # Panics
///
/// Never panics; a dropped sender after publishing a terminal state still
/// yields that state.
pub async fn resolved<T: Clone>(
    receiver: &mut watch::Receiver<QueryState<T>>,
) -> QueryState<T> {
    let current = receiver.borrow().clone();
    if !current.is_loading() {
        return current;
    }
    match receiver.wait_for(|state| !state.is_loading()).await {
        Ok(state) => state.clone(),
        // Sender dropped before publishing; report as a failure state.
        Err(_) => QueryState::Failed("query task dropped".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fetch_resolves_to_ready() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut rx = cache.fetch("items:all", async { Ok(vec![1, 2, 3]) });
        let state = resolved(&mut rx).await;
        assert_eq!(state, QueryState::Ready(vec![1, 2, 3]));
    }

    #[tokio::test]
    async fn test_error_captured_into_state() {
        let cache: QueryCache<Vec<u32>> = QueryCache::new();
        let mut rx = cache.fetch("items:all", async { Err(AppError::NoDataAvailable) });
        let state = resolved(&mut rx).await;
        assert!(matches!(state, QueryState::Failed(_)));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_request() {
        let cache: Arc<QueryCache<u32>> = Arc::new(QueryCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let loader = |calls: Arc<AtomicUsize>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok(7_u32)
        };

        let mut first = cache.fetch("parks", loader(calls.clone()));
        let mut second = cache.fetch("parks", loader(calls.clone()));

        assert_eq!(resolved(&mut first).await, QueryState::Ready(7));
        assert_eq!(resolved(&mut second).await, QueryState::Ready(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_refetch_after_completion_replaces_entry() {
        let cache: QueryCache<u32> = QueryCache::new();
        let mut first = cache.fetch("parks", async { Ok(1) });
        assert_eq!(resolved(&mut first).await, QueryState::Ready(1));

        let mut second = cache.fetch("parks", async { Ok(2) });
        assert_eq!(resolved(&mut second).await, QueryState::Ready(2));
    }

    #[tokio::test]
    async fn test_invalidate_drops_key() {
        let cache: QueryCache<u32> = QueryCache::new();
        let mut rx = cache.fetch("parks", async { Ok(1) });
        let _ = resolved(&mut rx).await;
        cache.invalidate("parks");
        assert!(cache.is_empty());
    }
}
