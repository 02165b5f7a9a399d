// ABOUTME: Recent search history store
// ABOUTME: Most-recent-first, case-insensitively deduplicated, capped at five entries
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use std::sync::Arc;

const STORAGE_KEY: &str = "recent_searches";

/// Maximum number of remembered queries
pub const MAX_RECENT_SEARCHES: usize = 5;

/// Recent search queries, newest first. Defaults to empty.
pub struct RecentSearchesStore {
    store: ObservableStore<Vec<String>>,
}

impl RecentSearchesStore {
    /// Hydrate the history from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, Vec::new()),
        }
    }

    /// Remembered queries, newest first
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.store.get()
    }

    /// Record a query: trimmed, moved to the front, deduplicated
    /// case-insensitively, capped. Blank queries are ignored.
    pub fn record(&self, query: &str) {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return;
        }
        let trimmed = trimmed.to_owned();
        self.store.update(|queries| {
            let mut next: Vec<String> = queries
                .iter()
                .filter(|existing| !existing.eq_ignore_ascii_case(&trimmed))
                .cloned()
                .collect();
            next.insert(0, trimmed.clone());
            next.truncate(MAX_RECENT_SEARCHES);
            next
        });
    }

    /// Forget every remembered query
    pub fn clear(&self) {
        self.store.set(Vec::new());
    }

    /// Observe history changes
    pub fn subscribe(&self, callback: impl Fn(&Vec<String>) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::observable::MemoryBackend;

    #[test]
    fn test_newest_first_dedup_and_cap() {
        let searches = RecentSearchesStore::new(Arc::new(MemoryBackend::new()));
        for query in ["churro", "turkey leg", "dole whip", "pretzel", "corn dog", "nachos"] {
            searches.record(query);
        }
        let list = searches.list();
        assert_eq!(list.len(), MAX_RECENT_SEARCHES);
        assert_eq!(list[0], "nachos");

        searches.record("Turkey Leg");
        let list = searches.list();
        assert_eq!(list[0], "Turkey Leg");
        // Case-insensitive dedup: the older "turkey leg" is gone.
        assert_eq!(
            list.iter().filter(|q| q.eq_ignore_ascii_case("turkey leg")).count(),
            1
        );
    }

    #[test]
    fn test_blank_queries_ignored() {
        let searches = RecentSearchesStore::new(Arc::new(MemoryBackend::new()));
        searches.record("   ");
        searches.record("");
        assert!(searches.list().is_empty());
    }
}
