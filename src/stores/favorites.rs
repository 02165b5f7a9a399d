// ABOUTME: Favorite item id set store
// ABOUTME: Toggle semantics over a persisted id set
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use std::collections::BTreeSet;
use std::sync::Arc;

const STORAGE_KEY: &str = "favorites";

/// Persisted set of favorited catalog item ids. Defaults to empty.
pub struct FavoritesStore {
    store: ObservableStore<BTreeSet<String>>,
}

impl FavoritesStore {
    /// Hydrate favorites from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, BTreeSet::new()),
        }
    }

    /// Whether an item is currently favorited
    #[must_use]
    pub fn is_favorite(&self, item_id: &str) -> bool {
        self.store.get().contains(item_id)
    }

    /// All favorited ids
    #[must_use]
    pub fn ids(&self) -> BTreeSet<String> {
        self.store.get()
    }

    /// Flip an item's favorite state
    pub fn toggle(&self, item_id: &str) {
        self.store.update(|ids| {
            let mut next = ids.clone();
            if !next.remove(item_id) {
                next.insert(item_id.to_owned());
            }
            next
        });
    }

    /// Remove every favorite
    pub fn clear(&self) {
        self.store.set(BTreeSet::new());
    }

    /// Observe favorites changes
    pub fn subscribe(
        &self,
        callback: impl Fn(&BTreeSet<String>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}
