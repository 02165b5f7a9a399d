// ABOUTME: Side-by-side compare set store
// ABOUTME: Hard cap of three snapshots; over-cap and duplicate adds are silent no-ops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use crate::models::CompareItem;
use std::sync::Arc;

const STORAGE_KEY: &str = "compare_set";

/// Maximum number of items that can be compared at once
pub const COMPARE_CAP: usize = 3;

/// The compare set. Defaults to empty; capped at [`COMPARE_CAP`].
pub struct CompareStore {
    store: ObservableStore<Vec<CompareItem>>,
}

impl CompareStore {
    /// Hydrate the compare set from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, Vec::new()),
        }
    }

    /// Current compare set, in insertion order
    #[must_use]
    pub fn items(&self) -> Vec<CompareItem> {
        self.store.get()
    }

    /// Add a snapshot. Adding beyond the cap, or an item id already present,
    /// is a silent no-op.
    pub fn add(&self, item: CompareItem) {
        self.store.update(|items| {
            if items.len() >= COMPARE_CAP
                || items.iter().any(|existing| existing.item_id == item.item_id)
            {
                return items.clone();
            }
            let mut next = items.clone();
            next.push(item);
            next
        });
    }

    /// Remove by catalog item id; unknown ids are ignored
    pub fn remove(&self, item_id: &str) {
        self.store.update(|items| {
            items
                .iter()
                .filter(|existing| existing.item_id != item_id)
                .cloned()
                .collect()
        });
    }

    /// Empty the compare set
    pub fn clear(&self) {
        self.store.set(Vec::new());
    }

    /// Observe compare-set changes
    pub fn subscribe(
        &self,
        callback: impl Fn(&Vec<CompareItem>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}
