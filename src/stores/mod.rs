// ABOUTME: Shared reactive stores for user-authored state
// ABOUTME: Persisted, multi-observer containers for cart, trip plan, compare set, and settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Shared Reactive Stores
//!
//! Each store owns one canonical value plus a set of subscriber callbacks.
//! On construction the value hydrates from durable storage, substituting the
//! documented default on absence or parse failure. Every mutation computes
//! the next value immutably, persists a serialized copy, replaces the
//! canonical value, and then synchronously notifies all subscribers, so
//! every mounted consumer observes the identical, freshly-persisted value.
//! Mutations that leave the value unchanged, including every rejected
//! operation, skip persistence and notification entirely.
//!
//! Stores are scoped behind [`UserStores`] rather than process globals, so
//! tests construct them over a throwaway backend and reset freely.

/// Side-by-side compare set, capped at three snapshots
pub mod compare;
/// Favorite item id set
pub mod favorites;
/// Insulin calculator settings and bolus suggestion
pub mod insulin;
/// Running meal cart
pub mod meal_cart;
/// Observable store core and storage backends
pub mod observable;
/// Display preferences
pub mod preferences;
/// Recent search history
pub mod recent_searches;
/// Multi-day trip plan
pub mod trip;

pub use compare::{CompareStore, COMPARE_CAP};
pub use favorites::FavoritesStore;
pub use insulin::{suggest_bolus, InsulinSettings, InsulinStore};
pub use meal_cart::MealCartStore;
pub use observable::{JsonFileBackend, MemoryBackend, ObservableStore, StorageBackend, SubscriptionId};
pub use preferences::{Preferences, PreferencesStore};
pub use recent_searches::{RecentSearchesStore, MAX_RECENT_SEARCHES};
pub use trip::TripPlanStore;

use std::sync::Arc;

/// Factory bundling every user-state store over one storage backend
pub struct UserStores {
    pub meal_cart: MealCartStore,
    pub compare: CompareStore,
    pub favorites: FavoritesStore,
    pub trip: TripPlanStore,
    pub preferences: PreferencesStore,
    pub recent_searches: RecentSearchesStore,
    pub insulin: InsulinStore,
}

impl UserStores {
    /// Hydrate every store from the given backend
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            meal_cart: MealCartStore::new(backend.clone()),
            compare: CompareStore::new(backend.clone()),
            favorites: FavoritesStore::new(backend.clone()),
            trip: TripPlanStore::new(backend.clone()),
            preferences: PreferencesStore::new(backend.clone()),
            recent_searches: RecentSearchesStore::new(backend.clone()),
            insulin: InsulinStore::new(backend),
        }
    }
}
