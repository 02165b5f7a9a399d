// ABOUTME: Display and planning preferences store
// ABOUTME: Font scale, contrast mode, and daily carb goal with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const STORAGE_KEY: &str = "preferences";

/// User preferences. Defaults: 1.0 font scale, normal contrast, 150 g/day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub font_scale: f64,
    pub high_contrast: bool,
    /// Daily carbohydrate budget in grams, used by trip planning
    pub daily_carb_goal: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            font_scale: 1.0,
            high_contrast: false,
            daily_carb_goal: 150.0,
        }
    }
}

/// Persisted preferences store
pub struct PreferencesStore {
    store: ObservableStore<Preferences>,
}

impl PreferencesStore {
    /// Hydrate preferences from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, Preferences::default()),
        }
    }

    /// Current preferences
    #[must_use]
    pub fn get(&self) -> Preferences {
        self.store.get()
    }

    /// Replace preferences wholesale
    pub fn set(&self, preferences: Preferences) {
        self.store.set(preferences);
    }

    /// Update the font scale only
    pub fn set_font_scale(&self, font_scale: f64) {
        self.store.update(|prefs| Preferences {
            font_scale,
            ..prefs.clone()
        });
    }

    /// Update the daily carb goal only
    pub fn set_daily_carb_goal(&self, daily_carb_goal: f64) {
        self.store.update(|prefs| Preferences {
            daily_carb_goal,
            ..prefs.clone()
        });
    }

    /// Observe preference changes
    pub fn subscribe(&self, callback: impl Fn(&Preferences) + Send + 'static) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}
