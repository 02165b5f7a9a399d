// ABOUTME: Insulin calculator settings store and bolus suggestion helper
// ABOUTME: Carb ratio, correction factor, and glucose target with documented defaults
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const STORAGE_KEY: &str = "insulin_settings";

/// Insulin calculator settings. Defaults: 10 g/unit carb ratio, 50 mg/dL
/// per unit correction factor, 120 mg/dL target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsulinSettings {
    /// Grams of carbohydrate covered by one unit
    pub carb_ratio: f64,
    /// mg/dL glucose drop per unit
    pub correction_factor: f64,
    /// Target glucose in mg/dL
    pub target_glucose: f64,
}

impl Default for InsulinSettings {
    fn default() -> Self {
        Self {
            carb_ratio: 10.0,
            correction_factor: 50.0,
            target_glucose: 120.0,
        }
    }
}

/// Suggested bolus in units for a planned carb load and optional current
/// glucose reading, rounded to the nearest half unit and floored at zero.
/// Non-positive settings disable the respective component.
#[must_use]
pub fn suggest_bolus(settings: &InsulinSettings, carbs: f64, current_glucose: Option<f64>) -> f64 {
    let mut units = 0.0;
    if settings.carb_ratio > 0.0 {
        units += carbs.max(0.0) / settings.carb_ratio;
    }
    if let Some(glucose) = current_glucose {
        if settings.correction_factor > 0.0 {
            units += (glucose - settings.target_glucose).max(0.0) / settings.correction_factor;
        }
    }
    (units * 2.0).round() / 2.0
}

/// Persisted insulin settings store
pub struct InsulinStore {
    store: ObservableStore<InsulinSettings>,
}

impl InsulinStore {
    /// Hydrate settings from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, InsulinSettings::default()),
        }
    }

    /// Current settings
    #[must_use]
    pub fn get(&self) -> InsulinSettings {
        self.store.get()
    }

    /// Replace settings wholesale
    pub fn set(&self, settings: InsulinSettings) {
        self.store.set(settings);
    }

    /// Observe settings changes
    pub fn subscribe(
        &self,
        callback: impl Fn(&InsulinSettings) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }
}
