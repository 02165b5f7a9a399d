// ABOUTME: Running meal cart store
// ABOUTME: Ordered meal item snapshots with carb and calorie totals
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use crate::models::{MealItem, NutritionTotals};
use std::sync::Arc;
use uuid::Uuid;

const STORAGE_KEY: &str = "meal_cart";

/// The running meal a user is assembling. Defaults to empty.
pub struct MealCartStore {
    store: ObservableStore<Vec<MealItem>>,
}

impl MealCartStore {
    /// Hydrate the cart from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, Vec::new()),
        }
    }

    /// Current cart contents, in insertion order
    #[must_use]
    pub fn items(&self) -> Vec<MealItem> {
        self.store.get()
    }

    /// Append a snapshot to the cart
    pub fn add(&self, item: MealItem) {
        self.store.update(|items| {
            let mut next = items.clone();
            next.push(item);
            next
        });
    }

    /// Remove one cart entry by its entry id; unknown ids are ignored
    pub fn remove(&self, entry_id: Uuid) {
        self.store
            .update(|items| items.iter().filter(|i| i.id != entry_id).cloned().collect());
    }

    /// Empty the cart
    pub fn clear(&self) {
        self.store.set(Vec::new());
    }

    /// Summed nutrition across the cart; unknown fields contribute nothing
    #[must_use]
    pub fn totals(&self) -> NutritionTotals {
        let mut totals = NutritionTotals::default();
        for item in self.store.get() {
            totals.add_item(&item);
        }
        totals
    }

    /// Observe cart changes
    pub fn subscribe(&self, callback: impl Fn(&Vec<MealItem>) + Send + 'static) -> SubscriptionId {
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

    fn meal(name: &str, carbs: Option<f64>) -> MealItem {
        MealItem {
            id: Uuid::new_v4(),
            item_id: "item".into(),
            name: name.into(),
            restaurant_name: "Grill".into(),
            carbs,
            calories: Some(300.0),
            protein: None,
            fiber: None,
            sugar: None,
            grade: None,
        }
    }

    #[test]
    fn test_add_remove_and_totals() {
        let cart = MealCartStore::new(Arc::new(MemoryBackend::new()));
        let burger = meal("Burger", Some(45.0));
        let mystery = meal("Mystery", None);
        cart.add(burger.clone());
        cart.add(mystery);
        assert_eq!(cart.items().len(), 2);

        let totals = cart.totals();
        assert!((totals.carbs - 45.0).abs() < f64::EPSILON);
        assert_eq!(totals.items_missing_data, 1);

        cart.remove(burger.id);
        assert_eq!(cart.items().len(), 1);
        cart.clear();
        assert!(cart.items().is_empty());
    }
}
