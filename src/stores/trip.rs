// ABOUTME: Multi-day trip plan store
// ABOUTME: Path-addressed slot mutations where invalid targets are silent no-ops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

use super::observable::{ObservableStore, StorageBackend, SubscriptionId};
use crate::models::{MealItem, TripDay, TripMealSlot, TripPlan};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const STORAGE_KEY: &str = "trip_plan";

/// Standard slot names; slots beyond the fourth are numbered
const SLOT_NAMES: [&str; 4] = ["Breakfast", "Lunch", "Dinner", "Snack"];

fn slot_name(index: usize) -> String {
    SLOT_NAMES
        .get(index)
        .map_or_else(|| format!("Meal {}", index + 1), |name| (*name).to_owned())
}

fn build_day(day_index: usize, meals_per_day: usize) -> TripDay {
    TripDay {
        label: format!("Day {}", day_index + 1),
        slots: (0..meals_per_day)
            .map(|slot| TripMealSlot {
                name: slot_name(slot),
                items: Vec::new(),
            })
            .collect(),
    }
}

/// The trip plan store. Defaults to no plan; every mutation on a missing
/// plan or an out-of-range (day, meal[, item]) path is a silent no-op.
pub struct TripPlanStore {
    store: ObservableStore<Option<TripPlan>>,
}

impl TripPlanStore {
    /// Hydrate the plan from storage
    #[must_use]
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self {
            store: ObservableStore::new(STORAGE_KEY, backend, None),
        }
    }

    /// Current plan, if one exists
    #[must_use]
    pub fn plan(&self) -> Option<TripPlan> {
        self.store.get()
    }

    /// Create a fresh plan, replacing any existing one. Day and meal counts
    /// are floored at one; slots are named Breakfast/Lunch/Dinner/Snack and
    /// numbered past four.
    pub fn create_plan(&self, resort: &str, days: usize, meals_per_day: usize) {
        let days = days.max(1);
        let meals_per_day = meals_per_day.max(1);
        let plan = TripPlan {
            id: Uuid::new_v4(),
            resort: resort.to_owned(),
            created_at: Utc::now(),
            days: (0..days).map(|d| build_day(d, meals_per_day)).collect(),
        };
        self.store.set(Some(plan));
    }

    /// Append a day mirroring the slot layout of the first day
    pub fn add_day(&self) {
        self.mutate_plan(|plan| {
            let meals_per_day = plan.days.first().map_or(3, |day| day.slots.len());
            plan.days.push(build_day(plan.days.len(), meals_per_day));
        });
    }

    /// Remove a day. Removing the last remaining day, or an out-of-range
    /// index, is a no-op.
    pub fn remove_day(&self, day_index: usize) {
        self.mutate_plan(|plan| {
            if plan.days.len() > 1 && day_index < plan.days.len() {
                plan.days.remove(day_index);
                for (index, day) in plan.days.iter_mut().enumerate() {
                    day.label = format!("Day {}", index + 1);
                }
            }
        });
    }

    /// Add a meal snapshot to the addressed slot
    pub fn add_item(&self, day_index: usize, meal_index: usize, item: MealItem) {
        self.mutate_plan(|plan| {
            if let Some(slot) = plan
                .days
                .get_mut(day_index)
                .and_then(|day| day.slots.get_mut(meal_index))
            {
                slot.items.push(item);
            }
        });
    }

    /// Remove one item from the addressed slot by position
    pub fn remove_item(&self, day_index: usize, meal_index: usize, item_index: usize) {
        self.mutate_plan(|plan| {
            if let Some(slot) = plan
                .days
                .get_mut(day_index)
                .and_then(|day| day.slots.get_mut(meal_index))
            {
                if item_index < slot.items.len() {
                    slot.items.remove(item_index);
                }
            }
        });
    }

    /// Discard the plan entirely
    pub fn clear_plan(&self) {
        self.store.set(None);
    }

    /// Observe plan changes
    pub fn subscribe(
        &self,
        callback: impl Fn(&Option<TripPlan>) + Send + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(callback)
    }

    /// Stop observing
    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.store.unsubscribe(id);
    }

    fn mutate_plan(&self, mutate: impl FnOnce(&mut TripPlan)) {
        self.store.update(|current| {
            let Some(plan) = current else {
                return None;
            };
            let mut next = plan.clone();
            mutate(&mut next);
            Some(next)
        });
    }
}
