// ABOUTME: End-to-end tests for trip planning over durable storage
// ABOUTME: Validates snapshot semantics, day totals against the carb goal, and restart rehydration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use carb_compass::models::{day_totals, trip_totals, CatalogEntry, MealItem, NutritionFacts};
use carb_compass::scoring::grade_item;
use carb_compass::stores::{JsonFileBackend, PreferencesStore, StorageBackend, TripPlanStore};
use carb_compass::{Grade, MenuItem};
use std::sync::Arc;

fn file_backend(dir: &tempfile::TempDir) -> Arc<dyn StorageBackend> {
    Arc::new(JsonFileBackend::new(dir.path().to_path_buf()))
}

fn entry(id: &str, name: &str, carbs: f64, calories: f64) -> CatalogEntry {
    CatalogEntry {
        item: MenuItem {
            id: id.into(),
            restaurant_id: "r1".into(),
            park_id: "p1".into(),
            name: name.into(),
            description: None,
            category: carb_compass::models::Category::Entree,
            seasonal: false,
            fried: false,
            vegetarian: false,
            nutrition: Some(NutritionFacts {
                carbs: Some(carbs),
                calories: Some(calories),
                protein: Some(25.0),
                fiber: Some(2.0),
                sugar: Some(4.0),
                ..NutritionFacts::default()
            }),
            allergens: Vec::new(),
        },
        restaurant_name: "Frontier Grill".into(),
    }
}

fn planned(entry: &CatalogEntry) -> MealItem {
    MealItem::from_entry(entry, grade_item(&entry.item))
}

#[test]
fn test_plan_survives_restart_with_items_intact() {
    let dir = tempfile::tempdir().unwrap();

    let trips = TripPlanStore::new(file_backend(&dir));
    trips.create_plan("Magic Meadows Resort", 2, 3);
    let turkey = entry("i1", "Smoked Turkey Leg", 1.0, 720.0);
    trips.add_item(0, 1, planned(&turkey));
    drop(trips);

    let reloaded = TripPlanStore::new(file_backend(&dir));
    let plan = reloaded.plan().unwrap();
    assert_eq!(plan.resort, "Magic Meadows Resort");
    assert_eq!(plan.days.len(), 2);
    assert_eq!(plan.days[0].slots[1].name, "Lunch");
    assert_eq!(plan.days[0].slots[1].items.len(), 1);
    assert_eq!(plan.days[0].slots[1].items[0].name, "Smoked Turkey Leg");
}

#[test]
fn test_snapshot_is_immune_to_catalog_changes() {
    let dir = tempfile::tempdir().unwrap();
    let trips = TripPlanStore::new(file_backend(&dir));
    trips.create_plan("Resort", 1, 3);

    let mut source = entry("i1", "Churro", 40.0, 380.0);
    trips.add_item(0, 0, planned(&source));

    // A catalog refresh changes the item; the planned snapshot must not move.
    source.item.nutrition = Some(NutritionFacts {
        carbs: Some(99.0),
        ..NutritionFacts::default()
    });

    let plan = trips.plan().unwrap();
    assert_eq!(plan.days[0].slots[0].items[0].carbs, Some(40.0));
}

#[test]
fn test_snapshot_carries_the_grade_at_planning_time() {
    let dir = tempfile::tempdir().unwrap();
    let trips = TripPlanStore::new(file_backend(&dir));
    trips.create_plan("Resort", 1, 1);

    let lean = entry("i1", "Grilled Chicken Skewer", 12.0, 250.0);
    trips.add_item(0, 0, planned(&lean));

    let plan = trips.plan().unwrap();
    assert_eq!(plan.days[0].slots[0].items[0].grade, Some(Grade::A));
}

#[test]
fn test_day_totals_against_carb_goal() {
    let dir = tempfile::tempdir().unwrap();
    let backend = file_backend(&dir);
    let trips = TripPlanStore::new(backend.clone());
    let preferences = PreferencesStore::new(backend);
    preferences.set_daily_carb_goal(100.0);

    trips.create_plan("Resort", 1, 3);
    trips.add_item(0, 0, planned(&entry("i1", "Pancakes", 60.0, 550.0)));
    trips.add_item(0, 1, planned(&entry("i2", "Turkey Wrap", 35.0, 420.0)));

    let plan = trips.plan().unwrap();
    let totals = day_totals(&plan.days[0]);
    assert!((totals.carbs - 95.0).abs() < f64::EPSILON);
    assert!(totals.carbs <= preferences.get().daily_carb_goal);

    trips.add_item(0, 2, planned(&entry("i3", "Funnel Cake", 75.0, 760.0)));
    let plan = trips.plan().unwrap();
    assert!(day_totals(&plan.days[0]).carbs > preferences.get().daily_carb_goal);
}

#[test]
fn test_trip_totals_span_days_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    let trips = TripPlanStore::new(file_backend(&dir));
    trips.create_plan("Resort", 2, 2);
    trips.add_item(0, 0, planned(&entry("i1", "Waffle", 50.0, 500.0)));
    trips.add_item(1, 0, planned(&entry("i2", "Salad", 15.0, 200.0)));
    drop(trips);

    let reloaded = TripPlanStore::new(file_backend(&dir));
    let totals = trip_totals(&reloaded.plan().unwrap());
    assert!((totals.carbs - 65.0).abs() < f64::EPSILON);
    assert!((totals.calories - 700.0).abs() < f64::EPSILON);
    assert_eq!(totals.items_missing_data, 0);
}

#[test]
fn test_clear_plan_persists_the_absence() {
    let dir = tempfile::tempdir().unwrap();

    let trips = TripPlanStore::new(file_backend(&dir));
    trips.create_plan("Resort", 3, 3);
    trips.clear_plan();
    drop(trips);

    let reloaded = TripPlanStore::new(file_backend(&dir));
    assert!(reloaded.plan().is_none());
}
