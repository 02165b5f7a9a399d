// ABOUTME: Tests for durable store persistence over the file-per-key JSON backend
// ABOUTME: Validates rehydration across store instances and corrupt-state recovery
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use carb_compass::models::MealItem;
use carb_compass::stores::{
    JsonFileBackend, MealCartStore, PreferencesStore, StorageBackend, UserStores,
};
use std::sync::Arc;
use uuid::Uuid;

fn file_backend(dir: &tempfile::TempDir) -> Arc<dyn StorageBackend> {
    Arc::new(JsonFileBackend::new(dir.path().to_path_buf()))
}

fn meal(name: &str, carbs: f64) -> MealItem {
    MealItem {
        id: Uuid::new_v4(),
        item_id: "item-1".into(),
        name: name.into(),
        restaurant_name: "Cosmic Cantina".into(),
        carbs: Some(carbs),
        calories: Some(420.0),
        protein: Some(12.0),
        fiber: None,
        sugar: None,
        grade: None,
    }
}

#[test]
fn test_cart_survives_store_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = MealCartStore::new(file_backend(&dir));
    first.add(meal("Galaxy Burger", 45.0));
    first.add(meal("Side Salad", 8.0));
    drop(first);

    let second = MealCartStore::new(file_backend(&dir));
    let items = second.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Galaxy Burger");
    assert!((second.totals().carbs - 53.0).abs() < f64::EPSILON);
}

#[test]
fn test_preferences_survive_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = PreferencesStore::new(file_backend(&dir));
    first.set_daily_carb_goal(180.0);
    first.set_font_scale(1.25);
    drop(first);

    let second = PreferencesStore::new(file_backend(&dir));
    let prefs = second.get();
    assert!((prefs.daily_carb_goal - 180.0).abs() < f64::EPSILON);
    assert!((prefs.font_scale - 1.25).abs() < f64::EPSILON);
}

#[test]
fn test_corrupt_persisted_state_falls_back_to_default() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("preferences.json"), "{definitely not json").unwrap();
    std::fs::write(dir.path().join("meal_cart.json"), "[1, 2, oops").unwrap();

    let prefs = PreferencesStore::new(file_backend(&dir)).get();
    assert!((prefs.daily_carb_goal - 150.0).abs() < f64::EPSILON);

    let cart = MealCartStore::new(file_backend(&dir));
    assert!(cart.items().is_empty());

    // The stores stay writable after discarding the corrupt blob.
    cart.add(meal("Churro", 40.0));
    assert_eq!(cart.items().len(), 1);
}

#[test]
fn test_stores_over_one_backend_use_distinct_keys() {
    let dir = tempfile::tempdir().unwrap();
    let stores = UserStores::new(file_backend(&dir));

    stores.meal_cart.add(meal("Waffle", 50.0));
    stores.favorites.toggle("item-7");
    stores.preferences.set_daily_carb_goal(120.0);

    assert!(dir.path().join("meal_cart.json").exists());
    assert!(dir.path().join("favorites.json").exists());
    assert!(dir.path().join("preferences.json").exists());

    // Reload everything and confirm nothing bled across keys.
    let reloaded = UserStores::new(file_backend(&dir));
    assert_eq!(reloaded.meal_cart.items().len(), 1);
    assert!(reloaded.favorites.is_favorite("item-7"));
    assert!((reloaded.preferences.get().daily_carb_goal - 120.0).abs() < f64::EPSILON);
    assert!(reloaded.compare.items().is_empty());
}

#[test]
fn test_remove_clears_backing_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let backend = file_backend(&dir);
    backend.save("probe", "{\"a\":1}").unwrap();
    assert!(backend.load("probe").is_some());
    backend.remove("probe").unwrap();
    assert!(backend.load("probe").is_none());
    // Removing a missing key is not an error.
    backend.remove("probe").unwrap();
}
