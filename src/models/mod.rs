// ABOUTME: Core data models for the catalog and user-authored state
// ABOUTME: Parks, restaurants, menu items, nutrition facts, and trip-plan structures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Data Model
//!
//! Two families of types live here. Catalog entities ([`Park`], [`Restaurant`],
//! [`MenuItem`], [`NutritionFacts`], [`Allergen`]) are read-only to this engine
//! and owned by the catalog service. User-authored entities ([`MealItem`],
//! [`CompareItem`], [`TripPlan`]) are created client-side; meal and compare
//! items snapshot the nutrition they were built from by value, so later catalog
//! changes never retroactively alter a planned meal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A theme park
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Park {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    pub timezone: Option<String>,
}

/// A restaurant inside a park
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: String,
    pub park_id: String,
    pub name: String,
    pub land: Option<String>,
    pub cuisine: Option<String>,
}

/// Menu item category, closed set matching the catalog service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Entree,
    Side,
    Snack,
    Dessert,
    Beverage,
    Breakfast,
    Other,
}

impl Category {
    /// Lowercase wire name, matching the serde representation
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Entree => "entree",
            Self::Side => "side",
            Self::Snack => "snack",
            Self::Dessert => "dessert",
            Self::Beverage => "beverage",
            Self::Breakfast => "breakfast",
            Self::Other => "other",
        }
    }
}

/// Per-item nutrition record. Every nutrient is independently nullable;
/// `None` means unknown and must never be read as zero.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionFacts {
    pub calories: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub sugar: Option<f64>,
    pub protein: Option<f64>,
    pub fiber: Option<f64>,
    pub sodium: Option<f64>,
    pub cholesterol: Option<f64>,
    pub alcohol_grams: Option<f64>,
    /// Data-quality confidence reported by the catalog pipeline, 0.0..=1.0
    pub confidence: Option<f64>,
    pub source: Option<String>,
}

/// Allergen type reported for a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllergenKind {
    Gluten,
    Dairy,
    Egg,
    Fish,
    Shellfish,
    TreeNuts,
    Peanuts,
    Soy,
    Sesame,
}

/// How certain the allergen presence is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllergenSeverity {
    Contains,
    SharedEquipment,
}

/// Allergen record attached to a menu item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergen {
    pub item_id: String,
    pub kind: AllergenKind,
    pub severity: AllergenSeverity,
}

/// A menu item with its optional nutrition record and allergen list.
/// `park_id` is denormalized from the owning restaurant for indexed lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItem {
    pub id: String,
    pub restaurant_id: String,
    pub park_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    #[serde(default)]
    pub seasonal: bool,
    #[serde(default)]
    pub fried: bool,
    #[serde(default)]
    pub vegetarian: bool,
    pub nutrition: Option<NutritionFacts>,
    #[serde(default)]
    pub allergens: Vec<Allergen>,
}

/// A menu item joined with its restaurant name, the unit the filter pipeline
/// and search index operate over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub item: MenuItem,
    pub restaurant_name: String,
}

/// Letter grade summarizing diabetes impact.
///
/// Variants are declared worst-first so the derived ordering makes
/// `Grade::A` compare greatest: A > B > C > D > F.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Grade {
    F,
    D,
    C,
    B,
    A,
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let letter = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        };
        f.write_str(letter)
    }
}

/// By-value snapshot of a menu item placed in a meal or trip slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    /// Identity of this cart/slot entry, distinct from the catalog item id
    pub id: Uuid,
    pub item_id: String,
    pub name: String,
    pub restaurant_name: String,
    pub carbs: Option<f64>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub fiber: Option<f64>,
    pub sugar: Option<f64>,
    pub grade: Option<Grade>,
}

impl MealItem {
    /// Snapshot a catalog entry. The nutrition fields are copied by value so
    /// later catalog refreshes never alter an already-planned meal.
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry, grade: Option<Grade>) -> Self {
        let nutrition = entry.item.nutrition.clone().unwrap_or_default();
        Self {
            id: Uuid::new_v4(),
            item_id: entry.item.id.clone(),
            name: entry.item.name.clone(),
            restaurant_name: entry.restaurant_name.clone(),
            carbs: nutrition.carbs,
            calories: nutrition.calories,
            protein: nutrition.protein,
            fiber: nutrition.fiber,
            sugar: nutrition.sugar,
            grade,
        }
    }
}

/// Snapshot held in the side-by-side compare set (capped at three)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareItem {
    pub item_id: String,
    pub name: String,
    pub restaurant_name: String,
    pub nutrition: NutritionFacts,
    pub grade: Option<Grade>,
}

impl CompareItem {
    /// Snapshot a catalog entry for comparison
    #[must_use]
    pub fn from_entry(entry: &CatalogEntry, grade: Option<Grade>) -> Self {
        Self {
            item_id: entry.item.id.clone(),
            name: entry.item.name.clone(),
            restaurant_name: entry.restaurant_name.clone(),
            nutrition: entry.item.nutrition.clone().unwrap_or_default(),
            grade,
        }
    }
}

/// Named meal slot within a trip day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMealSlot {
    pub name: String,
    pub items: Vec<MealItem>,
}

/// One day of a trip plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripDay {
    pub label: String,
    pub slots: Vec<TripMealSlot>,
}

/// A multi-day trip plan. Invariant: `days` is never empty; removing the
/// last remaining day is a no-op at the store level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub id: Uuid,
    pub resort: String,
    pub created_at: DateTime<Utc>,
    pub days: Vec<TripDay>,
}

/// Summed nutrition over a day or a whole trip. Unknown fields on the
/// constituent items contribute nothing; `items_missing_data` counts them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub carbs: f64,
    pub calories: f64,
    pub protein: f64,
    pub items_missing_data: usize,
}

impl NutritionTotals {
    /// Accumulate one meal item into the running totals
    pub fn add_item(&mut self, item: &MealItem) {
        match item.carbs {
            Some(carbs) => self.carbs += carbs,
            None => self.items_missing_data += 1,
        }
        self.calories += item.calories.unwrap_or(0.0);
        self.protein += item.protein.unwrap_or(0.0);
    }
}

/// Carb and calorie totals for one trip day
#[must_use]
pub fn day_totals(day: &TripDay) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for slot in &day.slots {
        for item in &slot.items {
            totals.add_item(item);
        }
    }
    totals
}

/// Carb and calorie totals across every day of a plan
#[must_use]
pub fn trip_totals(plan: &TripPlan) -> NutritionTotals {
    let mut totals = NutritionTotals::default();
    for day in &plan.days {
        let day = day_totals(day);
        totals.carbs += day.carbs;
        totals.calories += day.calories;
        totals.protein += day.protein;
        totals.items_missing_data += day.items_missing_data;
    }
    totals
}
