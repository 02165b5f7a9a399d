// ABOUTME: Compound filter and sort pipeline over catalog entries
// ABOUTME: Conjunctive toggleable predicates plus one null-safe stable comparator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Filter/Sort Pipeline
//!
//! [`apply_filters`] is a pure function from a catalog slice and a
//! [`FilterSpec`] to a filtered, sorted `Vec`. Filters are independently
//! toggleable and conjunctive. Every numeric comparator is null-safe: entries
//! missing the sorted field sort last regardless of direction. Sorting is
//! stable, so equal keys keep their original catalog order (the documented
//! tie-break).

use crate::models::{AllergenKind, CatalogEntry, Category, Grade};
use crate::scoring;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort key for the single selected comparator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    CarbsAsc,
    CarbsDesc,
    CaloriesAsc,
    CaloriesDesc,
    GradeDesc,
}

/// Toggleable filter set. `Default` disables everything and applies no sort.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Case-insensitive substring over item name, description, restaurant name
    pub text: Option<String>,
    /// Maximum carb grams; entries with unknown carbs are excluded while set
    pub max_carbs: Option<f64>,
    pub category: Option<Category>,
    pub vegetarian_only: bool,
    pub hide_fried: bool,
    pub hide_beverages: bool,
    /// Excludes entries with alcohol grams > 0; unknown or zero passes
    pub hide_alcohol: bool,
    /// Grade membership; empty means inactive. Ungraded entries are excluded
    /// while any grade is selected.
    pub grades: Vec<Grade>,
    /// Entries carrying any of these allergens are excluded
    pub excluded_allergens: Vec<AllergenKind>,
    pub sort: Option<SortKey>,
}

fn matches_text(entry: &CatalogEntry, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    entry.item.name.to_lowercase().contains(&needle)
        || entry
            .item
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || entry.restaurant_name.to_lowercase().contains(&needle)
}

fn passes(entry: &CatalogEntry, spec: &FilterSpec) -> bool {
    if let Some(text) = spec.text.as_deref() {
        if !text.trim().is_empty() && !matches_text(entry, text.trim()) {
            return false;
        }
    }

    let nutrition = entry.item.nutrition.as_ref();

    if let Some(ceiling) = spec.max_carbs {
        match nutrition.and_then(|n| n.carbs) {
            Some(carbs) if carbs <= ceiling => {}
            _ => return false,
        }
    }

    if let Some(category) = spec.category {
        if entry.item.category != category {
            return false;
        }
    }

    if spec.vegetarian_only && !entry.item.vegetarian {
        return false;
    }
    if spec.hide_fried && entry.item.fried {
        return false;
    }
    if spec.hide_beverages && entry.item.category == Category::Beverage {
        return false;
    }
    if spec.hide_alcohol
        && nutrition
            .and_then(|n| n.alcohol_grams)
            .is_some_and(|grams| grams > 0.0)
    {
        return false;
    }

    if !spec.grades.is_empty() {
        match scoring::grade_item(&entry.item) {
            Some(grade) if spec.grades.contains(&grade) => {}
            _ => return false,
        }
    }

    if !spec.excluded_allergens.is_empty()
        && entry
            .item
            .allergens
            .iter()
            .any(|a| spec.excluded_allergens.contains(&a.kind))
    {
        return false;
    }

    true
}

/// Compare two optional numeric keys, placing `None` last in both directions
fn cmp_nullable(a: Option<f64>, b: Option<f64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => {
            let ord = a.total_cmp(&b);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sort_entries(entries: &mut [CatalogEntry], key: SortKey) {
    match key {
        SortKey::Name => {
            entries.sort_by(|a, b| a.item.name.to_lowercase().cmp(&b.item.name.to_lowercase()));
        }
        SortKey::CarbsAsc | SortKey::CarbsDesc => {
            let descending = key == SortKey::CarbsDesc;
            entries.sort_by(|a, b| {
                cmp_nullable(
                    a.item.nutrition.as_ref().and_then(|n| n.carbs),
                    b.item.nutrition.as_ref().and_then(|n| n.carbs),
                    descending,
                )
            });
        }
        SortKey::CaloriesAsc | SortKey::CaloriesDesc => {
            let descending = key == SortKey::CaloriesDesc;
            entries.sort_by(|a, b| {
                cmp_nullable(
                    a.item.nutrition.as_ref().and_then(|n| n.calories),
                    b.item.nutrition.as_ref().and_then(|n| n.calories),
                    descending,
                )
            });
        }
        SortKey::GradeDesc => {
            entries.sort_by(|a, b| {
                cmp_nullable(
                    a.item
                        .nutrition
                        .as_ref()
                        .and_then(scoring::score)
                        .map(f64::from),
                    b.item
                        .nutrition
                        .as_ref()
                        .and_then(scoring::score)
                        .map(f64::from),
                    true,
                )
            });
        }
    }
}

/// Apply the compound filter set and the selected sort to a catalog slice
#[must_use]
pub fn apply_filters(entries: &[CatalogEntry], spec: &FilterSpec) -> Vec<CatalogEntry> {
    let mut kept: Vec<CatalogEntry> = entries
        .iter()
        .filter(|entry| passes(entry, spec))
        .cloned()
        .collect();
    if let Some(key) = spec.sort {
        sort_entries(&mut kept, key);
    }
    kept
}
