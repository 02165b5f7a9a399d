// ABOUTME: Pure nutrition scoring, grading, and annotation engine
// ABOUTME: Maps nutrition facts to a 0-100 score, a letter grade, and explanatory notes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Scoring & Annotation Engine
//!
//! Deterministic, side-effect-free functions over [`NutritionFacts`]. All
//! null-handling for derived arithmetic (net carbs, ratios) is centralized
//! here so call sites never reimplement it. An item whose calories or carbs
//! are unknown cannot be graded: [`score`] returns `None` and
//! [`annotations`] returns an empty list, both valid displayable states.

use crate::models::{Category, Grade, MenuItem, NutritionFacts};
use serde::{Deserialize, Serialize};

/// Flat penalty applied once when an item contains any alcohol
const ALCOHOL_PENALTY: f64 = 15.0;

/// Net carbohydrate grams: total carbs minus fiber, floored at zero.
/// Unknown fiber subtracts nothing; unknown carbs yield `None`.
#[must_use]
pub fn net_carbs(nutrition: &NutritionFacts) -> Option<f64> {
    let carbs = nutrition.carbs?;
    Some((carbs - nutrition.fiber.unwrap_or(0.0)).max(0.0))
}

fn net_carb_points(net: f64) -> f64 {
    if net <= 15.0 {
        100.0
    } else if net <= 30.0 {
        80.0
    } else if net <= 45.0 {
        60.0
    } else if net <= 60.0 {
        40.0
    } else if net <= 80.0 {
        20.0
    } else {
        0.0
    }
}

fn sugar_ratio_points(sugar: Option<f64>, carbs: f64) -> f64 {
    // A carb-free item cannot be sugar-heavy by ratio.
    if carbs == 0.0 {
        return 100.0;
    }
    let Some(sugar) = sugar else {
        // Unknown sugar lands in the worst bracket rather than passing as zero.
        return 10.0;
    };
    let ratio = sugar / carbs;
    if ratio < 0.2 {
        100.0
    } else if ratio < 0.4 {
        70.0
    } else if ratio < 0.6 {
        40.0
    } else {
        10.0
    }
}

fn protein_ratio_points(protein: Option<f64>, carbs: f64) -> f64 {
    let Some(protein) = protein else {
        return 20.0;
    };
    if carbs == 0.0 {
        return if protein > 0.0 { 100.0 } else { 20.0 };
    }
    let ratio = protein / carbs;
    if ratio > 1.0 {
        100.0
    } else if ratio > 0.5 {
        75.0
    } else if ratio > 0.25 {
        50.0
    } else {
        20.0
    }
}

fn fiber_points(fiber: Option<f64>) -> f64 {
    match fiber {
        Some(f) if f >= 8.0 => 100.0,
        Some(f) if f >= 5.0 => 75.0,
        Some(f) if f >= 2.0 => 50.0,
        _ => 20.0,
    }
}

fn calorie_points(calories: f64) -> f64 {
    if calories < 300.0 {
        100.0
    } else if calories < 500.0 {
        75.0
    } else if calories < 700.0 {
        50.0
    } else {
        25.0
    }
}

/// Diabetes-suitability score in 0..=100.
///
/// Returns `None` when calories or carbs are unknown (incomplete data is
/// never graded), and a short-circuit 100 for a true zero-calorie,
/// zero-carb item such as plain water.
#[must_use]
pub fn score(nutrition: &NutritionFacts) -> Option<u32> {
    let calories = nutrition.calories?;
    let carbs = nutrition.carbs?;

    if calories == 0.0 && carbs == 0.0 {
        return Some(100);
    }

    let net = (carbs - nutrition.fiber.unwrap_or(0.0)).max(0.0);

    let mut total = 0.40 * net_carb_points(net)
        + 0.20 * sugar_ratio_points(nutrition.sugar, carbs)
        + 0.15 * protein_ratio_points(nutrition.protein, carbs)
        + 0.15 * fiber_points(nutrition.fiber)
        + 0.10 * calorie_points(calories);

    // Flat penalty, not scaled by quantity.
    if nutrition.alcohol_grams.is_some_and(|grams| grams > 0.0) {
        total -= ALCOHOL_PENALTY;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(total.max(0.0).round() as u32)
}

/// Map a score to a letter grade; boundaries are inclusive on the lower
/// bound of each grade (85/70/55/40)
#[must_use]
pub fn grade(score: Option<u32>) -> Option<Grade> {
    let score = score?;
    Some(match score {
        85.. => Grade::A,
        70..=84 => Grade::B,
        55..=69 => Grade::C,
        40..=54 => Grade::D,
        _ => Grade::F,
    })
}

/// Convenience: score and grade an item's nutrition in one call
#[must_use]
pub fn grade_item(item: &MenuItem) -> Option<Grade> {
    grade(score(item.nutrition.as_ref()?))
}

/// Severity of an annotation, used for styling only. Display priority is
/// rule-list order, never severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Green,
    Amber,
    Red,
    Teal,
}

/// One explanatory note about an item's diabetes impact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub text: String,
    pub severity: Severity,
}

impl Annotation {
    fn new(text: &str, severity: Severity) -> Self {
        Self {
            text: text.to_owned(),
            severity,
        }
    }
}

/// Evaluate the fixed, ordered annotation rule list for an item.
///
/// Returns an empty list when calories or carbs are unknown. The first
/// element is the headline note; the ordering is the declaration order of
/// the rules below, independent of severity. A zero-carb beverage
/// short-circuits to a single positive note.
#[must_use]
pub fn annotations(item: &MenuItem) -> Vec<Annotation> {
    let Some(nutrition) = item.nutrition.as_ref() else {
        return Vec::new();
    };
    let (Some(calories), Some(carbs)) = (nutrition.calories, nutrition.carbs) else {
        return Vec::new();
    };

    if item.category == Category::Beverage && carbs == 0.0 {
        return vec![Annotation::new(
            "Carb-free drink with no meaningful glucose impact",
            Severity::Green,
        )];
    }

    let net = (carbs - nutrition.fiber.unwrap_or(0.0)).max(0.0);
    let mut notes = Vec::new();

    if net <= 15.0 {
        notes.push(Annotation::new("Low net carbs", Severity::Green));
    }
    if net > 60.0 {
        notes.push(Annotation::new(
            "Very high carb load; consider sharing or saving half",
            Severity::Red,
        ));
    }
    if nutrition
        .sugar
        .is_some_and(|sugar| carbs > 0.0 && sugar / carbs >= 0.6)
    {
        notes.push(Annotation::new(
            "Carbs are mostly sugar, expect a fast rise",
            Severity::Red,
        ));
    }
    if nutrition.sugar.is_some_and(|sugar| sugar > 30.0) {
        notes.push(Annotation::new("High total sugar", Severity::Amber));
    }
    if nutrition.fiber.is_some_and(|fiber| fiber >= 5.0) {
        notes.push(Annotation::new(
            "High fiber slows carb absorption",
            Severity::Green,
        ));
    }
    if nutrition.protein.is_some_and(|protein| protein >= 20.0) {
        notes.push(Annotation::new(
            "High protein helps blunt the glucose rise",
            Severity::Green,
        ));
    }
    if item.fried {
        notes.push(Annotation::new(
            "Fried item: fat can delay the glucose peak",
            Severity::Amber,
        ));
    }
    if nutrition.fat.is_some_and(|fat| fat >= 30.0) {
        notes.push(Annotation::new(
            "Very high fat may cause a late rise; a split bolus can help",
            Severity::Teal,
        ));
    }
    if nutrition.alcohol_grams.is_some_and(|grams| grams > 0.0) {
        notes.push(Annotation::new(
            "Contains alcohol, which raises later hypoglycemia risk",
            Severity::Red,
        ));
    }
    if calories >= 700.0 {
        notes.push(Annotation::new("Calorie-dense portion", Severity::Amber));
    }

    notes
}
