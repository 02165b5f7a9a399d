// ABOUTME: Typo-tolerant in-memory search index over catalog entries
// ABOUTME: Weighted field matching with edit-distance tolerance per query token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Search Index
//!
//! An in-memory approximate-match index built once per catalog snapshot.
//! Three fields are indexed with fixed weights: item name (2.0), restaurant
//! name (1.5), description (1.0). A query token matches a field token when
//! their Levenshtein distance is within 40% of the query token's length and
//! the field token is at least two characters. Results are ranked by summed
//! weighted match quality; ties keep original catalog order (stable sort).

use crate::models::CatalogEntry;
use strsim::levenshtein;

/// Default result cap for [`SearchIndex::search`]
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// Fraction of the query token length tolerated as edit distance
const ERROR_THRESHOLD: f64 = 0.4;

/// Shortest field token the matcher will consider
const MIN_MATCH_LEN: usize = 2;

const NAME_WEIGHT: f64 = 2.0;
const RESTAURANT_WEIGHT: f64 = 1.5;
const DESCRIPTION_WEIGHT: f64 = 1.0;

struct IndexedField {
    weight: f64,
    tokens: Vec<String>,
}

struct IndexedDoc {
    item_id: String,
    fields: Vec<IndexedField>,
}

/// One ranked search result
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub item_id: String,
    pub relevance: f64,
}

/// Approximate-match index over a catalog snapshot
pub struct SearchIndex {
    docs: Vec<IndexedDoc>,
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Best match quality of one query token against one field's tokens,
/// in 0.0..=1.0, or `None` when nothing is within tolerance
fn token_quality(query_token: &str, field_tokens: &[String]) -> Option<f64> {
    let allowed = (ERROR_THRESHOLD * query_token.len() as f64).floor() as usize;
    let mut best: Option<f64> = None;
    for token in field_tokens {
        if token.len() < MIN_MATCH_LEN {
            continue;
        }
        let quality = if token.contains(query_token) {
            1.0
        } else {
            let distance = levenshtein(query_token, token);
            if distance > allowed {
                continue;
            }
            1.0 - distance as f64 / query_token.len().max(1) as f64
        };
        if best.map_or(true, |b| quality > b) {
            best = Some(quality);
        }
    }
    best
}

impl SearchIndex {
    /// Build the index over a catalog snapshot
    #[must_use]
    pub fn build(entries: &[CatalogEntry]) -> Self {
        let docs = entries
            .iter()
            .map(|entry| IndexedDoc {
                item_id: entry.item.id.clone(),
                fields: vec![
                    IndexedField {
                        weight: NAME_WEIGHT,
                        tokens: tokenize(&entry.item.name),
                    },
                    IndexedField {
                        weight: RESTAURANT_WEIGHT,
                        tokens: tokenize(&entry.restaurant_name),
                    },
                    IndexedField {
                        weight: DESCRIPTION_WEIGHT,
                        tokens: tokenize(entry.item.description.as_deref().unwrap_or_default()),
                    },
                ],
            })
            .collect();
        Self { docs }
    }

    /// Number of indexed documents
    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    /// Whether the index is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Rank entries matching `query`, best first, capped at `limit`.
    ///
    /// An empty or whitespace-only query returns an empty list without
    /// invoking the matcher.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<SearchHit> = Vec::new();
        for doc in &self.docs {
            let mut relevance = 0.0;
            for query_token in &query_tokens {
                // Best weighted field match for this token.
                let best = doc
                    .fields
                    .iter()
                    .filter_map(|field| {
                        token_quality(query_token, &field.tokens).map(|q| q * field.weight)
                    })
                    .fold(0.0_f64, f64::max);
                relevance += best;
            }
            if relevance > 0.0 {
                hits.push(SearchHit {
                    item_id: doc.item_id.clone(),
                    relevance,
                });
            }
        }

        // Stable sort keeps catalog order among equal scores.
        hits.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        hits.truncate(limit);
        hits
    }

    /// [`Self::search`] with the default result cap
    #[must_use]
    pub fn search_default(&self, query: &str) -> Vec<SearchHit> {
        self.search(query, DEFAULT_SEARCH_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, MenuItem};

    fn entry(id: &str, name: &str, restaurant: &str, description: &str) -> CatalogEntry {
        CatalogEntry {
            item: MenuItem {
                id: id.into(),
                restaurant_id: "rest-1".into(),
                park_id: "park-1".into(),
                name: name.into(),
                description: Some(description.into()),
                category: Category::Entree,
                seasonal: false,
                fried: false,
                vegetarian: false,
                nutrition: None,
                allergens: Vec::new(),
            },
            restaurant_name: restaurant.into(),
        }
    }

    fn sample_index() -> SearchIndex {
        SearchIndex::build(&[
            entry("turkey", "Turkey Leg", "Frontier Grub", "Giant smoked turkey leg"),
            entry("churro", "Churro", "Plaza Sweets", "Cinnamon sugar pastry"),
            entry("milk", "Blue Milk", "Ronto Cantina", "Frozen plant-based drink"),
        ])
    }

    #[test]
    fn test_typo_query_ranks_correct_item_first() {
        let index = sample_index();
        let hits = index.search_default("turky leg");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].item_id, "turkey");
    }

    #[test]
    fn test_restaurant_substring_ranks_first() {
        let index = sample_index();
        let hits = index.search_default("cantina");
        assert!(!hits.is_empty());
        assert_eq!(hits[0].item_id, "milk");
    }

    #[test]
    fn test_empty_and_whitespace_queries_return_nothing() {
        let index = sample_index();
        assert!(index.search_default("").is_empty());
        assert!(index.search_default("   \t ").is_empty());
    }

    #[test]
    fn test_limit_caps_results() {
        let entries: Vec<CatalogEntry> = (0..10)
            .map(|i| entry(&format!("id-{i}"), "Churro", "Plaza Sweets", ""))
            .collect();
        let index = SearchIndex::build(&entries);
        assert_eq!(index.search("churro", 3).len(), 3);
    }

    #[test]
    fn test_name_weight_outranks_description() {
        let index = SearchIndex::build(&[
            entry("desc", "Fruit Cup", "Plaza Sweets", "served with churro dust"),
            entry("name", "Churro", "Plaza Sweets", ""),
        ]);
        let hits = index.search_default("churro");
        assert_eq!(hits[0].item_id, "name");
        assert_eq!(hits[1].item_id, "desc");
    }

    #[test]
    fn test_ties_preserve_catalog_order() {
        let index = SearchIndex::build(&[
            entry("first", "Churro", "Plaza Sweets", ""),
            entry("second", "Churro", "Plaza Sweets", ""),
        ]);
        let hits = index.search_default("churro");
        assert_eq!(hits[0].item_id, "first");
        assert_eq!(hits[1].item_id, "second");
    }
}
