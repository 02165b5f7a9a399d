// ABOUTME: HTTP gateway to the hosted relational catalog service
// ABOUTME: Paginated PostgREST-style queries with caller-side ilike pattern escaping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Remote Data Gateway
//!
//! Thin client over the catalog service's PostgREST-style REST interface:
//! equality filters (`col=eq.value`), case-insensitive substring filters
//! (`col=ilike.*value*`), ordering, and offset/limit range pagination.
//! Nutrition and allergen rows arrive embedded on each menu item row.
//!
//! Exactly one network attempt per call; offline fallback lives one layer up
//! in [`crate::catalog`]. User text is escaped with [`escape_like_pattern`]
//! before it is embedded in an `ilike` pattern, and the pattern is
//! double-quoted inside `or=(...)` expressions so commas and parentheses in
//! the query cannot split the disjunction.

use crate::errors::AppResult;
use crate::models::{Allergen, Category, MenuItem, NutritionFacts, Park, Restaurant};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Duration;

/// Default request timeout in seconds
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default connection timeout in seconds
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Global shared HTTP client with connection pooling
static SHARED_CLIENT: OnceLock<Client> = OnceLock::new();

fn shared_client() -> &'static Client {
    SHARED_CLIENT.get_or_init(|| {
        ClientBuilder::new()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| Client::new())
    })
}

/// Escape `\`, `%`, and `_` so user text embeds safely in an `ilike` pattern
#[must_use]
pub fn escape_like_pattern(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Double-quote a filter value for use inside an `or=(...)` expression, where
/// a bare `,` or parenthesis would otherwise split the disjunction. `"` and
/// `\` inside the value are backslash-escaped per the service's quoting rules.
fn quote_filter_value(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        if matches!(ch, '"' | '\\') {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

/// Menu item row as the service returns it, with embedded child tables
#[derive(Debug, Deserialize)]
struct MenuItemRow {
    id: String,
    restaurant_id: String,
    park_id: String,
    name: String,
    description: Option<String>,
    category: Category,
    #[serde(default)]
    seasonal: bool,
    #[serde(default)]
    fried: bool,
    #[serde(default)]
    vegetarian: bool,
    /// Zero or one active nutrition record per item
    #[serde(default)]
    nutritional_data: Vec<NutritionFacts>,
    #[serde(default)]
    allergens: Vec<Allergen>,
}

impl From<MenuItemRow> for MenuItem {
    fn from(row: MenuItemRow) -> Self {
        Self {
            id: row.id,
            restaurant_id: row.restaurant_id,
            park_id: row.park_id,
            name: row.name,
            description: row.description,
            category: row.category,
            seasonal: row.seasonal,
            fried: row.fried,
            vegetarian: row.vegetarian,
            nutrition: row.nutritional_data.into_iter().next(),
            allergens: row.allergens,
        }
    }
}

const ITEM_SELECT: &str = "*,nutritional_data(*),allergens(*)";

/// Client for the hosted catalog service
#[derive(Debug, Clone)]
pub struct CatalogGateway {
    base_url: String,
    api_key: Option<String>,
}

impl CatalogGateway {
    /// Create a gateway against a service base URL (no trailing slash)
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key,
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}/{path}", self.base_url);
        let mut request = shared_client().get(&url).query(query);
        if let Some(key) = self.api_key.as_deref() {
            request = request.header("apikey", key);
        }
        let response = request.send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// One page of parks, ordered by name
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::Remote`] on any network, status, or decode failure
    pub async fn parks_page(&self, offset: usize, limit: usize) -> AppResult<Vec<Park>> {
        self.get(
            "parks",
            &[
                ("select", "*".to_owned()),
                ("order", "name.asc".to_owned()),
                ("offset", offset.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await
    }

    /// All restaurants belonging to one park
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::Remote`] on any network, status, or decode failure
    pub async fn restaurants_for_park(&self, park_id: &str) -> AppResult<Vec<Restaurant>> {
        self.get(
            "restaurants",
            &[
                ("select", "*".to_owned()),
                ("park_id", format!("eq.{park_id}")),
                ("order", "name.asc".to_owned()),
            ],
        )
        .await
    }

    /// One page of menu items with embedded nutrition and allergens,
    /// optionally filtered by park and/or category
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::Remote`] on any network, status, or decode failure
    pub async fn items_page(
        &self,
        park_id: Option<&str>,
        category: Option<Category>,
        offset: usize,
        limit: usize,
    ) -> AppResult<Vec<MenuItem>> {
        let mut query = vec![
            ("select", ITEM_SELECT.to_owned()),
            ("order", "name.asc".to_owned()),
            ("offset", offset.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(park_id) = park_id {
            query.push(("park_id", format!("eq.{park_id}")));
        }
        if let Some(category) = category {
            query.push(("category", format!("eq.{}", category.as_str())));
        }
        let rows: Vec<MenuItemRow> = self.get("menu_items", &query).await?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }

    /// Free-text item search over name and description. The user text is
    /// escaped before embedding in the `ilike` patterns.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::AppError::Remote`] on any network, status, or decode failure
    pub async fn search_items(&self, text: &str) -> AppResult<Vec<MenuItem>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = quote_filter_value(&format!("*{}*", escape_like_pattern(trimmed)));
        let rows: Vec<MenuItemRow> = self
            .get(
                "menu_items",
                &[
                    ("select", ITEM_SELECT.to_owned()),
                    (
                        "or",
                        format!("(name.ilike.{pattern},description.ilike.{pattern})"),
                    ),
                    ("order", "name.asc".to_owned()),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(MenuItem::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_pattern_escapes_separators() {
        assert_eq!(escape_like_pattern("50% off_deal"), "50\\% off\\_deal");
        assert_eq!(escape_like_pattern("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like_pattern("plain text"), "plain text");
    }

    #[test]
    fn test_quote_filter_value_contains_separators() {
        // Commas and parentheses ride inside the quotes untouched.
        assert_eq!(
            quote_filter_value("*churros, fries (large)*"),
            "\"*churros, fries (large)*\""
        );
        // Quotes and backslashes inside the value are escaped.
        assert_eq!(quote_filter_value("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(quote_filter_value("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_menu_item_row_takes_first_nutrition_record() {
        let json = r#"{
            "id": "i1",
            "restaurant_id": "r1",
            "park_id": "p1",
            "name": "Turkey Leg",
            "description": null,
            "category": "entree",
            "nutritional_data": [{"calories": 720.0, "carbs": 1.0}],
            "allergens": []
        }"#;
        let row: MenuItemRow = serde_json::from_str(json).unwrap();
        let item = MenuItem::from(row);
        assert_eq!(item.nutrition.as_ref().unwrap().calories, Some(720.0));
    }

    #[test]
    fn test_menu_item_row_tolerates_missing_children() {
        let json = r#"{
            "id": "i1",
            "restaurant_id": "r1",
            "park_id": "p1",
            "name": "Mystery Bowl",
            "description": null,
            "category": "other"
        }"#;
        let row: MenuItemRow = serde_json::from_str(json).unwrap();
        let item = MenuItem::from(row);
        assert!(item.nutrition.is_none());
        assert!(item.allergens.is_empty());
    }
}
