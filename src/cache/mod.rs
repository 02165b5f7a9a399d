// ABOUTME: SQLite-backed local cache store for the menu catalog
// ABOUTME: Idempotent schema creation, upsert-by-id writes, indexed reads, and sync metadata
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Local Cache Store
//!
//! Persistent, indexed storage that keeps the app usable without network
//! access. One table per catalog entity plus a `sync_metadata` table; records
//! are stored as JSON documents alongside the columns the secondary indexes
//! need (restaurants by park, items by park and by category).
//!
//! All access should go through [`shared_cache`], a lazily-initialized shared
//! handle: concurrent first users await a single `connect`, so the schema is
//! never created twice and no caller observes a half-migrated database.

use crate::models::{Category, MenuItem, Park, Restaurant};
use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;

/// Named record collections tracked in `sync_metadata`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Parks,
    Restaurants,
    Items,
}

impl Collection {
    fn as_str(self) -> &'static str {
        match self {
            Self::Parks => "parks",
            Self::Restaurants => "restaurants",
            Self::Items => "items",
        }
    }
}

/// Cache store over a SQLite connection pool
#[derive(Clone)]
pub struct CacheStore {
    pool: SqlitePool,
}

static SHARED_STORE: OnceCell<CacheStore> = OnceCell::const_new();

/// The process-wide shared cache handle, connecting and migrating on first
/// use. Callers racing initialization all await the same attempt.
///
/// # Errors
///
/// Returns an error if the initial connection or migration fails; later
/// callers retry initialization.
pub async fn shared_cache(database_url: &str) -> Result<&'static CacheStore> {
    SHARED_STORE
        .get_or_try_init(|| CacheStore::connect(database_url))
        .await
}

impl CacheStore {
    /// Open (and create if missing) the cache database, then run the
    /// idempotent migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema creation fails
    pub async fn connect(database_url: &str) -> Result<Self> {
        let connection_options = with_create_mode(database_url);

        // An in-memory SQLite database exists per connection, so the pool
        // must not open a second one.
        let pool = if connection_options.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .connect(&connection_options)
                .await?
        } else {
            SqlitePool::connect(&connection_options).await?
        };
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create tables and secondary indexes; safe to run repeatedly
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS parks (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                doc TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS restaurants (
                id TEXT PRIMARY KEY,
                park_id TEXT NOT NULL,
                name TEXT NOT NULL,
                doc TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS menu_items (
                id TEXT PRIMARY KEY,
                park_id TEXT NOT NULL,
                category TEXT NOT NULL,
                name TEXT NOT NULL,
                doc TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS sync_metadata (
                collection TEXT PRIMARY KEY,
                last_synced TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        // Secondary indexes for foreign-key scans.
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_restaurants_park_id ON restaurants(park_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_menu_items_park_id ON menu_items(park_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_menu_items_category ON menu_items(category)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Upsert parks by id, overwriting existing records in full
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transaction fails
    pub async fn write_parks(&self, parks: &[Park]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for park in parks {
            sqlx::query(
                r"
                INSERT INTO parks (id, name, doc) VALUES (?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET name = excluded.name, doc = excluded.doc
                ",
            )
            .bind(&park.id)
            .bind(&park.name)
            .bind(serde_json::to_string(park)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Upsert restaurants by id
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transaction fails
    pub async fn write_restaurants(&self, restaurants: &[Restaurant]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for restaurant in restaurants {
            sqlx::query(
                r"
                INSERT INTO restaurants (id, park_id, name, doc) VALUES (?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    park_id = excluded.park_id,
                    name = excluded.name,
                    doc = excluded.doc
                ",
            )
            .bind(&restaurant.id)
            .bind(&restaurant.park_id)
            .bind(&restaurant.name)
            .bind(serde_json::to_string(restaurant)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// Upsert menu items by id
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the transaction fails
    pub async fn write_items(&self, items: &[MenuItem]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for item in items {
            sqlx::query(
                r"
                INSERT INTO menu_items (id, park_id, category, name, doc)
                VALUES (?, ?, ?, ?, ?)
                ON CONFLICT(id) DO UPDATE SET
                    park_id = excluded.park_id,
                    category = excluded.category,
                    name = excluded.name,
                    doc = excluded.doc
                ",
            )
            .bind(&item.id)
            .bind(&item.park_id)
            .bind(item.category.as_str())
            .bind(&item.name)
            .bind(serde_json::to_string(item)?)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// All cached parks, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn read_parks(&self) -> Result<Vec<Park>> {
        let rows = sqlx::query("SELECT doc FROM parks ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// All cached restaurants, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn read_restaurants(&self) -> Result<Vec<Restaurant>> {
        let rows = sqlx::query("SELECT doc FROM restaurants ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// Cached restaurants for one park, via the `park_id` index
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn restaurants_by_park(&self, park_id: &str) -> Result<Vec<Restaurant>> {
        let rows = sqlx::query("SELECT doc FROM restaurants WHERE park_id = ? ORDER BY name")
            .bind(park_id)
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// All cached menu items, ordered by name
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn read_items(&self) -> Result<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT doc FROM menu_items ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// Cached menu items for one park, via the denormalized `park_id` index
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn items_by_park(&self, park_id: &str) -> Result<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT doc FROM menu_items WHERE park_id = ? ORDER BY name")
            .bind(park_id)
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// Cached menu items in one category, via the `category` index
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn items_by_category(&self, category: Category) -> Result<Vec<MenuItem>> {
        let rows = sqlx::query("SELECT doc FROM menu_items WHERE category = ? ORDER BY name")
            .bind(category.as_str())
            .fetch_all(&self.pool)
            .await?;
        decode_docs(&rows)
    }

    /// Case-insensitive substring scan over cached item names and
    /// descriptions, the offline stand-in for remote free-text search
    ///
    /// # Errors
    ///
    /// Returns an error if the query or record decoding fails
    pub async fn search_items(&self, text: &str) -> Result<Vec<MenuItem>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        let items = self.read_items().await?;
        Ok(items
            .into_iter()
            .filter(|item| {
                item.name.to_lowercase().contains(&needle)
                    || item
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// Record a successful sync of one collection at the current time
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails
    pub async fn record_sync(&self, collection: Collection) -> Result<()> {
        sqlx::query(
            r"
            INSERT INTO sync_metadata (collection, last_synced) VALUES (?, ?)
            ON CONFLICT(collection) DO UPDATE SET last_synced = excluded.last_synced
            ",
        )
        .bind(collection.as_str())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Timestamp of the last successful sync for a collection, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn last_sync(&self, collection: Collection) -> Result<Option<DateTime<Utc>>> {
        let row = sqlx::query("SELECT last_synced FROM sync_metadata WHERE collection = ?")
            .bind(collection.as_str())
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else { return Ok(None) };
        let raw: String = row.try_get("last_synced")?;
        Ok(Some(DateTime::parse_from_rfc3339(&raw)?.with_timezone(&Utc)))
    }

    /// Drop every cached record and all sync metadata
    ///
    /// # Errors
    ///
    /// Returns an error if any delete fails
    pub async fn clear(&self) -> Result<()> {
        for table in ["parks", "restaurants", "menu_items", "sync_metadata"] {
            sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&self.pool)
                .await?;
        }
        Ok(())
    }
}

/// Ensure SQLite creates the database file if it doesn't exist, joining
/// `mode=rwc` onto any query string the URL already carries
fn with_create_mode(database_url: &str) -> String {
    if database_url.starts_with("sqlite:")
        && !database_url.contains("mode=")
        && !database_url.contains(":memory:")
    {
        let separator = if database_url.contains('?') { '&' } else { '?' };
        format!("{database_url}{separator}mode=rwc")
    } else {
        database_url.to_string()
    }
}

fn decode_docs<T: serde::de::DeserializeOwned>(rows: &[sqlx::sqlite::SqliteRow]) -> Result<Vec<T>> {
    rows.iter()
        .map(|row| {
            let doc: String = row.try_get("doc")?;
            Ok(serde_json::from_str(&doc)?)
        })
        .collect()
}
