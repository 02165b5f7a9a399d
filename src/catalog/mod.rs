// ABOUTME: Cache-coordinated catalog fetchers
// ABOUTME: Network-first fetching with fire-and-forget cache write-through and offline fallback
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Cache-Coordinated Fetchers
//!
//! Every operation follows one control flow: attempt the remote query; on
//! success return the fresh result immediately while a spawned task writes it
//! through to the local cache and records a sync timestamp; on failure read
//! the equivalent slice from the cache; if the cache is empty too, fail with
//! [`AppError::NoDataAvailable`]. The write-through is explicitly not awaited,
//! so fresh data reaches the UI without waiting on the cache, and a racing
//! cache read is tolerated because the cache is best-effort, never
//! authoritative. No retries happen here.

use crate::cache::{CacheStore, Collection};
use crate::errors::{AppError, AppResult};
use crate::models::{Category, MenuItem, Park, Restaurant};
use crate::remote::CatalogGateway;
use tracing::{debug, warn};

/// Default records per page for fetch-all loops
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Smallest allowed page size
pub const MIN_PAGE_SIZE: usize = 10;

/// Largest allowed page size
pub const MAX_PAGE_SIZE: usize = 500;

/// Paging behavior for fetch-all loops
#[derive(Debug, Clone, Copy)]
pub struct FetchConfig {
    /// Records requested per page
    pub page_size: usize,
    /// Hard cap on total records retrieved (None for unlimited)
    pub max_records: Option<usize>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_records: None,
        }
    }
}

impl FetchConfig {
    /// Create a config with the given page size, clamped to the allowed range
    #[must_use]
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
            max_records: None,
        }
    }

    /// Cap the total number of records a fetch-all loop may retrieve
    #[must_use]
    pub const fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = Some(max);
        self
    }
}

/// Catalog access with network-first, cache-fallback semantics
#[derive(Clone)]
pub struct CatalogService {
    gateway: CatalogGateway,
    cache: CacheStore,
    fetch: FetchConfig,
}

impl CatalogService {
    /// Build a service over a gateway and an opened cache store
    #[must_use]
    pub fn new(gateway: CatalogGateway, cache: CacheStore, fetch: FetchConfig) -> Self {
        Self {
            gateway,
            cache,
            fetch,
        }
    }

    /// Spawn a fire-and-forget cache write-through for freshly fetched parks
    fn write_through_parks(&self, parks: Vec<Park>) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.write_parks(&parks).await {
                warn!(error = %err, "park cache write-through failed");
                return;
            }
            if let Err(err) = cache.record_sync(Collection::Parks).await {
                warn!(error = %err, "park sync timestamp write failed");
            }
        });
    }

    fn write_through_restaurants(&self, restaurants: Vec<Restaurant>) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.write_restaurants(&restaurants).await {
                warn!(error = %err, "restaurant cache write-through failed");
                return;
            }
            if let Err(err) = cache.record_sync(Collection::Restaurants).await {
                warn!(error = %err, "restaurant sync timestamp write failed");
            }
        });
    }

    fn write_through_items(&self, items: Vec<MenuItem>) {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            if let Err(err) = cache.write_items(&items).await {
                warn!(error = %err, "item cache write-through failed");
                return;
            }
            if let Err(err) = cache.record_sync(Collection::Items).await {
                warn!(error = %err, "item sync timestamp write failed");
            }
        });
    }

    /// All parks, paging through the remote service
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when the remote fetch fails and
    /// the cache holds no parks
    pub async fn parks(&self) -> AppResult<Vec<Park>> {
        let remote = self.fetch_all_pages(|offset, limit| {
            let gateway = self.gateway.clone();
            async move { gateway.parks_page(offset, limit).await }
        });
        match remote.await {
            Ok(parks) => {
                self.write_through_parks(parks.clone());
                Ok(parks)
            }
            Err(err) => {
                debug!(error = %err, "park fetch failed, falling back to cache");
                fallback(self.cache.read_parks().await)
            }
        }
    }

    /// Restaurants for one park
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when both remote and cache fail
    pub async fn restaurants(&self, park_id: &str) -> AppResult<Vec<Restaurant>> {
        match self.gateway.restaurants_for_park(park_id).await {
            Ok(restaurants) => {
                self.write_through_restaurants(restaurants.clone());
                Ok(restaurants)
            }
            Err(err) => {
                debug!(error = %err, park_id, "restaurant fetch failed, falling back to cache");
                fallback(self.cache.restaurants_by_park(park_id).await)
            }
        }
    }

    /// Menu items for one park, paging through the remote service
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when both remote and cache fail
    pub async fn items(&self, park_id: &str) -> AppResult<Vec<MenuItem>> {
        let remote = self.fetch_all_pages(|offset, limit| {
            let gateway = self.gateway.clone();
            let park_id = park_id.to_owned();
            async move {
                gateway
                    .items_page(Some(&park_id), None, offset, limit)
                    .await
            }
        });
        match remote.await {
            Ok(items) => {
                self.write_through_items(items.clone());
                Ok(items)
            }
            Err(err) => {
                debug!(error = %err, park_id, "item fetch failed, falling back to cache");
                fallback(self.cache.items_by_park(park_id).await)
            }
        }
    }

    /// Menu items in one category across all parks
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when both remote and cache fail
    pub async fn items_by_category(&self, category: Category) -> AppResult<Vec<MenuItem>> {
        let remote = self.fetch_all_pages(|offset, limit| {
            let gateway = self.gateway.clone();
            async move { gateway.items_page(None, Some(category), offset, limit).await }
        });
        match remote.await {
            Ok(items) => {
                self.write_through_items(items.clone());
                Ok(items)
            }
            Err(err) => {
                debug!(error = %err, "category fetch failed, falling back to cache");
                fallback(self.cache.items_by_category(category).await)
            }
        }
    }

    /// Every menu item in the catalog, paged until a short page or the
    /// configured record cap
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when both remote and cache fail
    pub async fn all_items(&self) -> AppResult<Vec<MenuItem>> {
        let remote = self.fetch_all_pages(|offset, limit| {
            let gateway = self.gateway.clone();
            async move { gateway.items_page(None, None, offset, limit).await }
        });
        match remote.await {
            Ok(items) => {
                self.write_through_items(items.clone());
                Ok(items)
            }
            Err(err) => {
                debug!(error = %err, "full item fetch failed, falling back to cache");
                fallback(self.cache.read_items().await)
            }
        }
    }

    /// Free-text item search; falls back to a substring scan over the cache
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NoDataAvailable`] when both remote and cache fail
    pub async fn search(&self, text: &str) -> AppResult<Vec<MenuItem>> {
        match self.gateway.search_items(text).await {
            Ok(items) => {
                // Upsert the result slice so the offline scan can find these
                // items later. A search page is not a full sync, so no
                // timestamp is recorded.
                let cache = self.cache.clone();
                let found = items.clone();
                tokio::spawn(async move {
                    if let Err(err) = cache.write_items(&found).await {
                        warn!(error = %err, "search cache write-through failed");
                    }
                });
                Ok(items)
            }
            Err(err) => {
                debug!(error = %err, "remote search failed, scanning cache");
                fallback(self.cache.search_items(text).await)
            }
        }
    }

    /// Accumulate pages until a short page or the configured cap
    async fn fetch_all_pages<F, Fut, T>(&self, mut page_fn: F) -> AppResult<Vec<T>>
    where
        F: FnMut(usize, usize) -> Fut,
        Fut: std::future::Future<Output = AppResult<Vec<T>>>,
    {
        let page_size = self.fetch.page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        let mut records = Vec::new();
        let mut offset = 0;
        loop {
            let page = page_fn(offset, page_size).await?;
            let short = page.len() < page_size;
            records.extend(page);
            if let Some(max) = self.fetch.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }
            if short {
                break;
            }
            offset += page_size;
        }
        Ok(records)
    }
}

/// Map a cache fallback read onto the fetch result: an empty slice (or a
/// cache failure) becomes [`AppError::NoDataAvailable`]
fn fallback<T>(read: anyhow::Result<Vec<T>>) -> AppResult<Vec<T>> {
    match read {
        Ok(records) if !records.is_empty() => Ok(records),
        Ok(_) => Err(AppError::NoDataAvailable),
        Err(err) => {
            warn!(error = %err, "cache fallback read failed");
            Err(AppError::NoDataAvailable)
        }
    }
}
