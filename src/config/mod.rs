// ABOUTME: Environment-driven engine configuration
// ABOUTME: Remote service endpoint, paging limits, cache location, and storage directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Configuration
//!
//! [`EngineConfig::from_env`] reads `CARB_COMPASS_*` variables, substituting
//! defaults for everything except the remote service URL. Missing optional
//! values never error; a malformed numeric value does.

use crate::catalog::FetchConfig;
use crate::errors::{AppError, AppResult};
use std::env;
use std::path::PathBuf;

/// Remote catalog service settings
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL of the catalog REST service
    pub base_url: String,
    /// Optional API key sent as the `apikey` header
    pub api_key: Option<String>,
}

/// Full engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub remote: RemoteConfig,
    /// Paging behavior for fetch-all loops
    pub fetch: FetchConfig,
    /// SQLite URL for the local cache store
    pub cache_url: String,
    /// Directory holding the per-key JSON blobs of the reactive stores
    pub storage_dir: PathBuf,
}

fn env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> AppResult<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{key} is not a valid number: {raw}"))),
        Err(_) => Ok(None),
    }
}

impl EngineConfig {
    /// Load configuration from the environment
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] when `CARB_COMPASS_REMOTE_URL` is unset
    /// or a numeric variable fails to parse
    pub fn from_env() -> AppResult<Self> {
        let base_url = env::var("CARB_COMPASS_REMOTE_URL")
            .map_err(|_| AppError::config("CARB_COMPASS_REMOTE_URL must be set"))?;

        let mut fetch = match env_parse::<usize>("CARB_COMPASS_PAGE_SIZE")? {
            Some(page_size) => FetchConfig::with_page_size(page_size),
            None => FetchConfig::default(),
        };
        if let Some(max) = env_parse::<usize>("CARB_COMPASS_MAX_RECORDS")? {
            fetch = fetch.with_max_records(max);
        }

        let default_storage = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("carb-compass");
        let storage_dir =
            env::var("CARB_COMPASS_DATA_DIR").map_or(default_storage, PathBuf::from);

        Ok(Self {
            remote: RemoteConfig {
                base_url,
                api_key: env::var("CARB_COMPASS_API_KEY").ok(),
            },
            fetch,
            cache_url: env_or_default(
                "CARB_COMPASS_CACHE_URL",
                &format!("sqlite:{}", storage_dir.join("catalog-cache.db").display()),
            ),
            storage_dir,
        })
    }
}
