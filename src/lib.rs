// ABOUTME: Main library entry point for the CarbCompass data and decision engine
// ABOUTME: Cache-first catalog access, nutrition scoring, filtering, search, and reactive user state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

#![deny(unsafe_code)]

//! # CarbCompass Engine
//!
//! The client-side data and decision engine behind a theme-park menu browser
//! for diabetes management. The engine is deliberately UI-free: pages, routing,
//! and export formatting are thin consumers of the modules here.
//!
//! ## Architecture
//!
//! - **Cache**: SQLite-backed local store so the app stays usable offline
//! - **Remote**: paginated client for the hosted catalog service
//! - **Catalog**: network-first fetchers with cache write-through and fallback
//! - **Query**: keyed, de-duplicated async request wrappers
//! - **Scoring**: pure nutrition score / grade / annotation functions
//! - **Filters**: compound filter and null-safe sort pipeline
//! - **Search**: typo-tolerant weighted search index
//! - **Stores**: persisted, multi-observer state (meal cart, trip plan, ...)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use carb_compass::config::EngineConfig;
//! use carb_compass::errors::AppResult;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = EngineConfig::from_env()?;
//!     println!("catalog service: {}", config.remote.base_url);
//!     Ok(())
//! }
//! ```

/// Cache-coordinated catalog fetchers (network-first, cache fallback)
pub mod catalog;
/// Local cache store backed by SQLite
pub mod cache;
/// Environment-driven engine configuration
pub mod config;
/// Unified error handling
pub mod errors;
/// Compound filter and sort pipeline
pub mod filters;
/// Structured logging setup
pub mod logging;
/// Catalog and user-authored data model
pub mod models;
/// Keyed, de-duplicated async query layer
pub mod query;
/// Remote catalog service gateway
pub mod remote;
/// Nutrition scoring, grading, and annotation engine
pub mod scoring;
/// Typo-tolerant search index
pub mod search;
/// Shared reactive stores with durable persistence
pub mod stores;

pub use errors::{AppError, AppResult};
pub use models::{CatalogEntry, Grade, MenuItem, NutritionFacts, Park, Restaurant};
