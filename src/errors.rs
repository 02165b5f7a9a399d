// ABOUTME: Unified error handling for the engine
// ABOUTME: Defines AppError variants for remote, cache, storage, and config failures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 CarbCompass Contributors

//! # Unified Error Handling
//!
//! All fallible engine operations return [`AppResult`]. The variants mirror the
//! engine's failure surface: the remote catalog service, the local cache store,
//! durable user-state storage, and configuration loading. Everything above the
//! fetch layer degrades to empty/default values rather than surfacing errors,
//! so [`AppError::NoDataAvailable`] is the only error consumers are expected to
//! show to a user.

use thiserror::Error;

/// Result type used throughout the engine
pub type AppResult<T> = Result<T, AppError>;

/// Unified error type for engine operations
#[derive(Debug, Error)]
pub enum AppError {
    /// The remote service failed and the local cache holds no equivalent slice
    #[error("no data available: remote fetch failed and the local cache is empty")]
    NoDataAvailable,

    /// Remote catalog service failure (network, HTTP status, or decode)
    #[error("remote catalog error: {0}")]
    Remote(String),

    /// Local cache store failure
    #[error("cache store error: {0}")]
    Cache(String),

    /// Durable user-state storage failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Configuration loading failure
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Create a remote error from any displayable cause
    pub fn remote(msg: impl Into<String>) -> Self {
        Self::Remote(msg.into())
    }

    /// Create a cache error from any displayable cause
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a config error from any displayable cause
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_available_message() {
        let err = AppError::NoDataAvailable;
        assert!(err.to_string().contains("no data available"));
    }

    #[test]
    fn test_remote_error_wraps_cause() {
        let err = AppError::remote("connection refused");
        assert_eq!(
            err.to_string(),
            "remote catalog error: connection refused"
        );
    }
}
