//! Error handling module
//!
//! Provides the error type shared by the record store, the GitLab source,
//! and the feed writer. Every variant here aborts the run; per-proposal
//! rejections are values (see `intake::Rejection`), not errors.

use reqwest::StatusCode;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitLab API error {status} on {endpoint}: {body}")]
    GitLabApi {
        status: StatusCode,
        endpoint: String,
        body: String,
    },

    #[error("Malformed source data: {0}")]
    Decode(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias used across the pipeline
pub type AppResult<T> = Result<T, AppError>;

/// Helper function to create a decode error
pub fn decode_error(msg: impl Into<String>) -> AppError {
    AppError::Decode(msg.into())
}
