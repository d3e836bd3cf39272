// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors produced by the upstream source adapters. Every variant is
/// recoverable through the cache layer's stale-serving policy.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Upstream HTTP error: {0}")]
    UpstreamHttp(String),

    #[error("Upstream returned no usable data: {0}")]
    EmptyResult(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        SourceError::UpstreamHttp(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum CacheError {
    /// The fetch failed and no prior successful reading exists. This is the
    /// only case surfaced to callers; everything else is masked by the
    /// stale-serving policy.
    #[error("No data available: {0}")]
    NoDataAvailable(SourceError),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage read error: {0}")]
    Read(String),

    #[error("Storage write error: {0}")]
    Write(String),
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type SourceResult<T> = Result<T, SourceError>;
pub type CacheResult<T> = Result<T, CacheError>;
pub type StoreResult<T> = Result<T, StoreError>;
