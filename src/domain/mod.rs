// src/domain/mod.rs
pub mod errors;
pub mod models;
pub mod repository;

// Re-export common types for convenience
pub use errors::{AppError, AppResult, CacheError, SourceError, StoreError};
pub use models::{
    LedgerEntry, P2pSnapshot, RateHistory, RateReading, RateSource, Trend, TrendAnalysis,
};
