// src/application/mod.rs
pub mod cache;
pub mod context;
pub mod ledger;
pub mod service;
pub mod trend;

// Re-export public API
pub use cache::{Cached, SourceCache};
pub use ledger::RateHistoryLedger;
pub use service::RateService;
pub use trend::TrendAnalyzer;
