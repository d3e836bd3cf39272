// src/domain/repository/mod.rs
// Port interfaces for the rate pipeline

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::errors::{SourceResult, StoreResult};
use crate::domain::models::{P2pSnapshot, RateReading};

/// Port for the P2P order-book source. Adapters are pure request/response:
/// one attempt, no internal retry; failures are masked by the cache layer.
#[async_trait]
pub trait P2pMarketSource: Send + Sync {
    async fn fetch_snapshot(&self) -> SourceResult<P2pSnapshot>;
}

/// Port for an official-rate page scrape (one implementation per currency)
#[async_trait]
pub trait OfficialRateSource: Send + Sync {
    async fn fetch_rate(&self) -> SourceResult<RateReading>;
}

/// Minimal durable key-value storage behind the rate history ledger.
/// Implementations must treat a missing key as `None`, never as an error.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Injectable time source so caches and the ledger are testable with a
/// fixed clock
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock implementation used by the composition root
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
