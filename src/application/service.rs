// src/application/service.rs
// Composition of the three upstream sources behind their caches

use std::sync::Arc;

use crate::application::cache::{Cached, SourceCache};
use crate::domain::errors::CacheResult;
use crate::domain::models::{P2pSnapshot, RateReading};
use crate::domain::repository::{Clock, OfficialRateSource, P2pMarketSource};

/// One instance owns the cache slot and adapter for every source; consumers
/// reach rates only through it. The three sources evolve independently:
/// there is no cross-source consistency guarantee.
pub struct RateService {
    p2p_source: Arc<dyn P2pMarketSource>,
    usd_source: Arc<dyn OfficialRateSource>,
    eur_source: Arc<dyn OfficialRateSource>,
    p2p_cache: SourceCache<P2pSnapshot>,
    usd_cache: SourceCache<RateReading>,
    eur_cache: SourceCache<RateReading>,
}

impl RateService {
    pub fn new(
        p2p_source: Arc<dyn P2pMarketSource>,
        usd_source: Arc<dyn OfficialRateSource>,
        eur_source: Arc<dyn OfficialRateSource>,
        clock: Arc<dyn Clock>,
        p2p_freshness_secs: u64,
        official_freshness_secs: u64,
    ) -> Self {
        Self {
            p2p_source,
            usd_source,
            eur_source,
            p2p_cache: SourceCache::new("p2p-market", p2p_freshness_secs, clock.clone()),
            usd_cache: SourceCache::new("official-usd", official_freshness_secs, clock.clone()),
            eur_cache: SourceCache::new("official-eur", official_freshness_secs, clock),
        }
    }

    /// Current P2P order-book aggregate, through the 30-second cache
    pub async fn p2p_market(&self) -> CacheResult<Cached<P2pSnapshot>> {
        self.p2p_cache
            .get_or_fetch(|| self.p2p_source.fetch_snapshot())
            .await
    }

    /// Current official USD rate, through the 10-minute cache
    pub async fn official_usd(&self) -> CacheResult<Cached<RateReading>> {
        self.usd_cache
            .get_or_fetch(|| self.usd_source.fetch_rate())
            .await
    }

    /// Current official EUR rate, through the 10-minute cache
    pub async fn official_eur(&self) -> CacheResult<Cached<RateReading>> {
        self.eur_cache
            .get_or_fetch(|| self.eur_source.fetch_rate())
            .await
    }

    pub async fn peek_p2p(&self) -> Option<Cached<P2pSnapshot>> {
        self.p2p_cache.peek().await
    }

    pub async fn peek_official_usd(&self) -> Option<Cached<RateReading>> {
        self.usd_cache.peek().await
    }

    pub async fn peek_official_eur(&self) -> Option<Cached<RateReading>> {
        self.eur_cache.peek().await
    }
}
