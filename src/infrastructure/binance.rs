// src/infrastructure/binance.rs
// Binance P2P order-book source adapter

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::P2pConfig;
use crate::domain::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::domain::models::P2pSnapshot;
use crate::domain::repository::P2pMarketSource;

/// Samples a bounded page of top-ranked P2P ads for the configured
/// asset/fiat pair and reduces it to one aggregate reading. One attempt per
/// call; the cache layer owns failure masking.
pub struct BinanceP2pAdapter {
    client: reqwest::Client,
    config: P2pConfig,
}

#[derive(Debug, Deserialize)]
struct AdvSearchResponse {
    #[serde(default)]
    data: Option<Vec<AdvEntry>>,
}

#[derive(Debug, Deserialize)]
struct AdvEntry {
    adv: Adv,
}

#[derive(Debug, Deserialize)]
struct Adv {
    price: String,
}

impl BinanceP2pAdapter {
    pub fn new(config: P2pConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build P2P HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn search_body(&self) -> serde_json::Value {
        json!({
            "asset": self.config.asset,
            "fiat": self.config.fiat,
            "tradeType": self.config.trade_type,
            "page": 1,
            "rows": self.config.rows,
            "payTypes": self.config.pay_types,
            "countries": [],
            "publisherType": null,
            "proMerchantAds": false,
            "shieldMerchantAds": false,
        })
    }
}

#[async_trait]
impl P2pMarketSource for BinanceP2pAdapter {
    async fn fetch_snapshot(&self) -> SourceResult<P2pSnapshot> {
        let response = self
            .client
            .post(&self.config.search_url)
            .header(header::ACCEPT, "application/json")
            .json(&self.search_body())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::UpstreamHttp(format!(
                "Binance API error: {}",
                response.status()
            )));
        }

        let payload: AdvSearchResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(format!("Invalid P2P search response: {}", e)))?;

        let ads = payload.data.unwrap_or_default();
        if ads.is_empty() {
            return Err(SourceError::EmptyResult("No P2P ads found".to_string()));
        }

        let mut prices = Vec::with_capacity(ads.len());
        for entry in &ads {
            let price: Decimal = entry.adv.price.trim().parse().map_err(|_| {
                SourceError::Parse(format!("Invalid ad price: {:?}", entry.adv.price))
            })?;
            prices.push(price);
        }

        let first_price = prices[0];
        if first_price <= Decimal::ZERO {
            return Err(SourceError::Parse(format!(
                "Non-positive reference price: {}",
                first_price
            )));
        }

        let sample_size = prices.len();
        let sum: Decimal = prices.iter().copied().sum();
        let average = sum / Decimal::from(sample_size);
        let reference_change =
            (average - first_price) / first_price * Decimal::ONE_HUNDRED;

        log::debug!(
            "P2P sample: {} ads, average {} {}",
            sample_size,
            average.round_dp(2),
            self.config.fiat
        );

        Ok(P2pSnapshot {
            average_price: average.round_dp(2),
            first_price,
            sample_prices: prices,
            sample_size,
            reference_change_percent: reference_change.round_dp(2),
            observed_at: Utc::now(),
        })
    }
}
