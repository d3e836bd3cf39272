// src/infrastructure/bcv.rs
// Official-rate scrape adapters for the BCV site

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::time::Duration;

use crate::config::BcvConfig;
use crate::domain::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::domain::models::{RateReading, RateSource};
use crate::domain::repository::OfficialRateSource;

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

/// Scrapes one currency value off the BCV page: select the named container's
/// emphasized text, normalize the decimal comma, parse a positive decimal.
/// One attempt per call, no retry.
pub struct BcvRateAdapter {
    client: reqwest::Client,
    page_url: String,
    selector: Selector,
    source: RateSource,
}

impl BcvRateAdapter {
    /// USD adapter. The BCV host serves an invalid certificate chain on this
    /// page, so certificate verification is skipped on this client when
    /// configured — a trust exception scoped to this adapter only.
    pub fn official_usd(config: &BcvConfig) -> AppResult<Self> {
        Self::build(
            config,
            RateSource::OfficialUsd,
            &config.usd_selector,
            config.usd_timeout_secs,
            config.usd_accept_invalid_certs,
        )
    }

    /// EUR adapter, with full certificate verification
    pub fn official_eur(config: &BcvConfig) -> AppResult<Self> {
        Self::build(
            config,
            RateSource::OfficialEur,
            &config.eur_selector,
            config.eur_timeout_secs,
            false,
        )
    }

    fn build(
        config: &BcvConfig,
        source: RateSource,
        selector: &str,
        timeout_secs: u64,
        accept_invalid_certs: bool,
    ) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(&config.user_agent);

        if accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build BCV HTTP client: {}", e)))?;

        let selector = Selector::parse(selector)
            .map_err(|e| AppError::Config(format!("Invalid BCV selector {:?}: {}", selector, e)))?;

        Ok(Self {
            client,
            page_url: config.page_url.clone(),
            selector,
            source,
        })
    }

    fn extract_value(&self, html: &str) -> SourceResult<Decimal> {
        let document = Html::parse_document(html);

        let text = document
            .select(&self.selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(SourceError::Parse(format!(
                "Value element not found for {}",
                self.source
            )));
        }

        // The BCV publishes decimal-comma values
        let normalized = text.replace(',', ".");
        let value: Decimal = normalized.parse().map_err(|_| {
            SourceError::Parse(format!("Non-numeric rate for {}: {:?}", self.source, text))
        })?;

        if value <= Decimal::ZERO {
            return Err(SourceError::Parse(format!(
                "Non-positive rate for {}: {}",
                self.source, value
            )));
        }

        Ok(value)
    }
}

#[async_trait]
impl OfficialRateSource for BcvRateAdapter {
    async fn fetch_rate(&self) -> SourceResult<RateReading> {
        let response = self
            .client
            .get(&self.page_url)
            .header(header::ACCEPT, ACCEPT_HTML)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(SourceError::UpstreamHttp(format!(
                "BCV page error: {}",
                response.status()
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| SourceError::UpstreamHttp(e.to_string()))?;

        let value = self.extract_value(&html)?;
        log::debug!("BCV {} rate: {}", self.source, value);

        Ok(RateReading {
            value,
            source: self.source,
            observed_at: Utc::now(),
        })
    }
}
