// src/domain/models.rs
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upstream sources tracked by the rate pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateSource {
    P2pMarket,
    OfficialUsd,
    OfficialEur,
}

impl RateSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RateSource::P2pMarket => "p2p-market",
            RateSource::OfficialUsd => "official-usd",
            RateSource::OfficialEur => "official-eur",
        }
    }

    /// ISO currency code for the official sources; the P2P market reading is
    /// an aggregate, not a single currency quote.
    pub fn currency_code(&self) -> Option<&'static str> {
        match self {
            RateSource::P2pMarket => None,
            RateSource::OfficialUsd => Some("USD"),
            RateSource::OfficialEur => Some("EUR"),
        }
    }
}

impl fmt::Display for RateSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single observation of an exchange rate, created immutably by an adapter
/// on each successful fetch. Value is local-currency units (Bs) per unit of
/// the foreign asset and is always positive.
#[derive(Debug, Clone)]
pub struct RateReading {
    pub value: Decimal,
    pub source: RateSource,
    pub observed_at: DateTime<Utc>,
}

/// Aggregate reading produced by the P2P order-book adapter: the mean over a
/// bounded page of top-ranked ads plus the raw sample behind it.
#[derive(Debug, Clone)]
pub struct P2pSnapshot {
    /// Arithmetic mean of the sampled ad prices, rounded to 2 decimals
    pub average_price: Decimal,

    /// Price of the top-ranked ad
    pub first_price: Decimal,

    /// Sampled prices in order-book rank order
    pub sample_prices: Vec<Decimal>,

    /// Number of ads behind the average (>= 1)
    pub sample_size: usize,

    /// Percent difference between the average and the top-ranked price, a
    /// within-sample dispersion signal rather than a time-series trend
    pub reference_change_percent: Decimal,

    pub observed_at: DateTime<Utc>,
}

/// One ledger record per calendar day. A same-day re-observation overwrites
/// the entry in place; it never appends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Persisted shape of the rate history, newest entry first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateHistory {
    pub entries: Vec<LedgerEntry>,
}

/// Market direction classified from the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Bullish,
    Bearish,
    Stable,
}

impl Trend {
    /// Product label, as shown to users
    pub fn as_str(&self) -> &'static str {
        match self {
            Trend::Bullish => "ALCISTA",
            Trend::Bearish => "BAJISTA",
            Trend::Stable => "ESTABLE",
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Derived classification of the market, recomputed from scratch on every
/// call; nothing here is persisted.
#[derive(Debug, Clone)]
pub struct TrendAnalysis {
    pub trend: Trend,

    /// Run length supporting the trend
    pub consecutive_days: u32,

    /// Change vs. the immediately preceding ledger day, in Bs (2 decimals)
    pub today_change: Decimal,

    /// Change vs. the immediately preceding ledger day, in percent (2 decimals)
    pub today_change_percent: Decimal,

    pub previous_day_rate: Option<Decimal>,

    /// Templated guidance string keyed by trend and change magnitude
    pub advice: String,
}
