// src/adapter/rest.rs
// HTTP delivery for the rate pipeline

use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::sync::Arc;

use crate::application::cache::Cached;
use crate::application::service::RateService;
use crate::config::Config;
use crate::domain::errors::CacheError;
use crate::domain::models::{RateReading, RateSource};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub rates: Arc<RateService>,
    p2p_max_age: u64,
    official_max_age: u64,
}

impl AppState {
    pub fn new(rates: Arc<RateService>, config: &Config) -> Self {
        Self {
            rates,
            p2p_max_age: config.p2p.freshness_secs,
            official_max_age: config.bcv.freshness_secs,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/rate/p2p-market", get(p2p_market))
        .route("/rate/official-usd", get(official_usd))
        .route("/rate/official-eur", get(official_eur))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct P2pRateResponse {
    success: bool,
    rate: f64,
    first_price: f64,
    prices: Vec<f64>,
    percent_change: f64,
    ads_count: usize,
    timestamp: String,
    from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_age: Option<u64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OfficialRateResponse {
    success: bool,
    moneda: &'static str,
    valor: String,
    timestamp: String,
    from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_age: Option<u64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: String,
    timestamp: String,
}

/// GET /rate/p2p-market - P2P order-book aggregate
async fn p2p_market(State(state): State<AppState>) -> Response {
    match state.rates.p2p_market().await {
        Ok(cached) => {
            let snapshot = &cached.payload;
            let body = P2pRateResponse {
                success: true,
                rate: snapshot.average_price.to_f64().unwrap_or_default(),
                first_price: snapshot.first_price.to_f64().unwrap_or_default(),
                prices: snapshot
                    .sample_prices
                    .iter()
                    .map(|p| p.to_f64().unwrap_or_default())
                    .collect(),
                percent_change: snapshot
                    .reference_change_percent
                    .to_f64()
                    .unwrap_or_default(),
                ads_count: snapshot.sample_size,
                timestamp: iso_timestamp(snapshot.observed_at),
                from_cache: cached.from_cache,
                cache_age: cached.age_secs,
            };

            success_response(body, cached.is_stale, state.p2p_max_age)
        }
        Err(err) => failure_response(RateSource::P2pMarket, err),
    }
}

/// GET /rate/official-usd - official USD rate
async fn official_usd(State(state): State<AppState>) -> Response {
    match state.rates.official_usd().await {
        Ok(cached) => official_response(cached, state.official_max_age),
        Err(err) => failure_response(RateSource::OfficialUsd, err),
    }
}

/// GET /rate/official-eur - official EUR rate
async fn official_eur(State(state): State<AppState>) -> Response {
    match state.rates.official_eur().await {
        Ok(cached) => official_response(cached, state.official_max_age),
        Err(err) => failure_response(RateSource::OfficialEur, err),
    }
}

fn official_response(cached: Cached<RateReading>, max_age: u64) -> Response {
    let reading = &cached.payload;
    let body = OfficialRateResponse {
        success: true,
        moneda: reading.source.currency_code().unwrap_or("USD"),
        valor: reading.value.to_string(),
        timestamp: iso_timestamp(reading.observed_at),
        from_cache: cached.from_cache,
        cache_age: cached.age_secs,
    };

    success_response(body, cached.is_stale, max_age)
}

fn success_response<T: Serialize>(body: T, is_stale: bool, max_age: u64) -> Response {
    let mut response = (StatusCode::OK, Json(body)).into_response();

    // A stale serve must not be re-cached downstream for a full window
    if !is_stale {
        if let Ok(value) = HeaderValue::from_str(&format!("public, max-age={}", max_age)) {
            response.headers_mut().insert(header::CACHE_CONTROL, value);
        }
    }

    response
}

fn failure_response(source: RateSource, err: CacheError) -> Response {
    log::error!("Error serving {} rate: {}", source, err);

    let body = ErrorResponse {
        success: false,
        error: err.to_string(),
        timestamp: iso_timestamp(Utc::now()),
    };

    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

fn iso_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}
