// tests/rest_api.rs
// End-to-end: wiremock upstreams -> adapters -> caches -> axum handlers

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use criptoguia::adapter::rest::{router, AppState};
use criptoguia::application::service::RateService;
use criptoguia::config::Config;
use criptoguia::domain::repository::SystemClock;
use criptoguia::infrastructure::bcv::BcvRateAdapter;
use criptoguia::infrastructure::binance::BinanceP2pAdapter;

const SEARCH_PATH: &str = "/bapi/c2c/v2/friendly/c2c/adv/search";

const BCV_PAGE: &str = r#"<html><body>
    <div id="euro"><strong>42,11</strong></div>
    <div id="dolar"><strong>36,50</strong></div>
</body></html>"#;

fn config_against(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.p2p.search_url = format!("{}{}", server.uri(), SEARCH_PATH);
    config.p2p.timeout_secs = 2;
    config.bcv.page_url = format!("{}/", server.uri());
    config.bcv.usd_timeout_secs = 2;
    config.bcv.eur_timeout_secs = 2;
    config
}

fn app_for(config: &Config) -> Router {
    let rates = Arc::new(RateService::new(
        Arc::new(BinanceP2pAdapter::new(config.p2p.clone()).unwrap()),
        Arc::new(BcvRateAdapter::official_usd(&config.bcv).unwrap()),
        Arc::new(BcvRateAdapter::official_eur(&config.bcv).unwrap()),
        Arc::new(SystemClock),
        config.p2p.freshness_secs,
        config.bcv.freshness_secs,
    ));

    router(AppState::new(rates, config))
}

async fn mount_p2p_ads(server: &MockServer, prices: &[&str]) {
    let ads: Vec<Value> = prices
        .iter()
        .map(|price| {
            json!({
                "adv": { "advNo": "1", "price": price },
                "advertiser": { "nickName": "vendor" }
            })
        })
        .collect();

    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": "000000",
            "message": null,
            "data": ads,
        })))
        .mount(server)
        .await;
}

async fn mount_bcv_page(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BCV_PAGE))
        .mount(server)
        .await;
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Option<String>, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let cache_control = response
        .headers()
        .get("cache-control")
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap();

    (status, cache_control, body)
}

#[tokio::test]
async fn p2p_market_serves_the_order_book_average() {
    let server = MockServer::start().await;
    mount_p2p_ads(&server, &["36.0", "36.2", "35.8", "36.1", "35.9"]).await;

    let config = config_against(&server);
    let app = app_for(&config);

    let (status, cache_control, body) = get_json(&app, "/rate/p2p-market").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=30"));
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["rate"], json!(36.0));
    assert_eq!(body["firstPrice"], json!(36.0));
    assert_eq!(body["percentChange"], json!(0.0));
    assert_eq!(body["adsCount"], json!(5));
    assert_eq!(body["prices"].as_array().unwrap().len(), 5);
    assert_eq!(body["fromCache"], json!(false));
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    // A second call inside the freshness window is served from the cache
    let (_, _, body) = get_json(&app, "/rate/p2p-market").await;
    assert_eq!(body["fromCache"], json!(true));
    assert_eq!(body["rate"], json!(36.0));
}

#[tokio::test]
async fn official_usd_serves_the_scraped_value() {
    let server = MockServer::start().await;
    mount_bcv_page(&server).await;

    let config = config_against(&server);
    let app = app_for(&config);

    let (status, cache_control, body) = get_json(&app, "/rate/official-usd").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache_control.as_deref(), Some("public, max-age=600"));
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["moneda"], json!("USD"));
    assert_eq!(body["valor"], json!("36.50"));
    assert_eq!(body["fromCache"], json!(false));
}

#[tokio::test]
async fn official_eur_serves_the_scraped_value() {
    let server = MockServer::start().await;
    mount_bcv_page(&server).await;

    let config = config_against(&server);
    let app = app_for(&config);

    let (status, _, body) = get_json(&app, "/rate/official-eur").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["moneda"], json!("EUR"));
    assert_eq!(body["valor"], json!("42.11"));
}

#[tokio::test]
async fn cold_failure_returns_an_explicit_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let config = config_against(&server);
    let app = app_for(&config);

    let (status, cache_control, body) = get_json(&app, "/rate/p2p-market").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(cache_control, None);
    assert_eq!(body["success"], json!(false));
    assert!(!body["error"].as_str().unwrap().is_empty());
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn stale_reading_is_served_when_the_upstream_starts_failing() {
    let server = MockServer::start().await;
    mount_p2p_ads(&server, &["36.0", "36.2"]).await;

    // Zero freshness forces a refresh attempt on every call
    let mut config = config_against(&server);
    config.p2p.freshness_secs = 0;
    let app = app_for(&config);

    let (status, _, body) = get_json(&app, "/rate/p2p-market").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fromCache"], json!(false));

    // Upstream goes down; the last good reading keeps being served
    server.reset().await;
    Mock::given(method("POST"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    for _ in 0..2 {
        let (status, cache_control, body) = get_json(&app, "/rate/p2p-market").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cache_control, None);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["rate"], json!(36.1));
        assert_eq!(body["fromCache"], json!(true));
        assert!(body["cacheAge"].is_u64());
    }
}
