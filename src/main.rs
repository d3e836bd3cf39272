// src/main.rs
use criptoguia::adapter::rest::{router, AppState};
use criptoguia::application::service::RateService;
use criptoguia::config::Config;
use criptoguia::domain::errors::AppResult;
use criptoguia::domain::repository::SystemClock;
use criptoguia::infrastructure::bcv::BcvRateAdapter;
use criptoguia::infrastructure::binance::BinanceP2pAdapter;

use std::sync::Arc;
use tokio::signal::ctrl_c;

#[tokio::main]
async fn main() -> AppResult<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    config.init_logging()?;

    log::info!("Starting criptoguia v{}", env!("CARGO_PKG_VERSION"));
    log::info!(
        "Sampling {} {}/{} ads, scraping {}",
        config.p2p.rows,
        config.p2p.asset,
        config.p2p.fiat,
        config.bcv.page_url
    );

    // Build the source adapters and wire them behind their caches
    let p2p_source = Arc::new(BinanceP2pAdapter::new(config.p2p.clone())?);
    let usd_source = Arc::new(BcvRateAdapter::official_usd(&config.bcv)?);
    let eur_source = Arc::new(BcvRateAdapter::official_eur(&config.bcv)?);

    let rates = Arc::new(RateService::new(
        p2p_source,
        usd_source,
        eur_source,
        Arc::new(SystemClock),
        config.p2p.freshness_secs,
        config.bcv.freshness_secs,
    ));

    let app = router(AppState::new(rates, &config));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    log::info!("Rate API listening on {}", config.server.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            ctrl_c().await.expect("Failed to listen for control-c event");
            log::info!("Shutting down...");
        })
        .await?;

    log::info!("Shutdown complete. Goodbye!");
    Ok(())
}
