// src/application/context.rs
// Rate context handed to the AI chat assistant

use crate::application::service::RateService;

/// Assemble the plain-text rate block injected into the chat assistant's
/// system prompt. Best-effort by construction: it reads the best-known
/// (possibly stale) entry per source and omits sources that have never
/// produced a reading, so it can never fail.
pub async fn assemble_rate_context(rates: &RateService) -> String {
    let mut lines = Vec::new();

    if let Some(snapshot) = rates.peek_p2p().await {
        lines.push(format!(
            "Tasa Dólar Paralelo: {} Bs",
            snapshot.payload.average_price
        ));
    }

    if let Some(usd) = rates.peek_official_usd().await {
        lines.push(format!("Tasa BCV: {} Bs", usd.payload.value));
    }

    if let Some(eur) = rates.peek_official_eur().await {
        lines.push(format!("Tasa Euro: {} Bs", eur.payload.value));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{SourceError, SourceResult};
    use crate::domain::models::{P2pSnapshot, RateReading, RateSource};
    use crate::domain::repository::{OfficialRateSource, P2pMarketSource, SystemClock};
    use async_trait::async_trait;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct FakeP2p(Option<Decimal>);

    #[async_trait]
    impl P2pMarketSource for FakeP2p {
        async fn fetch_snapshot(&self) -> SourceResult<P2pSnapshot> {
            match self.0 {
                Some(average) => Ok(P2pSnapshot {
                    average_price: average,
                    first_price: average,
                    sample_prices: vec![average],
                    sample_size: 1,
                    reference_change_percent: Decimal::ZERO,
                    observed_at: Utc::now(),
                }),
                None => Err(SourceError::EmptyResult("no ads".to_string())),
            }
        }
    }

    struct FakeOfficial(RateSource, Option<Decimal>);

    #[async_trait]
    impl OfficialRateSource for FakeOfficial {
        async fn fetch_rate(&self) -> SourceResult<RateReading> {
            match self.1 {
                Some(value) => Ok(RateReading {
                    value,
                    source: self.0,
                    observed_at: Utc::now(),
                }),
                None => Err(SourceError::Parse("element missing".to_string())),
            }
        }
    }

    fn service(
        p2p: Option<Decimal>,
        usd: Option<Decimal>,
        eur: Option<Decimal>,
    ) -> RateService {
        RateService::new(
            Arc::new(FakeP2p(p2p)),
            Arc::new(FakeOfficial(RateSource::OfficialUsd, usd)),
            Arc::new(FakeOfficial(RateSource::OfficialEur, eur)),
            Arc::new(SystemClock),
            30,
            600,
        )
    }

    #[tokio::test]
    async fn context_lists_every_known_source() {
        let rates = service(Some(dec!(598.12)), Some(dec!(36.50)), Some(dec!(39.80)));
        rates.p2p_market().await.unwrap();
        rates.official_usd().await.unwrap();
        rates.official_eur().await.unwrap();

        let context = assemble_rate_context(&rates).await;

        assert_eq!(
            context,
            "Tasa Dólar Paralelo: 598.12 Bs\nTasa BCV: 36.50 Bs\nTasa Euro: 39.80 Bs"
        );
    }

    #[tokio::test]
    async fn sources_that_never_succeeded_are_omitted() {
        let rates = service(Some(dec!(598.12)), None, Some(dec!(39.80)));
        rates.p2p_market().await.unwrap();
        let _ = rates.official_usd().await;
        rates.official_eur().await.unwrap();

        let context = assemble_rate_context(&rates).await;

        assert_eq!(
            context,
            "Tasa Dólar Paralelo: 598.12 Bs\nTasa Euro: 39.80 Bs"
        );
    }

    #[tokio::test]
    async fn cold_start_yields_an_empty_context() {
        let rates = service(None, None, None);
        assert_eq!(assemble_rate_context(&rates).await, "");
    }
}
