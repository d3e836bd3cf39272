// src/application/trend.rs
// Day-over-day trend classification with hysteresis

use rust_decimal::Decimal;

use crate::application::ledger::RateHistoryLedger;
use crate::config::TrendConfig;
use crate::domain::models::{Trend, TrendAnalysis};

/// Classifies the market from the rate history plus a just-observed rate.
/// Analyzing an observation persists it; given identical ledger state and
/// input the result is always identical.
pub struct TrendAnalyzer {
    ledger: RateHistoryLedger,
    config: TrendConfig,
}

impl TrendAnalyzer {
    pub fn new(ledger: RateHistoryLedger, config: TrendConfig) -> Self {
        Self { ledger, config }
    }

    pub fn ledger(&self) -> &RateHistoryLedger {
        &self.ledger
    }

    /// Record `current_rate` under today's date, then classify.
    ///
    /// Decision order: a significant same-day move wins outright; otherwise
    /// the recent multi-day picture decides; a multi-day label contradicted
    /// by today's direction is forced back to stable.
    pub fn analyze(&self, current_rate: Decimal) -> TrendAnalysis {
        let prior = self.ledger.history();

        // First observation ever: persist it and report an empty baseline
        if prior.entries.is_empty() {
            self.ledger.record(current_rate);

            return TrendAnalysis {
                trend: Trend::Stable,
                consecutive_days: 0,
                today_change: Decimal::ZERO,
                today_change_percent: Decimal::ZERO,
                previous_day_rate: None,
                advice: "Primera medición del día. Vuelve mañana para ver la tendencia."
                    .to_string(),
            };
        }

        self.ledger.record(current_rate);
        let history = self.ledger.history();

        // Index 0 is the entry just written for today
        let yesterday = match history.entries.get(1) {
            Some(entry) => entry.clone(),
            None => {
                return TrendAnalysis {
                    trend: Trend::Stable,
                    consecutive_days: 1,
                    today_change: Decimal::ZERO,
                    today_change_percent: Decimal::ZERO,
                    previous_day_rate: None,
                    advice: "Acumulando datos. Vuelve mañana para ver la tendencia.".to_string(),
                };
            }
        };

        let today_change = current_rate - yesterday.rate;
        let today_change_percent = today_change / yesterday.rate * Decimal::ONE_HUNDRED;

        let window = history.entries.len().min(self.config.recent_window);
        let recent = &history.entries[..window];

        let mut trend = Trend::Stable;
        let mut consecutive_days = 0u32;

        if today_change_percent >= self.config.significant_change_percent {
            // A significant same-day move defines the trend on its own
            trend = Trend::Bullish;
            consecutive_days = 1;
        } else if today_change_percent <= -self.config.significant_change_percent {
            trend = Trend::Bearish;
            consecutive_days = 1;
        } else if recent.len() >= 2 {
            // Small same-day move: count up/down steps across recent days
            let mut up_days = 0u32;
            let mut down_days = 0u32;

            for pair in recent.windows(2) {
                let prev_rate = pair[1].rate;
                let percent_diff = (pair[0].rate - prev_rate) / prev_rate * Decimal::ONE_HUNDRED;

                if percent_diff > self.config.daily_step_percent {
                    up_days += 1;
                } else if percent_diff < -self.config.daily_step_percent {
                    down_days += 1;
                }
            }

            if up_days >= 2 && up_days > down_days {
                trend = Trend::Bullish;
                consecutive_days = up_days;
            } else if down_days >= 2 && down_days > up_days {
                trend = Trend::Bearish;
                consecutive_days = down_days;
            }

            // A multi-day label that contradicts today's direction reads as
            // wrong next to the number; fall back to stable.
            if trend == Trend::Bearish && today_change_percent > self.config.contradiction_percent
            {
                trend = Trend::Stable;
                consecutive_days = 0;
            }
            if trend == Trend::Bullish
                && today_change_percent < -self.config.contradiction_percent
            {
                trend = Trend::Stable;
                consecutive_days = 0;
            }
        }

        let advice = self.advice_for(trend, today_change_percent);

        TrendAnalysis {
            trend,
            consecutive_days,
            today_change: today_change.round_dp(2),
            today_change_percent: today_change_percent.round_dp(2),
            previous_day_rate: Some(yesterday.rate),
            advice,
        }
    }

    /// Guidance templated on the trend and the magnitude of today's move.
    /// Venezuelan context: the dollar almost always rises, so a rising rate
    /// is the urgent case for bolívar savings.
    fn advice_for(&self, trend: Trend, change_percent: Decimal) -> String {
        let abs_change = change_percent.abs();
        let urgent = abs_change > self.config.urgent_advice_percent;

        match trend {
            Trend::Bullish => {
                if urgent {
                    format!(
                        "🚨 ¡Atención! El dólar subió {}% - Tus bolívares están perdiendo valor \
                         rápidamente. Si tienes ahorros en Bs, considera convertirlos a USDT \
                         para protegerlos.",
                        abs_change.round_dp(1)
                    )
                } else {
                    "📈 El dólar sigue subiendo. Esto significa que tus bolívares valen cada día \
                     un poco menos. Si planeas comprar USDT para proteger tu dinero, mejor hazlo \
                     pronto."
                        .to_string()
                }
            }
            Trend::Bearish => {
                if urgent {
                    format!(
                        "📉 ¡Poco común! El dólar bajó {}%. Esto no suele durar mucho en \
                         Venezuela. Si ya tienes USDT y necesitas Bs, podrías aprovechar la tasa.",
                        abs_change.round_dp(1)
                    )
                } else {
                    "📉 El dólar bajó un poco (raro en Venezuela). Si no es urgente comprar \
                     USDT, puedes esperar a ver si baja más."
                        .to_string()
                }
            }
            Trend::Stable => "➡️ El dólar se mantiene estable estos días. Buen momento para \
                              planificar tus movimientos con calma, sin presiones."
                .to_string(),
        }
    }
}
