// src/application/ledger.rs
// Bounded per-day history of observed rates

use rust_decimal::Decimal;
use std::sync::Arc;

use crate::config::LedgerConfig;
use crate::domain::models::{LedgerEntry, RateHistory};
use crate::domain::repository::{Clock, KeyValueStore};

/// Append-per-day log of observed rates behind trend analysis. At most one
/// entry per UTC calendar day (a same-day re-observation overwrites in
/// place), newest first, capped to a bounded window of most-recent days.
pub struct RateHistoryLedger {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    storage_key: String,
    max_entries: usize,
}

impl RateHistoryLedger {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, config: &LedgerConfig) -> Self {
        Self {
            store,
            clock,
            storage_key: config.storage_key.clone(),
            max_entries: config.max_entries,
        }
    }

    /// Record an observation under today's date and persist synchronously.
    /// A persistence failure costs at most one day's history point, so it is
    /// logged and swallowed.
    pub fn record(&self, rate: Decimal) {
        let mut history = self.history();
        let now = self.clock.now();
        let today = now.date_naive();

        let entry = LedgerEntry {
            rate,
            timestamp: now,
        };

        match history
            .entries
            .iter_mut()
            .find(|e| e.timestamp.date_naive() == today)
        {
            Some(existing) => *existing = entry,
            None => history.entries.insert(0, entry),
        }

        history.entries.truncate(self.max_entries);

        match serde_json::to_string(&history) {
            Ok(json) => {
                if let Err(e) = self.store.set(&self.storage_key, &json) {
                    log::warn!("Failed to persist rate history: {}", e);
                }
            }
            Err(e) => log::warn!("Failed to serialize rate history: {}", e),
        }
    }

    /// Full history, newest first. Never fails: missing or corrupt persisted
    /// data reads as an empty ledger.
    pub fn history(&self) -> RateHistory {
        let Some(raw) = self.store.get(&self.storage_key) else {
            return RateHistory::default();
        };

        match serde_json::from_str(&raw) {
            Ok(history) => history,
            Err(e) => {
                log::warn!("Corrupt rate history, starting empty: {}", e);
                RateHistory::default()
            }
        }
    }

    /// The `count` most recent entries
    pub fn recent_entries(&self, count: usize) -> Vec<LedgerEntry> {
        let mut entries = self.history().entries;
        entries.truncate(count);
        entries
    }
}
