// src/application/cache.rs
// Per-source response cache with stale-data fallback

use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::errors::{CacheError, CacheResult, SourceResult};
use crate::domain::repository::Clock;

/// A reading as served by the cache layer
#[derive(Debug, Clone)]
pub struct Cached<T> {
    pub payload: T,

    /// When the underlying fetch succeeded
    pub captured_at: DateTime<Utc>,

    /// True when the reading was served without touching the upstream source
    pub from_cache: bool,

    /// True when the reading is past its freshness window and the refresh
    /// attempt failed
    pub is_stale: bool,

    /// Age in seconds, annotated on stale serves only
    pub age_secs: Option<u64>,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    payload: T,
    captured_at: DateTime<Utc>,
}

/// One cache slot per upstream source, owned by the composition root and
/// shared across requests. An entry is only ever replaced wholesale by a
/// newer successful fetch; failures keep the previous entry alive.
pub struct SourceCache<T> {
    name: &'static str,
    freshness: Duration,
    clock: Arc<dyn Clock>,
    entry: Mutex<Option<CacheEntry<T>>>,
}

impl<T: Clone> SourceCache<T> {
    pub fn new(name: &'static str, freshness_secs: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            freshness: Duration::seconds(freshness_secs as i64),
            clock,
            entry: Mutex::new(None),
        }
    }

    /// Serve from the cache within the freshness window; otherwise run the
    /// fetch. A failed fetch falls back to the previous entry (marked stale)
    /// and only errors when no entry has ever existed.
    pub async fn get_or_fetch<F, Fut>(&self, fetch: F) -> CacheResult<Cached<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = SourceResult<T>>,
    {
        {
            let entry = self.entry.lock().await;
            if let Some(e) = entry.as_ref() {
                if self.clock.now() - e.captured_at < self.freshness {
                    return Ok(Cached {
                        payload: e.payload.clone(),
                        captured_at: e.captured_at,
                        from_cache: true,
                        is_stale: false,
                        age_secs: None,
                    });
                }
            }
        }

        // The lock is not held across the upstream call. Overlapping expired
        // reads may each fetch once; the last wholesale replace wins.
        match fetch().await {
            Ok(payload) => {
                let captured_at = self.clock.now();
                let mut entry = self.entry.lock().await;
                *entry = Some(CacheEntry {
                    payload: payload.clone(),
                    captured_at,
                });

                Ok(Cached {
                    payload,
                    captured_at,
                    from_cache: false,
                    is_stale: false,
                    age_secs: None,
                })
            }
            Err(err) => {
                let entry = self.entry.lock().await;
                match entry.as_ref() {
                    Some(e) => {
                        let age = (self.clock.now() - e.captured_at).num_seconds().max(0) as u64;
                        log::warn!(
                            "{} fetch failed, serving stale data ({}s old): {}",
                            self.name,
                            age,
                            err
                        );

                        Ok(Cached {
                            payload: e.payload.clone(),
                            captured_at: e.captured_at,
                            from_cache: true,
                            is_stale: true,
                            age_secs: Some(age),
                        })
                    }
                    None => Err(CacheError::NoDataAvailable(err)),
                }
            }
        }
    }

    /// Best-known reading, possibly stale, without touching upstream.
    /// Never fails; `None` only when no fetch has ever succeeded.
    pub async fn peek(&self) -> Option<Cached<T>> {
        let entry = self.entry.lock().await;
        entry.as_ref().map(|e| {
            let age = self.clock.now() - e.captured_at;
            let is_stale = age >= self.freshness;

            Cached {
                payload: e.payload.clone(),
                captured_at: e.captured_at,
                from_cache: true,
                is_stale,
                age_secs: is_stale.then(|| age.num_seconds().max(0) as u64),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::SourceError;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ManualClock(std::sync::Mutex<DateTime<Utc>>);

    impl ManualClock {
        fn starting() -> Arc<Self> {
            let start = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
            Arc::new(Self(std::sync::Mutex::new(start)))
        }

        fn advance_secs(&self, secs: i64) {
            *self.0.lock().unwrap() += Duration::seconds(secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    #[tokio::test]
    async fn only_the_first_call_within_the_window_fetches() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock.clone());
        let calls = Arc::new(AtomicUsize::new(0));

        for i in 0..3 {
            let calls = calls.clone();
            let out = cache
                .get_or_fetch(|| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(41)
                })
                .await
                .unwrap();

            assert_eq!(out.payload, 41);
            assert_eq!(out.from_cache, i > 0);
            assert!(!out.is_stale);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock.clone());

        cache.get_or_fetch(|| async { Ok(1) }).await.unwrap();
        clock.advance_secs(31);

        let out = cache.get_or_fetch(|| async { Ok(2) }).await.unwrap();
        assert_eq!(out.payload, 2);
        assert!(!out.from_cache);
    }

    #[tokio::test]
    async fn repeated_failures_keep_serving_the_last_good_reading() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock.clone());

        cache.get_or_fetch(|| async { Ok(7) }).await.unwrap();
        clock.advance_secs(45);

        for _ in 0..3 {
            let out = cache
                .get_or_fetch(|| async {
                    Err(SourceError::UpstreamHttp("boom".to_string()))
                })
                .await
                .unwrap();

            assert_eq!(out.payload, 7);
            assert!(out.from_cache);
            assert!(out.is_stale);
            assert_eq!(out.age_secs, Some(45));
        }
    }

    #[tokio::test]
    async fn cold_failure_propagates() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock);

        let err = cache
            .get_or_fetch(|| async { Err(SourceError::EmptyResult("no ads".to_string())) })
            .await
            .unwrap_err();

        assert!(matches!(err, CacheError::NoDataAvailable(_)));
    }

    #[tokio::test]
    async fn recovery_after_failures_replaces_the_entry() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock.clone());

        cache.get_or_fetch(|| async { Ok(7) }).await.unwrap();
        clock.advance_secs(60);
        cache
            .get_or_fetch(|| async { Err(SourceError::UpstreamHttp("down".to_string())) })
            .await
            .unwrap();

        let out = cache.get_or_fetch(|| async { Ok(9) }).await.unwrap();
        assert_eq!(out.payload, 9);
        assert!(!out.is_stale);
    }

    #[tokio::test]
    async fn peek_reports_staleness_without_fetching() {
        let clock = ManualClock::starting();
        let cache: SourceCache<i32> = SourceCache::new("test", 30, clock.clone());

        assert!(cache.peek().await.is_none());

        cache.get_or_fetch(|| async { Ok(5) }).await.unwrap();
        let fresh = cache.peek().await.unwrap();
        assert!(!fresh.is_stale);
        assert_eq!(fresh.age_secs, None);

        clock.advance_secs(90);
        let stale = cache.peek().await.unwrap();
        assert_eq!(stale.payload, 5);
        assert!(stale.is_stale);
        assert_eq!(stale.age_secs, Some(90));
    }
}
