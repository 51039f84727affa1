// Shared cache-then-fetch-then-fallback routine for every metric source
use crate::application::clock::Clock;
use crate::application::error::SourceError;
use crate::application::ttl_cache::TtlCache;
use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;

/// A metric together with when it was fetched. `fetched_at` is `None` when
/// the value is a static fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReading<T> {
    pub value: T,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl<T> SourceReading<T> {
    pub fn fallback(value: T) -> Self {
        Self {
            value,
            fetched_at: None,
        }
    }
}

/// Serve `key` from `cache` if fresh; otherwise run `fetch`, caching a
/// success for `ttl`. Any failure is logged and replaced by `fallback`.
pub async fn fetch_with_fallback<T, F, Fut>(
    source: &'static str,
    cache: &TtlCache<SourceReading<T>>,
    clock: &dyn Clock,
    key: &str,
    ttl: TimeDelta,
    fetch: F,
    fallback: impl FnOnce() -> T,
) -> SourceReading<T>
where
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
{
    if let Some(cached) = cache.get(key) {
        tracing::debug!(source, key, "serving cached reading");
        return cached;
    }

    match fetch().await {
        Ok(value) => {
            let reading = SourceReading {
                value,
                fetched_at: Some(clock.now()),
            };
            cache.set(key, reading.clone(), ttl);
            tracing::info!(source, key, "fetched fresh reading");
            reading
        }
        Err(e) => {
            tracing::warn!(source, key, error = %e, "fetch failed, using fallback");
            SourceReading::fallback(fallback())
        }
    }
}
