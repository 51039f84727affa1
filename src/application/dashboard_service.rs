// Dashboard service - Use case for assembling the polled snapshot
use crate::application::clock::Clock;
use crate::application::insight_service::InsightService;
use crate::application::metrics_service::MetricsService;
use crate::domain::dashboard::{DashboardData, DashboardSnapshot};
use crate::domain::fingerprint::DataFingerprint;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    metrics: Arc<MetricsService>,
    insights: Arc<InsightService>,
    clock: Arc<dyn Clock>,
}

impl DashboardService {
    pub fn new(metrics: Arc<MetricsService>, insights: Arc<InsightService>, clock: Arc<dyn Clock>) -> Self {
        Self {
            metrics,
            insights,
            clock,
        }
    }

    pub async fn snapshot(&self, force_refresh: bool) -> anyhow::Result<DashboardSnapshot> {
        // Each fetch absorbs its own failure, so one source can't sink the others
        let (production, energy, weather) = tokio::join!(
            self.metrics.production(),
            self.metrics.energy(),
            self.metrics.weather(),
        );

        let fingerprint = DataFingerprint::compute(&production.value, &energy.value, &weather.value)?;
        tracing::debug!(%fingerprint, force_refresh, "computed data fingerprint");

        let served = self
            .insights
            .insight(
                &production.value,
                &energy.value,
                &weather.value,
                &fingerprint,
                force_refresh,
            )
            .await;

        let last_fetched = [production.fetched_at, energy.fetched_at, weather.fetched_at]
            .into_iter()
            .flatten()
            .max()
            .unwrap_or_else(|| self.clock.now());

        Ok(DashboardSnapshot::new(
            DashboardData {
                production: production.value,
                energy: energy.value,
                weather: weather.value,
                insight: served.insight,
            },
            last_fetched,
            served.generated_at,
        ))
    }

    /// Snapshot with every field at its static fallback.
    pub fn fallback_snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot::fallback(self.clock.now())
    }
}
