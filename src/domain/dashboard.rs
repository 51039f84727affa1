// Dashboard snapshot returned to pollers
use super::insight_rules::generic_insight;
use super::metrics::{EnergyMetric, InsightMetric, ProductionMetric, WeatherMetric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardData {
    pub production: ProductionMetric,
    pub energy: EnergyMetric,
    pub weather: WeatherMetric,
    pub insight: InsightMetric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub data: DashboardData,
    pub last_fetched: DateTime<Utc>,
    pub last_insight_run: Option<DateTime<Utc>>,
}

impl DashboardSnapshot {
    pub fn new(
        data: DashboardData,
        last_fetched: DateTime<Utc>,
        last_insight_run: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            data,
            last_fetched,
            last_insight_run,
        }
    }

    /// Every field at its static fallback, with no insight run.
    pub fn fallback(now: DateTime<Utc>) -> Self {
        Self::new(
            DashboardData {
                production: ProductionMetric::fallback(),
                energy: EnergyMetric::fallback(),
                weather: WeatherMetric::fallback(),
                insight: generic_insight(),
            },
            now,
            None,
        )
    }
}
