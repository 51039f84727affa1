// Metrics service - Cached, fault-isolated reads of the three data sources
use crate::application::clock::Clock;
use crate::application::error::SourceError;
use crate::application::source_fetch::{SourceReading, fetch_with_fallback};
use crate::application::ttl_cache::TtlCache;
use crate::application::upstream_api::{EconomicDataApi, EnergyPriceApi, WeatherApi};
use crate::domain::metrics::{EnergyMetric, ProductionMetric, WeatherMetric};
use crate::infrastructure::config::CacheSettings;
use std::sync::Arc;

const PRODUCTION_KEY: &str = "production";
const ENERGY_KEY: &str = "energy";
const WEATHER_KEY: &str = "weather";

pub struct MetricsService {
    economic_api: Arc<dyn EconomicDataApi>,
    energy_api: Arc<dyn EnergyPriceApi>,
    weather_api: Arc<dyn WeatherApi>,
    production_cache: TtlCache<SourceReading<ProductionMetric>>,
    energy_cache: TtlCache<SourceReading<EnergyMetric>>,
    weather_cache: TtlCache<SourceReading<WeatherMetric>>,
    settings: CacheSettings,
    clock: Arc<dyn Clock>,
}

impl MetricsService {
    pub fn new(
        economic_api: Arc<dyn EconomicDataApi>,
        energy_api: Arc<dyn EnergyPriceApi>,
        weather_api: Arc<dyn WeatherApi>,
        settings: CacheSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            economic_api,
            energy_api,
            weather_api,
            production_cache: TtlCache::new(clock.clone()),
            energy_cache: TtlCache::new(clock.clone()),
            weather_cache: TtlCache::new(clock.clone()),
            settings,
            clock,
        }
    }

    pub async fn production(&self) -> SourceReading<ProductionMetric> {
        fetch_with_fallback(
            PRODUCTION_KEY,
            &self.production_cache,
            self.clock.as_ref(),
            PRODUCTION_KEY,
            self.settings.production_ttl(),
            move || async move {
                let observations = self.economic_api.series_observations().await?;
                ProductionMetric::from_observations(&observations)
                    .ok_or_else(|| SourceError::Malformed("no valid observations".to_string()))
            },
            ProductionMetric::fallback,
        )
        .await
    }

    pub async fn energy(&self) -> SourceReading<EnergyMetric> {
        fetch_with_fallback(
            ENERGY_KEY,
            &self.energy_cache,
            self.clock.as_ref(),
            ENERGY_KEY,
            self.settings.energy_ttl(),
            move || async move {
                let prices = self.energy_api.monthly_prices().await?;
                EnergyMetric::from_prices(&prices)
                    .ok_or_else(|| SourceError::Malformed("no monthly prices".to_string()))
            },
            EnergyMetric::fallback,
        )
        .await
    }

    pub async fn weather(&self) -> SourceReading<WeatherMetric> {
        fetch_with_fallback(
            WEATHER_KEY,
            &self.weather_cache,
            self.clock.as_ref(),
            WEATHER_KEY,
            self.settings.weather_ttl(),
            move || async move {
                let conditions = self.weather_api.current_conditions().await?;
                Ok(WeatherMetric::from_conditions(&conditions))
            },
            WeatherMetric::fallback,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use chrono::TimeDelta;

    struct Fixture {
        clock: Arc<ManualClock>,
        economic: Arc<FakeEconomicApi>,
        energy: Arc<FakeEnergyApi>,
        weather: Arc<FakeWeatherApi>,
        service: MetricsService,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let economic = Arc::new(FakeEconomicApi::ok(rising_production()));
        let energy = Arc::new(FakeEnergyApi::ok(steady_prices()));
        let weather = Arc::new(FakeWeatherApi::ok(mild_weather()));
        let service = MetricsService::new(
            economic.clone(),
            energy.clone(),
            weather.clone(),
            CacheSettings::default(),
            clock.clone(),
        );
        Fixture {
            clock,
            economic,
            energy,
            weather,
            service,
        }
    }

    #[tokio::test]
    async fn test_live_values() {
        let f = fixture();

        let production = f.service.production().await;
        assert_eq!(production.value.index, 101.0);
        assert_eq!(production.value.trend, "↑ 1.0% MoM");
        assert_eq!(production.fetched_at, Some(f.clock.now()));

        let energy = f.service.energy().await;
        assert_eq!(energy.value.cents_per_kwh, 15.1);

        let weather = f.service.weather().await;
        assert_eq!(weather.value.temp_f, 72);
        assert_eq!(weather.value.alert, "none");
    }

    #[tokio::test]
    async fn test_each_source_has_its_own_ttl() {
        let f = fixture();
        f.service.production().await;
        f.service.energy().await;
        f.service.weather().await;

        f.clock.advance(TimeDelta::minutes(10));
        f.service.production().await;
        f.service.energy().await;
        f.service.weather().await;
        assert_eq!(f.economic.calls(), 1);
        assert_eq!(f.energy.calls(), 2);
        assert_eq!(f.weather.calls(), 1);

        f.clock.advance(TimeDelta::minutes(5));
        f.service.weather().await;
        assert_eq!(f.weather.calls(), 2);

        f.clock.advance(TimeDelta::minutes(45));
        f.service.production().await;
        assert_eq!(f.economic.calls(), 2);
    }

    #[tokio::test]
    async fn test_failures_return_documented_fallbacks() {
        let f = fixture();
        f.economic.respond_with(None);
        f.energy.respond_with(None);
        f.weather.respond_with(None);

        let production = f.service.production().await;
        assert_eq!(production, SourceReading::fallback(ProductionMetric::fallback()));
        assert_eq!(production.value.index, 102.4);
        assert_eq!(production.value.trend, "data unavailable");

        let energy = f.service.energy().await;
        assert_eq!(energy.value.cents_per_kwh, 12.5);
        assert_eq!(energy.fetched_at, None);

        let weather = f.service.weather().await;
        assert_eq!(weather.value.temp_f, 75);
        assert_eq!(weather.value.alert, "unavailable");
    }

    #[tokio::test]
    async fn test_empty_series_is_treated_as_failure() {
        let f = fixture();
        f.economic.respond_with(Some(Vec::new()));
        f.energy.respond_with(Some(Vec::new()));

        assert_eq!(f.service.production().await.value, ProductionMetric::fallback());
        assert_eq!(f.service.energy().await.value, EnergyMetric::fallback());
    }

    #[tokio::test]
    async fn test_fallback_is_retried_next_call() {
        let f = fixture();
        f.weather.respond_with(None);
        assert_eq!(f.service.weather().await.fetched_at, None);

        f.weather.respond_with(Some(mild_weather()));
        assert!(f.service.weather().await.fetched_at.is_some());
        assert_eq!(f.weather.calls(), 2);
    }
}
