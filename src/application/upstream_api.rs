// Traits for the external APIs the dashboard reads from
use crate::application::error::SourceError;
use crate::domain::readings::{CurrentConditions, MonthlyPrice, Observation};
use async_trait::async_trait;

#[async_trait]
pub trait EconomicDataApi: Send + Sync {
    /// Recent observations of the configured series, in any order
    async fn series_observations(&self) -> Result<Vec<Observation>, SourceError>;
}

#[async_trait]
pub trait EnergyPriceApi: Send + Sync {
    /// Recent monthly retail prices for the configured region and sector
    async fn monthly_prices(&self) -> Result<Vec<MonthlyPrice>, SourceError>;
}

#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn current_conditions(&self) -> Result<CurrentConditions, SourceError>;
}

#[async_trait]
pub trait TextGenerationApi: Send + Sync {
    /// Single-turn completion; returns the text of the reply
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, SourceError>;
}
