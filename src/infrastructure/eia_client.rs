// EIA electricity retail price client
use crate::application::error::SourceError;
use crate::application::upstream_api::EnergyPriceApi;
use crate::domain::readings::MonthlyPrice;
use crate::infrastructure::config::EnergySettings;
use crate::infrastructure::http::{build_client, read_json, require_key};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct EiaClient {
    client: reqwest::Client,
    base_url: String,
    state: String,
    sector: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EiaEnvelope {
    response: EiaResponse,
}

#[derive(Debug, Deserialize)]
struct EiaResponse {
    #[serde(default)]
    data: Vec<EiaRow>,
}

#[derive(Debug, Deserialize)]
struct EiaRow {
    period: String,
    // EIA returns prices as strings, numbers or null depending on the series
    #[serde(default)]
    price: serde_json::Value,
}

impl EiaClient {
    pub fn new(settings: &EnergySettings, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            state: settings.state.clone(),
            sector: settings.sector.clone(),
            api_key,
        })
    }

    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/electricity/retail-sales/data/?api_key={}&frequency=monthly&data[0]=price\
             &facets[stateid][]={}&facets[sectorid][]={}\
             &sort[0][column]=period&sort[0][direction]=desc&offset=0&length=2",
            self.base_url,
            urlencoding::encode(api_key),
            urlencoding::encode(&self.state),
            urlencoding::encode(&self.sector),
        )
    }
}

fn price_value(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn into_prices(envelope: EiaEnvelope) -> Vec<MonthlyPrice> {
    envelope
        .response
        .data
        .into_iter()
        .filter_map(|row| price_value(&row.price).map(|price| MonthlyPrice::new(row.period, price)))
        .collect()
}

#[async_trait]
impl EnergyPriceApi for EiaClient {
    async fn monthly_prices(&self) -> Result<Vec<MonthlyPrice>, SourceError> {
        let api_key = require_key(&self.api_key, "EIA_API_KEY")?;

        tracing::debug!("Requesting EIA retail price for {}/{}", self.state, self.sector);
        let response = self.client.get(self.build_url(api_key)).send().await?;

        Ok(into_prices(read_json(response).await?))
    }
}
