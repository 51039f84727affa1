// FRED economic data client (series observations)
use crate::application::error::SourceError;
use crate::application::upstream_api::EconomicDataApi;
use crate::domain::readings::Observation;
use crate::infrastructure::config::EconomicSettings;
use crate::infrastructure::http::{build_client, read_json, require_key};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

/// Observations requested per call; a year plus one so a gap or two
/// still leaves two valid points.
const OBSERVATION_LIMIT: u32 = 13;

#[derive(Debug, Clone)]
pub struct FredClient {
    client: reqwest::Client,
    base_url: String,
    series_id: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<RawObservation>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

impl FredClient {
    pub fn new(settings: &EconomicSettings, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            series_id: settings.series_id.clone(),
            api_key,
        })
    }

    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/series/observations?series_id={}&api_key={}&file_type=json&sort_order=desc&limit={}",
            self.base_url,
            urlencoding::encode(&self.series_id),
            urlencoding::encode(api_key),
            OBSERVATION_LIMIT
        )
    }
}

fn into_observations(response: ObservationsResponse) -> Result<Vec<Observation>, SourceError> {
    response
        .observations
        .into_iter()
        .map(|raw| {
            let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d")
                .map_err(|e| SourceError::Malformed(format!("bad observation date {}: {}", raw.date, e)))?;
            Ok(Observation::from_raw(date, &raw.value))
        })
        .collect()
}

#[async_trait]
impl EconomicDataApi for FredClient {
    async fn series_observations(&self) -> Result<Vec<Observation>, SourceError> {
        let api_key = require_key(&self.api_key, "FRED_API_KEY")?;

        tracing::debug!("Requesting FRED series {}", self.series_id);
        let response = self
            .client
            .get(self.build_url(api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        into_observations(read_json(response).await?)
    }
}
