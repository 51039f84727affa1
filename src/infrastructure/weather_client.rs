// OpenWeather One Call client (current conditions and alerts)
use crate::application::error::SourceError;
use crate::application::upstream_api::WeatherApi;
use crate::domain::readings::CurrentConditions;
use crate::infrastructure::config::WeatherSettings;
use crate::infrastructure::http::{build_client, read_json, require_key};
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OneCallResponse {
    current: Current,
    #[serde(default)]
    alerts: Vec<Alert>,
}

#[derive(Debug, Deserialize)]
struct Current {
    temp: f64,
    #[serde(default)]
    weather: Vec<Condition>,
}

#[derive(Debug, Deserialize)]
struct Condition {
    id: u16,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Alert {
    event: String,
}

impl WeatherClient {
    pub fn new(settings: &WeatherSettings, api_key: Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_client(settings.timeout_secs)?,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            latitude: settings.latitude,
            longitude: settings.longitude,
            api_key,
        })
    }

    fn build_url(&self, api_key: &str) -> String {
        format!(
            "{}/onecall?lat={}&lon={}&units=imperial&exclude=minutely,hourly,daily&appid={}",
            self.base_url,
            self.latitude,
            self.longitude,
            urlencoding::encode(api_key)
        )
    }
}

fn into_conditions(response: OneCallResponse) -> CurrentConditions {
    let condition = response.current.weather.into_iter().next();
    CurrentConditions {
        temp_f: response.current.temp,
        condition_code: condition.as_ref().map(|c| c.id),
        condition: condition.and_then(|c| c.description),
        alerts: response.alerts.into_iter().map(|a| a.event).collect(),
    }
}

#[async_trait]
impl WeatherApi for WeatherClient {
    async fn current_conditions(&self) -> Result<CurrentConditions, SourceError> {
        let api_key = require_key(&self.api_key, "OPENWEATHER_API_KEY")?;

        tracing::debug!("Requesting weather at {},{}", self.latitude, self.longitude);
        let response = self.client.get(self.build_url(api_key)).send().await?;
        let body: OneCallResponse = read_json(response).await?;

        if !body.current.temp.is_finite() {
            return Err(SourceError::Malformed("non-finite temperature".to_string()));
        }
        Ok(into_conditions(body))
    }
}
