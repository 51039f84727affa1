// Test doubles for the clock and the upstream APIs
use crate::application::clock::Clock;
use crate::application::error::SourceError;
use crate::application::upstream_api::{
    EconomicDataApi, EnergyPriceApi, TextGenerationApi, WeatherApi,
};
use crate::domain::readings::{CurrentConditions, MonthlyPrice, Observation};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: TimeDelta) {
        *self.now.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Canned upstream response; `None` makes the call fail with a 503.
pub struct Canned<T> {
    response: Mutex<Option<T>>,
    calls: AtomicUsize,
}

impl<T: Clone> Canned<T> {
    pub fn ok(value: T) -> Self {
        Self {
            response: Mutex::new(Some(value)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn respond_with(&self, value: Option<T>) {
        *self.response.lock() = value;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer(&self) -> Result<T, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.lock().clone().ok_or(SourceError::HttpStatus {
            status: 503,
            body: "unavailable".to_string(),
        })
    }
}

pub type FakeEconomicApi = Canned<Vec<Observation>>;
pub type FakeEnergyApi = Canned<Vec<MonthlyPrice>>;
pub type FakeWeatherApi = Canned<CurrentConditions>;
pub type FakeTextApi = Canned<String>;

#[async_trait]
impl EconomicDataApi for Canned<Vec<Observation>> {
    async fn series_observations(&self) -> Result<Vec<Observation>, SourceError> {
        self.answer()
    }
}

#[async_trait]
impl EnergyPriceApi for Canned<Vec<MonthlyPrice>> {
    async fn monthly_prices(&self) -> Result<Vec<MonthlyPrice>, SourceError> {
        self.answer()
    }
}

#[async_trait]
impl WeatherApi for Canned<CurrentConditions> {
    async fn current_conditions(&self) -> Result<CurrentConditions, SourceError> {
        self.answer()
    }
}

#[async_trait]
impl TextGenerationApi for Canned<String> {
    async fn complete(&self, _system: &str, _prompt: &str) -> Result<String, SourceError> {
        self.answer()
    }
}

/// INDPRO-like series rising from 100.0 to 101.0.
pub fn rising_production() -> Vec<Observation> {
    vec![
        Observation::from_raw(NaiveDate::from_ymd_opt(2024, 4, 1).unwrap(), "100.0"),
        Observation::from_raw(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(), "101.0"),
    ]
}

pub fn steady_prices() -> Vec<MonthlyPrice> {
    vec![
        MonthlyPrice::new("2024-04", 15.0),
        MonthlyPrice::new("2024-05", 15.1),
    ]
}

pub fn mild_weather() -> CurrentConditions {
    CurrentConditions {
        temp_f: 72.0,
        condition_code: Some(800),
        condition: Some("clear sky".to_string()),
        alerts: Vec::new(),
    }
}

pub fn insight_reply() -> String {
    r#"{"summary": "Output is up while prices hold steady.", "recommendation": "Lock in current energy rates."}"#
        .to_string()
}
