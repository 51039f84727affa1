// Raw upstream readings, before any trend or alert derivation
use chrono::NaiveDate;

/// Value the economic-data API reports for a period with no observation.
pub const MISSING_VALUE: &str = ".";

/// One point of an economic time series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    /// Build from the API's string value; the missing marker and unparsable
    /// text both become `None`.
    pub fn from_raw(date: NaiveDate, raw: &str) -> Self {
        let raw = raw.trim();
        let value = if raw == MISSING_VALUE {
            None
        } else {
            raw.parse::<f64>().ok().filter(|v| v.is_finite())
        };
        Self { date, value }
    }
}

/// Average retail electricity price for one month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyPrice {
    /// `YYYY-MM`
    pub period: String,
    pub cents_per_kwh: f64,
}

impl MonthlyPrice {
    pub fn new(period: impl Into<String>, cents_per_kwh: f64) -> Self {
        Self {
            period: period.into(),
            cents_per_kwh,
        }
    }
}

/// Current conditions at the configured coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CurrentConditions {
    pub temp_f: f64,
    pub condition_code: Option<u16>,
    pub condition: Option<String>,
    /// Event names from the upstream alert feed, most relevant first.
    pub alerts: Vec<String>,
}
