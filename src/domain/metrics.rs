// Dashboard metric models and their derivation from raw readings
use super::readings::{CurrentConditions, MonthlyPrice, Observation};
use serde::{Deserialize, Serialize};

pub const PRODUCTION_FALLBACK_INDEX: f64 = 102.4;
pub const PRODUCTION_FALLBACK_TREND: &str = "data unavailable";
pub const PRODUCTION_NO_DATA: &str = "no data";

pub const ENERGY_FALLBACK_CENTS: f64 = 12.5;
/// Percent move between months needed to call the price trend up or down.
pub const ENERGY_TREND_THRESHOLD_PCT: f64 = 2.0;

pub const WEATHER_FALLBACK_TEMP_F: i32 = 75;
pub const WEATHER_FALLBACK_ALERT: &str = "unavailable";
pub const NO_ALERT: &str = "none";
pub const EXTREME_HEAT_F: i32 = 100;
pub const FREEZING_F: i32 = 32;

pub const UP_ARROW: char = '↑';
pub const DOWN_ARROW: char = '↓';
pub const RIGHT_ARROW: char = '→';

/// Weather condition codes treated as severe: thunderstorms, heavy or
/// freezing rain, heavy snow and atmospheric hazards.
pub const SEVERE_CONDITION_CODES: &[u16] = &[
    200, 201, 202, 210, 211, 212, 221, 230, 231, 232, // thunderstorm
    502, 503, 504, 511, 522, 531, // heavy / freezing rain
    602, 622, // heavy snow
    711, 731, 751, 761, 762, 771, 781, // smoke, dust, sand, ash, squalls, tornado
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionMetric {
    pub index: f64,
    pub trend: String,
}

impl ProductionMetric {
    pub fn fallback() -> Self {
        Self {
            index: PRODUCTION_FALLBACK_INDEX,
            trend: PRODUCTION_FALLBACK_TREND.to_string(),
        }
    }

    /// Derive index and month-over-month label from a series.
    ///
    /// Missing points are dropped and the rest sorted by date. Returns `None`
    /// when no valid point remains.
    pub fn from_observations(observations: &[Observation]) -> Option<Self> {
        let mut valid: Vec<(chrono::NaiveDate, f64)> = observations
            .iter()
            .filter_map(|o| o.value.map(|v| (o.date, v)))
            .collect();
        valid.sort_by_key(|(date, _)| *date);

        let (_, latest) = *valid.last()?;
        if valid.len() < 2 {
            return Some(Self {
                index: latest,
                trend: PRODUCTION_NO_DATA.to_string(),
            });
        }

        let (_, previous) = valid[valid.len() - 2];
        Some(Self {
            index: latest,
            trend: month_over_month_label(latest, previous),
        })
    }

    pub fn is_trending_up(&self) -> bool {
        self.trend.starts_with(UP_ARROW)
    }

    pub fn is_trending_down(&self) -> bool {
        self.trend.starts_with(DOWN_ARROW)
    }
}

fn month_over_month_label(latest: f64, previous: f64) -> String {
    let change = if previous == 0.0 {
        0.0
    } else {
        (latest - previous) / previous * 100.0
    };
    let glyph = if change > 0.0 {
        UP_ARROW
    } else if change < 0.0 {
        DOWN_ARROW
    } else {
        RIGHT_ARROW
    };
    format!("{} {:.1}% MoM", glyph, change.abs())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTrend {
    Up,
    Down,
    Stable,
}

impl EnergyTrend {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyTrend::Up => "up",
            EnergyTrend::Down => "down",
            EnergyTrend::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyMetric {
    pub cents_per_kwh: f64,
    pub trend: EnergyTrend,
}

impl EnergyMetric {
    pub fn fallback() -> Self {
        Self {
            cents_per_kwh: ENERGY_FALLBACK_CENTS,
            trend: EnergyTrend::Stable,
        }
    }

    /// Latest price and its trend against the previous month. `None` when the
    /// series is empty.
    pub fn from_prices(prices: &[MonthlyPrice]) -> Option<Self> {
        let mut sorted: Vec<&MonthlyPrice> = prices
            .iter()
            .filter(|p| p.cents_per_kwh.is_finite())
            .collect();
        sorted.sort_by(|a, b| a.period.cmp(&b.period));

        let latest = sorted.last()?.cents_per_kwh;
        let trend = match sorted.len() {
            0 | 1 => EnergyTrend::Stable,
            n => price_trend(latest, sorted[n - 2].cents_per_kwh),
        };

        Some(Self {
            cents_per_kwh: latest,
            trend,
        })
    }
}

fn price_trend(latest: f64, previous: f64) -> EnergyTrend {
    if previous == 0.0 {
        return EnergyTrend::Stable;
    }
    let change = (latest - previous) / previous * 100.0;
    if change > ENERGY_TREND_THRESHOLD_PCT {
        EnergyTrend::Up
    } else if change < -ENERGY_TREND_THRESHOLD_PCT {
        EnergyTrend::Down
    } else {
        EnergyTrend::Stable
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherMetric {
    #[serde(rename = "tempF")]
    pub temp_f: i32,
    pub alert: String,
}

impl WeatherMetric {
    pub fn fallback() -> Self {
        Self {
            temp_f: WEATHER_FALLBACK_TEMP_F,
            alert: WEATHER_FALLBACK_ALERT.to_string(),
        }
    }

    /// Upstream alerts win over anything derived locally; then severe
    /// condition codes, then temperature thresholds.
    pub fn from_conditions(conditions: &CurrentConditions) -> Self {
        let temp_f = conditions.temp_f.round() as i32;

        let upstream = conditions
            .alerts
            .iter()
            .map(|a| a.trim())
            .find(|a| !a.is_empty());

        let alert = if let Some(event) = upstream {
            event.to_string()
        } else if conditions
            .condition_code
            .is_some_and(|code| SEVERE_CONDITION_CODES.contains(&code))
        {
            conditions
                .condition
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| "severe weather".to_string())
        } else if temp_f >= EXTREME_HEAT_F {
            "extreme heat".to_string()
        } else if temp_f <= FREEZING_F {
            "freezing".to_string()
        } else {
            NO_ALERT.to_string()
        };

        Self { temp_f, alert }
    }

    pub fn has_active_alert(&self) -> bool {
        self.alert != NO_ALERT && self.alert != WEATHER_FALLBACK_ALERT
    }
}

pub const SUMMARY_MAX_CHARS: usize = 200;
pub const RECOMMENDATION_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetric {
    pub summary: String,
    pub recommendation: String,
}

impl InsightMetric {
    /// Build an insight, trimming each field to its length limit.
    pub fn new(summary: &str, recommendation: &str) -> Self {
        Self {
            summary: truncate_chars(summary.trim(), SUMMARY_MAX_CHARS),
            recommendation: truncate_chars(recommendation.trim(), RECOMMENDATION_MAX_CHARS),
        }
    }
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
