// Content fingerprint over normalized metrics, used to skip redundant insight runs
use super::metrics::{EnergyMetric, ProductionMetric, WeatherMetric};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Bytes of the SHA-256 digest kept in the fingerprint (128 bits).
const DIGEST_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DataFingerprint(String);

impl DataFingerprint {
    /// Hash a normalized projection of the three metrics. Values that round
    /// to the same projection always produce the same fingerprint.
    pub fn compute(
        production: &ProductionMetric,
        energy: &EnergyMetric,
        weather: &WeatherMetric,
    ) -> serde_json::Result<Self> {
        let normalized = NormalizedMetrics {
            alert: &weather.alert,
            energy_price: round_to(energy.cents_per_kwh, 2),
            energy_trend: energy.trend.as_str(),
            production_index: round_to(production.index, 1),
            production_trend: &production.trend,
            temp_f: round_to_step(weather.temp_f, 5),
        };

        // Fields are declared in key order, so the serialization is canonical.
        let canonical = serde_json::to_vec(&normalized)?;
        let digest = Sha256::digest(&canonical);
        Ok(Self(hex::encode(&digest[..DIGEST_BYTES])))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DataFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize)]
struct NormalizedMetrics<'a> {
    alert: &'a str,
    energy_price: f64,
    energy_trend: &'a str,
    production_index: f64,
    production_trend: &'a str,
    temp_f: i32,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    // -0.0 and 0.0 serialize differently
    if rounded == 0.0 { 0.0 } else { rounded }
}

fn round_to_step(value: i32, step: i32) -> i32 {
    ((value as f64 / step as f64).round() as i32) * step
}
