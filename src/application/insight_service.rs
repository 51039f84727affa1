// Insight service - Generated commentary, cached by data fingerprint
use crate::application::clock::Clock;
use crate::application::error::SourceError;
use crate::application::ttl_cache::TtlCache;
use crate::application::upstream_api::TextGenerationApi;
use crate::domain::fingerprint::DataFingerprint;
use crate::domain::insight_rules::rule_based_insight;
use crate::domain::metrics::{
    EnergyMetric, InsightMetric, ProductionMetric, RECOMMENDATION_MAX_CHARS, SUMMARY_MAX_CHARS,
    WeatherMetric,
};
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InsightParseError {
    #[error("no JSON object in reply")]
    NoJsonObject,
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("unexpected shape: {0}")]
    Shape(String),
}

#[derive(Debug, Error)]
enum InsightError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Parse(#[from] InsightParseError),
}

/// A generated insight and when it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct InsightRecord {
    pub insight: InsightMetric,
    pub generated_at: DateTime<Utc>,
}

/// What the dashboard shows; `generated_at` is `None` for rule-based text.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedInsight {
    pub insight: InsightMetric,
    pub generated_at: Option<DateTime<Utc>>,
}

impl From<InsightRecord> for ServedInsight {
    fn from(record: InsightRecord) -> Self {
        Self {
            insight: record.insight,
            generated_at: Some(record.generated_at),
        }
    }
}

pub struct InsightService {
    api: Arc<dyn TextGenerationApi>,
    cache: TtlCache<InsightRecord>,
    latest: Mutex<Option<InsightRecord>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl InsightService {
    pub fn new(api: Arc<dyn TextGenerationApi>, ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            cache: TtlCache::new(clock.clone()),
            latest: Mutex::new(None),
            ttl,
            clock,
        }
    }

    /// Serve the cached insight for `fingerprint`, generating a new one when
    /// there is none or `force_refresh` is set. Never fails: a failed
    /// generation falls back to this fingerprint's last insight, then the
    /// most recent insight of any fingerprint, then the rule table.
    pub async fn insight(
        &self,
        production: &ProductionMetric,
        energy: &EnergyMetric,
        weather: &WeatherMetric,
        fingerprint: &DataFingerprint,
        force_refresh: bool,
    ) -> ServedInsight {
        let key = fingerprint.as_str();
        let previous = self.cache.peek(key);

        if !force_refresh {
            if let Some(record) = self.cache.get(key) {
                tracing::debug!(%fingerprint, "reusing cached insight");
                return record.into();
            }
        }

        match self.generate(production, energy, weather).await {
            Ok(insight) => {
                let record = InsightRecord {
                    insight,
                    generated_at: self.clock.now(),
                };
                self.cache.set(key, record.clone(), self.ttl);
                *self.latest.lock() = Some(record.clone());
                tracing::info!(%fingerprint, force_refresh, "generated new insight");
                record.into()
            }
            Err(e) => {
                tracing::warn!(%fingerprint, error = %e, "insight generation failed");
                if let Some(record) = previous {
                    return record.into();
                }
                if let Some(record) = self.latest.lock().clone() {
                    return record.into();
                }
                ServedInsight {
                    insight: rule_based_insight(production, energy, weather),
                    generated_at: None,
                }
            }
        }
    }

    async fn generate(
        &self,
        production: &ProductionMetric,
        energy: &EnergyMetric,
        weather: &WeatherMetric,
    ) -> Result<InsightMetric, InsightError> {
        let prompt = build_prompt(production, energy, weather);
        let reply = self.api.complete(&system_instruction(), &prompt).await?;
        Ok(parse_insight(&reply)?)
    }
}

fn system_instruction() -> String {
    format!(
        "You are a concise regional economic analyst. Reply with only a JSON object \
         with exactly two string keys: \"summary\" (at most {} characters) and \
         \"recommendation\" (at most {} characters). No markdown, no extra keys.",
        SUMMARY_MAX_CHARS, RECOMMENDATION_MAX_CHARS
    )
}

fn build_prompt(production: &ProductionMetric, energy: &EnergyMetric, weather: &WeatherMetric) -> String {
    format!(
        "Current regional indicators:\n\
         - Industrial production index: {:.1} ({})\n\
         - Residential electricity price: {:.2} cents/kWh (trend: {})\n\
         - Local weather: {}°F (alert: {})\n\n\
         Summarize what these mean together for a local business and give one practical recommendation.",
        production.index,
        production.trend,
        energy.cents_per_kwh,
        energy.trend.as_str(),
        weather.temp_f,
        weather.alert,
    )
}

#[derive(Deserialize)]
struct RawInsight {
    summary: String,
    recommendation: String,
}

/// Pull the first `{ ... }` span out of a model reply and validate it.
pub fn parse_insight(reply: &str) -> Result<InsightMetric, InsightParseError> {
    let start = reply.find('{').ok_or(InsightParseError::NoJsonObject)?;
    let end = reply.rfind('}').ok_or(InsightParseError::NoJsonObject)?;
    if end < start {
        return Err(InsightParseError::NoJsonObject);
    }

    let value: serde_json::Value =
        serde_json::from_str(&reply[start..=end]).map_err(InsightParseError::InvalidJson)?;
    let raw: RawInsight =
        serde_json::from_value(value).map_err(|e| InsightParseError::Shape(e.to_string()))?;

    if raw.summary.trim().is_empty() || raw.recommendation.trim().is_empty() {
        return Err(InsightParseError::Shape("empty field".to_string()));
    }

    Ok(InsightMetric::new(&raw.summary, &raw.recommendation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::*;
    use crate::domain::insight_rules::generic_insight;
    use crate::domain::metrics::EnergyTrend;

    struct Fixture {
        clock: Arc<ManualClock>,
        api: Arc<FakeTextApi>,
        service: InsightService,
    }

    fn fixture(api: FakeTextApi) -> Fixture {
        let clock = Arc::new(ManualClock::default());
        let api = Arc::new(api);
        let service = InsightService::new(api.clone(), TimeDelta::minutes(30), clock.clone());
        Fixture { clock, api, service }
    }

    fn metrics(temp_f: i32, energy_trend: EnergyTrend) -> (ProductionMetric, EnergyMetric, WeatherMetric) {
        (
            ProductionMetric {
                index: 101.0,
                trend: "↑ 1.0% MoM".to_string(),
            },
            EnergyMetric {
                cents_per_kwh: 15.0,
                trend: energy_trend,
            },
            WeatherMetric {
                temp_f,
                alert: "none".to_string(),
            },
        )
    }

    async fn serve(f: &Fixture, temp_f: i32, force: bool) -> ServedInsight {
        let (p, e, w) = metrics(temp_f, EnergyTrend::Stable);
        let fp = DataFingerprint::compute(&p, &e, &w).unwrap();
        f.service.insight(&p, &e, &w, &fp, force).await
    }

    #[tokio::test]
    async fn test_same_fingerprint_reuses_insight() {
        let f = fixture(FakeTextApi::ok(insight_reply()));

        let first = serve(&f, 72, false).await;
        f.clock.advance(TimeDelta::minutes(1));
        let second = serve(&f, 71, false).await;

        assert_eq!(first, second);
        assert_eq!(f.api.calls(), 1);
        assert_eq!(first.insight.summary, "Output is up while prices hold steady.");
    }

    #[tokio::test]
    async fn test_regenerates_after_ttl_and_on_force() {
        let f = fixture(FakeTextApi::ok(insight_reply()));
        let first = serve(&f, 72, false).await;

        f.clock.advance(TimeDelta::minutes(30));
        let second = serve(&f, 72, false).await;
        assert_eq!(f.api.calls(), 2);
        assert!(second.generated_at > first.generated_at);

        f.clock.advance(TimeDelta::minutes(1));
        let forced = serve(&f, 72, true).await;
        assert_eq!(f.api.calls(), 3);
        assert!(forced.generated_at > second.generated_at);
    }

    #[tokio::test]
    async fn test_changed_fingerprint_regenerates() {
        let f = fixture(FakeTextApi::ok(insight_reply()));
        serve(&f, 72, false).await;
        serve(&f, 80, false).await;
        assert_eq!(f.api.calls(), 2);
    }

    #[tokio::test]
    async fn test_forced_failure_keeps_same_fingerprint_insight() {
        let f = fixture(FakeTextApi::ok(insight_reply()));
        let first = serve(&f, 72, false).await;

        f.api.respond_with(None);
        f.clock.advance(TimeDelta::minutes(45));
        let stale = serve(&f, 72, true).await;
        assert_eq!(stale, first);
    }

    #[tokio::test]
    async fn test_failure_prefers_latest_insight_over_rules() {
        let f = fixture(FakeTextApi::ok(insight_reply()));
        let first = serve(&f, 72, false).await;

        f.api.respond_with(None);
        let other = serve(&f, 104, false).await;
        assert_eq!(other, first);
    }

    #[tokio::test]
    async fn test_failure_without_cache_uses_rule_priority() {
        let f = fixture(FakeTextApi::failing());
        let (p, e, w) = metrics(104, EnergyTrend::Up);
        let fp = DataFingerprint::compute(&p, &e, &w).unwrap();

        let served = f.service.insight(&p, &e, &w, &fp, false).await;
        assert_eq!(served.generated_at, None);
        assert!(served.insight.summary.starts_with("Extreme heat"));
    }

    #[tokio::test]
    async fn test_unparsable_reply_falls_back() {
        let f = fixture(FakeTextApi::ok("I think things look fine.".to_string()));
        let served = serve(&f, 72, false).await;
        assert_eq!(served.generated_at, None);
        assert_ne!(served.insight, generic_insight());
        assert!(served.insight.summary.contains("expanding"));
    }

    #[test]
    fn test_parse_insight_extracts_embedded_object() {
        let reply = "Here you go:\n```json\n{\"summary\": \"Steady.\", \"recommendation\": \"Hold.\"}\n```";
        let insight = parse_insight(reply).unwrap();
        assert_eq!(insight.summary, "Steady.");
        assert_eq!(insight.recommendation, "Hold.");
    }

    #[test]
    fn test_parse_insight_errors() {
        assert!(matches!(parse_insight("no json"), Err(InsightParseError::NoJsonObject)));
        assert!(matches!(parse_insight("} {"), Err(InsightParseError::NoJsonObject)));
        assert!(matches!(parse_insight("{not json}"), Err(InsightParseError::InvalidJson(_))));
        assert!(matches!(
            parse_insight(r#"{"summary": "x"}"#),
            Err(InsightParseError::Shape(_))
        ));
        assert!(matches!(
            parse_insight(r#"{"summary": 3, "recommendation": "y"}"#),
            Err(InsightParseError::Shape(_))
        ));
        assert!(matches!(
            parse_insight(r#"{"summary": " ", "recommendation": "y"}"#),
            Err(InsightParseError::Shape(_))
        ));
    }

    #[test]
    fn test_parse_insight_truncates_long_fields() {
        let reply = format!(
            r#"{{"summary": "{}", "recommendation": "{}"}}"#,
            "s".repeat(500),
            "r".repeat(500)
        );
        let insight = parse_insight(&reply).unwrap();
        assert_eq!(insight.summary.len(), SUMMARY_MAX_CHARS);
        assert_eq!(insight.recommendation.len(), RECOMMENDATION_MAX_CHARS);
    }

    #[test]
    fn test_prompt_embeds_metrics() {
        let (p, e, w) = metrics(72, EnergyTrend::Up);
        let prompt = build_prompt(&p, &e, &w);
        assert!(prompt.contains("101.0 (↑ 1.0% MoM)"));
        assert!(prompt.contains("15.00 cents/kWh (trend: up)"));
        assert!(prompt.contains("72°F (alert: none)"));
    }
}
