// Deterministic insight used when no generated insight can be served
use super::metrics::{
    EnergyMetric, EnergyTrend, InsightMetric, ProductionMetric, WeatherMetric, EXTREME_HEAT_F,
};

/// Pick a canned insight from the metrics. The first matching rule wins:
/// extreme heat, rising energy prices, active weather alert, falling
/// production, rising production, otherwise a generic message.
pub fn rule_based_insight(
    production: &ProductionMetric,
    energy: &EnergyMetric,
    weather: &WeatherMetric,
) -> InsightMetric {
    let (summary, recommendation) = if weather.temp_f >= EXTREME_HEAT_F {
        (
            "Extreme heat is pushing regional power demand toward its peak.",
            "Shift energy-intensive work to early morning or evening and check cooling capacity.",
        )
    } else if energy.trend == EnergyTrend::Up {
        (
            "Electricity prices are climbing month over month.",
            "Review energy contracts and defer non-essential high-load operations.",
        )
    } else if weather.has_active_alert() {
        (
            "An active weather alert may disrupt local operations.",
            "Confirm contingency plans and monitor conditions before scheduling outdoor or logistics work.",
        )
    } else if production.is_trending_down() {
        (
            "Industrial production is slowing compared with last month.",
            "Keep inventory lean and watch order volumes for further softening.",
        )
    } else if production.is_trending_up() {
        (
            "Industrial production is expanding compared with last month.",
            "Plan for higher demand and confirm supplier lead times.",
        )
    } else {
        (
            "Live insight is unavailable; showing the latest available metrics.",
            "Check back after the next refresh for an updated analysis.",
        )
    };

    InsightMetric::new(summary, recommendation)
}

/// Insight served when nothing at all is known about current conditions.
pub fn generic_insight() -> InsightMetric {
    rule_based_insight(
        &ProductionMetric::fallback(),
        &EnergyMetric::fallback(),
        &WeatherMetric::fallback(),
    )
}
