// Domain layer - Metric models and pure derivations
pub mod dashboard;
pub mod fingerprint;
pub mod insight_rules;
pub mod metrics;
pub mod readings;
