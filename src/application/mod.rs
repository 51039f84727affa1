// Application layer - Use cases, caching and upstream API contracts
pub mod clock;
pub mod dashboard_service;
pub mod error;
pub mod insight_service;
pub mod metrics_service;
pub mod source_fetch;
pub mod ttl_cache;
pub mod upstream_api;

#[cfg(test)]
pub mod testing;
