// HTTP request handlers
use crate::domain::dashboard::DashboardSnapshot;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{RawQuery, State},
};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Whether any `refresh` parameter in the raw query string is an explicit
/// yes. Repeated keys, unknown keys and bad encodings never reject the request.
fn force_refresh(raw_query: Option<&str>) -> bool {
    raw_query
        .unwrap_or_default()
        .split('&')
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .filter(|(key, _)| *key == "refresh")
        .filter_map(|(_, value)| {
            urlencoding::decode(&value.replace('+', " "))
                .ok()
                .map(|v| v.into_owned())
        })
        .any(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Aggregated dashboard payload. Always answers 200 with a complete snapshot.
pub async fn get_dashboard(
    RawQuery(raw_query): RawQuery,
    State(state): State<Arc<AppState>>,
) -> Json<DashboardSnapshot> {
    let refresh = force_refresh(raw_query.as_deref());
    let service = &state.dashboard_service;

    match AssertUnwindSafe(service.snapshot(refresh)).catch_unwind().await {
        Ok(Ok(snapshot)) => Json(snapshot),
        Ok(Err(e)) => {
            tracing::error!("Error building dashboard snapshot: {:#}", e);
            Json(service.fallback_snapshot())
        }
        Err(_) => {
            tracing::error!("Panic while building dashboard snapshot");
            Json(service.fallback_snapshot())
        }
    }
}
