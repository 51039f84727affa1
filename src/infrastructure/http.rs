// Shared plumbing for the outbound HTTP clients
use crate::application::error::SourceError;
use anyhow::Context;
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest upstream error body kept in a `SourceError`.
const MAX_ERROR_BODY: usize = 512;

pub fn build_client(timeout_secs: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .context("Failed to build HTTP client")
}

pub fn require_key<'a>(key: &'a Option<String>, var: &'static str) -> Result<&'a str, SourceError> {
    key.as_deref().ok_or(SourceError::MissingCredential(var))
}

/// Check the status and decode the JSON body.
pub async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, SourceError> {
    let status = response.status();
    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if let Some((idx, _)) = body.char_indices().nth(MAX_ERROR_BODY) {
            body.truncate(idx);
        }
        return Err(SourceError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    Ok(response.json::<T>().await?)
}
