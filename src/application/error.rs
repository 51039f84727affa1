// Failure modes of upstream calls; every one ends in a fallback value
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Request(err.to_string())
        }
    }
}
