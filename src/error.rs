//! Boundary error types.
//!
//! Neither error escapes into the orchestration layer. Sources return
//! [`FetchError`] to the pipeline, which logs it and continues with an empty
//! batch; the article extractor turns [`ExtractionError`] into a single
//! "unavailable" block. Keeping the kinds typed lets a caller tell a
//! transient failure from a permanent one.

use serde::Serialize;
use std::fmt;

/// Coarse classification of a [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchErrorKind {
    Timeout,
    Transport,
    UpstreamStatus,
    Parse,
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Transport => "transport",
            FetchErrorKind::UpstreamStatus => "upstream_status",
            FetchErrorKind::Parse => "parse",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("upstream returned status {status}: {message}")]
    UpstreamStatus { status: u16, message: String },

    #[error("malformed response: {0}")]
    Parse(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::UpstreamStatus { .. } => FetchErrorKind::UpstreamStatus,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    ///
    /// Timeouts and transport failures are transient, as are `429` and `5xx`
    /// statuses. Everything else (bad key, malformed body) is permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Timeout(_) | FetchError::Transport(_) => true,
            FetchError::UpstreamStatus { status, .. } => *status == 429 || *status >= 500,
            FetchError::Parse(_) => false,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    /// The request URL is stripped; it can carry the API key.
    fn from(e: reqwest::Error) -> Self {
        let e = e.without_url();
        if e.is_timeout() {
            FetchError::Timeout(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::UpstreamStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("unknown").to_string(),
            }
        } else if e.is_decode() || e.is_body() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("no article text could be extracted")]
    EmptyExtraction,
}

impl From<reqwest::Error> for ExtractionError {
    fn from(e: reqwest::Error) -> Self {
        ExtractionError::DownloadFailed(e.to_string())
    }
}
