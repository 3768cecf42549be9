use chrono::{DateTime, Utc};
use thiserror::Error;

/// Top-level error type for the `fleetwatch-api` crate.
///
/// Covers every failure mode of the two remote surfaces: the tracking API
/// and the REST key-value store. `fleetwatch-core` maps these into
/// domain-level errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Tracking API ────────────────────────────────────────────────
    /// Error reported by the tracking API, either as an `error` object in
    /// the body or as a non-2xx status.
    #[error("API error: {message} (code {code})")]
    Upstream { message: String, code: i64 },

    /// The body parsed, but not into any shape we know how to read.
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String, body: String },

    /// Alarm query with `from` later than `till`.
    #[error("Invalid alarm window: {from} is after {till}")]
    InvalidWindow {
        from: DateTime<Utc>,
        till: DateTime<Utc>,
    },

    // ── Key-value store ─────────────────────────────────────────────
    /// The key-value store rejected a request or answered with garbage.
    #[error("Key-value store error: {message}")]
    Kv { message: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Upstream { code, .. } => matches!(code, 2 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Returns `true` if the tracking API rejected the configured key.
    pub fn is_invalid_api_key(&self) -> bool {
        matches!(self, Self::Upstream { code: 10, .. })
            || matches!(self, Self::Transport(e) if e.status() == Some(reqwest::StatusCode::UNAUTHORIZED))
    }

    /// Upstream error code, if the failure came from the tracking API.
    pub fn upstream_code(&self) -> Option<i64> {
        match self {
            Self::Upstream { code, .. } => Some(*code),
            Self::Transport(e) => e.status().map(|s| i64::from(s.as_u16())),
            _ => None,
        }
    }
}

/// Human-readable fallback for tracking API error codes that arrive
/// without a message.
pub(crate) fn describe_upstream_code(code: i64) -> &'static str {
    match code {
        2 => "Service unavailable or in maintenance",
        3 => "Invalid parameters sent to the tracking API",
        10 => "Invalid API key, check the key configured for this profile",
        1005 => "Access denied by the tracking API",
        500 => "An internal server error occurred",
        502 => "Bad gateway: the server could not reach an upstream service",
        _ => "An unknown error occurred",
    }
}
