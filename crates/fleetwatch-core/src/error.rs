// ── Core error types ──
//
// User-facing errors from fleetwatch-core. Consumers never see reqwest
// errors or JSON parse failures directly; the `From<fleetwatch_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the tracking API at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    /// `timeout_secs` is `None` when the HTTP client was supplied by the
    /// caller and its limit is unknown.
    #[error("Tracking API request timed out{}", after_secs(*.timeout_secs))]
    Timeout { timeout_secs: Option<u64> },

    // ── Upstream errors ──────────────────────────────────────────────
    #[error("API error: {message} (code {code})")]
    Upstream { message: String, code: i64 },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ── Persistence ──────────────────────────────────────────────────
    /// The override/client store could not be read or written. Units keep
    /// rendering without overrides while this persists.
    #[error("Persistence unavailable: {message}")]
    PersistenceUnavailable {
        message: String,
        remediation: Option<String>,
    },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dashboard has been shut down")]
    Shutdown,

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// `true` for failures of the key-value store rather than the
    /// tracking API.
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::PersistenceUnavailable { .. })
    }

    /// Operator guidance attached to the error, if any.
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Self::PersistenceUnavailable { remediation, .. } => remediation.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn persistence(err: impl std::fmt::Display) -> Self {
        Self::PersistenceUnavailable {
            message: err.to_string(),
            remediation: None,
        }
    }

    pub(crate) fn not_found(entity_type: &str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<fleetwatch_api::Error> for CoreError {
    fn from(err: fleetwatch_api::Error) -> Self {
        match err {
            fleetwatch_api::Error::Transport(e) => {
                let url = e.url().map_or_else(|| "<unknown>".into(), redact_query);
                let e = e.without_url();
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: None }
                } else if let Some(status) = e.status() {
                    CoreError::Upstream {
                        message: e.to_string(),
                        code: i64::from(status.as_u16()),
                    }
                } else {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                }
            }
            fleetwatch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            fleetwatch_api::Error::Timeout { timeout_secs } => CoreError::Timeout {
                timeout_secs: Some(timeout_secs),
            },
            fleetwatch_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            fleetwatch_api::Error::Upstream { message, code } => {
                CoreError::Upstream { message, code }
            }
            fleetwatch_api::Error::MalformedResponse { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            fleetwatch_api::Error::InvalidWindow { from, till } => CoreError::ValidationFailed {
                message: format!("alarm window starts at {from}, after its end {till}"),
            },
            fleetwatch_api::Error::Kv { message } => CoreError::PersistenceUnavailable {
                message,
                remediation: None,
            },
        }
    }
}

fn after_secs(timeout_secs: Option<u64>) -> String {
    timeout_secs.map_or_else(String::new, |secs| format!(" after {secs}s"))
}

/// The tracking API key travels in the query string; never echo it.
fn redact_query(url: &url::Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_keeps_code_and_message() {
        let err = CoreError::from(fleetwatch_api::Error::Upstream {
            message: "Invalid API key".into(),
            code: 10,
        });
        assert_eq!(err.to_string(), "API error: Invalid API key (code 10)");
        assert!(!err.is_persistence());
    }

    #[test]
    fn timeout_only_names_a_known_limit() {
        let known = CoreError::from(fleetwatch_api::Error::Timeout { timeout_secs: 30 });
        assert_eq!(known.to_string(), "Tracking API request timed out after 30s");

        let unknown = CoreError::Timeout { timeout_secs: None };
        assert_eq!(unknown.to_string(), "Tracking API request timed out");
    }

    #[test]
    fn kv_failures_are_persistence_errors() {
        let err = CoreError::from(fleetwatch_api::Error::Kv {
            message: "HTTP 401: Unauthorized".into(),
        });
        assert!(err.is_persistence());
        assert_eq!(err.remediation(), None);
    }
}
