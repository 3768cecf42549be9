// Tracking API HTTP client
//
// Wraps `reqwest::Client` with endpoint URL construction, API key
// injection, and error-envelope handling. Endpoint modules (units, alarms)
// are implemented as inherent methods in separate files to keep this
// module focused on transport mechanics.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{Error, describe_upstream_code};
use crate::transport::TransportConfig;

/// Raw HTTP client for the vehicle tracking API.
///
/// Every request carries the API key as a `key` query parameter. Methods
/// return normalized records; error envelopes are turned into
/// [`Error::Upstream`] before the caller sees them.
pub struct TrackerClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    timeout: Option<Duration>,
}

impl TrackerClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the API root, e.g. `https://mapon.com/api/v1/`. A
    /// missing trailing slash is added so relative endpoint paths resolve
    /// underneath it.
    pub fn new(
        base_url: Url,
        api_key: SecretString,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url),
            api_key,
            timeout: Some(transport.timeout),
        })
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url, api_key: SecretString) -> Self {
        Self {
            http,
            base_url: with_trailing_slash(base_url),
            api_key,
            timeout: None,
        }
    }

    /// The API root this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{base}{path}?{query}&key={api_key}`.
    pub(crate) fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
        let mut url = self.base_url.join(path)?;
        url.query_pairs_mut()
            .extend_pairs(query)
            .append_pair("key", self.api_key.expose_secret());
        Ok(url)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request and return the JSON body of a successful answer.
    ///
    /// The URL is never logged: it carries the API key.
    pub(crate) async fn get_json(&self, url: Url) -> Result<Value, Error> {
        debug!(endpoint = url.path(), "GET");

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        let Ok(value) = serde_json::from_str::<Value>(&body) else {
            if status.is_success() {
                return Err(Error::MalformedResponse {
                    message: "response body is not JSON".into(),
                    body,
                });
            }
            let reason = status.canonical_reason().unwrap_or("unknown status");
            return Err(Error::Upstream {
                message: format!("tracking API returned a non-JSON error: {reason}. Details: {body}"),
                code: i64::from(status.as_u16()),
            });
        };

        let has_error = value.get("error").is_some_and(|e| !e.is_null());
        if !status.is_success() || has_error {
            return Err(upstream_error(&value, status.as_u16()));
        }

        Ok(value)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        match self.timeout {
            Some(timeout) if err.is_timeout() => Error::Timeout {
                timeout_secs: timeout.as_secs(),
            },
            _ => Error::Transport(err),
        }
    }
}

/// Build an [`Error::Upstream`] from an error payload.
///
/// The tracking API answers `{"error": {"code": N, "msg": "..."}}`; proxies
/// in front of it tend to answer `{"message": "...", "code": N}`. Both are
/// read, the message falling back to a description of the code.
fn upstream_error(payload: &Value, status: u16) -> Error {
    let error = payload.get("error");

    let text_at = |v: Option<&Value>, key: &str| {
        v.and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .map(str::to_owned)
    };

    let code = payload
        .get("code")
        .and_then(Value::as_i64)
        .or_else(|| error.and_then(|e| e.get("code")).and_then(Value::as_i64))
        .unwrap_or_else(|| i64::from(status));

    let mut message = text_at(Some(payload), "message")
        .or_else(|| text_at(error, "message"))
        .or_else(|| text_at(error, "msg"))
        .or_else(|| error.and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_else(|| describe_upstream_code(code).to_owned());

    if let Some(details) = text_at(Some(payload), "details") {
        message.push_str(". Details: ");
        message.push_str(&details);
    }

    Error::Upstream { message, code }
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str) -> TrackerClient {
        TrackerClient::with_client(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            SecretString::from("s3cret".to_string()),
        )
    }

    #[test]
    fn endpoint_url_appends_key_after_query() {
        let url = client("https://example.com/api/v1")
            .endpoint_url("unit/list.json", &[("include", "fuel,can")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.com/api/v1/unit/list.json?include=fuel%2Ccan&key=s3cret"
        );
    }

    #[test]
    fn error_object_with_msg() {
        let err = upstream_error(&json!({ "error": { "code": 3, "msg": "bad from" } }), 200);
        assert!(matches!(err, Error::Upstream { ref message, code: 3 } if message == "bad from"));
    }

    #[test]
    fn error_code_without_message_is_described() {
        let err = upstream_error(&json!({ "error": { "code": 10 } }), 400);
        let Error::Upstream { message, code } = err else {
            panic!("expected upstream error");
        };
        assert_eq!(code, 10);
        assert!(message.contains("Invalid API key"));
    }

    #[test]
    fn proxy_style_error_with_details() {
        let err = upstream_error(
            &json!({ "message": "proxy down", "code": 502, "details": "ECONNRESET" }),
            502,
        );
        assert_eq!(
            err.to_string(),
            "API error: proxy down. Details: ECONNRESET (code 502)"
        );
    }

    #[test]
    fn status_is_the_code_of_last_resort() {
        let err = upstream_error(&json!({}), 500);
        assert!(matches!(err, Error::Upstream { code: 500, .. }));
        assert!(err.to_string().contains("internal server error"));
    }
}
