// REST key-value client
//
// Speaks the Upstash / Vercel KV REST protocol: `GET {base}/get/{key}`
// answers `{"result": "<json text>" | null}`, `POST {base}/set/{key}` takes
// the value as the raw request body. Values are stored as JSON text, so
// structured data round-trips through `serde_json::Value`.

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Envelope of every KV REST answer.
#[derive(Debug, Deserialize)]
struct KvResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

/// Client for a REST key-value store authenticated with a bearer token.
pub struct RestKv {
    http: reqwest::Client,
    base_url: Url,
}

impl RestKv {
    /// Create a new client; the token is sent as `Authorization: Bearer`.
    pub fn new(base_url: Url, token: &SecretString, transport: &TransportConfig) -> Result<Self, Error> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Kv {
                message: format!("token is not a valid header value: {e}"),
            })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let http = transport.build_client_with_headers(headers)?;
        Ok(Self { http, base_url })
    }

    /// Create a client around a pre-built `reqwest::Client` that already
    /// carries its credentials.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// Read a key. `Ok(None)` when the key does not exist.
    pub async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let url = self.command_url("get", key)?;
        debug!(key, "KV GET");

        let resp = self.http.get(url).send().await?;
        let envelope = Self::parse(resp).await?;

        match envelope.result {
            None | Some(Value::Null) => Ok(None),
            // Values are written as JSON text; anything else came from
            // another writer and is handed back verbatim.
            Some(Value::String(text)) => Ok(Some(
                serde_json::from_str(&text).unwrap_or(Value::String(text)),
            )),
            Some(other) => Ok(Some(other)),
        }
    }

    /// Write a key, replacing any previous value.
    pub async fn set(&self, key: &str, value: &Value) -> Result<(), Error> {
        let url = self.command_url("set", key)?;
        debug!(key, "KV SET");

        let resp = self.http.post(url).body(value.to_string()).send().await?;
        Self::parse(resp).await?;
        Ok(())
    }

    fn command_url(&self, command: &str, key: &str) -> Result<Url, Error> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| Error::Kv {
                message: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .push(command)
            .push(key);
        Ok(url)
    }

    async fn parse(resp: reqwest::Response) -> Result<KvResponse, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        let envelope: Option<KvResponse> = serde_json::from_str(&body).ok();

        if let Some(KvResponse {
            error: Some(message),
            ..
        }) = &envelope
        {
            return Err(Error::Kv {
                message: format!("HTTP {}: {message}", status.as_u16()),
            });
        }

        if !status.is_success() {
            return Err(Error::Kv {
                message: format!("HTTP {}: {body}", status.as_u16()),
            });
        }

        envelope.ok_or_else(|| Error::Kv {
            message: format!("unexpected response body: {body}"),
        })
    }
}
