//! Relay-routed remote fetching.
//!
//! External systems are reached through third-party relay services. The
//! chain is a prioritized, pluggable list: try the first relay, fall
//! back to the next on any failure, and fail only after exhausting the
//! list. No retries beyond the chain, no caching.

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult};

/// One relay service in the chain.
///
/// Relays differ in what they can carry: the JSON-envelope style can
/// only return text, while raw pass-through relays also carry binary
/// responses and POST bodies. Unsupported operations fall through to
/// the next relay in the chain.
#[async_trait]
pub trait Relay: Send + Sync {
    /// Relay name (for logging/diagnostics).
    fn name(&self) -> &str;

    /// GET the target URL and return the response body as text.
    async fn get_text(&self, client: &Client, target: &str) -> FetchResult<String>;

    /// GET the target URL and return the raw response bytes.
    async fn get_bytes(&self, _client: &Client, _target: &str) -> FetchResult<Vec<u8>> {
        Err(FetchError::Unsupported {
            relay: self.name().to_string(),
            what: "binary",
        })
    }

    /// POST a JSON body to the target URL and return the response text.
    async fn post_json(
        &self,
        _client: &Client,
        _target: &str,
        _body: &serde_json::Value,
    ) -> FetchResult<String> {
        Err(FetchError::Unsupported {
            relay: self.name().to_string(),
            what: "POST",
        })
    }
}

/// Relay that wraps responses in a JSON envelope `{ contents: "..." }`.
pub struct AllOriginsRelay {
    base: String,
}

impl Default for AllOriginsRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl AllOriginsRelay {
    pub fn new() -> Self {
        Self {
            base: "https://api.allorigins.win".to_string(),
        }
    }

    /// Point at a different envelope-relay deployment.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn request_url(&self, target: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("url", target)
            .finish();
        format!("{}/get?{}", self.base, query)
    }
}

#[async_trait]
impl Relay for AllOriginsRelay {
    fn name(&self) -> &str {
        "allorigins"
    }

    async fn get_text(&self, client: &Client, target: &str) -> FetchResult<String> {
        let response = client
            .get(self.request_url(target))
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                relay: self.name().to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RelayStatus {
                relay: self.name().to_string(),
                status: status.as_u16(),
            });
        }

        let envelope: serde_json::Value =
            response.json().await.map_err(|e| FetchError::Transport {
                relay: self.name().to_string(),
                source: e,
            })?;

        envelope
            .get("contents")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| FetchError::Envelope {
                relay: self.name().to_string(),
            })
    }
}

/// Relay that passes the response body through unchanged.
pub struct CorsProxyRelay {
    base: String,
}

impl Default for CorsProxyRelay {
    fn default() -> Self {
        Self::new()
    }
}

impl CorsProxyRelay {
    pub fn new() -> Self {
        Self {
            base: "https://corsproxy.io".to_string(),
        }
    }

    /// Point at a different pass-through relay deployment.
    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    fn request_url(&self, target: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
        format!("{}/?{}", self.base, encoded)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> FetchResult<reqwest::Response> {
        let response = request.send().await.map_err(|e| FetchError::Transport {
            relay: self.name().to_string(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::RelayStatus {
                relay: self.name().to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl Relay for CorsProxyRelay {
    fn name(&self) -> &str {
        "corsproxy"
    }

    async fn get_text(&self, client: &Client, target: &str) -> FetchResult<String> {
        let response = self.send(client.get(self.request_url(target))).await?;
        response.text().await.map_err(|e| FetchError::Transport {
            relay: self.name().to_string(),
            source: e,
        })
    }

    async fn get_bytes(&self, client: &Client, target: &str) -> FetchResult<Vec<u8>> {
        let response = self.send(client.get(self.request_url(target))).await?;
        let bytes = response.bytes().await.map_err(|e| FetchError::Transport {
            relay: self.name().to_string(),
            source: e,
        })?;
        Ok(bytes.to_vec())
    }

    async fn post_json(
        &self,
        client: &Client,
        target: &str,
        body: &serde_json::Value,
    ) -> FetchResult<String> {
        let response = self
            .send(client.post(self.request_url(target)).json(body))
            .await?;
        response.text().await.map_err(|e| FetchError::Transport {
            relay: self.name().to_string(),
            source: e,
        })
    }
}

/// Fetcher that walks a prioritized relay chain.
pub struct RelayFetcher {
    client: Client,
    relays: Vec<Box<dyn Relay>>,
}

impl Default for RelayFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl RelayFetcher {
    /// Default chain: envelope relay first, pass-through relay second.
    pub fn new() -> Self {
        Self::with_relays(vec![
            Box::new(AllOriginsRelay::new()),
            Box::new(CorsProxyRelay::new()),
        ])
    }

    /// Build a fetcher with a custom relay chain, tried in order.
    pub fn with_relays(relays: Vec<Box<dyn Relay>>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("Failed to create HTTP client"),
            relays,
        }
    }

    /// Replace the HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// GET text through the chain.
    pub async fn get_text(&self, url: &str) -> FetchResult<String> {
        let mut last: Option<FetchError> = None;
        for relay in &self.relays {
            match relay.get_text(&self.client, url).await {
                Ok(body) => {
                    debug!(relay = relay.name(), url, "fetch succeeded");
                    return Ok(body);
                }
                Err(e) => {
                    warn!(relay = relay.name(), url, error = %e, "relay failed, trying next");
                    last = Some(e);
                }
            }
        }
        Err(Self::exhausted(url, last))
    }

    /// GET raw bytes through the chain (pass-through relays only).
    pub async fn get_bytes(&self, url: &str) -> FetchResult<Vec<u8>> {
        let mut last: Option<FetchError> = None;
        for relay in &self.relays {
            match relay.get_bytes(&self.client, url).await {
                Ok(bytes) => {
                    debug!(relay = relay.name(), url, len = bytes.len(), "fetch succeeded");
                    return Ok(bytes);
                }
                Err(e) => {
                    warn!(relay = relay.name(), url, error = %e, "relay failed, trying next");
                    last = Some(e);
                }
            }
        }
        Err(Self::exhausted(url, last))
    }

    /// POST a JSON body through the chain (pass-through relays only).
    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> FetchResult<String> {
        let mut last: Option<FetchError> = None;
        for relay in &self.relays {
            match relay.post_json(&self.client, url, body).await {
                Ok(text) => {
                    debug!(relay = relay.name(), url, "post succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(relay = relay.name(), url, error = %e, "relay failed, trying next");
                    last = Some(e);
                }
            }
        }
        Err(Self::exhausted(url, last))
    }

    fn exhausted(url: &str, last: Option<FetchError>) -> FetchError {
        FetchError::Exhausted {
            url: url.to_string(),
            last: last
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no relays configured".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRelay;

    #[test]
    fn envelope_relay_encodes_target() {
        let relay = AllOriginsRelay::new().with_base("https://relay.test");
        assert_eq!(
            relay.request_url("https://example.com/a b?x=1"),
            "https://relay.test/get?url=https%3A%2F%2Fexample.com%2Fa+b%3Fx%3D1"
        );
    }

    #[test]
    fn passthrough_relay_encodes_target() {
        let relay = CorsProxyRelay::new().with_base("https://relay.test");
        assert_eq!(
            relay.request_url("https://example.com/x.pdf"),
            "https://relay.test/?https%3A%2F%2Fexample.com%2Fx.pdf"
        );
    }

    #[tokio::test]
    async fn falls_back_to_next_relay() {
        let primary = ScriptedRelay::named("primary").fail_text(503);
        let fallback = ScriptedRelay::named("fallback").text("payload");
        let fetcher = RelayFetcher::with_relays(vec![Box::new(primary), Box::new(fallback)]);

        let body = fetcher.get_text("https://example.com").await.unwrap();
        assert_eq!(body, "payload");
    }

    #[tokio::test]
    async fn exhausted_chain_reports_last_error() {
        let primary = ScriptedRelay::named("primary").fail_text(503);
        let fallback = ScriptedRelay::named("fallback").fail_text(429);
        let fetcher = RelayFetcher::with_relays(vec![Box::new(primary), Box::new(fallback)]);

        let err = fetcher.get_text("https://example.com").await.unwrap_err();
        match err {
            FetchError::Exhausted { url, last } => {
                assert_eq!(url, "https://example.com");
                assert!(last.contains("429"), "last error should be the fallback's: {last}");
            }
            other => panic!("expected Exhausted, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unsupported_operations_fall_through() {
        // The envelope-style scripted relay refuses POST; the chain must
        // land on the pass-through one.
        let text_only = ScriptedRelay::named("envelope").text_only();
        let passthrough = ScriptedRelay::named("passthrough").text(r#"{"status":"success"}"#);
        let fetcher = RelayFetcher::with_relays(vec![Box::new(text_only), Box::new(passthrough)]);

        let body = fetcher
            .post_json("https://script.test", &serde_json::json!({"action": "ping"}))
            .await
            .unwrap();
        assert_eq!(body, r#"{"status":"success"}"#);
    }
}
