use reqwest::{Client, ClientBuilder, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{sync::Arc, time::Duration};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use super::{CancelSignal, UpstreamError};

/// Configuration for HTTP client concurrency and timeout behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpClientConfig {
    /// Maximum number of concurrent upstream requests across all sources.
    #[serde(default = "default_concurrent_limit")]
    pub concurrent_limit: usize,
    /// Permit acquisition timeout in milliseconds.
    #[serde(default = "default_permit_timeout_ms")]
    pub permit_timeout_ms: u64,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Sent as `User-Agent`; the weather service rejects anonymous clients.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_concurrent_limit() -> usize {
    32
}

fn default_permit_timeout_ms() -> u64 {
    5_000
}

fn default_request_timeout_ms() -> u64 {
    15_000
}

fn default_user_agent() -> String {
    "pulse-dashboard/0.1 (ops@example.com)".to_string()
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            concurrent_limit: default_concurrent_limit(),
            permit_timeout_ms: default_permit_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Error body returned by the credential-injecting proxy on failure.
#[derive(Debug, Deserialize)]
struct ProxyErrorBody {
    error: String,
}

/// HTTP client with semaphore-based concurrency control and cooperative cancellation.
///
/// One instance is shared by every fetcher so that nested fan-outs (outage details)
/// cannot exhaust connections.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    concurrent_limit: Arc<Semaphore>,
    config: HttpClientConfig,
}

/// RAII guard ensuring semaphore permits are always released.
struct PermitGuard {
    _permit: OwnedSemaphorePermit,
    semaphore: Arc<Semaphore>,
}

impl PermitGuard {
    fn new(permit: OwnedSemaphorePermit, semaphore: Arc<Semaphore>) -> Self {
        Self { _permit: permit, semaphore }
    }
}

impl Drop for PermitGuard {
    fn drop(&mut self) {
        tracing::trace!(
            available_permits = self.semaphore.available_permits(),
            "permit guard dropped"
        );
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn new() -> Result<Self, UpstreamError> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Sanitizes network errors so upstream URLs and keys never reach the status map.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_decode() {
            "response decode error".to_string()
        } else if error.is_redirect() {
            "too many redirects".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Creates a new HTTP client with the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reqwest client fails to build.
    pub fn with_config(config: HttpClientConfig) -> Result<Self, UpstreamError> {
        let client = ClientBuilder::new()
            .pool_idle_timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .use_rustls_tls()
            .user_agent(config.user_agent.clone())
            .tcp_keepalive(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                UpstreamError::ConnectionFailed(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self {
            client,
            concurrent_limit: Arc::new(Semaphore::new(config.concurrent_limit.max(1))),
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Sends a GET request and returns the body as text.
    ///
    /// # Errors
    ///
    /// - [`UpstreamError::Cancelled`] if `cancel` fires first
    /// - [`UpstreamError::Timeout`] if permit acquisition or the request times out
    /// - [`UpstreamError::HttpError`] for non-success HTTP status codes
    /// - [`UpstreamError::ConnectionFailed`] for network failures
    pub async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
        cancel: &CancelSignal,
    ) -> Result<String, UpstreamError> {
        let request = self.client.get(url).query(query);
        cancel.run(self.execute(url, request)).await
    }

    /// Sends a GET request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// As [`get_text`](Self::get_text), plus [`UpstreamError::InvalidResponse`] when the
    /// body does not decode into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        cancel: &CancelSignal,
    ) -> Result<T, UpstreamError> {
        let body = self.get_text(url, query, cancel).await?;
        decode(&body)
    }

    /// Sends a JSON POST request and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// As [`get_json`](Self::get_json).
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        url: &str,
        body: &B,
        cancel: &CancelSignal,
    ) -> Result<T, UpstreamError> {
        let request = self.client.post(url).json(body);
        let text = cancel.run(self.execute(url, request)).await?;
        decode(&text)
    }

    async fn execute(&self, url: &str, request: RequestBuilder) -> Result<String, UpstreamError> {
        const MAX_RETRIES: u32 = 2;

        let permit = tokio::time::timeout(
            Duration::from_millis(self.config.permit_timeout_ms),
            Arc::clone(&self.concurrent_limit).acquire_owned(),
        )
        .await
        .map_err(|_| {
            tracing::warn!(
                available_permits = self.concurrent_limit.available_permits(),
                "http client semaphore acquisition timeout"
            );
            UpstreamError::Timeout
        })?
        .map_err(|_| UpstreamError::ConcurrencyLimit(url.to_string()))?;

        let _permit_guard = PermitGuard::new(permit, self.concurrent_limit.clone());

        let mut retries = 0;

        loop {
            let attempt = request.try_clone().ok_or_else(|| {
                UpstreamError::InvalidRequest("request body is not cloneable".into())
            })?;

            let error = match attempt.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response.text().await.map_err(UpstreamError::Network);
                    }
                    let raw_text = response.text().await.unwrap_or_default();
                    tracing::debug!(status = status.as_u16(), "upstream request failed");
                    UpstreamError::HttpError(status.as_u16(), error_message(&raw_text))
                }
                Err(e) if e.is_builder() => {
                    return Err(UpstreamError::InvalidRequest(Self::sanitize_network_error(&e)));
                }
                Err(e) if e.is_timeout() => UpstreamError::Timeout,
                Err(e) => UpstreamError::ConnectionFailed(Self::sanitize_network_error(&e)),
            };

            if !error.is_transient() || retries >= MAX_RETRIES {
                return Err(error);
            }
            retries += 1;
            tokio::time::sleep(Duration::from_millis(100 * (1 << retries))).await;
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.concurrent_limit.available_permits()
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, UpstreamError> {
    serde_json::from_str(body).map_err(|e| UpstreamError::InvalidResponse(e.to_string()))
}

/// Extracts the proxy's `{"error": ...}` message, falling back to the truncated body.
fn error_message(raw_text: &str) -> String {
    if let Ok(body) = serde_json::from_str::<ProxyErrorBody>(raw_text) {
        return body.error;
    }
    if raw_text.len() > 256 {
        let cut = (0..=256).rev().find(|i| raw_text.is_char_boundary(*i)).unwrap_or(0);
        format!("{}... (truncated)", &raw_text[..cut])
    } else {
        raw_text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.concurrent_limit, 32);
        assert_eq!(config.permit_timeout_ms, 5_000);
        assert_eq!(config.request_timeout_ms, 15_000);
        assert!(config.user_agent.starts_with("pulse-dashboard"));
    }

    #[test]
    fn test_http_client_new() {
        assert!(HttpClient::new().is_ok(), "HttpClient::new() should succeed");
    }

    #[test]
    fn test_error_message_prefers_proxy_error_field() {
        assert_eq!(error_message(r#"{"error":"invalid bbox"}"#), "invalid bbox");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_error_message_truncates_long_bodies() {
        let long = "x".repeat(1000);
        let message = error_message(&long);
        assert!(message.ends_with("... (truncated)"));
        assert!(message.len() < 300);
    }

    #[tokio::test]
    async fn test_cancelled_request_is_distinguishable() {
        let client = HttpClient::new().unwrap();
        let cancel = CancelSignal::new();
        cancel.cancel();

        let result = client.get_text("http://127.0.0.1:1/never", &[], &cancel).await;
        assert!(matches!(result, Err(UpstreamError::Cancelled)));
    }

    #[tokio::test]
    async fn test_permits_released_after_failure() {
        let config = HttpClientConfig { concurrent_limit: 3, ..HttpClientConfig::default() };
        let client = HttpClient::with_config(config).unwrap();
        let initial = client.available_permits();

        let result = client.get_text("http://127.0.0.1:1/", &[], &CancelSignal::new()).await;
        assert!(result.is_err(), "request to unreachable host should fail");
        assert_eq!(client.available_permits(), initial);
    }
}
