//! Retrying HTTP client for the configuration backend.

use creditbank_core::{QuoteError, QuoteResult};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Where the configuration backend lives and how hard to try reaching it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBackendConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Additional attempts after the first one; total attempts are `max_retries + 1`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Deadline for a single attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// First backoff delay; 0 retries immediately.
    #[serde(default = "default_backoff_initial_ms")]
    pub backoff_initial_ms: u64,

    #[serde(default = "default_backoff_max_ms")]
    pub backoff_max_ms: u64,
}

impl Default for ConfigBackendConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            host: default_host(),
            port: default_port(),
            api_version: default_api_version(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
            backoff_initial_ms: default_backoff_initial_ms(),
            backoff_max_ms: default_backoff_max_ms(),
        }
    }
}

impl ConfigBackendConfig {
    pub fn base_url(&self) -> String {
        format!(
            "{}://{}:{}/{}/",
            self.protocol,
            self.host,
            self.port,
            self.api_version.trim_matches('/')
        )
    }

    /// Delay before retry number `retry` (1-based), or `None` when backoff is disabled.
    pub fn backoff(&self, retry: u32) -> Option<Duration> {
        if self.backoff_initial_ms == 0 {
            return None;
        }
        let factor = 1u64.checked_shl(retry.saturating_sub(1)).unwrap_or(u64::MAX);
        let millis = self
            .backoff_initial_ms
            .saturating_mul(factor)
            .min(self.backoff_max_ms.max(self.backoff_initial_ms));
        Some(Duration::from_millis(millis))
    }
}

fn default_protocol() -> String {
    "http".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_api_version() -> String {
    "v1".to_string()
}

fn default_max_retries() -> u32 {
    2
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_backoff_initial_ms() -> u64 {
    100
}

fn default_backoff_max_ms() -> u64 {
    2_000
}

/// Outcome of one attempt.
enum Attempt<T> {
    Success(T),
    Retryable(QuoteError),
    Terminal(QuoteError),
}

/// GET/PUT against the configuration backend with blind retry on 5xx and transport failures.
///
/// Any other non-2xx answer fails on the first attempt. Dropping the returned future abandons the
/// in-flight request together with any pending backoff sleep.
#[derive(Debug, Clone)]
pub struct ResilientClient {
    client: Client,
    base_url: String,
    config: ConfigBackendConfig,
}

impl ResilientClient {
    pub fn new(config: ConfigBackendConfig) -> QuoteResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| misconfigured("failed to build http client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url(),
            config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ConfigBackendConfig {
        &self.config
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> QuoteResult<T> {
        self.execute(Method::GET, path, |request| request).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> QuoteResult<T> {
        self.execute(Method::PUT, path, |request| request.json(body))
            .await
    }

    async fn execute<T, F>(&self, method: Method, path: &str, build: F) -> QuoteResult<T>
    where
        T: DeserializeOwned,
        F: Fn(RequestBuilder) -> RequestBuilder,
    {
        let url = format!("{}{}", self.base_url, path.trim_start_matches('/'));
        let max_attempts = self.config.max_retries.saturating_add(1);
        let mut attempt = 1;

        loop {
            debug!(method = %method, url = %url, attempt, "Calling config backend");
            let request = build(self.client.request(method.clone(), &url));

            match Self::attempt(request).await {
                Attempt::Success(value) => return Ok(value),
                Attempt::Terminal(err) => {
                    warn!(method = %method, url = %url, error = %err, "Config backend call failed");
                    return Err(err);
                }
                Attempt::Retryable(err) if attempt >= max_attempts => {
                    warn!(
                        method = %method,
                        url = %url,
                        attempts = attempt,
                        error = %err,
                        "Config backend retries exhausted"
                    );
                    return Err(err);
                }
                Attempt::Retryable(err) => {
                    warn!(
                        method = %method,
                        url = %url,
                        attempt,
                        error = %err,
                        "Retryable config backend failure"
                    );
                    if let Some(delay) = self.config.backoff(attempt) {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    async fn attempt<T: DeserializeOwned>(request: RequestBuilder) -> Attempt<T> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) if e.is_builder() => {
                return Attempt::Terminal(misconfigured("invalid config backend request", e))
            }
            Err(e) => {
                return Attempt::Retryable(QuoteError::RemoteUnavailable {
                    status: None,
                    message: e.to_string(),
                })
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.bytes().await {
                Ok(bytes) => match serde_json::from_slice(&bytes) {
                    Ok(value) => Attempt::Success(value),
                    Err(e) => Attempt::Terminal(QuoteError::Decoding(e.to_string())),
                },
                Err(e) => Attempt::Retryable(QuoteError::RemoteUnavailable {
                    status: Some(status.as_u16()),
                    message: e.to_string(),
                }),
            };
        }

        let message = describe(status, response.text().await.unwrap_or_default());
        if status.is_server_error() {
            Attempt::Retryable(QuoteError::RemoteUnavailable {
                status: Some(status.as_u16()),
                message,
            })
        } else {
            // 4xx, and any 1xx/3xx reqwest did not resolve itself
            Attempt::Terminal(QuoteError::RemoteRejected {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Client-side setup failures are local misconfiguration, never a remote outage.
fn misconfigured(context: &str, err: reqwest::Error) -> QuoteError {
    QuoteError::invalid_state(format!("{context}: {err}"))
}

fn describe(status: StatusCode, body: String) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}
