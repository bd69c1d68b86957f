/*!
 * Network transport for chat requests.
 */

use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::errors::{truncate_body, TranslationError, MAX_ERROR_BODY_CHARS};

/// Sends one JSON request and returns the raw response body
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// POST `body` to `url` with the given extra headers.
    ///
    /// Implementations must fail with [`TranslationError::Transport`] on timeout,
    /// connection failure or any non-2xx status.
    async fn post_json(
        &self,
        url: &Url,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<String, TranslationError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose connections give up after `connect_timeout`
    pub fn new(connect_timeout: Duration) -> Result<Self, TranslationError> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| TranslationError::Configuration(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_json(
        &self,
        url: &Url,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<String, TranslationError> {
        let mut request = self
            .client
            .post(url.clone())
            .timeout(timeout)
            .header("Content-Type", "application/json")
            .json(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!("POST {}", url);
        let response = request.send().await.map_err(|e| transport_failure(url, timeout, e))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| transport_failure(url, timeout, e))?;

        if !status.is_success() {
            error!(
                "Provider error ({}): {}",
                status,
                truncate_body(&response_text, MAX_ERROR_BODY_CHARS)
            );
            return Err(TranslationError::http_status(status.as_u16(), &response_text));
        }

        Ok(response_text)
    }
}

fn transport_failure(url: &Url, timeout: Duration, e: reqwest::Error) -> TranslationError {
    let message = if e.is_timeout() {
        format!("Request to {} timed out after {}s", url, timeout.as_secs())
    } else if e.is_connect() {
        format!("Failed to connect to {}: {}", url, e)
    } else {
        format!("Failed to send request to {}: {}", url, e)
    };
    error!("{}", message);
    TranslationError::Transport { status: None, message }
}
