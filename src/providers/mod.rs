/*!
 * Provider implementations for chat-completion backends.
 *
 * This module contains the protocol adapters for the supported LLM providers:
 * - OpenAI-compatible: `/chat/completions` (OpenAI, LM Studio, vLLM, ...)
 * - Ollama: native `/api/chat`
 *
 * A protocol only knows how to address a backend, shape a request envelope
 * and pull the assistant text back out of a reply. Moving bytes over the
 * network is the job of a [`ChatTransport`].
 */

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use url::Url;

use crate::app_config::TranslationProvider;
use crate::errors::TranslationError;

pub mod mock;
pub mod ollama;
pub mod openai;
pub mod transport;

pub use transport::{ChatTransport, HttpTransport};

/// Chat message object shared by both protocols
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender (system, user or assistant)
    pub role: String,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

/// Common trait for all chat-completion protocols
///
/// This trait defines the capabilities every provider variant must offer,
/// allowing the translation service to drive them interchangeably.
pub trait ChatProtocol: Send + Sync + Debug {
    /// Path appended to the base URL to reach the chat endpoint
    fn chat_path(&self) -> &'static str;

    /// Build the JSON request body for one chat exchange
    fn build_request(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<serde_json::Value, TranslationError>;

    /// Headers to send in addition to `Content-Type`
    fn auth_headers(&self, api_key: Option<&str>) -> Vec<(String, String)>;

    /// Extract the assistant text from a raw response body
    fn extract_text(&self, response_body: &str) -> Result<String, TranslationError>;
}

/// Protocol adapter for a provider variant
pub fn protocol_for(provider: TranslationProvider) -> &'static dyn ChatProtocol {
    match provider {
        TranslationProvider::OpenAiCompatible => &openai::OpenAiProtocol,
        TranslationProvider::Ollama => &ollama::OllamaProtocol,
    }
}

/// Chat endpoint resolved once per job
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderEndpoint {
    /// Provider variant the endpoint belongs to
    pub provider: TranslationProvider,
    /// Normalized base URL without trailing slash
    pub base_url: String,
    /// Provider-specific chat path
    pub chat_path: &'static str,
    url: Url,
}

impl ProviderEndpoint {
    /// Resolve the chat endpoint from a configured base URL.
    ///
    /// A blank base URL selects the provider default; trailing slashes are stripped.
    pub fn resolve(provider: TranslationProvider, configured_base_url: &str) -> Result<Self, TranslationError> {
        let trimmed = configured_base_url.trim();
        let base = if trimmed.is_empty() { provider.default_base_url() } else { trimmed };
        let base_url = base.trim_end_matches('/').to_string();
        let chat_path = protocol_for(provider).chat_path();

        let url = Url::parse(&format!("{}{}", base_url, chat_path)).map_err(|e| {
            TranslationError::Configuration(format!("Invalid base URL '{}': {}", base_url, e))
        })?;

        Ok(Self { provider, base_url, chat_path, url })
    }

    /// Full chat URL
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Parse a response body into a JSON object, rejecting anything else
pub(crate) fn parse_envelope(response_body: &str) -> Result<serde_json::Map<String, serde_json::Value>, TranslationError> {
    let root: serde_json::Value = serde_json::from_str(response_body).map_err(|e| {
        TranslationError::Protocol(format!("Provider response was not valid JSON: {}", e))
    })?;
    match root {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(TranslationError::Protocol("Provider response was not a JSON object".to_string())),
    }
}

pub(crate) fn missing_content() -> TranslationError {
    TranslationError::Protocol("Translation response did not include assistant content".to_string())
}
