use serde::{Deserialize, Serialize};

use super::{missing_content, parse_envelope, ChatMessage, ChatProtocol};
use crate::errors::TranslationError;

/// Ollama native chat protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct OllamaProtocol;

/// Generation options for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Temperature for generation (default: 0.8)
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Chat request for the Ollama API
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Model name to use for generation
    model: String,
    /// Messages of the conversation
    messages: Vec<ChatMessage>,
    /// Additional model parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<GenerationOptions>,
    /// Format to return a response in
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<String>,
    /// Whether to stream the response
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

/// Builder methods for ChatRequest
impl ChatRequest {
    /// Create a new chat request
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: None,
            format: None,
            stream: Some(false),
        }
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        match &mut self.options {
            Some(options) => options.temperature = Some(temperature),
            None => {
                self.options = Some(GenerationOptions {
                    temperature: Some(temperature),
                })
            }
        }
        self
    }

    /// Set the format
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

impl ChatProtocol for OllamaProtocol {
    fn chat_path(&self) -> &'static str {
        "/api/chat"
    }

    fn build_request(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<serde_json::Value, TranslationError> {
        let request = ChatRequest::new(model, messages)
            .temperature(temperature)
            .format("json");

        serde_json::to_value(&request)
            .map_err(|e| TranslationError::Protocol(format!("Failed to encode request: {}", e)))
    }

    // Ollama has no authentication
    fn auth_headers(&self, _api_key: Option<&str>) -> Vec<(String, String)> {
        Vec::new()
    }

    fn extract_text(&self, response_body: &str) -> Result<String, TranslationError> {
        let root = parse_envelope(response_body)?;
        root.get("message")
            .and_then(|m| m.get("content"))
            .and_then(|c| c.as_str())
            .map(str::to_string)
            .ok_or_else(missing_content)
    }
}
