use serde::Serialize;

use super::{missing_content, parse_envelope, ChatMessage, ChatProtocol};
use crate::errors::TranslationError;

/// OpenAI-compatible chat completions protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenAiProtocol;

/// Chat completions request
#[derive(Debug, Serialize)]
pub struct OpenAIRequest {
    /// The model to use
    model: String,

    /// The messages for the conversation
    messages: Vec<ChatMessage>,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,

    /// Whether to stream the response
    stream: bool,

    /// Requested output format
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

/// Response format hint
#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    /// Format type, e.g. "json_object"
    #[serde(rename = "type")]
    pub format_type: String,
}

impl Default for OpenAIRequest {
    fn default() -> Self {
        Self {
            model: String::new(),
            messages: Vec::new(),
            temperature: None,
            stream: false,
            response_format: None,
        }
    }
}

impl OpenAIRequest {
    /// Create a new request for a model
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Add a message to the request
    pub fn add_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Set the temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask the model to answer with a single JSON object
    pub fn json_object(mut self) -> Self {
        self.response_format = Some(ResponseFormat {
            format_type: "json_object".to_string(),
        });
        self
    }
}

impl ChatProtocol for OpenAiProtocol {
    fn chat_path(&self) -> &'static str {
        "/chat/completions"
    }

    fn build_request(
        &self,
        model: &str,
        messages: Vec<ChatMessage>,
        temperature: f32,
    ) -> Result<serde_json::Value, TranslationError> {
        let request = messages
            .into_iter()
            .fold(OpenAIRequest::new(model), OpenAIRequest::add_message)
            .temperature(temperature)
            .json_object();

        serde_json::to_value(&request)
            .map_err(|e| TranslationError::Protocol(format!("Failed to encode request: {}", e)))
    }

    fn auth_headers(&self, api_key: Option<&str>) -> Vec<(String, String)> {
        match api_key.map(str::trim).filter(|k| !k.is_empty()) {
            Some(key) => vec![("Authorization".to_string(), format!("Bearer {}", key))],
            None => Vec::new(),
        }
    }

    /// Reads `choices[0].message.content`, then `choices[0].text`, then `output_text`.
    fn extract_text(&self, response_body: &str) -> Result<String, TranslationError> {
        let root = parse_envelope(response_body)?;

        if let Some(choice) = root
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|choices| choices.first())
        {
            if let Some(content) = choice
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
            {
                return Ok(content.to_string());
            }
            if let Some(text) = choice.get("text").and_then(|t| t.as_str()) {
                return Ok(text.to_string());
            }
        }

        root.get("output_text")
            .and_then(|t| t.as_str())
            .map(str::to_string)
            .ok_or_else(missing_content)
    }
}
