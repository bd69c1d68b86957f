/*!
 * Mock transport for testing.
 *
 * `MockTransport` replays a scripted list of replies in order and records
 * every request it receives, so tests can drive the whole translation
 * pipeline without a network:
 * - `MockReply::Body` - a 200 response with the given body
 * - `MockReply::Status` - a non-success status with a body
 * - `MockReply::Timeout` - a transport timeout
 */

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use super::ChatTransport;
use crate::errors::TranslationError;

/// One scripted reply
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Successful response body
    Body(String),
    /// Non-success status with a body
    Status(u16, String),
    /// Request timed out
    Timeout,
}

/// A request captured by the mock
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
    pub timeout: Duration,
}

impl RecordedRequest {
    /// Value of a header, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Parsed JSON of the user message content (the per-chunk page payload)
    pub fn user_payload(&self) -> Option<serde_json::Value> {
        self.body["messages"]
            .as_array()?
            .iter()
            .find(|m| m["role"] == "user")
            .and_then(|m| m["content"].as_str())
            .and_then(|content| serde_json::from_str(content).ok())
    }
}

/// Scripted transport for tests
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: Mutex<Vec<MockReply>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Create a mock that answers with `replies` in order
    pub fn new(replies: Vec<MockReply>) -> Self {
        let mut replies = replies;
        replies.reverse();
        Self {
            replies: Mutex::new(replies),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock whose replies are OpenAI-style envelopes around `contents`
    pub fn openai(contents: &[&str]) -> Self {
        Self::new(contents.iter().map(|c| MockReply::Body(Self::openai_envelope(c))).collect())
    }

    /// Create a mock whose replies are Ollama-style envelopes around `contents`
    pub fn ollama(contents: &[&str]) -> Self {
        Self::new(contents.iter().map(|c| MockReply::Body(Self::ollama_envelope(c))).collect())
    }

    /// Wrap assistant content in a chat completions response
    pub fn openai_envelope(content: &str) -> String {
        serde_json::json!({
            "id": "chatcmpl-mock",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
        .to_string()
    }

    /// Wrap assistant content in an Ollama chat response
    pub fn ollama_envelope(content: &str) -> String {
        serde_json::json!({
            "model": "mock",
            "created_at": "2024-01-01T00:00:00Z",
            "message": { "role": "assistant", "content": content },
            "done": true
        })
        .to_string()
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Number of requests received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn post_json(
        &self,
        url: &Url,
        headers: &[(String, String)],
        body: &serde_json::Value,
        timeout: Duration,
    ) -> Result<String, TranslationError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest {
                url: url.to_string(),
                headers: headers.to_vec(),
                body: body.clone(),
                timeout,
            });
        }

        let reply = self.replies.lock().ok().and_then(|mut r| r.pop());
        match reply {
            Some(MockReply::Body(body)) => Ok(body),
            Some(MockReply::Status(status, body)) => Err(TranslationError::http_status(status, &body)),
            Some(MockReply::Timeout) => Err(TranslationError::Transport {
                status: None,
                message: format!("Request to {} timed out after {}s", url, timeout.as_secs()),
            }),
            None => Err(TranslationError::Transport {
                status: None,
                message: "Mock transport has no scripted reply left".to_string(),
            }),
        }
    }
}
