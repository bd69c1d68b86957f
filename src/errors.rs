/*!
 * Error types for the pdf-translate application.
 *
 * This module contains custom error types for the different stages of a
 * translation job, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while translating page text through an LLM provider
#[derive(Error, Debug)]
pub enum TranslationError {
    /// The feature is disabled or the job cannot be resolved into a runnable configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request timed out, could not connect, or returned a non-success status
    #[error("Translation request failed: {message}")]
    Transport {
        /// HTTP status code, when the server answered
        status: Option<u16>,
        /// Description including a truncated response body when available
        message: String,
    },

    /// The provider answered with something that is not the expected envelope
    #[error("Unexpected provider response: {0}")]
    Protocol(String),

    /// The reply for a chunk did not contain every requested page
    #[error("Translation response was missing pages: {missing:?}")]
    MissingPages {
        /// Page numbers absent from the reply, ascending
        missing: Vec<u32>,
    },

    /// The extracted page list violates the page numbering contract
    #[error("Invalid page input: {0}")]
    InvalidInput(String),
}

impl TranslationError {
    /// Build a transport error for a non-success HTTP status
    pub fn http_status(status: u16, body: &str) -> Self {
        Self::Transport {
            status: Some(status),
            message: format!(
                "Translation request failed with status {} and body: {}",
                status,
                truncate_body(body, MAX_ERROR_BODY_CHARS)
            ),
        }
    }

    /// Status code carried by a transport error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

/// Maximum number of response body characters kept in a transport error
pub const MAX_ERROR_BODY_CHARS: usize = 500;

/// Truncate a response body to `max_chars` characters, marking the cut with `...`
pub fn truncate_body(body: &str, max_chars: usize) -> String {
    if body.chars().count() > max_chars {
        let mut truncated: String = body.chars().take(max_chars).collect();
        truncated.push_str("...");
        truncated
    } else {
        body.to_string()
    }
}

/// Errors that can occur while laying out and writing output pages
#[derive(Error, Debug)]
pub enum RenderError {
    /// The PDF backend rejected an operation
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The job font could not be loaded or used
    #[error("Font error: {0}")]
    Font(String),
}

impl From<lopdf::Error> for RenderError {
    fn from(error: lopdf::Error) -> Self {
        Self::Pdf(error.to_string())
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from translation
    #[error("Translation error: {0}")]
    Translation(#[from] TranslationError),

    /// Error from rendering the output document
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
