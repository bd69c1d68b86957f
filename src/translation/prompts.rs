/*!
 * Prompt construction for page translation.
 *
 * The system prompt is a fixed template with the language pair filled in,
 * followed by optional deployment and caller instructions. The user message
 * is a JSON object mapping page numbers to raw page text.
 */

use serde_json::{Map, Value};

use super::page::PageText;
use crate::errors::TranslationError;

/// System prompt template for page translation.
pub struct PromptTemplate;

impl PromptTemplate {
    /// The system prompt for page translation.
    pub const PAGE_TRANSLATOR: &'static str = "You are a professional translation assistant. \
Translate the provided PDF text from {source_language} into {target_language}. \
Preserve headings, numbering, and paragraph structure. \
Respond with a JSON object whose keys are the page numbers and whose values are only the translated text. \
Do not include explanations or additional commentary.";

    /// Phrase used when the caller leaves the source language blank.
    pub const UNKNOWN_SOURCE: &'static str = "its original language";

    /// Render the template with the given languages.
    pub fn render(source_language: &str, target_language: &str) -> String {
        Self::PAGE_TRANSLATOR
            .replace("{source_language}", source_language)
            .replace("{target_language}", target_language)
    }
}

/// Build the full system prompt for a job.
///
/// `default_prompt` is always appended when present; `custom_prompt` must
/// already be filtered by the caller's permission to customize.
pub fn build_system_prompt(
    source_language: Option<&str>,
    target_language: &str,
    default_prompt: Option<&str>,
    custom_prompt: Option<&str>,
) -> String {
    let source = source_language
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(PromptTemplate::UNKNOWN_SOURCE);

    let mut prompt = PromptTemplate::render(source, target_language.trim());
    for extra in [default_prompt, custom_prompt].into_iter().flatten() {
        let extra = extra.trim();
        if !extra.is_empty() {
            prompt.push(' ');
            prompt.push_str(extra);
        }
    }
    prompt
}

/// Serialize a chunk as the user message: `{"<page>": "<raw text>", ...}`
pub fn build_user_payload(chunk: &[PageText]) -> Result<String, TranslationError> {
    let payload: Map<String, Value> = chunk
        .iter()
        .map(|page| (page.page_number().to_string(), Value::String(page.text().to_string())))
        .collect();

    serde_json::to_string(&payload)
        .map_err(|e| TranslationError::Protocol(format!("Failed to encode page payload: {}", e)))
}
