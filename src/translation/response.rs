/*!
 * Parsing and validation of the assistant's page map.
 *
 * The assistant is asked for a JSON object keyed by page number. Replies
 * are accepted with or without a markdown code fence around them, but every
 * page of the chunk must be answered.
 */

use log::debug;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use super::page::PageText;
use crate::errors::TranslationError;

const FENCE: &str = "```";

/// Strip an optional markdown code fence from assistant content.
///
/// Blank content becomes `{}` so that validation reports every page missing
/// instead of failing on empty input.
pub fn cleanup_assistant_content(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return "{}".to_string();
    }
    if !trimmed.starts_with(FENCE) {
        return trimmed.to_string();
    }

    let body = match trimmed.find('\n') {
        Some(newline) => &trimmed[newline + 1..],
        None => trimmed.trim_start_matches('`'),
    };
    let body = match closing_fence(body) {
        Some(closing) => &body[..closing],
        None => body,
    };
    body.trim().to_string()
}

/// Byte offset of the fence closing `body`, if any.
///
/// A closing fence starts a line or directly follows the JSON value; a
/// fence quoted inside a string value is neither.
fn closing_fence(body: &str) -> Option<usize> {
    body.rmatch_indices(FENCE).map(|(index, _)| index).find(|&index| {
        let before = &body[..index];
        before.ends_with('\n')
            || matches!(before.trim_end().chars().last(), None | Some('}') | Some(']'))
    })
}

/// Parse assistant content into translations for exactly the pages of `chunk`.
///
/// Keys are matched after trimming and integer parsing, so `" 2"` answers
/// page 2. A key that is present with a `null` value counts as an empty
/// translation; a missing key is an error.
pub fn parse_translation_response(
    content: &str,
    chunk: &[PageText],
) -> Result<BTreeMap<u32, String>, TranslationError> {
    let cleaned = cleanup_assistant_content(content);
    let root: Value = serde_json::from_str(&cleaned).map_err(|e| {
        TranslationError::Protocol(format!("Assistant content was not valid JSON: {}", e))
    })?;
    let object = match root {
        Value::Object(object) => object,
        _ => {
            return Err(TranslationError::Protocol(
                "Assistant content was not a JSON object".to_string(),
            ))
        }
    };

    let mut answered: BTreeMap<u32, Value> = BTreeMap::new();
    for (key, value) in object {
        match key.trim().parse::<u32>() {
            Ok(page_number) => {
                answered.insert(page_number, value);
            }
            Err(_) => debug!("Ignoring non-numeric key '{}' in translation response", key),
        }
    }

    let mut missing: Vec<u32> = chunk
        .iter()
        .map(PageText::page_number)
        .filter(|page_number| !answered.contains_key(page_number))
        .collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        return Err(TranslationError::MissingPages { missing });
    }

    let requested: HashSet<u32> = chunk.iter().map(PageText::page_number).collect();
    let extra: Vec<u32> = answered
        .keys()
        .copied()
        .filter(|page_number| !requested.contains(page_number))
        .collect();
    if !extra.is_empty() {
        debug!("Ignoring translations for pages outside the chunk: {:?}", extra);
    }

    Ok(chunk
        .iter()
        .map(|page| {
            let text = answered
                .get(&page.page_number())
                .map(value_to_text)
                .unwrap_or_default();
            (page.page_number(), text)
        })
        .collect())
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
