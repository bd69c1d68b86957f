/*!
 * Tests for chunking, prompts and response validation
 */

use pdf_translate::errors::TranslationError;
use pdf_translate::translation::chunker::chunk_pages;
use pdf_translate::translation::prompts::{build_system_prompt, build_user_payload};
use pdf_translate::translation::response::{cleanup_assistant_content, parse_translation_response};
use pdf_translate::translation::PageText;

use crate::common::{page_with_cost, pages};

fn chunk_numbers(chunks: &[Vec<PageText>]) -> Vec<Vec<u32>> {
    chunks
        .iter()
        .map(|chunk| chunk.iter().map(PageText::page_number).collect())
        .collect()
}

#[test]
fn test_chunkPages_withBudget_shouldPackGreedilyInOrder() {
    let input = vec![page_with_cost(1, 100), page_with_cost(2, 100), page_with_cost(3, 100)];
    assert_eq!(chunk_numbers(&chunk_pages(&input, 250)), vec![vec![1, 2], vec![3]]);
    assert_eq!(chunk_numbers(&chunk_pages(&input, 300)), vec![vec![1, 2, 3]]);
    assert_eq!(chunk_numbers(&chunk_pages(&input, 99)), vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn test_chunkPages_withOversizedPage_shouldIsolateIt() {
    let input = vec![page_with_cost(1, 50), page_with_cost(2, 900), page_with_cost(3, 50)];
    assert_eq!(chunk_numbers(&chunk_pages(&input, 200)), vec![vec![1], vec![2], vec![3]]);
}

#[test]
fn test_chunkPages_withNoPages_shouldReturnNoChunks() {
    assert!(chunk_pages(&[], 4000).is_empty());
}

#[test]
fn test_buildUserPayload_shouldMapPageNumbersToRawText() {
    let payload = build_user_payload(&pages(&[(4, "  keep  spacing\n"), (5, "\"quoted\"")])).unwrap();
    let value: serde_json::Value = serde_json::from_str(&payload).unwrap();

    assert_eq!(value["4"], "  keep  spacing\n");
    assert_eq!(value["5"], "\"quoted\"");
}

#[test]
fn test_buildSystemPrompt_withExtras_shouldAppendInOrder() {
    let prompt = build_system_prompt(Some("en"), "fr", Some(" Be concise. "), Some("Use tu."));
    assert!(prompt.starts_with("You are a professional translation assistant."));
    assert!(prompt.contains("from en into fr."));
    assert!(prompt.ends_with("Be concise. Use tu."));
}

#[test]
fn test_cleanupAssistantContent_shouldStripFences() {
    assert_eq!(cleanup_assistant_content("   "), "{}");
    assert_eq!(cleanup_assistant_content("```json\n{\"1\":\"a\"}\n```"), "{\"1\":\"a\"}");
    assert_eq!(cleanup_assistant_content("```\n{\"1\":\"a\"}\n```  "), "{\"1\":\"a\"}");
    assert_eq!(cleanup_assistant_content(" {\"1\":\"a\"} "), "{\"1\":\"a\"}");
}

#[test]
fn test_parseTranslationResponse_withUnclosedFenceAndBackticksInValue_shouldKeepValue() {
    let chunk = pages(&[(1, "a")]);
    let parsed =
        parse_translation_response("```json\n{\"1\":\"Use ``` to open a block\"}", &chunk).unwrap();

    assert_eq!(parsed[&1], "Use ``` to open a block");
}

#[test]
fn test_parseTranslationResponse_withPaddedKeysAndExtras_shouldKeepChunkPages() {
    let chunk = pages(&[(1, "a"), (2, "b")]);
    let parsed = parse_translation_response(r#"{" 1 ":"A","02":" B ","9":"extra"}"#, &chunk).unwrap();

    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[&1], "A");
    assert_eq!(parsed[&2], " B ");
}

#[test]
fn test_parseTranslationResponse_withNonStringValues_shouldStringify() {
    let chunk = pages(&[(1, "a"), (2, "b"), (3, "c")]);
    let parsed = parse_translation_response(r#"{"1":null,"2":42,"3":["x"]}"#, &chunk).unwrap();

    assert_eq!(parsed[&1], "");
    assert_eq!(parsed[&2], "42");
    assert_eq!(parsed[&3], "[\"x\"]");
}

#[test]
fn test_parseTranslationResponse_withInvalidContent_shouldFail() {
    let chunk = pages(&[(1, "a"), (3, "c")]);

    let err = parse_translation_response("Sure! Here is the translation.", &chunk).unwrap_err();
    assert!(matches!(err, TranslationError::Protocol(_)));

    let err = parse_translation_response("[\"a\"]", &chunk).unwrap_err();
    assert!(matches!(err, TranslationError::Protocol(_)));

    match parse_translation_response("", &chunk).unwrap_err() {
        TranslationError::MissingPages { missing } => assert_eq!(missing, vec![1, 3]),
        other => panic!("unexpected error: {other}"),
    }
}
