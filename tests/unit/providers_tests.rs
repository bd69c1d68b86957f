/*!
 * Tests for provider protocol adapters
 */

use pdf_translate::app_config::TranslationProvider;
use pdf_translate::errors::TranslationError;
use pdf_translate::providers::mock::MockTransport;
use pdf_translate::providers::{protocol_for, ChatMessage, ProviderEndpoint};

#[test]
fn test_protocolFor_shouldPickChatPathPerProvider() {
    assert_eq!(protocol_for(TranslationProvider::OpenAiCompatible).chat_path(), "/chat/completions");
    assert_eq!(protocol_for(TranslationProvider::Ollama).chat_path(), "/api/chat");
}

#[test]
fn test_extractText_withMatchingEnvelopes_shouldReturnAssistantContent() {
    let openai = protocol_for(TranslationProvider::OpenAiCompatible);
    let ollama = protocol_for(TranslationProvider::Ollama);

    assert_eq!(
        openai.extract_text(&MockTransport::openai_envelope("{\"1\":\"Salut\"}")).unwrap(),
        "{\"1\":\"Salut\"}"
    );
    assert_eq!(
        ollama.extract_text(&MockTransport::ollama_envelope("{\"1\":\"Hallo\"}")).unwrap(),
        "{\"1\":\"Hallo\"}"
    );
}

#[test]
fn test_extractText_withWrongEnvelope_shouldBeProtocolError() {
    let ollama = protocol_for(TranslationProvider::Ollama);
    let err = ollama.extract_text(&MockTransport::openai_envelope("{}")).unwrap_err();
    assert!(matches!(err, TranslationError::Protocol(_)));
}

#[test]
fn test_authHeaders_shouldOnlyAuthenticateOpenAi() {
    let openai = protocol_for(TranslationProvider::OpenAiCompatible);
    let ollama = protocol_for(TranslationProvider::Ollama);

    assert_eq!(openai.auth_headers(Some("sk-1")).len(), 1);
    assert!(ollama.auth_headers(Some("sk-1")).is_empty());
}

#[test]
fn test_buildRequest_shouldCarryMessagesInOrder() {
    let protocol = protocol_for(TranslationProvider::Ollama);
    let body = protocol
        .build_request(
            "llama3",
            vec![ChatMessage::system("translate"), ChatMessage::user("{\"1\":\"x\"}")],
            0.7,
        )
        .unwrap();

    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], "{\"1\":\"x\"}");
}

#[test]
fn test_endpointResolve_withPathInBase_shouldAppendChatPath() {
    let endpoint =
        ProviderEndpoint::resolve(TranslationProvider::OpenAiCompatible, "http://localhost:1234/v1/").unwrap();
    assert_eq!(endpoint.url().as_str(), "http://localhost:1234/v1/chat/completions");
    assert_eq!(endpoint.chat_path, "/chat/completions");
}
