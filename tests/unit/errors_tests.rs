/*!
 * Tests for error types and conversions
 */

use pdf_translate::errors::{truncate_body, AppError, RenderError, TranslationError, MAX_ERROR_BODY_CHARS};

#[test]
fn test_httpStatus_withLongBody_shouldTruncateAndKeepStatus() {
    let body = "é".repeat(MAX_ERROR_BODY_CHARS + 10);
    let err = TranslationError::http_status(503, &body);

    assert_eq!(err.status_code(), Some(503));
    let message = err.to_string();
    assert!(message.contains("status 503"));
    assert!(message.ends_with("..."));
    assert!(!message.contains(&"é".repeat(MAX_ERROR_BODY_CHARS + 1)));
}

#[test]
fn test_truncateBody_withShortBody_shouldReturnItUnchanged() {
    assert_eq!(truncate_body("bad gateway", 500), "bad gateway");
    assert_eq!(truncate_body("abcdef", 3), "abc...");
}

#[test]
fn test_statusCode_withNonTransportError_shouldBeNone() {
    assert_eq!(TranslationError::Protocol("x".to_string()).status_code(), None);
    assert_eq!(
        TranslationError::MissingPages { missing: vec![2, 5] }.to_string(),
        "Translation response was missing pages: [2, 5]"
    );
}

#[test]
fn test_appError_fromInnerErrors_shouldWrapThem() {
    let translation: AppError = TranslationError::Configuration("off".to_string()).into();
    assert!(matches!(translation, AppError::Translation(TranslationError::Configuration(_))));
    assert_eq!(translation.to_string(), "Translation error: Configuration error: off");

    let render: AppError = RenderError::Font("missing".to_string()).into();
    assert!(matches!(render, AppError::Render(_)));

    let io: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(io, AppError::File(_)));

    let other: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(other.to_string(), "Unknown error: boom");
}
