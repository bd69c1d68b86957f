/*!
 * Tests for the application lifecycle: configuration on disk through the
 * controller, and configuration failures that must stop a job before any
 * provider call.
 */

use anyhow::Result;

use pdf_translate::app_config::{Config, LlmSettings, TranslateRequest};
use pdf_translate::app_controller::Controller;
use pdf_translate::errors::{AppError, TranslationError};
use pdf_translate::providers::mock::MockTransport;

use crate::common::{config_with, create_source_pdf, create_temp_dir, enabled_settings, ollama_settings};

#[tokio::test]
async fn test_translateFile_withDisabledConfig_shouldFailBeforeAnyRequest() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_source_pdf(dir.path(), "doc.pdf", &["Hello"])?;
    let controller = Controller::with_transport(Config::default(), MockTransport::openai(&["{}"]));

    let err = controller
        .translate_file(&input, &dir.path().join("doc_translated.pdf"), &TranslateRequest::new("fr"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Translation(TranslationError::Configuration(_))));
    assert_eq!(controller.service().transport().call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withoutModel_shouldFailBeforeAnyRequest() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_source_pdf(dir.path(), "doc.pdf", &["Hello"])?;
    let settings = LlmSettings {
        model: String::new(),
        ..enabled_settings()
    };
    let controller = Controller::with_transport(config_with(settings), MockTransport::openai(&["{}"]));

    let err = controller
        .translate_file(&input, &dir.path().join("doc_translated.pdf"), &TranslateRequest::new("fr"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Translation(TranslationError::Configuration(_))));
    assert_eq!(controller.service().transport().call_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withConfigFromDisk_shouldUseConfiguredProvider() -> Result<()> {
    let dir = create_temp_dir()?;
    let config_path = dir.path().join("conf.json");
    config_with(ollama_settings()).save_to_file(&config_path)?;
    let config = Config::from_file(&config_path)?;
    config.validate()?;

    let input = create_source_pdf(dir.path(), "doc.pdf", &["Hello"])?;
    let output = dir.path().join("doc_translated.pdf");
    let controller = Controller::with_transport(config, MockTransport::ollama(&[r#"{"1":"Hallo"}"#]));

    controller
        .translate_file(&input, &output, &TranslateRequest::new("de"))
        .await?;

    let requests = controller.service().transport().requests();
    assert_eq!(requests[0].url, "http://gpu-box:11434/api/chat");
    assert_eq!(requests[0].body["model"], "llama3");
    assert!(output.exists());
    Ok(())
}

#[tokio::test]
async fn test_translateFile_withBlankDocument_shouldRenderPlaceholderWithoutRequests() -> Result<()> {
    let dir = create_temp_dir()?;
    let input = create_source_pdf(dir.path(), "blank.pdf", &[""])?;
    let output = dir.path().join("blank_translated.pdf");
    let controller = Controller::with_transport(config_with(enabled_settings()), MockTransport::default());

    let summary = controller
        .translate_file(&input, &output, &TranslateRequest::new("fr"))
        .await?;

    assert_eq!(summary.source_pages, 1);
    assert_eq!(summary.output_pages, 1);
    assert_eq!(controller.service().transport().call_count(), 0);
    Ok(())
}
