/*!
 * Tests for application configuration and job resolution
 */

use std::time::Duration;

use pdf_translate::app_config::{
    Config, JobConfig, LlmSettings, LogLevel, TranslateRequest, TranslationProvider,
};
use pdf_translate::errors::TranslationError;

use crate::common::{create_temp_dir, enabled_settings};

/// Test default configuration values
#[test]
fn test_defaultConfig_shouldBeDisabledWithSafeDefaults() {
    let config = Config::default();

    assert!(!config.llm.enabled);
    assert_eq!(config.llm.provider, "openai");
    assert_eq!(config.llm.max_chunk_characters, 4000);
    assert_eq!(config.llm.request_timeout_seconds, 120);
    assert!(config.llm.allow_original_text);
    assert!(!config.llm.allow_custom_prompt);
    assert_eq!(config.log_level, LogLevel::Info);
}

#[test]
fn test_resolve_withDisabledSettings_shouldFail() {
    let err = JobConfig::resolve(&LlmSettings::default(), &TranslateRequest::new("fr")).unwrap_err();
    assert!(matches!(err, TranslationError::Configuration(_)));
    assert!(err.to_string().contains("disabled"));
}

#[test]
fn test_resolve_withoutTranslationFunction_shouldFail() {
    let settings = LlmSettings {
        supported_functions: vec!["summary".to_string()],
        ..enabled_settings()
    };
    let err = JobConfig::resolve(&settings, &TranslateRequest::new("fr")).unwrap_err();
    assert!(matches!(err, TranslationError::Configuration(_)));
}

#[test]
fn test_resolve_withBlankTargetOrModel_shouldFail() {
    let err = JobConfig::resolve(&enabled_settings(), &TranslateRequest::new("   ")).unwrap_err();
    assert!(err.to_string().contains("Target language"));

    let settings = LlmSettings {
        model: " ".to_string(),
        ..enabled_settings()
    };
    let err = JobConfig::resolve(&settings, &TranslateRequest::new("fr")).unwrap_err();
    assert!(err.to_string().contains("model"));
}

#[test]
fn test_resolve_withDefaults_shouldFillEveryField() {
    let job = JobConfig::resolve(&enabled_settings(), &TranslateRequest::new(" fr ")).unwrap();

    assert_eq!(job.provider, TranslationProvider::OpenAiCompatible);
    assert_eq!(job.model, "gpt-4o-mini");
    assert_eq!(job.endpoint.url().as_str(), "https://api.openai.com/v1/chat/completions");
    assert_eq!(job.api_key.as_deref(), Some("sk-test"));
    assert_eq!(job.timeout, Duration::from_secs(120));
    assert!((job.temperature - 0.2).abs() < f32::EPSILON);
    assert_eq!(job.max_chunk_characters, 4000);
    assert_eq!(job.target_language, "fr");
    assert!(job.source_language.is_none());
    assert!(job.system_prompt.contains("from its original language into fr."));
    assert_eq!(job.font_size, 12.0);
}

#[test]
fn test_resolve_withOverridesNotAllowed_shouldIgnoreThem() {
    let request = TranslateRequest {
        provider: Some("ollama".to_string()),
        model: Some("llama3".to_string()),
        custom_prompt: Some("Use a formal register.".to_string()),
        ..TranslateRequest::new("de")
    };
    let job = JobConfig::resolve(&enabled_settings(), &request).unwrap();

    assert_eq!(job.provider, TranslationProvider::OpenAiCompatible);
    assert_eq!(job.model, "gpt-4o-mini");
    assert!(!job.system_prompt.contains("formal register"));
}

#[test]
fn test_resolve_withOverridesAllowed_shouldApplyThem() {
    let settings = LlmSettings {
        allow_provider_override: true,
        allow_model_override: true,
        allow_custom_prompt: true,
        default_prompt: "Keep product names untranslated.".to_string(),
        ..enabled_settings()
    };
    let request = TranslateRequest {
        provider: Some("ollama".to_string()),
        model: Some("llama3".to_string()),
        custom_prompt: Some("Use a formal register.".to_string()),
        source_language: Some("en".to_string()),
        ..TranslateRequest::new("de")
    };
    let job = JobConfig::resolve(&settings, &request).unwrap();

    assert_eq!(job.provider, TranslationProvider::Ollama);
    assert_eq!(job.model, "llama3");
    assert_eq!(job.endpoint.url().as_str(), "http://localhost:11434/api/chat");
    assert!(job.system_prompt.contains("from en into de."));
    assert!(job.system_prompt.ends_with("Keep product names untranslated. Use a formal register."));
}

#[test]
fn test_resolve_withOutOfRangeValues_shouldClampThem() {
    let settings = LlmSettings {
        max_chunk_characters: -5,
        request_timeout_seconds: 1,
        ..enabled_settings()
    };
    let request = TranslateRequest {
        font_size: 200.0,
        ..TranslateRequest::new("fr")
    };
    let job = JobConfig::resolve(&settings, &request).unwrap();

    assert_eq!(job.max_chunk_characters, 4000);
    assert_eq!(job.timeout, Duration::from_secs(10));
    assert_eq!(job.font_size, 36.0);
}

#[test]
fn test_resolve_withOriginalTextGate_shouldRequireBothFlags() {
    let request = TranslateRequest {
        include_original_text: true,
        ..TranslateRequest::new("fr")
    };
    assert!(JobConfig::resolve(&enabled_settings(), &request).unwrap().include_original_text);

    let settings = LlmSettings {
        allow_original_text: false,
        ..enabled_settings()
    };
    assert!(!JobConfig::resolve(&settings, &request).unwrap().include_original_text);
}

#[test]
fn test_resolve_withBlankApiKeyAndSlashedBase_shouldNormalize() {
    let settings = LlmSettings {
        api_key: "   ".to_string(),
        base_url: "http://localhost:1234/v1//".to_string(),
        ..enabled_settings()
    };
    let job = JobConfig::resolve(&settings, &TranslateRequest::new("fr")).unwrap();

    assert!(job.api_key.is_none());
    assert_eq!(job.endpoint.base_url, "http://localhost:1234/v1");
    assert_eq!(job.endpoint.url().as_str(), "http://localhost:1234/v1/chat/completions");
}

#[test]
fn test_providerFromKey_withUnknownValue_shouldFallBackToOpenAi() {
    assert_eq!(TranslationProvider::from_key("OLLAMA"), TranslationProvider::Ollama);
    assert_eq!(TranslationProvider::from_key("something"), TranslationProvider::OpenAiCompatible);
}

#[test]
fn test_validate_withBadValues_shouldFail() {
    let mut config = Config {
        llm: enabled_settings(),
        ..Config::default()
    };
    assert!(config.validate().is_ok());

    config.llm.temperature = Some(3.5);
    assert!(config.validate().is_err());

    config.llm.temperature = None;
    config.llm.base_url = "not a url".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_saveAndLoad_shouldPreserveSettings() -> anyhow::Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("conf.json");
    let config = Config {
        llm: LlmSettings {
            base_url: "http://gpu-box:11434".to_string(),
            ..enabled_settings()
        },
        log_level: LogLevel::Debug,
        font_directory: Some(dir.path().to_path_buf()),
    };

    config.save_to_file(&path)?;
    let loaded = Config::from_file(&path)?;

    assert!(loaded.llm.enabled);
    assert_eq!(loaded.llm.model, "gpt-4o-mini");
    assert_eq!(loaded.llm.base_url, "http://gpu-box:11434");
    assert_eq!(loaded.log_level, LogLevel::Debug);
    assert_eq!(loaded.font_directory.as_deref(), Some(dir.path()));
    Ok(())
}

#[test]
fn test_fromFile_withPartialJson_shouldFillDefaults() -> anyhow::Result<()> {
    let dir = create_temp_dir()?;
    let path = dir.path().join("conf.json");
    std::fs::write(&path, r#"{"llm":{"enabled":true,"model":"llama3","provider":"ollama"}}"#)?;

    let loaded = Config::from_file(&path)?;
    assert!(loaded.llm.supports_translation());
    assert_eq!(loaded.llm.max_chunk_characters, 4000);
    assert_eq!(loaded.log_level, LogLevel::Info);
    Ok(())
}
