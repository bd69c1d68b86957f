use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::TranslationError;
use crate::providers::ProviderEndpoint;
use crate::render::sanitize_font_size;
use crate::translation::prompts::build_system_prompt;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings, and resolving a single
/// translation job into an immutable [`JobConfig`].
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// LLM service settings shared by every job
    #[serde(default)]
    pub llm: LlmSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Directory holding the TrueType files of each font face; Helvetica
    /// is used when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_directory: Option<PathBuf>,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: OpenAI-compatible chat completions (OpenAI, LM Studio, vLLM, ...)
    #[default]
    #[serde(rename = "openai")]
    OpenAiCompatible,
    // @provider: Ollama native chat API
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::OpenAiCompatible => "OpenAI-compatible",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn key(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "openai",
            Self::Ollama => "ollama",
        }
    }

    // @returns: Built-in base URL used when none is configured
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAiCompatible => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
        }
    }

    /// Lenient lookup used for configured and requested provider names.
    ///
    /// Blank and unknown values fall back to the OpenAI-compatible protocol.
    pub fn from_key(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        if normalized.is_empty() {
            return Self::OpenAiCompatible;
        }
        match normalized.parse() {
            Ok(provider) => provider,
            Err(_) => {
                warn!("Unknown provider '{}', using the OpenAI-compatible protocol", value.trim());
                Self::OpenAiCompatible
            }
        }
    }
}

// Implement Display trait for TranslationProvider
impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// Implement FromStr trait for TranslationProvider
impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAiCompatible),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Global LLM service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LlmSettings {
    /// Master switch for every LLM-backed feature
    #[serde(default)]
    pub enabled: bool,

    /// Functions the deployment allows; translation requires "translation"
    #[serde(default = "default_supported_functions")]
    pub supported_functions: Vec<String>,

    /// Default provider key ("openai" or "ollama")
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Default model name
    #[serde(default)]
    pub model: String,

    /// Whether a job may choose its own provider
    #[serde(default)]
    pub allow_provider_override: bool,

    /// Whether a job may choose its own model
    #[serde(default)]
    pub allow_model_override: bool,

    /// Whether a job may append its own prompt instructions
    #[serde(default)]
    pub allow_custom_prompt: bool,

    /// Whether output documents may include the original page text
    #[serde(default = "default_true")]
    pub allow_original_text: bool,

    /// Character budget per request; non-positive means the built-in default
    #[serde(default = "default_max_chunk_characters")]
    pub max_chunk_characters: i64,

    /// Request timeout in seconds, floored at [`MIN_TIMEOUT_SECONDS`]
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_seconds: u64,

    /// Sampling temperature; absent means [`DEFAULT_TEMPERATURE`]
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Extra instructions appended to every system prompt
    #[serde(default)]
    pub default_prompt: String,

    /// API key sent as a bearer token to OpenAI-compatible providers
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the provider; blank means the provider default
    #[serde(default)]
    pub base_url: String,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            supported_functions: default_supported_functions(),
            provider: default_provider(),
            model: String::new(),
            allow_provider_override: false,
            allow_model_override: false,
            allow_custom_prompt: false,
            allow_original_text: true,
            max_chunk_characters: default_max_chunk_characters(),
            request_timeout_seconds: default_timeout_secs(),
            temperature: None,
            default_prompt: String::new(),
            api_key: String::new(),
            base_url: String::new(),
        }
    }
}

impl LlmSettings {
    /// True when the service is switched on and allowed to translate
    pub fn supports_translation(&self) -> bool {
        self.enabled && self.supported_functions.iter().any(|f| f.trim() == TRANSLATION_FUNCTION)
    }
}

/// Per-job translation request supplied by the caller
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslateRequest {
    /// Target language tag, e.g. "fr" or "zh-CN"
    pub target_language: String,

    /// Source language; blank lets the model detect it
    #[serde(default)]
    pub source_language: Option<String>,

    /// Provider override, honoured only when the settings allow it
    #[serde(default)]
    pub provider: Option<String>,

    /// Model override, honoured only when the settings allow it
    #[serde(default)]
    pub model: Option<String>,

    /// Additional prompt instructions, honoured only when the settings allow it
    #[serde(default)]
    pub custom_prompt: Option<String>,

    /// Render the original text before the translation
    #[serde(default)]
    pub include_original_text: bool,

    /// Requested font size in points
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

impl TranslateRequest {
    /// Create a request for the given target language with default options
    pub fn new(target_language: impl Into<String>) -> Self {
        Self {
            target_language: target_language.into(),
            source_language: None,
            provider: None,
            model: None,
            custom_prompt: None,
            include_original_text: false,
            font_size: default_font_size(),
        }
    }
}

/// Fully resolved, immutable configuration for one translation job
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Provider protocol used for every chunk
    pub provider: TranslationProvider,
    /// Model name sent with every request
    pub model: String,
    /// Resolved chat endpoint
    pub endpoint: ProviderEndpoint,
    /// Trimmed API key, if one is configured
    pub api_key: Option<String>,
    /// Connect and request timeout
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Character budget per chunk
    pub max_chunk_characters: usize,
    /// Complete system prompt
    pub system_prompt: String,
    /// Trimmed target language
    pub target_language: String,
    /// Trimmed source language, if given
    pub source_language: Option<String>,
    /// Whether the original text is rendered, after the global gate
    pub include_original_text: bool,
    /// Font size clamped to the supported range
    pub font_size: f32,
}

impl JobConfig {
    /// Resolve global settings and a job request into a runnable configuration.
    ///
    /// Every configuration error is raised here, before any network call.
    pub fn resolve(settings: &LlmSettings, request: &TranslateRequest) -> Result<Self, TranslationError> {
        if !settings.supports_translation() {
            return Err(TranslationError::Configuration(
                "LLM translation is disabled. Enable llm in settings and add 'translation' to supported_functions.".to_string(),
            ));
        }

        let target_language = request.target_language.trim();
        if target_language.is_empty() {
            return Err(TranslationError::Configuration("Target language is required.".to_string()));
        }

        let provider = match non_blank(request.provider.as_deref()) {
            Some(requested) if settings.allow_provider_override => TranslationProvider::from_key(requested),
            _ => TranslationProvider::from_key(&settings.provider),
        };

        let model = match non_blank(request.model.as_deref()) {
            Some(requested) if settings.allow_model_override => requested.to_string(),
            _ => non_blank(Some(&settings.model))
                .map(str::to_string)
                .ok_or_else(|| {
                    TranslationError::Configuration(
                        "No translation model configured. Update llm.model.".to_string(),
                    )
                })?,
        };

        let endpoint = ProviderEndpoint::resolve(provider, &settings.base_url)?;

        let max_chunk_characters = if settings.max_chunk_characters <= 0 {
            DEFAULT_MAX_CHUNK_CHARACTERS
        } else {
            settings.max_chunk_characters as usize
        };

        let source_language = non_blank(request.source_language.as_deref()).map(str::to_string);
        let custom_prompt = if settings.allow_custom_prompt {
            non_blank(request.custom_prompt.as_deref())
        } else {
            None
        };
        let system_prompt = build_system_prompt(
            source_language.as_deref(),
            target_language,
            non_blank(Some(&settings.default_prompt)),
            custom_prompt,
        );

        Ok(Self {
            provider,
            model,
            endpoint,
            api_key: non_blank(Some(&settings.api_key)).map(str::to_string),
            timeout: Duration::from_secs(settings.request_timeout_seconds.max(MIN_TIMEOUT_SECONDS)),
            temperature: settings.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            max_chunk_characters,
            system_prompt,
            target_language: target_language.to_string(),
            source_language,
            include_original_text: request.include_original_text && settings.allow_original_text,
            font_size: sanitize_font_size(request.font_size),
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Function name that must be listed in `supported_functions`
pub const TRANSLATION_FUNCTION: &str = "translation";

/// Lower bound applied to the configured request timeout
pub const MIN_TIMEOUT_SECONDS: u64 = 10;

/// Chunk budget used when the configured one is not positive
pub const DEFAULT_MAX_CHUNK_CHARACTERS: usize = 4000;

/// Temperature used when none is configured
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

fn default_supported_functions() -> Vec<String> {
    vec![TRANSLATION_FUNCTION.to_string()]
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_max_chunk_characters() -> i64 {
    DEFAULT_MAX_CHUNK_CHARACTERS as i64
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_font_size() -> f32 {
    12.0
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Write the configuration as pretty-printed JSON
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let config_json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write config to file: {}", path.display()))?;
        Ok(())
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if let Some(directory) = &self.font_directory {
            if !directory.is_dir() {
                return Err(anyhow!("font_directory is not a directory: {}", directory.display()));
            }
        }

        if !self.llm.enabled {
            return Ok(());
        }

        if self.llm.model.trim().is_empty() && !self.llm.allow_model_override {
            return Err(anyhow!("llm.model is required when model overrides are not allowed"));
        }

        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(anyhow!("llm.temperature must be between 0.0 and 2.0, got {}", temperature));
            }
        }

        if !self.llm.base_url.trim().is_empty() {
            url::Url::parse(self.llm.base_url.trim())
                .with_context(|| format!("llm.base_url is not a valid URL: {}", self.llm.base_url))?;
        }

        Ok(())
    }
}
