/*!
 * # pdf-translate - PDF translation with LLMs
 *
 * A Rust library for translating the text of PDF documents through a
 * large-language-model backend and re-flowing the result into a new PDF.
 *
 * ## Features
 *
 * - Per-page text extraction from PDF files
 * - Translation through chat-completion providers:
 *   - OpenAI-compatible APIs (OpenAI, LM Studio, vLLM, ...)
 *   - Ollama (local LLM)
 * - Character-budgeted chunking with strict validation of every reply
 * - Script-aware line wrapping (word wrap, or per character for CJK and Thai)
 * - Optional original text alongside each translation
 * - ISO 639-1 and ISO 639-2 language code support
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management and per-job resolution
 * - `translation`: Chunking, prompts, response validation and the translation service
 * - `providers`: Protocol adapters for the supported LLM providers and the HTTP transport
 * - `render`: Fonts, layout, pagination and the PDF backend
 * - `app_controller`: Main application controller
 * - `language_utils`: ISO language code utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod language_utils;
pub mod providers;
pub mod render;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::{Config, JobConfig, LlmSettings, TranslateRequest, TranslationProvider};
pub use app_controller::Controller;
pub use errors::{AppError, RenderError, TranslationError};
pub use translation::{PageText, TranslationResult, TranslationService};
