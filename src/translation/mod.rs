/*!
 * Page translation through LLM providers.
 *
 * This module contains the translation pipeline for extracted PDF text.
 * It is split into several submodules:
 *
 * - `page`: Page text and translation result types
 * - `chunker`: Packing of pages into request-sized chunks
 * - `prompts`: System prompt and per-chunk user payload
 * - `response`: Parsing and validation of the assistant's page map
 * - `core`: The translation service that ties the pipeline together
 */

// Re-export main types for easier usage
pub use self::core::TranslationService;
pub use self::page::{PageText, TranslationResult};
pub use self::prompts::PromptTemplate;

// Submodules
pub mod chunker;
pub mod core;
pub mod page;
pub mod prompts;
pub mod response;
