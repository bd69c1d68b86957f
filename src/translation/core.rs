/*!
 * Core translation service implementation.
 *
 * This module contains the `TranslationService`, which drives a job end to
 * end: pages are sorted and validated, blank pages are answered locally,
 * the rest are packed into chunks and each chunk is sent to the configured
 * provider in order. Any failing chunk aborts the job.
 */

use log::{debug, error, info};
use std::collections::BTreeMap;
use std::time::Instant;

use super::chunker::chunk_pages;
use super::page::{sort_pages, PageText, TranslationResult};
use super::prompts::build_user_payload;
use super::response::parse_translation_response;
use crate::app_config::JobConfig;
use crate::errors::TranslationError;
use crate::providers::{protocol_for, ChatMessage, ChatTransport};

/// Main translation service for page translation
pub struct TranslationService<T: ChatTransport> {
    /// Transport used for every provider call
    transport: T,
}

impl<T: ChatTransport> TranslationService<T> {
    /// Create a new translation service over a transport
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Access the underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Translate every page of a document.
    ///
    /// `progress_callback` is called with `(completed_chunks, total_chunks)`
    /// after each chunk is merged, and once with `(0, total)` before the
    /// first request.
    pub async fn translate_pages(
        &self,
        pages: &[PageText],
        job: &JobConfig,
        progress_callback: impl Fn(usize, usize),
    ) -> Result<TranslationResult, TranslationError> {
        let start_time = Instant::now();
        let pages = sort_pages(pages)?;

        let mut result = TranslationResult::new();
        let mut content_pages = Vec::with_capacity(pages.len());
        for page in pages {
            if page.has_content() {
                content_pages.push(page);
            } else {
                result.insert(page.page_number(), "");
            }
        }

        let chunks = chunk_pages(&content_pages, job.max_chunk_characters);
        info!(
            "Translating {} pages ({} blank) in {} chunks with {} model {}",
            content_pages.len() + result.len(),
            result.len(),
            chunks.len(),
            job.provider,
            job.model
        );

        let total = chunks.len();
        progress_callback(0, total);

        for (index, chunk) in chunks.iter().enumerate() {
            debug!(
                "Sending chunk {}/{} with pages {:?}",
                index + 1,
                total,
                chunk.iter().map(PageText::page_number).collect::<Vec<_>>()
            );

            let translated = self.translate_chunk(chunk, job).await.map_err(|e| {
                error!("Chunk {}/{} failed: {}", index + 1, total, e);
                e
            })?;
            result.extend(translated);
            progress_callback(index + 1, total);
        }

        info!(
            "Translated {} pages in {:.2}s",
            result.len(),
            start_time.elapsed().as_secs_f64()
        );
        Ok(result)
    }

    /// Send one chunk and validate the reply
    async fn translate_chunk(
        &self,
        chunk: &[PageText],
        job: &JobConfig,
    ) -> Result<BTreeMap<u32, String>, TranslationError> {
        let protocol = protocol_for(job.provider);

        let messages = vec![
            ChatMessage::system(job.system_prompt.clone()),
            ChatMessage::user(build_user_payload(chunk)?),
        ];
        let body = protocol.build_request(&job.model, messages, job.temperature)?;
        let headers = protocol.auth_headers(job.api_key.as_deref());

        let response_body = self
            .transport
            .post_json(job.endpoint.url(), &headers, &body, job.timeout)
            .await?;

        let content = protocol.extract_text(&response_body)?;
        parse_translation_response(&content, chunk)
    }
}
