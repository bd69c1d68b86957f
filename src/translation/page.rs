/*!
 * Page-level data model for the translation pipeline.
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::errors::TranslationError;

/// Fixed per-page overhead added to the character count when budgeting chunks
pub const PAGE_COST_OVERHEAD: usize = 32;

/// Extracted text of one source page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 1-based page number in the source document
    page_number: u32,
    /// Raw extracted text
    text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the page has any non-whitespace text
    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// Budget cost of sending this page: character count plus a fixed overhead
    pub fn estimated_cost(&self) -> usize {
        self.text.chars().count() + PAGE_COST_OVERHEAD
    }
}

/// Sort pages by number and reject zero or duplicate page numbers
pub fn sort_pages(pages: &[PageText]) -> Result<Vec<PageText>, TranslationError> {
    let mut sorted = pages.to_vec();
    sorted.sort_by_key(PageText::page_number);

    let mut seen = HashSet::with_capacity(sorted.len());
    for page in &sorted {
        if page.page_number == 0 {
            return Err(TranslationError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }
        if !seen.insert(page.page_number) {
            return Err(TranslationError::InvalidInput(format!(
                "Page {} appears more than once",
                page.page_number
            )));
        }
    }

    Ok(sorted)
}

/// Translated text per page number, in page order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pages: BTreeMap<u32, String>,
}

impl TranslationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the translation of a page, replacing any earlier value
    pub fn insert(&mut self, page_number: u32, translated: impl Into<String>) {
        self.pages.insert(page_number, translated.into());
    }

    /// Merge a chunk's validated translations
    pub fn extend(&mut self, translated: BTreeMap<u32, String>) {
        self.pages.extend(translated);
    }

    pub fn get(&self, page_number: u32) -> Option<&str> {
        self.pages.get(&page_number).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
