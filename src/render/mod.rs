/*!
 * Rendering of translated pages into an output document.
 *
 * - `fonts`: Font selection, metrics and encoding
 * - `layout`: Script-aware line wrapping and page content assembly
 * - `paginator`: Writing lines into output pages with overflow handling
 * - `pdf`: lopdf-backed page sink and source document helpers
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::RenderError;
use crate::translation::{PageText, TranslationResult};

pub mod fonts;
pub mod layout;
pub mod paginator;
pub mod pdf;

pub use fonts::{BuiltinFontLoader, FontDirectoryLoader, FontFace, FontLoader, FontResource, TrueTypeFont};
pub use layout::{build_content_lines, LineWrapper, RenderedLine};
pub use paginator::{write_page, PageCanvas, PageContext, PageSetup, PageSink};

/// Margin on every side of an output page, in points
pub const PAGE_MARGIN: f32 = 48.0;

/// Smallest accepted font size
pub const MIN_FONT_SIZE: f32 = 6.0;

/// Largest accepted font size
pub const MAX_FONT_SIZE: f32 = 36.0;

/// Font size used when the requested one is unusable
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

/// Line spacing as a multiple of the font size
pub const LEADING_FACTOR: f32 = 1.4;

/// Clamp a requested font size to the supported range
pub fn sanitize_font_size(requested: f32) -> f32 {
    let size = if requested.is_finite() && requested > 0.0 {
        requested
    } else {
        DEFAULT_FONT_SIZE
    };
    size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// US Letter
    pub const LETTER: PageSize = PageSize {
        width: 612.0,
        height: 792.0,
    };
}

impl Default for PageSize {
    fn default() -> Self {
        Self::LETTER
    }
}

/// User-facing strings written into the output document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderLabels {
    pub original_header: String,
    pub translated_header: String,
    pub empty_page: String,
    /// Header of the first output page; `{page}` is replaced by the page number
    pub page_header: String,
    /// Header of overflow pages; `{page}` is replaced by the page number
    pub continued_header: String,
}

impl Default for RenderLabels {
    fn default() -> Self {
        Self {
            original_header: "Original text".to_string(),
            translated_header: "Translated text".to_string(),
            empty_page: "No translatable text detected on this page.".to_string(),
            page_header: "Page {page}".to_string(),
            continued_header: "Page {page} (continued)".to_string(),
        }
    }
}

impl RenderLabels {
    /// Header for the `segment`-th output page of `page_number`
    pub fn header_for(&self, page_number: u32, segment: usize) -> String {
        let template = if segment == 0 {
            &self.page_header
        } else {
            &self.continued_header
        };
        template.replace("{page}", &page_number.to_string())
    }
}

/// Lays out and paginates translated pages with one font
#[derive(Debug, Clone)]
pub struct Renderer {
    font: Arc<dyn FontResource>,
    font_size: f32,
    include_original_text: bool,
    labels: RenderLabels,
}

impl Renderer {
    pub fn new(font: Arc<dyn FontResource>, font_size: f32) -> Self {
        Self {
            font,
            font_size: sanitize_font_size(font_size),
            include_original_text: false,
            labels: RenderLabels::default(),
        }
    }

    /// Render the original text above each translation
    pub fn include_original_text(mut self, include: bool) -> Self {
        self.include_original_text = include;
        self
    }

    pub fn with_labels(mut self, labels: RenderLabels) -> Self {
        self.labels = labels;
        self
    }

    /// Render every page in page order into `sink`.
    ///
    /// `source_sizes[n - 1]` is the size of source page `n`; missing entries
    /// fall back to US Letter. Returns the number of output pages written.
    pub fn render<S: PageSink>(
        &self,
        sink: &mut S,
        pages: &[PageText],
        translations: &TranslationResult,
        source_sizes: &[Option<PageSize>],
    ) -> Result<usize, RenderError> {
        let mut ordered: Vec<&PageText> = pages.iter().collect();
        ordered.sort_by_key(|page| page.page_number());

        let mut output_pages = 0usize;
        for page in ordered {
            let page_number = page.page_number();
            let size = (page_number as usize)
                .checked_sub(1)
                .and_then(|index| source_sizes.get(index).copied().flatten())
                .unwrap_or_default();

            let wrapper = LineWrapper::new(
                self.font.as_ref(),
                self.font_size,
                size.width - PAGE_MARGIN * 2.0,
            );
            let translation = translations.get(page_number).unwrap_or_default();
            let lines = build_content_lines(
                page,
                translation,
                self.include_original_text,
                &self.labels,
                &wrapper,
            );

            let setup = PageSetup {
                size,
                font_size: self.font_size,
                leading: self.font_size * LEADING_FACTOR,
                margin: PAGE_MARGIN,
            };
            let written = write_page(sink, &setup, &lines, |segment| {
                self.labels.header_for(page_number, segment)
            })?;
            debug!("Page {} rendered as {} output page(s)", page_number, written);
            output_pages += written;
        }

        Ok(output_pages)
    }
}
