/*!
 * Script-aware line wrapping.
 *
 * Paragraphs written in scripts without spaces between words (Han, kana,
 * Hangul, Thai) are wrapped per code point; everything else is wrapped on
 * whitespace, with single words wider than the line broken per code point.
 */

use super::fonts::FontResource;
use super::RenderLabels;
use crate::translation::PageText;

/// One display line of an output page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    pub text: String,
    pub is_blank: bool,
}

impl RenderedLine {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let is_blank = text.is_empty();
        Self { text, is_blank }
    }

    pub fn blank() -> Self {
        Self {
            text: String::new(),
            is_blank: true,
        }
    }
}

/// Whether a code point belongs to a script wrapped per character
fn is_character_wrapped(c: char) -> bool {
    matches!(
        c as u32,
        // Han
        0x2E80..=0x2FDF
            | 0x3005
            | 0x3007
            | 0x3021..=0x3029
            | 0x3038..=0x303B
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFAFF
            | 0x20000..=0x3134F
            // Hiragana
            | 0x3040..=0x309F
            | 0x1B001..=0x1B11F
            // Katakana
            | 0x30A0..=0x30FF
            | 0x31F0..=0x31FF
            | 0xFF66..=0xFF9F
            // Hangul
            | 0x1100..=0x11FF
            | 0x3130..=0x318F
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7FF
            | 0xFFA0..=0xFFDC
            // Thai
            | 0x0E00..=0x0E7F
    )
}

/// True if any code point of `text` is Han, Hiragana, Katakana, Hangul or Thai
pub fn uses_character_wrap(text: &str) -> bool {
    text.chars().any(is_character_wrapped)
}

fn is_word_separator(c: char) -> bool {
    c.is_ascii_whitespace() || c == '\u{0B}'
}

/// Measures and wraps text for one font, size and line width
#[derive(Debug, Clone, Copy)]
pub struct LineWrapper<'a> {
    font: &'a dyn FontResource,
    font_size: f32,
    max_width: f32,
}

impl<'a> LineWrapper<'a> {
    pub fn new(font: &'a dyn FontResource, font_size: f32, max_width: f32) -> Self {
        Self {
            font,
            font_size,
            max_width,
        }
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Width of `text` in points
    pub fn width(&self, text: &str) -> f32 {
        if text.is_empty() {
            0.0
        } else {
            self.font.string_width(text, self.font_size)
        }
    }

    fn fits(&self, text: &str) -> bool {
        self.width(text) <= self.max_width
    }

    /// Wrap multi-paragraph text; blank source lines become blank display lines
    pub fn wrap_paragraphs(&self, text: &str) -> Vec<RenderedLine> {
        if text.trim().is_empty() {
            return Vec::new();
        }

        let mut lines = Vec::new();
        for raw in text.replace("\r\n", "\n").split('\n') {
            let paragraph = raw.trim();
            if paragraph.is_empty() {
                lines.push(RenderedLine::blank());
                continue;
            }
            lines.extend(self.wrap_paragraph(paragraph).into_iter().map(RenderedLine::text));
        }
        lines
    }

    /// Wrap a single trimmed paragraph with the strategy its script needs
    pub fn wrap_paragraph(&self, paragraph: &str) -> Vec<String> {
        if uses_character_wrap(paragraph) {
            self.wrap_chars(paragraph)
        } else {
            self.wrap_words(paragraph)
        }
    }

    /// Greedy wrapping on ASCII whitespace; no-break spaces stay inside words
    pub fn wrap_words(&self, paragraph: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for word in paragraph.split(is_word_separator).filter(|word| !word.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };

            if self.fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if self.fits(word) {
                current = word.to_string();
            } else {
                lines.extend(self.wrap_chars(word));
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }

    /// Greedy per-code-point wrapping; a code point wider than the line sits alone
    pub fn wrap_chars(&self, text: &str) -> Vec<String> {
        let mut lines = Vec::new();
        let mut current = String::new();

        for c in text.chars() {
            current.push(c);
            if !self.fits(&current) {
                current.pop();
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current.push(c);
            }
        }

        if !current.is_empty() {
            lines.push(current);
        }
        lines
    }
}

/// Assemble the display lines of one output page.
///
/// With `include_original` and a non-blank source page, the original text
/// comes first under its own header, followed by a blank line. The
/// translated section is always present.
pub fn build_content_lines(
    page: &PageText,
    translation: &str,
    include_original: bool,
    labels: &RenderLabels,
    wrapper: &LineWrapper<'_>,
) -> Vec<RenderedLine> {
    let mut lines = Vec::new();

    if include_original && page.has_content() {
        lines.push(RenderedLine::text(labels.original_header.as_str()));
        lines.extend(wrapper.wrap_paragraphs(page.text()));
        lines.push(RenderedLine::blank());
    }

    lines.push(RenderedLine::text(labels.translated_header.as_str()));
    if translation.trim().is_empty() {
        lines.push(RenderedLine::text(labels.empty_page.as_str()));
    } else {
        lines.extend(wrapper.wrap_paragraphs(translation));
    }

    lines
}
