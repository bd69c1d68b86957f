/*!
 * Common test utilities for the pdf-translate test suite
 */

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use pdf_translate::app_config::{Config, JobConfig, LlmSettings, TranslateRequest};
use pdf_translate::render::fonts::BuiltinFont;
use pdf_translate::render::pdf::PdfOutput;
use pdf_translate::render::{PageCanvas, PageSetup, PageSink, PageSize};
use pdf_translate::translation::PageText;
use tempfile::TempDir;

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// LLM settings with translation enabled for an OpenAI-compatible model
pub fn enabled_settings() -> LlmSettings {
    LlmSettings {
        enabled: true,
        model: "gpt-4o-mini".to_string(),
        api_key: "sk-test".to_string(),
        ..LlmSettings::default()
    }
}

/// LLM settings for a local Ollama server
pub fn ollama_settings() -> LlmSettings {
    LlmSettings {
        enabled: true,
        provider: "ollama".to_string(),
        model: "llama3".to_string(),
        base_url: "http://gpu-box:11434/".to_string(),
        api_key: "never-sent".to_string(),
        ..LlmSettings::default()
    }
}

/// Configuration wrapping the given settings
pub fn config_with(settings: LlmSettings) -> Config {
    Config {
        llm: settings,
        ..Config::default()
    }
}

/// Resolve a job for `target_language` with the given settings
pub fn job_for(settings: &LlmSettings, target_language: &str) -> JobConfig {
    JobConfig::resolve(settings, &TranslateRequest::new(target_language)).unwrap()
}

/// Build page texts from `(page_number, text)` pairs
pub fn pages(entries: &[(u32, &str)]) -> Vec<PageText> {
    entries.iter().map(|(n, t)| PageText::new(*n, *t)).collect()
}

/// A page whose chunk cost is exactly `cost`
pub fn page_with_cost(page_number: u32, cost: usize) -> PageText {
    PageText::new(page_number, "a".repeat(cost - 32))
}

/// Write a source PDF with one text line per page
pub fn create_source_pdf(dir: &Path, filename: &str, page_texts: &[&str]) -> Result<PathBuf> {
    let mut output = PdfOutput::new(Arc::new(BuiltinFont))?;
    for text in page_texts {
        let setup = PageSetup {
            size: PageSize::LETTER,
            font_size: 12.0,
            leading: 16.8,
            margin: 72.0,
        };
        let mut canvas = output.begin_page(&setup)?;
        canvas.show_text(text)?;
        canvas.new_line()?;
        output.commit_page(canvas)?;
    }
    let path = dir.join(filename);
    output.save(&path)?;
    Ok(path)
}

/// Units per em of the fonts built by [`build_test_font`]
pub const TEST_FONT_UNITS_PER_EM: u16 = 2048;

/// PostScript name of the fonts built by [`build_test_font`]
pub const TEST_FONT_NAME: &str = "Test Sans";

/// Build a minimal TrueType font mapping printable ASCII and `extra` chars.
///
/// Glyph 0 is notdef at half an em, ASCII glyphs advance 1229 units (600 in
/// 1/1000 em) and every other glyph a full em. Glyph ids follow code point
/// order starting at 1. The font has no outlines.
pub fn build_test_font(extra: &str) -> Vec<u8> {
    let mut chars: Vec<char> = (' '..='~').chain(extra.chars()).collect();
    chars.sort_unstable();
    chars.dedup();
    let glyph_count = (chars.len() + 1) as u16;
    let upem = TEST_FONT_UNITS_PER_EM;

    let mut cmap = Vec::new();
    put_u16(&mut cmap, 0);
    put_u16(&mut cmap, 1);
    put_u16(&mut cmap, 3); // Windows
    put_u16(&mut cmap, 10); // UCS-4
    put_u32(&mut cmap, 12);
    put_u16(&mut cmap, 12); // format
    put_u16(&mut cmap, 0);
    put_u32(&mut cmap, 16 + 12 * chars.len() as u32);
    put_u32(&mut cmap, 0);
    put_u32(&mut cmap, chars.len() as u32);
    for (index, c) in chars.iter().enumerate() {
        put_u32(&mut cmap, *c as u32);
        put_u32(&mut cmap, *c as u32);
        put_u32(&mut cmap, index as u32 + 1);
    }

    let mut head = Vec::new();
    put_u32(&mut head, 0x0001_0000);
    put_u32(&mut head, 0x0001_0000);
    put_u32(&mut head, 0);
    put_u32(&mut head, 0x5F0F_3CF5);
    put_u16(&mut head, 0);
    put_u16(&mut head, upem);
    head.extend_from_slice(&[0; 16]); // created, modified
    for value in [0i16, -434, 2048, 1802] {
        put_u16(&mut head, value as u16);
    }
    put_u16(&mut head, 0); // mac style
    put_u16(&mut head, 8); // lowest ppem
    put_u16(&mut head, 2); // direction hint
    put_u16(&mut head, 0); // short loca
    put_u16(&mut head, 0); // glyph data format

    let mut hhea = Vec::new();
    put_u32(&mut hhea, 0x0001_0000);
    for value in [1802i16, -434, 0] {
        put_u16(&mut hhea, value as u16);
    }
    put_u16(&mut hhea, upem);
    hhea.extend_from_slice(&[0; 6]); // min lsb, min rsb, max extent
    put_u16(&mut hhea, 1); // caret rise
    hhea.extend_from_slice(&[0; 4 + 8 + 2]); // caret run and offset, reserved, data format
    put_u16(&mut hhea, glyph_count);

    let mut hmtx = Vec::new();
    put_u16(&mut hmtx, upem / 2);
    put_u16(&mut hmtx, 0);
    for c in &chars {
        put_u16(&mut hmtx, if c.is_ascii() { 1229 } else { upem });
        put_u16(&mut hmtx, 0);
    }

    let mut maxp = Vec::new();
    put_u32(&mut maxp, 0x0000_5000);
    put_u16(&mut maxp, glyph_count);

    let postscript_name: Vec<u8> = TEST_FONT_NAME
        .replace(' ', "")
        .encode_utf16()
        .flat_map(u16::to_be_bytes)
        .collect();
    let mut name = Vec::new();
    put_u16(&mut name, 0);
    put_u16(&mut name, 1);
    put_u16(&mut name, 6 + 12);
    for value in [3u16, 1, 0x0409, 6, postscript_name.len() as u16, 0] {
        put_u16(&mut name, value);
    }
    name.extend_from_slice(&postscript_name);

    // Table records must be sorted by tag
    let tables: [(&[u8; 4], Vec<u8>); 6] = [
        (b"cmap", cmap),
        (b"head", head),
        (b"hhea", hhea),
        (b"hmtx", hmtx),
        (b"maxp", maxp),
        (b"name", name),
    ];

    let mut font = Vec::new();
    put_u32(&mut font, 0x0001_0000);
    put_u16(&mut font, tables.len() as u16);
    put_u16(&mut font, 64);
    put_u16(&mut font, 2);
    put_u16(&mut font, 32);

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in &tables {
        font.extend_from_slice(&tag[..]);
        put_u32(&mut font, 0);
        put_u32(&mut font, offset as u32);
        put_u32(&mut font, data.len() as u32);

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    font.extend_from_slice(&body);
    font
}

fn put_u16(buffer: &mut Vec<u8>, value: u16) {
    buffer.extend_from_slice(&value.to_be_bytes());
}

fn put_u32(buffer: &mut Vec<u8>, value: u32) {
    buffer.extend_from_slice(&value.to_be_bytes());
}
