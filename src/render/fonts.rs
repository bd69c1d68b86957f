/*!
 * Font selection and metrics for the output document.
 *
 * One font is chosen per job from the target language and shared read-only
 * by the layout engine (for measuring) and the PDF backend (for encoding
 * and embedding).
 */

use log::{info, warn};
use lopdf::{Dictionary, Document, Object, Stream};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Debug, Write as _};
use std::path::PathBuf;
use std::sync::Arc;
use ttf_parser::{name_id, Face};

use crate::errors::RenderError;
use crate::language_utils::normalized_primary_subtag;

/// Font family picked for a target language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFace {
    SimplifiedChinese,
    Japanese,
    Korean,
    Arabic,
    Thai,
    /// General Unicode coverage for every other language
    General,
}

impl FontFace {
    /// Select the face for a target language tag by its primary subtag
    pub fn for_language(target_language: &str) -> Self {
        match normalized_primary_subtag(target_language).as_str() {
            "zh" => Self::SimplifiedChinese,
            "ja" => Self::Japanese,
            "ko" => Self::Korean,
            "ar" => Self::Arabic,
            "th" => Self::Thai,
            _ => Self::General,
        }
    }

    /// File name of the font resource that covers this face
    pub fn resource_name(&self) -> &'static str {
        match self {
            Self::SimplifiedChinese => "NotoSansSC-Regular.ttf",
            Self::Japanese => "NotoSansJP-Regular.ttf",
            Self::Korean => "malgun.ttf",
            Self::Arabic => "NotoSansArabic-Regular.ttf",
            Self::Thai => "NotoSansThai-Regular.ttf",
            Self::General => "NotoSans-Regular.ttf",
        }
    }
}

impl std::fmt::Display for FontFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.resource_name())
    }
}

/// Metrics and encoding of a font usable by the layout engine and PDF backend
pub trait FontResource: Send + Sync + Debug {
    /// PostScript name written as `BaseFont`
    fn base_font(&self) -> &str;

    /// Advance width of a character in 1/1000 em
    fn char_width(&self, c: char) -> u16;

    /// Encode text as content-stream bytes for this font
    fn encode(&self, text: &str) -> Vec<u8>;

    /// Add the objects the font needs to `document` and return its font
    /// dictionary. `used` holds every character drawn with the font.
    fn embed(&self, document: &mut Document, used: &BTreeSet<char>) -> Result<Dictionary, RenderError>;

    /// Width of `text` in points at `font_size`
    fn string_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 / 1000.0 * font_size
    }
}

/// Standard 14 Helvetica with WinAnsi encoding
#[derive(Debug, Clone, Default)]
pub struct BuiltinFont;

/// Helvetica advance widths for U+0020..=U+007E
const HELVETICA_ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

const DEFAULT_WIDTH: u16 = 556;
const WIDE_WIDTH: u16 = 1000;

/// Characters WinAnsi places in 0x80..=0x9F
const WIN_ANSI_HIGH: [(char, u8); 27] = [
    ('€', 0x80),
    ('‚', 0x82),
    ('ƒ', 0x83),
    ('„', 0x84),
    ('…', 0x85),
    ('†', 0x86),
    ('‡', 0x87),
    ('ˆ', 0x88),
    ('‰', 0x89),
    ('Š', 0x8A),
    ('‹', 0x8B),
    ('Œ', 0x8C),
    ('Ž', 0x8E),
    ('\u{2018}', 0x91),
    ('\u{2019}', 0x92),
    ('\u{201C}', 0x93),
    ('\u{201D}', 0x94),
    ('•', 0x95),
    ('–', 0x96),
    ('—', 0x97),
    ('˜', 0x98),
    ('™', 0x99),
    ('š', 0x9A),
    ('›', 0x9B),
    ('œ', 0x9C),
    ('ž', 0x9E),
    ('Ÿ', 0x9F),
];

/// Full-width code points measured as one em
fn is_wide(c: char) -> bool {
    matches!(
        c as u32,
        0x1100..=0x115F
            | 0x2E80..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x20000..=0x3FFFD
    )
}

impl BuiltinFont {
    fn win_ansi_byte(c: char) -> Option<u8> {
        match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => Some(c as u32 as u8),
            _ => WIN_ANSI_HIGH
                .iter()
                .find(|(mapped, _)| *mapped == c)
                .map(|(_, byte)| *byte),
        }
    }
}

impl FontResource for BuiltinFont {
    fn base_font(&self) -> &str {
        "Helvetica"
    }

    fn char_width(&self, c: char) -> u16 {
        match c as u32 {
            code @ 0x20..=0x7E => HELVETICA_ASCII_WIDTHS[(code - 0x20) as usize],
            _ if is_wide(c) => WIDE_WIDTH,
            _ => DEFAULT_WIDTH,
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(|c| match c {
                '\t' => b' ',
                _ => Self::win_ansi_byte(c).unwrap_or(b'?'),
            })
            .collect()
    }

    fn embed(&self, _document: &mut Document, _used: &BTreeSet<char>) -> Result<Dictionary, RenderError> {
        Ok(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.base_font().as_bytes().to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]))
    }
}

/// TrueType font embedded whole as a Type0 font with Identity-H encoding.
///
/// Text is encoded as big-endian glyph ids, so CIDs equal glyph ids and the
/// ToUnicode map written on embedding keeps the output searchable. Glyphs
/// are drawn as mapped by `cmap`; complex scripts are not shaped.
pub struct TrueTypeFont {
    base_font: String,
    data: Vec<u8>,
    glyphs: HashMap<char, u16>,
    // Advance per glyph id in 1/1000 em
    advances: Vec<u16>,
    ascent: i64,
    descent: i64,
    cap_height: i64,
    bounding_box: [i64; 4],
}

impl TrueTypeFont {
    /// Parse the first face of `data`.
    ///
    /// `fallback_name` becomes the `BaseFont` when the font carries no
    /// PostScript name.
    pub fn from_bytes(data: Vec<u8>, fallback_name: &str) -> Result<Self, RenderError> {
        let face = Face::parse(&data, 0)
            .map_err(|e| RenderError::Font(format!("Failed to parse TrueType font: {}", e)))?;

        let units_per_em = f32::from(face.units_per_em());
        let scale = |value: i32| (value as f32 * 1000.0 / units_per_em).round() as i64;

        let mut glyphs = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|code_point| {
                    let mapped = char::from_u32(code_point)
                        .zip(subtable.glyph_index(code_point))
                        .filter(|(_, glyph)| glyph.0 != 0);
                    if let Some((c, glyph)) = mapped {
                        glyphs.entry(c).or_insert(glyph.0);
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(RenderError::Font("TrueType font has no Unicode character map".to_string()));
        }

        let advances = (0..face.number_of_glyphs())
            .map(|glyph| {
                let advance = face.glyph_hor_advance(ttf_parser::GlyphId(glyph)).unwrap_or(0);
                scale(i32::from(advance)).clamp(0, i64::from(u16::MAX)) as u16
            })
            .collect();

        let postscript_name = face
            .names()
            .into_iter()
            .filter(|name| name.name_id == name_id::POST_SCRIPT_NAME)
            .find_map(|name| name.to_string());
        let base_font = sanitize_font_name(postscript_name.as_deref().unwrap_or(fallback_name));

        let ascent = scale(i32::from(face.ascender()));
        let bbox = face.global_bounding_box();
        Ok(Self {
            base_font,
            glyphs,
            advances,
            ascent,
            descent: scale(i32::from(face.descender())),
            cap_height: face.capital_height().map_or(ascent, |height| scale(i32::from(height))),
            bounding_box: [
                scale(i32::from(bbox.x_min)),
                scale(i32::from(bbox.y_min)),
                scale(i32::from(bbox.x_max)),
                scale(i32::from(bbox.y_max)),
            ],
            data,
        })
    }

    /// Glyph id drawn for `c`; 0 (notdef) when the font lacks it
    pub fn glyph_id(&self, c: char) -> u16 {
        let c = if c == '\t' { ' ' } else { c };
        self.glyphs.get(&c).copied().unwrap_or(0)
    }

    fn glyph_width(&self, glyph: u16) -> u16 {
        self.advances.get(usize::from(glyph)).copied().unwrap_or(0)
    }
}

impl Debug for TrueTypeFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrueTypeFont")
            .field("base_font", &self.base_font)
            .field("glyphs", &self.glyphs.len())
            .field("bytes", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl FontResource for TrueTypeFont {
    fn base_font(&self) -> &str {
        &self.base_font
    }

    fn char_width(&self, c: char) -> u16 {
        self.glyph_width(self.glyph_id(c))
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .flat_map(|c| self.glyph_id(c).to_be_bytes())
            .collect()
    }

    fn embed(&self, document: &mut Document, used: &BTreeSet<char>) -> Result<Dictionary, RenderError> {
        let mut drawn: BTreeMap<u16, char> = BTreeMap::new();
        for &c in used {
            let glyph = self.glyph_id(c);
            if glyph != 0 {
                drawn.entry(glyph).or_insert(if c == '\t' { ' ' } else { c });
            }
        }

        let base_font = Object::Name(self.base_font.as_bytes().to_vec());
        let font_file_id = document.add_object(Stream::new(
            Dictionary::from_iter([("Length1", Object::Integer(self.data.len() as i64))]),
            self.data.clone(),
        ));
        let descriptor_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"FontDescriptor".to_vec())),
            ("FontName", base_font.clone()),
            ("Flags", Object::Integer(4)),
            (
                "FontBBox",
                Object::Array(self.bounding_box.iter().map(|v| Object::Integer(*v)).collect()),
            ),
            ("ItalicAngle", Object::Integer(0)),
            ("Ascent", Object::Integer(self.ascent)),
            ("Descent", Object::Integer(self.descent)),
            ("CapHeight", Object::Integer(self.cap_height)),
            ("StemV", Object::Integer(80)),
            ("FontFile2", Object::Reference(font_file_id)),
        ]));

        let widths = drawn
            .keys()
            .flat_map(|&glyph| {
                [
                    Object::Integer(i64::from(glyph)),
                    Object::Array(vec![Object::Integer(i64::from(self.glyph_width(glyph)))]),
                ]
            })
            .collect();
        let cid_font_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"CIDFontType2".to_vec())),
            ("BaseFont", base_font.clone()),
            (
                "CIDSystemInfo",
                Object::Dictionary(Dictionary::from_iter([
                    ("Registry", Object::string_literal("Adobe")),
                    ("Ordering", Object::string_literal("Identity")),
                    ("Supplement", Object::Integer(0)),
                ])),
            ),
            ("FontDescriptor", Object::Reference(descriptor_id)),
            ("DW", Object::Integer(i64::from(self.glyph_width(0)))),
            ("W", Object::Array(widths)),
            ("CIDToGIDMap", Object::Name(b"Identity".to_vec())),
        ]));

        let to_unicode_id =
            document.add_object(Stream::new(Dictionary::new(), to_unicode_cmap(&drawn).into_bytes()));

        Ok(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type0".to_vec())),
            ("BaseFont", base_font),
            ("Encoding", Object::Name(b"Identity-H".to_vec())),
            ("DescendantFonts", Object::Array(vec![Object::Reference(cid_font_id)])),
            ("ToUnicode", Object::Reference(to_unicode_id)),
        ]))
    }
}

const TO_UNICODE_HEADER: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo
<< /Registry (Adobe)
/Ordering (UCS)
/Supplement 0
>> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
";

const TO_UNICODE_FOOTER: &str = "endcmap
CMapName currentdict /CMap defineresource pop
end
end
";

/// Entries per `bfchar` block
const BFCHAR_BLOCK: usize = 100;

/// ToUnicode CMap mapping each drawn glyph id back to its character
fn to_unicode_cmap(drawn: &BTreeMap<u16, char>) -> String {
    let mut cmap = String::from(TO_UNICODE_HEADER);
    let entries: Vec<(&u16, &char)> = drawn.iter().collect();
    for block in entries.chunks(BFCHAR_BLOCK) {
        let _ = writeln!(cmap, "{} beginbfchar", block.len());
        for (glyph, c) in block {
            let mut units = [0u16; 2];
            let destination: String = c
                .encode_utf16(&mut units)
                .iter()
                .map(|unit| format!("{:04X}", unit))
                .collect();
            let _ = writeln!(cmap, "<{:04X}> <{}>", glyph, destination);
        }
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str(TO_UNICODE_FOOTER);
    cmap
}

/// Reduce a font name to the characters allowed in a PDF name
fn sanitize_font_name(raw: &str) -> String {
    let name: String = raw
        .chars()
        .filter_map(|c| match c {
            c if c.is_ascii_alphanumeric() || c == '-' || c == '_' => Some(c),
            c if c.is_whitespace() => Some('-'),
            _ => None,
        })
        .collect();
    if name.is_empty() {
        "EmbeddedFont".to_string()
    } else {
        name
    }
}

/// Loads the font for a face
pub trait FontLoader {
    fn load(&self, face: FontFace) -> Result<Arc<dyn FontResource>, RenderError>;
}

/// Loader that always serves the builtin Helvetica font
#[derive(Debug, Clone, Default)]
pub struct BuiltinFontLoader;

impl FontLoader for BuiltinFontLoader {
    fn load(&self, face: FontFace) -> Result<Arc<dyn FontResource>, RenderError> {
        if face != FontFace::General {
            warn!(
                "{} is not bundled, using Helvetica; characters outside WinAnsi will print as '?'",
                face
            );
        }
        Ok(Arc::new(BuiltinFont))
    }
}

/// Loader that reads each face's TrueType file from a directory.
///
/// A face whose file is absent falls back to Helvetica; a file that exists
/// but cannot be read or parsed is an error.
#[derive(Debug, Clone)]
pub struct FontDirectoryLoader {
    directory: PathBuf,
}

impl FontDirectoryLoader {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl FontLoader for FontDirectoryLoader {
    fn load(&self, face: FontFace) -> Result<Arc<dyn FontResource>, RenderError> {
        let path = self.directory.join(face.resource_name());
        if !path.is_file() {
            warn!("Font file {} not found", path.display());
            return BuiltinFontLoader.load(face);
        }

        let data = std::fs::read(&path)
            .map_err(|e| RenderError::Font(format!("Failed to read {}: {}", path.display(), e)))?;
        let fallback_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| face.resource_name().to_string());
        let font = TrueTypeFont::from_bytes(data, &fallback_name)
            .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;

        info!("Using font {} from {}", font.base_font(), path.display());
        Ok(Arc::new(font))
    }
}

/// Load the job font for a target language
pub fn load_font_for_language(
    loader: &dyn FontLoader,
    target_language: &str,
) -> Result<Arc<dyn FontResource>, RenderError> {
    loader.load(FontFace::for_language(target_language))
}
