/*!
 * lopdf-backed output document and source document helpers.
 */

use log::{debug, warn};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use super::fonts::FontResource;
use super::paginator::{PageCanvas, PageSetup, PageSink};
use super::PageSize;
use crate::errors::RenderError;
use crate::translation::PageText;

/// Resource name of the job font in every page
const FONT_RESOURCE_NAME: &str = "F1";

/// Pages tree depth after which inherited attributes are no longer looked up
const MAX_INHERITANCE_DEPTH: usize = 10;

/// Output PDF document built page by page
pub struct PdfOutput {
    document: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    font: Arc<dyn FontResource>,
    font_id: ObjectId,
    // Characters drawn so far and those covered by the embedded font objects
    used: BTreeSet<char>,
    embedded: BTreeSet<char>,
    kids: Vec<ObjectId>,
}

impl PdfOutput {
    /// Create an empty document with `font` registered as its only font
    pub fn new(font: Arc<dyn FontResource>) -> Result<Self, RenderError> {
        let mut document = Document::with_version("1.5");
        let pages_id = document.new_object_id();

        let font_dictionary = font.embed(&mut document, &BTreeSet::new())?;
        let font_id = document.add_object(font_dictionary);
        let resources_id = document.add_object(Dictionary::from_iter([(
            "Font",
            Object::Dictionary(Dictionary::from_iter([(
                FONT_RESOURCE_NAME,
                Object::Reference(font_id),
            )])),
        )]));

        let catalog_id = document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]));
        document.trailer.set("Root", Object::Reference(catalog_id));

        let mut output = Self {
            document,
            pages_id,
            resources_id,
            font,
            font_id,
            used: BTreeSet::new(),
            embedded: BTreeSet::new(),
            kids: Vec::new(),
        };
        output.update_page_tree();
        Ok(output)
    }

    /// Number of committed pages
    pub fn page_count(&self) -> usize {
        self.kids.len()
    }

    /// The document as built so far
    pub fn document(&self) -> &Document {
        &self.document
    }

    fn update_page_tree(&mut self) {
        let kids: Vec<Object> = self.kids.iter().map(|id| Object::Reference(*id)).collect();
        let pages = Dictionary::from_iter([
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(self.kids.len() as i64)),
        ]);
        self.document.objects.insert(self.pages_id, Object::Dictionary(pages));
    }

    /// Re-embed the font when characters were drawn since the last embedding
    fn embed_font(&mut self) -> Result<(), RenderError> {
        if self.used == self.embedded {
            return Ok(());
        }
        let font_dictionary = self.font.embed(&mut self.document, &self.used)?;
        self.document
            .objects
            .insert(self.font_id, Object::Dictionary(font_dictionary));
        let pruned = self.document.prune_objects();
        debug!(
            "Embedded {} for {} characters, dropped {} stale objects",
            self.font.base_font(),
            self.used.len(),
            pruned.len()
        );
        self.embedded = self.used.clone();
        Ok(())
    }

    /// Serialize the document
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, RenderError> {
        self.embed_font()?;
        self.document.compress();

        let mut output = Vec::new();
        self.document
            .save_to(&mut output)
            .map_err(|e| RenderError::Pdf(format!("Failed to save PDF: {}", e)))?;
        Ok(output)
    }

    /// Write the document to `path`
    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)
            .map_err(|e| RenderError::Pdf(format!("Failed to write {}: {}", path.display(), e)))?;
        debug!("Saved {} pages to {}", self.page_count(), path.display());
        Ok(())
    }
}

/// Content stream of a page being drawn
pub struct PdfCanvas {
    size: PageSize,
    font: Arc<dyn FontResource>,
    used: BTreeSet<char>,
    operations: Vec<Operation>,
}

impl PageCanvas for PdfCanvas {
    fn show_text(&mut self, text: &str) -> Result<(), RenderError> {
        let encoded = self.font.encode(text);
        self.used.extend(text.chars());
        self.operations.push(Operation::new(
            "Tj",
            vec![Object::String(encoded, StringFormat::Hexadecimal)],
        ));
        Ok(())
    }

    fn new_line(&mut self) -> Result<(), RenderError> {
        self.operations.push(Operation::new("T*", vec![]));
        Ok(())
    }
}

impl PageSink for PdfOutput {
    type Canvas = PdfCanvas;

    fn begin_page(&mut self, setup: &PageSetup) -> Result<PdfCanvas, RenderError> {
        let operations = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![FONT_RESOURCE_NAME.into(), setup.font_size.into()],
            ),
            Operation::new("TL", vec![setup.leading.into()]),
            Operation::new(
                "Td",
                vec![
                    setup.margin.into(),
                    (setup.size.height - setup.margin).into(),
                ],
            ),
        ];

        Ok(PdfCanvas {
            size: setup.size,
            font: Arc::clone(&self.font),
            used: BTreeSet::new(),
            operations,
        })
    }

    fn commit_page(&mut self, canvas: PdfCanvas) -> Result<(), RenderError> {
        self.used.extend(canvas.used);
        let mut operations = canvas.operations;
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations }.encode()?;
        let content_id = self
            .document
            .add_object(Stream::new(Dictionary::new(), content));

        let page_id = self.document.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(self.pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Resources", Object::Reference(self.resources_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    0.into(),
                    0.into(),
                    canvas.size.width.into(),
                    canvas.size.height.into(),
                ]),
            ),
        ]));

        self.kids.push(page_id);
        self.update_page_tree();
        Ok(())
    }
}

/// Load a source PDF from disk
pub fn load_document(path: impl AsRef<Path>) -> Result<Document, RenderError> {
    let path = path.as_ref();
    Document::load(path)
        .map_err(|e| RenderError::Pdf(format!("Failed to load {}: {}", path.display(), e)))
}

/// Load a source PDF from memory
pub fn load_document_from_bytes(bytes: &[u8]) -> Result<Document, RenderError> {
    Document::load_mem(bytes).map_err(|e| RenderError::Pdf(format!("Failed to load PDF: {}", e)))
}

/// Page sizes of a document, indexed by page number - 1.
///
/// `None` marks a page without a usable MediaBox.
pub fn source_page_sizes(document: &Document) -> Vec<Option<PageSize>> {
    let pages = document.get_pages();
    let count = pages.keys().copied().max().unwrap_or(0) as usize;
    let mut sizes = vec![None; count];

    for (page_number, page_id) in pages {
        let size = document
            .get_object(page_id)
            .ok()
            .and_then(|page| media_box(document, page, MAX_INHERITANCE_DEPTH))
            .map(|[x0, y0, x1, y1]| PageSize {
                width: (x1 - x0).abs(),
                height: (y1 - y0).abs(),
            })
            .filter(|size| size.width > 0.0 && size.height > 0.0);
        if let Some(slot) = (page_number as usize).checked_sub(1).and_then(|i| sizes.get_mut(i)) {
            *slot = size;
        }
    }
    sizes
}

/// MediaBox of a page, inherited from the Pages tree when absent
fn media_box(document: &Document, object: &Object, depth: usize) -> Option<[f32; 4]> {
    if depth == 0 {
        return None;
    }
    let dict = match object {
        Object::Dictionary(dict) => dict,
        _ => return None,
    };

    if let Ok(value) = dict.get(b"MediaBox") {
        let array = match value {
            Object::Array(array) => Some(array),
            Object::Reference(id) => match document.get_object(*id) {
                Ok(Object::Array(array)) => Some(array),
                _ => None,
            },
            _ => None,
        };
        if let Some(array) = array {
            let values: Vec<f32> = array
                .iter()
                .filter_map(|o| match o {
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r),
                    _ => None,
                })
                .collect();
            if values.len() == 4 {
                return Some([values[0], values[1], values[2], values[3]]);
            }
        }
    }

    match dict.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => document
            .get_object(*parent_id)
            .ok()
            .and_then(|parent| media_box(document, parent, depth - 1)),
        _ => None,
    }
}

/// Extract trimmed text of every page in page order
pub fn extract_page_texts(document: &Document) -> Vec<PageText> {
    document
        .get_pages()
        .keys()
        .map(|&page_number| {
            let text = match document.extract_text(&[page_number]) {
                Ok(text) => text.trim().to_string(),
                Err(e) => {
                    warn!("Could not extract text from page {}: {}", page_number, e);
                    String::new()
                }
            };
            PageText::new(page_number, text)
        })
        .collect()
}
