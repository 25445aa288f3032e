//! Page-oriented PDF access.
//!
//! [`PageSource`] is the seam the analyzer and the executors read through.
//! [`PdfDocument`] implements it on top of lopdf, using pdftotext for
//! column-preserving text when it was detected.

pub mod poppler;

use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};

use lopdf::{Dictionary, Document, Object, ObjectId};
use serde::Serialize;
use thiserror::Error;

use crate::capabilities::{Capabilities, Capability};

/// Errors that can occur while reading or writing PDFs.
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to open PDF: {0}")]
    Open(String),

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Text extraction failed on page {page}: {message}")]
    Text { page: usize, message: String },

    #[error("Layout text is not available: {0}")]
    LayoutUnavailable(String),

    #[error("Failed to write PDF {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document information dictionary entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
}

impl DocumentMetadata {
    pub fn is_empty(&self) -> bool {
        self.entries().next().is_none()
    }

    /// Present entries as (label, value) pairs in a fixed order.
    pub fn entries(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("Title", &self.title),
            ("Author", &self.author),
            ("Subject", &self.subject),
            ("Creator", &self.creator),
            ("Producer", &self.producer),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
    }
}

/// Read access to an opened document, addressed by 0-based page index.
pub trait PageSource {
    fn page_count(&self) -> usize;

    /// Plain text of one page.
    fn page_text(&self, index: usize) -> Result<String, PdfError>;

    /// Column-preserving text of one page, for table detection.
    fn layout_text(&self, index: usize) -> Result<String, PdfError>;

    fn metadata(&self) -> Option<DocumentMetadata>;

    /// Write pages `[range.start, range.end)` to a new document at `dest`.
    fn write_pages(&self, range: Range<usize>, dest: &Path) -> Result<(), PdfError>;
}

/// A PDF opened with lopdf.
pub struct PdfDocument {
    path: PathBuf,
    document: Document,
    page_numbers: Vec<u32>,
    page_ids: Vec<ObjectId>,
    use_pdftotext: bool,
}

impl PdfDocument {
    /// Open a PDF. `capabilities` decides whether pdftotext is used for text.
    pub fn open(path: &Path, capabilities: &Capabilities) -> Result<Self, PdfError> {
        capabilities
            .require(Capability::PdfRead)
            .map_err(|e| PdfError::Open(e.to_string()))?;

        let document = Document::load(path).map_err(|e| PdfError::Open(e.to_string()))?;
        let (page_numbers, page_ids): (Vec<u32>, Vec<ObjectId>) =
            document.get_pages().into_iter().unzip();

        Ok(Self {
            path: path.to_path_buf(),
            document,
            page_numbers,
            page_ids,
            use_pdftotext: capabilities.has(Capability::LayoutText),
        })
    }

    fn page_number(&self, index: usize) -> Result<u32, PdfError> {
        self.page_numbers
            .get(index)
            .copied()
            .ok_or(PdfError::PageOutOfRange {
                page: index + 1,
                count: self.page_numbers.len(),
            })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let number = self.page_number(index)?;
        if self.use_pdftotext {
            return poppler::page_text(&self.path, number);
        }
        self.document
            .extract_text(&[number])
            .map_err(|e| PdfError::Text {
                page: index + 1,
                message: e.to_string(),
            })
    }

    fn layout_text(&self, index: usize) -> Result<String, PdfError> {
        let number = self.page_number(index)?;
        if !self.use_pdftotext {
            return Err(PdfError::LayoutUnavailable(
                Capability::LayoutText.install_hint().to_string(),
            ));
        }
        poppler::page_text(&self.path, number)
    }

    fn metadata(&self) -> Option<DocumentMetadata> {
        let info = info_dictionary(&self.document)?;
        let metadata = DocumentMetadata {
            title: info_string(info, b"Title"),
            author: info_string(info, b"Author"),
            subject: info_string(info, b"Subject"),
            creator: info_string(info, b"Creator"),
            producer: info_string(info, b"Producer"),
        };
        (!metadata.is_empty()).then_some(metadata)
    }

    fn write_pages(&self, range: Range<usize>, dest: &Path) -> Result<(), PdfError> {
        if range.start >= range.end || range.end > self.page_count() {
            return Err(PdfError::PageOutOfRange {
                page: range.end,
                count: self.page_count(),
            });
        }

        let write_error = |e: lopdf::Error| PdfError::Write {
            path: dest.to_path_buf(),
            message: e.to_string(),
        };

        let keep = &self.page_ids[range];
        let mut document = self.document.clone();
        let tree_id = page_tree_root(&document).map_err(write_error)?;

        // Hang the kept pages directly off the root page tree. Attributes
        // they inherited from intermediate nodes are copied onto them first.
        for &page_id in keep {
            let attributes = inherited_attributes(&document, page_id);
            let page = document
                .get_object_mut(page_id)
                .and_then(Object::as_dict_mut)
                .map_err(write_error)?;
            for (key, value) in attributes {
                page.set(key, value);
            }
            page.set("Parent", tree_id);
        }

        let tree = document
            .get_object_mut(tree_id)
            .and_then(Object::as_dict_mut)
            .map_err(write_error)?;
        tree.set(
            "Kids",
            keep.iter()
                .map(|id| Object::Reference(*id))
                .collect::<Vec<_>>(),
        );
        tree.set("Count", keep.len() as i64);

        // Outline entries point at pages outside the chunk.
        let root = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(write_error)?;
        if let Ok(catalog) = document.get_object_mut(root).and_then(Object::as_dict_mut) {
            catalog.remove(b"Outlines");
        }

        document.prune_objects();
        document.compress();
        document.save(dest).map_err(|e| PdfError::Write {
            path: dest.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

fn page_tree_root(document: &Document) -> lopdf::Result<ObjectId> {
    let root = document.trailer.get(b"Root")?.as_reference()?;
    document
        .get_object(root)?
        .as_dict()?
        .get(b"Pages")?
        .as_reference()
}

/// Inheritable attributes a page lacks, taken from the nearest ancestor
/// that defines each one.
fn inherited_attributes(document: &Document, page_id: ObjectId) -> Vec<(Vec<u8>, Object)> {
    let mut found = Vec::new();
    let Ok(page) = document.get_object(page_id).and_then(Object::as_dict) else {
        return found;
    };
    let mut missing: Vec<&[u8]> = INHERITABLE
        .iter()
        .copied()
        .filter(|key| !page.has(key))
        .collect();

    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();
    while let Some(id) = parent {
        if missing.is_empty() || !visited.insert(id) {
            break;
        }
        let Ok(node) = document.get_object(id).and_then(Object::as_dict) else {
            break;
        };
        missing.retain(|key| match node.get(key) {
            Ok(value) => {
                found.push((key.to_vec(), value.clone()));
                false
            }
            Err(_) => true,
        });
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }
    found
}

fn info_dictionary(document: &Document) -> Option<&Dictionary> {
    match document.trailer.get(b"Info").ok()? {
        Object::Reference(id) => document.get_object(*id).ok()?.as_dict().ok(),
        Object::Dictionary(dict) => Some(dict),
        _ => None,
    }
}

fn info_string(info: &Dictionary, key: &[u8]) -> Option<String> {
    match info.get(key).ok()? {
        Object::String(bytes, _) => {
            let text = decode_text_string(bytes);
            let text = text.trim();
            (!text.is_empty()).then(|| text.to_string())
        }
        _ => None,
    }
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise single-byte.
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|&b| b as char).collect()
    }
}
