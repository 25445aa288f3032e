//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::ops::Range;
use std::path::Path;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use docintake::pdf::{DocumentMetadata, PageSource, PdfError};

/// Write a PDF with `pages` pages, each showing `text` (with `{n}` replaced
/// by the page number).
pub fn write_pdf(path: &Path, pages: usize, text: &str) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages);
    for n in 1..=pages {
        let body = text.replace("{n}", &n.to_string());
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(body)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.save(path).unwrap();
}

/// Pages held in memory; layout text is the page text itself.
pub struct MemorySource {
    pub pages: Vec<String>,
    pub metadata: Option<DocumentMetadata>,
}

impl MemorySource {
    pub fn new<S: Into<String>>(pages: impl IntoIterator<Item = S>) -> Self {
        Self {
            pages: pages.into_iter().map(Into::into).collect(),
            metadata: None,
        }
    }
}

impl PageSource for MemorySource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        self.pages
            .get(index)
            .cloned()
            .ok_or(PdfError::PageOutOfRange {
                page: index + 1,
                count: self.pages.len(),
            })
    }

    fn layout_text(&self, index: usize) -> Result<String, PdfError> {
        self.page_text(index)
    }

    fn metadata(&self) -> Option<DocumentMetadata> {
        self.metadata.clone()
    }

    fn write_pages(&self, range: Range<usize>, dest: &Path) -> Result<(), PdfError> {
        std::fs::write(dest, self.pages[range].join("\u{c}"))?;
        Ok(())
    }
}
