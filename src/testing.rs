//! In-memory page source for unit tests.

use std::cell::Cell;
use std::ops::Range;
use std::path::Path;

use crate::pdf::{DocumentMetadata, PageSource, PdfError};

pub(crate) struct FakeSource {
    pages: Vec<String>,
    layout: bool,
    pub text_override: Option<String>,
    pub metadata: Option<DocumentMetadata>,
    layout_calls: Cell<usize>,
}

impl FakeSource {
    pub fn new(pages: Vec<String>) -> Self {
        Self {
            pages,
            layout: false,
            text_override: None,
            metadata: None,
            layout_calls: Cell::new(0),
        }
    }

    pub fn uniform(count: usize, text: &str) -> Self {
        Self::new(vec![text.to_string(); count])
    }

    /// Serve page text as layout text too.
    pub fn with_layout(mut self) -> Self {
        self.layout = true;
        self
    }

    pub fn layout_calls(&self) -> usize {
        self.layout_calls.get()
    }

    fn page(&self, index: usize) -> Result<&String, PdfError> {
        self.pages.get(index).ok_or(PdfError::PageOutOfRange {
            page: index + 1,
            count: self.pages.len(),
        })
    }
}

impl PageSource for FakeSource {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_text(&self, index: usize) -> Result<String, PdfError> {
        let page = self.page(index)?;
        Ok(self.text_override.clone().unwrap_or_else(|| page.clone()))
    }

    fn layout_text(&self, index: usize) -> Result<String, PdfError> {
        self.layout_calls.set(self.layout_calls.get() + 1);
        if !self.layout {
            return Err(PdfError::LayoutUnavailable("fake source".to_string()));
        }
        self.page(index).cloned()
    }

    fn metadata(&self) -> Option<DocumentMetadata> {
        self.metadata.clone()
    }

    fn write_pages(&self, range: Range<usize>, dest: &Path) -> Result<(), PdfError> {
        std::fs::write(dest, format!("pages {}..{}", range.start, range.end))?;
        Ok(())
    }
}
