//! OCR backend abstraction.

use std::path::Path;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use thiserror::Error;

use crate::pdf::{poppler, PdfError};

/// Errors from OCR backends.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Backend not available: {0}")]
    BackendNotAvailable(String),

    #[error("OCR failed: {0}")]
    OcrFailed(String),

    #[error("Page rendering failed: {0}")]
    Render(#[from] PdfError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of OCR on one page.
#[derive(Debug, Clone)]
pub struct OcrResult {
    pub text: String,
    pub processing_time_ms: u64,
}

/// OCR settings (language, render resolution).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code, e.g. "eng" or "eng+deu".
    pub language: String,
    /// Render resolution for page images.
    pub dpi: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: 300,
        }
    }
}

/// Trait for OCR backends.
pub trait OcrBackend {
    fn name(&self) -> &'static str;

    /// Check if this backend is available (dependencies installed).
    fn is_available(&self) -> bool;

    /// Get a description of what's needed to make this backend available.
    fn availability_hint(&self) -> String;

    /// Core OCR: extract text from an image file.
    fn run_ocr(&self, image_path: &Path) -> Result<String, OcrError>;

    /// Render one 1-based page of a PDF and run OCR on it.
    fn ocr_pdf_page(&self, pdf_path: &Path, page: u32, dpi: u32) -> Result<OcrResult, OcrError> {
        let start = Instant::now();
        let temp_dir = TempDir::new()?;
        let image_path = poppler::page_to_image(pdf_path, page, dpi, temp_dir.path())?;
        let text = self.run_ocr(&image_path)?;
        Ok(OcrResult {
            text,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
