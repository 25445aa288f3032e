//! OCR for scanned documents.
//!
//! Pages are rendered with pdftoppm and recognized with Tesseract. The
//! [`OcrBackend`] trait keeps the text executor independent of the engine.

mod backend;
mod tesseract;

pub use backend::{OcrBackend, OcrError, OcrResult, OcrSettings};
pub use tesseract::TesseractBackend;
