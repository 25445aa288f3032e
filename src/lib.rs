//! docintake - PDF intake classifier and dispatcher.
//!
//! Inspects a PDF's size, page count, and content signals, picks one
//! handling strategy (direct read, text, OCR, tables, or chunking), runs the
//! matching extraction, and writes a plain-text processing report.

pub mod analyzer;
pub mod capabilities;
pub mod config;
pub mod executors;
pub mod ocr;
pub mod pdf;
pub mod report;
pub mod strategy;
pub mod tables;

#[cfg(test)]
mod testing;

pub use analyzer::{AnalyzedDocument, Analyzer, DocumentFacts, FailedAnalysis};
pub use capabilities::{Capabilities, Capability};
pub use config::Config;
pub use executors::{execute, ExecutionContext, ExecutionResult, ExecutorError, ExecutorOptions};
pub use strategy::{Recommendation, Strategy, Thresholds};
