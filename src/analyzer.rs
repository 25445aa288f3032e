//! Document analysis.
//!
//! Produces the write-once fact sheet the selector and the report work from.
//! Text density and table presence are estimated from the first few pages
//! only; the whole document is never scanned here.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::capabilities::Capabilities;
use crate::pdf::{DocumentMetadata, PageSource, PdfDocument};
use crate::strategy::{self, Recommendation, Signals, Thresholds};
use crate::tables;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Facts about a successfully opened document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentFacts {
    pub path: PathBuf,
    pub timestamp: DateTime<Local>,
    pub size_bytes: u64,
    pub size_mb: f64,
    pub page_count: usize,
    /// Mean characters per sampled page. `None` for a zero-page document.
    pub avg_text_per_page: Option<f64>,
    pub is_scanned: bool,
    pub likely_has_tables: bool,
    pub is_safe_for_direct_read: bool,
    pub recommendation: Recommendation,
    pub metadata: Option<DocumentMetadata>,
}

/// The terminal outcome when a document cannot be analyzed.
#[derive(Debug, Clone, Serialize)]
pub struct FailedAnalysis {
    pub path: PathBuf,
    pub timestamp: DateTime<Local>,
    pub size_mb: f64,
    pub error: String,
}

impl std::fmt::Display for FailedAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not analyze {} ({:.2} MB): {}",
            self.path.display(),
            self.size_mb,
            self.error
        )
    }
}

impl std::error::Error for FailedAnalysis {}

/// An analyzed document, still open for the executors.
pub struct AnalyzedDocument {
    pub facts: DocumentFacts,
    pub document: PdfDocument,
}

pub struct Analyzer {
    thresholds: Thresholds,
}

impl Analyzer {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    /// Stat and open `path`, then analyze it.
    pub fn analyze(
        &self,
        path: &Path,
        capabilities: &Capabilities,
    ) -> Result<AnalyzedDocument, FailedAnalysis> {
        let timestamp = Local::now();
        let size_bytes = match std::fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) => {
                return Err(FailedAnalysis {
                    path: path.to_path_buf(),
                    timestamp,
                    size_mb: 0.0,
                    error: e.to_string(),
                })
            }
        };

        let document = PdfDocument::open(path, capabilities).map_err(|e| FailedAnalysis {
            path: path.to_path_buf(),
            timestamp,
            size_mb: size_bytes as f64 / BYTES_PER_MB,
            error: e.to_string(),
        })?;

        let facts = self.analyze_source(path, size_bytes, &document, timestamp);
        Ok(AnalyzedDocument { facts, document })
    }

    /// Analyze an already opened source. Read-only.
    pub fn analyze_source(
        &self,
        path: &Path,
        size_bytes: u64,
        source: &dyn PageSource,
        timestamp: DateTime<Local>,
    ) -> DocumentFacts {
        let t = &self.thresholds;
        let size_mb = size_bytes as f64 / BYTES_PER_MB;
        let page_count = source.page_count();

        let avg_text_per_page = average_text_per_page(source, t.sample_pages);
        let is_scanned = t.is_scanned(avg_text_per_page.unwrap_or(0.0));
        let is_safe_for_direct_read = t.is_safe_for_direct_read(size_mb, page_count);
        let likely_has_tables = !is_scanned && sample_tables(source, t.sample_pages);

        let signals = Signals {
            is_safe_for_direct_read,
            is_scanned,
            likely_has_tables,
            size_mb,
            page_count,
        };
        let recommendation = strategy::select(&signals, t);

        tracing::info!(
            "analyzed {}: {} pages, {:.2} MB, recommended {}",
            path.display(),
            page_count,
            size_mb,
            recommendation.strategy
        );

        DocumentFacts {
            path: path.to_path_buf(),
            timestamp,
            size_bytes,
            size_mb,
            page_count,
            avg_text_per_page,
            is_scanned,
            likely_has_tables,
            is_safe_for_direct_read,
            recommendation,
            metadata: source.metadata(),
        }
    }
}

/// Mean character count over the first `sample` pages.
///
/// A page whose text cannot be read counts as empty.
fn average_text_per_page(source: &dyn PageSource, sample: usize) -> Option<f64> {
    let sampled = sample.min(source.page_count());
    if sampled == 0 {
        return None;
    }

    let total: usize = (0..sampled)
        .map(|index| match source.page_text(index) {
            Ok(text) => text.trim().chars().count(),
            Err(e) => {
                tracing::debug!("text sample failed on page {}: {}", index + 1, e);
                0
            }
        })
        .sum();

    Some(total as f64 / sampled as f64)
}

/// Best-effort table check over the first `sample` pages.
///
/// Any failure reading layout text is logged and treated as "no tables".
fn sample_tables(source: &dyn PageSource, sample: usize) -> bool {
    let sampled = sample.min(source.page_count());
    for index in 0..sampled {
        match source.layout_text(index) {
            Ok(text) => {
                if tables::has_table(&text) {
                    return true;
                }
            }
            Err(e) => {
                tracing::debug!("table check skipped: {}", e);
                return false;
            }
        }
    }
    false
}
