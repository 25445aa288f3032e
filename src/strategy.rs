//! Strategy selection.
//!
//! [`select`] maps the analyzer's signals to one [`Strategy`] with its reason.
//! Rules are evaluated in priority order and the first match wins:
//!
//! 1. safe for direct read → `direct`
//! 2. scanned → `text-ocr`
//! 3. likely has tables → `tables`
//! 4. large (size or pages) → `chunk`
//! 5. otherwise → `text`

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::Capability;

/// A document handling path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    Direct,
    Text,
    TextOcr,
    Tables,
    Chunk,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Direct,
        Strategy::Text,
        Strategy::TextOcr,
        Strategy::Tables,
        Strategy::Chunk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Direct => "direct",
            Strategy::Text => "text",
            Strategy::TextOcr => "text-ocr",
            Strategy::Tables => "tables",
            Strategy::Chunk => "chunk",
        }
    }

    /// Capabilities the executor for this strategy needs.
    pub fn required_capabilities(&self) -> &'static [Capability] {
        match self {
            Strategy::Direct => &[],
            Strategy::Text => &[Capability::PdfRead],
            Strategy::TextOcr => &[Capability::PdfRead, Capability::Rasterize, Capability::Ocr],
            Strategy::Tables => &[Capability::PdfRead, Capability::LayoutText],
            Strategy::Chunk => &[Capability::PdfRead, Capability::PdfSplit],
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named thresholds used by the analyzer and the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Average characters per sampled page below which a document is scanned.
    pub scanned_chars_per_page: f64,
    /// Direct reading requires size strictly below this many megabytes.
    pub direct_max_mb: f64,
    /// Direct reading requires strictly fewer pages than this.
    pub direct_max_pages: usize,
    /// Chunking is recommended above this many megabytes.
    pub chunk_min_mb: f64,
    /// Chunking is recommended above this many pages.
    pub chunk_min_pages: usize,
    /// Pages sampled for text density and table detection.
    pub sample_pages: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            scanned_chars_per_page: 50.0,
            direct_max_mb: 10.0,
            direct_max_pages: 50,
            chunk_min_mb: 15.0,
            chunk_min_pages: 100,
            sample_pages: 3,
        }
    }
}

impl Thresholds {
    pub fn is_scanned(&self, avg_text_per_page: f64) -> bool {
        avg_text_per_page < self.scanned_chars_per_page
    }

    pub fn is_safe_for_direct_read(&self, size_mb: f64, page_count: usize) -> bool {
        size_mb < self.direct_max_mb && page_count < self.direct_max_pages
    }

    pub fn is_large(&self, size_mb: f64, page_count: usize) -> bool {
        size_mb > self.chunk_min_mb || page_count > self.chunk_min_pages
    }
}

/// Inputs to the selector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub is_safe_for_direct_read: bool,
    pub is_scanned: bool,
    pub likely_has_tables: bool,
    pub size_mb: f64,
    pub page_count: usize,
}

/// A strategy together with the reason it was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Recommendation {
    pub strategy: Strategy,
    pub reason: &'static str,
}

impl Recommendation {
    const fn new(strategy: Strategy, reason: &'static str) -> Self {
        Self { strategy, reason }
    }
}

/// Pick a strategy. First matching rule wins.
pub fn select(signals: &Signals, thresholds: &Thresholds) -> Recommendation {
    if signals.is_safe_for_direct_read {
        Recommendation::new(Strategy::Direct, "Small enough for direct reading")
    } else if signals.is_scanned {
        Recommendation::new(Strategy::TextOcr, "Scanned document - OCR extraction recommended")
    } else if signals.likely_has_tables {
        Recommendation::new(
            Strategy::Tables,
            "Contains tables - specialized extraction recommended",
        )
    } else if thresholds.is_large(signals.size_mb, signals.page_count) {
        Recommendation::new(
            Strategy::Chunk,
            "Large document - chunking recommended to prevent crashes",
        )
    } else {
        Recommendation::new(
            Strategy::Text,
            "Extract text first, then process as a text file",
        )
    }
}
