//! Capability detection for the extraction toolchain.
//!
//! Detection runs once at startup. PDF reading and page splitting are
//! compiled in (lopdf); layout text, rasterizing, and OCR depend on
//! external binaries being present on `PATH`.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;

/// A single extraction capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Capability {
    /// Open a PDF, count pages, read per-page text and metadata.
    PdfRead,
    /// Compose new PDFs from page subsets.
    PdfSplit,
    /// Column-preserving per-page text via pdftotext.
    LayoutText,
    /// Page rendering to images via pdftoppm.
    Rasterize,
    /// Optical character recognition via tesseract.
    Ocr,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::PdfRead,
        Capability::PdfSplit,
        Capability::LayoutText,
        Capability::Rasterize,
        Capability::Ocr,
    ];

    /// External binary backing this capability, if any.
    pub fn tool(&self) -> Option<&'static str> {
        match self {
            Capability::PdfRead | Capability::PdfSplit => None,
            Capability::LayoutText => Some("pdftotext"),
            Capability::Rasterize => Some("pdftoppm"),
            Capability::Ocr => Some("tesseract"),
        }
    }

    /// Human-readable hint for making the capability available.
    pub fn install_hint(&self) -> &'static str {
        match self {
            Capability::PdfRead | Capability::PdfSplit => "built in",
            Capability::LayoutText | Capability::Rasterize => {
                "install poppler-utils (apt install poppler-utils)"
            }
            Capability::Ocr => "install tesseract-ocr (apt install tesseract-ocr)",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Capability::PdfRead => "pdf-read",
            Capability::PdfSplit => "pdf-split",
            Capability::LayoutText => "layout-text",
            Capability::Rasterize => "rasterize",
            Capability::Ocr => "ocr",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tool() {
            Some(tool) => write!(f, "{} ({})", self.name(), tool),
            None => f.write_str(self.name()),
        }
    }
}

/// Raised when an operation needs a capability that was not detected at startup.
#[derive(Debug, Error)]
#[error("Required capability {capability} is not available: {hint}")]
pub struct CapabilityError {
    pub capability: Capability,
    pub hint: &'static str,
}

/// The set of capabilities available in this process.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    available: BTreeSet<Capability>,
}

impl Capabilities {
    /// Look up every external tool on PATH once.
    pub fn detect() -> Self {
        let available = Capability::ALL
            .iter()
            .copied()
            .filter(|cap| match cap.tool() {
                Some(tool) => check_binary(tool),
                None => true,
            })
            .collect::<BTreeSet<_>>();

        tracing::debug!(
            "detected capabilities: {}",
            available
                .iter()
                .map(|c| c.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Self { available }
    }

    /// Build a fixed capability set.
    pub fn with(caps: &[Capability]) -> Self {
        Self {
            available: caps.iter().copied().collect(),
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.available.contains(&capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), CapabilityError> {
        if self.has(capability) {
            Ok(())
        } else {
            Err(CapabilityError {
                capability,
                hint: capability.install_hint(),
            })
        }
    }

    pub fn require_all(&self, capabilities: &[Capability]) -> Result<(), CapabilityError> {
        capabilities.iter().try_for_each(|c| self.require(*c))
    }

    /// Whether any text extraction path exists at all.
    pub fn can_extract(&self) -> bool {
        self.has(Capability::PdfRead) || self.has(Capability::LayoutText)
    }

    /// Status of every known capability, in declaration order.
    pub fn status(&self) -> Vec<(Capability, bool)> {
        Capability::ALL.iter().map(|c| (*c, self.has(*c))).collect()
    }
}

/// Check if a binary is available in PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}
