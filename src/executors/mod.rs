//! Strategy executors.
//!
//! Each executor consumes the opened document and an output directory and
//! either completes fully or fails with an [`ExecutorError`]. There is no
//! partial-result salvage, retry, or fallback to another strategy.

pub mod chunk;
pub mod tables;
pub mod text;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::capabilities::{Capabilities, CapabilityError};
use crate::ocr::{OcrBackend, OcrError, OcrSettings};
use crate::pdf::{PageSource, PdfError};
use crate::strategy::Strategy;

pub use chunk::{chunk_ranges, ChunkInfo, ChunkOptions, ChunkResult};
pub use tables::{TableFormat, TablesOutcome};
pub use text::TextResult;

/// Errors that abort an executor.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Ocr(#[from] OcrError),

    #[error("Failed to serialize tables: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Strategy '{0}' has no executor")]
    NoExecutor(Strategy),
}

/// What an executor produced, keyed by the strategy that ran.
#[derive(Debug, Clone)]
pub enum ExecutionResult {
    Chunked(ChunkResult),
    Text(TextResult),
    Tables(TablesOutcome),
}

/// Everything an executor needs besides its own options.
pub struct ExecutionContext<'a> {
    pub input: &'a Path,
    pub source: &'a dyn PageSource,
    pub output_dir: &'a Path,
    pub capabilities: &'a Capabilities,
    pub ocr: &'a dyn OcrBackend,
}

impl ExecutionContext<'_> {
    /// Input file name without extension, used to name outputs.
    pub fn stem(&self) -> String {
        self.input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string())
    }

    fn output_path(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

/// Per-strategy options.
#[derive(Debug, Clone, Default)]
pub struct ExecutorOptions {
    pub chunk: ChunkOptions,
    pub table_format: TableFormat,
    pub ocr: OcrSettings,
}

/// Run the executor for `strategy`.
pub fn execute(
    strategy: Strategy,
    ctx: &ExecutionContext<'_>,
    options: &ExecutorOptions,
) -> Result<ExecutionResult, ExecutorError> {
    ctx.capabilities
        .require_all(strategy.required_capabilities())?;

    tracing::info!(
        "running {} on {} -> {}",
        strategy,
        ctx.input.display(),
        ctx.output_dir.display()
    );

    match strategy {
        Strategy::Direct => Err(ExecutorError::NoExecutor(strategy)),
        Strategy::Chunk => chunk::run(ctx, &options.chunk).map(ExecutionResult::Chunked),
        Strategy::Text => text::run(ctx, None).map(ExecutionResult::Text),
        Strategy::TextOcr => text::run(ctx, Some(&options.ocr)).map(ExecutionResult::Text),
        Strategy::Tables => tables::run(ctx, options.table_format).map(ExecutionResult::Tables),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::capabilities::Capability;
    use crate::ocr::OcrError;
    use crate::testing::FakeSource;
    use tempfile::TempDir;

    /// OCR stand-in that "recognizes" a fixed string per page.
    pub(crate) struct FakeOcr;

    impl OcrBackend for FakeOcr {
        fn name(&self) -> &'static str {
            "fake"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn availability_hint(&self) -> String {
            String::new()
        }

        fn run_ocr(&self, _image_path: &Path) -> Result<String, OcrError> {
            Ok("recognized words".to_string())
        }

        fn ocr_pdf_page(
            &self,
            _pdf_path: &Path,
            page: u32,
            _dpi: u32,
        ) -> Result<crate::ocr::OcrResult, OcrError> {
            Ok(crate::ocr::OcrResult {
                text: format!("recognized words on page {}", page),
                processing_time_ms: 0,
            })
        }
    }

    #[test]
    fn test_direct_has_no_executor() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::uniform(1, "text");
        let caps = Capabilities::with(&Capability::ALL);
        let ctx = ExecutionContext {
            input: Path::new("in.pdf"),
            source: &source,
            output_dir: temp.path(),
            capabilities: &caps,
            ocr: &FakeOcr,
        };
        let err = execute(Strategy::Direct, &ctx, &ExecutorOptions::default()).unwrap_err();
        assert!(matches!(err, ExecutorError::NoExecutor(Strategy::Direct)));
    }

    #[test]
    fn test_missing_capability_fails_before_running() {
        let temp = TempDir::new().unwrap();
        let source = FakeSource::uniform(2, "text");
        let caps = Capabilities::with(&[Capability::PdfRead, Capability::PdfSplit]);
        let ctx = ExecutionContext {
            input: Path::new("scan.pdf"),
            source: &source,
            output_dir: temp.path(),
            capabilities: &caps,
            ocr: &FakeOcr,
        };

        let err = execute(Strategy::TextOcr, &ctx, &ExecutorOptions::default()).unwrap_err();
        assert!(matches!(err, ExecutorError::Capability(_)));
        assert!(!temp.path().join("scan_text.txt").exists());

        let err = execute(Strategy::Tables, &ctx, &ExecutorOptions::default()).unwrap_err();
        assert!(matches!(err, ExecutorError::Capability(_)));
    }

    #[test]
    fn test_stem_names_outputs() {
        let source = FakeSource::uniform(1, "text");
        let caps = Capabilities::default();
        let ctx = ExecutionContext {
            input: Path::new("/data/annual report.v2.pdf"),
            source: &source,
            output_dir: Path::new("/out"),
            capabilities: &caps,
            ocr: &FakeOcr,
        };
        assert_eq!(ctx.stem(), "annual report.v2");
    }
}
