//! Text executor: page-delimited plain text, optionally through OCR.

use std::path::PathBuf;

use indicatif::{ProgressBar, ProgressStyle};

use super::{ExecutionContext, ExecutorError};
use crate::ocr::OcrSettings;

#[derive(Debug, Clone)]
pub struct TextResult {
    pub output_file: PathBuf,
    pub size_kb: f64,
    pub word_count: usize,
    pub used_ocr: bool,
    pub pages: usize,
}

/// Delimited block for one page: `\n--- Page N ---\n<text>\n`.
pub fn page_block(number: usize, text: &str) -> String {
    format!("\n--- Page {} ---\n{}\n", number, text)
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

pub fn text_file_name(stem: &str) -> String {
    format!("{}_text.txt", stem)
}

/// `OCR page N/M`, printed per page when no progress bar can be drawn.
pub fn progress_line(page: usize, total: usize) -> String {
    format!("OCR page {}/{}", page, total)
}

/// Per-page OCR progress: a bar on a terminal, plain stderr lines otherwise.
enum OcrProgress {
    Bar(ProgressBar),
    Lines { total: usize },
}

impl OcrProgress {
    fn new(total: usize) -> Self {
        if !console::Term::stdout().is_term() {
            return OcrProgress::Lines { total };
        }
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} {msg} [{bar:30.cyan/blue}] {pos}/{len} pages")
            .map(|s| s.progress_chars("█▓░"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        bar.set_style(style);
        bar.set_message("OCR");
        OcrProgress::Bar(bar)
    }

    fn page_done(&self, page: usize) {
        match self {
            OcrProgress::Bar(bar) => bar.inc(1),
            OcrProgress::Lines { total } => {
                let _ = console::Term::stderr().write_line(&progress_line(page, *total));
            }
        }
    }

    fn abandon(&self) {
        if let OcrProgress::Bar(bar) = self {
            bar.abandon();
        }
    }

    fn finish(&self) {
        if let OcrProgress::Bar(bar) = self {
            bar.finish_and_clear();
        }
    }
}

pub(super) fn run(
    ctx: &ExecutionContext<'_>,
    ocr: Option<&OcrSettings>,
) -> Result<TextResult, ExecutorError> {
    let total = ctx.source.page_count();
    let mut content = String::new();

    match ocr {
        None => {
            for index in 0..total {
                let text = ctx.source.page_text(index)?;
                content.push_str(&page_block(index + 1, &text));
            }
        }
        Some(settings) => {
            let progress = OcrProgress::new(total);
            for index in 0..total {
                let page = index + 1;
                let result = ctx
                    .ocr
                    .ocr_pdf_page(ctx.input, page as u32, settings.dpi)
                    .inspect_err(|_| progress.abandon())?;
                tracing::info!(
                    "OCR page {}/{} with {} ({} ms)",
                    page,
                    total,
                    ctx.ocr.name(),
                    result.processing_time_ms
                );
                content.push_str(&page_block(page, &result.text));
                progress.page_done(page);
            }
            progress.finish();
        }
    }

    std::fs::create_dir_all(ctx.output_dir)?;
    let output_file = ctx.output_path(&text_file_name(&ctx.stem()));
    std::fs::write(&output_file, &content)?;

    Ok(TextResult {
        output_file,
        size_kb: content.len() as f64 / 1024.0,
        word_count: word_count(&content),
        used_ocr: ocr.is_some(),
        pages: total,
    })
}
