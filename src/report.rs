//! Plain-text processing report.
//!
//! [`render`] is a pure function of its inputs, so rendering the same facts
//! and result twice yields identical text. [`generate`] writes it to
//! `processing_report.txt` in the output directory, replacing any earlier
//! report.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::analyzer::DocumentFacts;
use crate::executors::{ExecutionResult, TablesOutcome};
use crate::strategy::Strategy;

pub const REPORT_FILE: &str = "processing_report.txt";

const RULE: &str = "============================================================";
const SECTION_RULE: &str = "------------------------------------------------------------";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

fn section(out: &mut String, title: &str) {
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", title);
    let _ = writeln!(out, "{}", SECTION_RULE);
}

fn write_analysis(out: &mut String, facts: &DocumentFacts) {
    section(out, "ANALYSIS");
    let _ = writeln!(
        out,
        "File size:            {:.2} MB ({} bytes)",
        facts.size_mb, facts.size_bytes
    );
    let _ = writeln!(out, "Pages:                {}", facts.page_count);
    match facts.avg_text_per_page {
        Some(avg) => {
            let _ = writeln!(out, "Avg text per page:    {:.0} characters", avg);
        }
        None => {
            let _ = writeln!(out, "Avg text per page:    N/A");
        }
    }
    let _ = writeln!(out, "Scanned:              {}", yes_no(facts.is_scanned));
    let _ = writeln!(
        out,
        "Likely has tables:    {}",
        yes_no(facts.likely_has_tables)
    );
    let _ = writeln!(
        out,
        "Safe for direct read: {}",
        yes_no(facts.is_safe_for_direct_read)
    );

    match &facts.metadata {
        Some(metadata) if !metadata.is_empty() => {
            let _ = writeln!(out, "Metadata:");
            for (label, value) in metadata.entries() {
                let _ = writeln!(out, "  {}: {}", label, value);
            }
        }
        _ => {
            let _ = writeln!(out, "Metadata:             N/A");
        }
    }
}

fn write_strategy(out: &mut String, facts: &DocumentFacts, strategy_used: Strategy) {
    let recommended = &facts.recommendation;
    section(out, "STRATEGY");
    let _ = writeln!(out, "Strategy used:        {}", strategy_used);
    let _ = writeln!(out, "Recommended:          {}", recommended.strategy);
    let _ = writeln!(out, "Reason:               {}", recommended.reason);
    if strategy_used != recommended.strategy {
        let _ = writeln!(
            out,
            "Note: recommended strategy '{}' was overridden by '{}'",
            recommended.strategy, strategy_used
        );
    }
}

fn write_results(out: &mut String, result: &ExecutionResult) {
    section(out, "RESULTS");
    match result {
        ExecutionResult::Chunked(chunked) => {
            let _ = writeln!(out, "Chunks created:       {}", chunked.chunks_created);
            let _ = writeln!(out, "Directory:            {}", chunked.directory.display());
            for chunk in &chunked.chunks {
                let name = chunk
                    .file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let _ = writeln!(
                    out,
                    "  {} (pages {}-{}, {} pages)",
                    name, chunk.page_range.0, chunk.page_range.1, chunk.page_count
                );
            }
        }
        ExecutionResult::Text(text) => {
            let _ = writeln!(out, "Output file:          {}", text.output_file.display());
            let _ = writeln!(out, "Size:                 {:.1} KB", text.size_kb);
            let _ = writeln!(out, "Words:                {}", text.word_count);
            let _ = writeln!(out, "Pages:                {}", text.pages);
            let _ = writeln!(out, "OCR used:             {}", yes_no(text.used_ocr));
        }
        ExecutionResult::Tables(TablesOutcome::Found {
            tables_found,
            files_created,
            directory,
            format,
        }) => {
            let _ = writeln!(out, "Tables found:         {}", tables_found);
            let _ = writeln!(out, "Format:               {}", format);
            let _ = writeln!(out, "Directory:            {}", directory.display());
            for file in files_created {
                let _ = writeln!(out, "  {}", file.display());
            }
        }
        ExecutionResult::Tables(TablesOutcome::None { message }) => {
            let _ = writeln!(out, "Tables found:         0");
            let _ = writeln!(out, "{}", message);
        }
    }
}

fn next_steps(strategy_used: Strategy, result: &ExecutionResult) -> Vec<String> {
    match (strategy_used, result) {
        (Strategy::Chunk, ExecutionResult::Chunked(chunked)) => vec![
            format!(
                "Process the chunks in {} one at a time, in order",
                chunked.directory.display()
            ),
            "Adjacent chunks repeat pages at their boundaries; merge results accordingly"
                .to_string(),
        ],
        (Strategy::TextOcr, ExecutionResult::Text(text)) => vec![
            format!("Review {} for recognition errors", text.output_file.display()),
            "Process the extracted text as a plain text file".to_string(),
        ],
        (_, ExecutionResult::Text(text)) => vec![format!(
            "Process {} as a plain text file",
            text.output_file.display()
        )],
        (_, ExecutionResult::Tables(TablesOutcome::Found { directory, .. })) => vec![
            format!("Review the extracted tables in {}", directory.display()),
            "Extract the surrounding prose with the text strategy if needed".to_string(),
        ],
        (_, ExecutionResult::Tables(TablesOutcome::None { .. })) => {
            vec!["Re-run with the text strategy to extract the document's prose".to_string()]
        }
        (_, ExecutionResult::Chunked(chunked)) => vec![format!(
            "Process the chunks in {}",
            chunked.directory.display()
        )],
    }
}

/// Render the report text.
pub fn render(facts: &DocumentFacts, strategy_used: Strategy, result: &ExecutionResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "DOCUMENT PROCESSING REPORT");
    let _ = writeln!(out, "{}", RULE);
    let _ = writeln!(out, "Source:    {}", facts.path.display());
    let _ = writeln!(
        out,
        "Generated: {}",
        facts.timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    write_analysis(&mut out, facts);
    write_strategy(&mut out, facts, strategy_used);
    write_results(&mut out, result);

    section(&mut out, "NEXT STEPS");
    for (index, step) in next_steps(strategy_used, result).iter().enumerate() {
        let _ = writeln!(out, "{}. {}", index + 1, step);
    }
    out
}

/// Render the report and write it to `<output_dir>/processing_report.txt`.
pub fn generate(
    facts: &DocumentFacts,
    strategy_used: Strategy,
    result: &ExecutionResult,
    output_dir: &Path,
) -> Result<(String, PathBuf), ReportError> {
    let text = render(facts, strategy_used, result);
    let path = output_dir.join(REPORT_FILE);
    std::fs::create_dir_all(output_dir)
        .and_then(|_| std::fs::write(&path, &text))
        .map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
    tracing::info!("report written to {}", path.display());
    Ok((text, path))
}
