//! End-to-end runs of analyze, select, execute, and report.

mod common;

use std::path::Path;

use chrono::Local;
use tempfile::TempDir;

use docintake::executors::{self, TableFormat, TablesOutcome};
use docintake::ocr::TesseractBackend;
use docintake::pdf::{PageSource, PdfDocument};
use docintake::report::{self, REPORT_FILE};
use docintake::{
    Analyzer, Capabilities, Capability, ExecutionContext, ExecutionResult, ExecutorOptions,
    Strategy, Thresholds,
};

use common::{write_pdf, MemorySource};

const MB: u64 = 1024 * 1024;

fn builtin() -> Capabilities {
    Capabilities::with(&[Capability::PdfRead, Capability::PdfSplit])
}

#[test]
fn small_pdf_is_recommended_for_direct_reading() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("memo.pdf");
    write_pdf(&path, 3, "Memo page {n}");

    let analyzed = Analyzer::new(Thresholds::default())
        .analyze(&path, &builtin())
        .unwrap();
    assert_eq!(analyzed.facts.page_count, 3);
    assert!(analyzed.facts.is_safe_for_direct_read);
    assert_eq!(analyzed.facts.recommendation.strategy, Strategy::Direct);
}

#[test]
fn sparse_text_pdf_over_page_limit_needs_ocr() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scan.pdf");
    write_pdf(&path, 60, "{n}");

    let analyzed = Analyzer::new(Thresholds::default())
        .analyze(&path, &builtin())
        .unwrap();
    assert!(analyzed.facts.is_scanned);
    assert!(!analyzed.facts.likely_has_tables);
    assert_eq!(analyzed.facts.recommendation.strategy, Strategy::TextOcr);
}

#[test]
fn missing_ocr_tools_fail_closed() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("scan.pdf");
    write_pdf(&path, 2, "{n}");
    let caps = builtin();
    let document = PdfDocument::open(&path, &caps).unwrap();
    let ocr = TesseractBackend::default();
    let out = temp.path().join("out");

    let ctx = ExecutionContext {
        input: &path,
        source: &document,
        output_dir: &out,
        capabilities: &caps,
        ocr: &ocr,
    };
    let err = executors::execute(Strategy::TextOcr, &ctx, &ExecutorOptions::default());
    assert!(matches!(err, Err(executors::ExecutorError::Capability(_))));
    assert!(!out.join("scan_text.txt").exists());
}

#[test]
fn chunking_a_real_pdf_writes_openable_chunks() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("manual.pdf");
    write_pdf(&path, 60, "Manual page {n} with enough words to look like real digital text.");
    let caps = builtin();

    let analyzed = Analyzer::new(Thresholds::default())
        .analyze(&path, &caps)
        .unwrap();
    let out = temp.path().join("out");
    let ocr = TesseractBackend::default();
    let ctx = ExecutionContext {
        input: &path,
        source: &analyzed.document,
        output_dir: &out,
        capabilities: &caps,
        ocr: &ocr,
    };

    let result = executors::execute(Strategy::Chunk, &ctx, &ExecutorOptions::default()).unwrap();
    let ExecutionResult::Chunked(chunked) = &result else {
        panic!("expected chunks, got {:?}", result);
    };
    assert_eq!(chunked.chunks_created, 3);

    let counts: Vec<usize> = chunked
        .chunks
        .iter()
        .map(|chunk| PdfDocument::open(&chunk.file, &caps).unwrap().page_count())
        .collect();
    assert_eq!(counts, vec![25, 25, 14]);
    assert!(out
        .join("chunks/manual_chunk_003_pages_47-60.pdf")
        .is_file());

    let (text, report_path) =
        report::generate(&analyzed.facts, Strategy::Chunk, &result, &out).unwrap();
    assert_eq!(report_path, out.join(REPORT_FILE));
    assert!(text.contains("Chunks created:       3"));
    assert!(text.contains("overridden"));
}

#[test]
fn text_strategy_on_a_real_pdf_delimits_every_page() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("letter.pdf");
    write_pdf(&path, 4, "Letter page {n}");
    let caps = builtin();
    let document = PdfDocument::open(&path, &caps).unwrap();
    let ocr = TesseractBackend::default();

    let ctx = ExecutionContext {
        input: &path,
        source: &document,
        output_dir: temp.path(),
        capabilities: &caps,
        ocr: &ocr,
    };
    let result = executors::execute(Strategy::Text, &ctx, &ExecutorOptions::default()).unwrap();
    let ExecutionResult::Text(text) = result else {
        panic!("expected text");
    };
    let written = std::fs::read_to_string(&text.output_file).unwrap();
    for n in 1..=4 {
        assert!(written.contains(&format!("--- Page {} ---", n)));
    }
    assert!(!text.used_ocr);
    assert_eq!(text.pages, 4);
}

#[test]
fn tables_pipeline_with_json_output_and_stable_report() {
    let temp = TempDir::new().unwrap();
    let table = "Inventory for the spring quarter, counted on site by the warehouse team.\n\n\
                 Part      Count    Bin\n\
                 Bolt      120      A1\n\
                 Washer    300      A2\n";
    let mut pages = vec![table.to_string()];
    pages.extend((0..29).map(|_| {
        "Narrative text describing the warehouse process in ordinary sentences.".to_string()
    }));
    let source = MemorySource::new(pages);

    let analyzer = Analyzer::new(Thresholds::default());
    let facts = analyzer.analyze_source(Path::new("inventory.pdf"), 12 * MB, &source, Local::now());
    assert!(facts.likely_has_tables);
    assert_eq!(facts.recommendation.strategy, Strategy::Tables);

    let caps = Capabilities::with(&[Capability::PdfRead, Capability::LayoutText]);
    let ocr = TesseractBackend::default();
    let ctx = ExecutionContext {
        input: Path::new("inventory.pdf"),
        source: &source,
        output_dir: temp.path(),
        capabilities: &caps,
        ocr: &ocr,
    };
    let options = ExecutorOptions {
        table_format: TableFormat::Json,
        ..Default::default()
    };
    let result = executors::execute(Strategy::Tables, &ctx, &options).unwrap();
    match &result {
        ExecutionResult::Tables(TablesOutcome::Found {
            tables_found,
            files_created,
            ..
        }) => {
            assert_eq!(*tables_found, 1);
            let json: serde_json::Value =
                serde_json::from_str(&std::fs::read_to_string(&files_created[0]).unwrap())
                    .unwrap();
            assert_eq!(json[0]["rows"][1]["Part"], "Washer");
            assert_eq!(json[0]["rows"][1]["Count"], "300");
        }
        other => panic!("expected tables, got {:?}", other),
    }

    let (first, _) = report::generate(&facts, Strategy::Tables, &result, temp.path()).unwrap();
    let (second, _) = report::generate(&facts, Strategy::Tables, &result, temp.path()).unwrap();
    assert_eq!(first, second);
    assert!(first.contains("Tables found:         1"));
}

#[test]
fn explicit_chunk_on_small_source_still_runs() {
    let temp = TempDir::new().unwrap();
    let source = MemorySource::new(["one", "two", "three"]);
    let caps = builtin();
    let ocr = TesseractBackend::default();
    let ctx = ExecutionContext {
        input: Path::new("tiny.pdf"),
        source: &source,
        output_dir: temp.path(),
        capabilities: &caps,
        ocr: &ocr,
    };

    let result = executors::execute(Strategy::Chunk, &ctx, &ExecutorOptions::default()).unwrap();
    let ExecutionResult::Chunked(chunked) = result else {
        panic!("expected chunks");
    };
    assert_eq!(chunked.chunks_created, 1);
    assert_eq!(chunked.chunks[0].page_range, (1, 3));
    assert_eq!(source.page_count(), 3);
}
