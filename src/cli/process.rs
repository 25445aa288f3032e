//! The `process_document` pipeline: analyze, select, execute, report.

use std::path::PathBuf;

use anyhow::Context;
use console::style;

use docintake::config::{expand_path, Config};
use docintake::executors::{self, ChunkOptions, ExecutionContext, ExecutorOptions};
use docintake::ocr::TesseractBackend;
use docintake::{report, Analyzer, Capabilities, DocumentFacts, Strategy};

use super::{Cli, StrategyArg};

/// Arguments for one processing run, separated from the parser.
#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub strategy: StrategyArg,
    pub pages_per_chunk: Option<usize>,
    pub overlap: Option<usize>,
    pub table_format: Option<executors::TableFormat>,
    pub ocr_lang: Option<String>,
    pub config: Option<PathBuf>,
    pub analyze_only: bool,
}

impl ProcessArgs {
    pub fn from_cli(cli: Cli) -> anyhow::Result<Self> {
        let input = cli.input.context("No input file given")?;
        Ok(Self {
            input: expand_path(&input),
            output: cli.output.map(|p| expand_path(&p)),
            strategy: cli.strategy,
            pages_per_chunk: cli.pages_per_chunk,
            overlap: cli.overlap,
            table_format: cli.table_format,
            ocr_lang: cli.ocr_lang,
            config: cli.config,
            analyze_only: cli.analyze_only,
        })
    }
}

/// Merge flags over config. Flags win.
fn executor_options(args: &ProcessArgs, config: &Config) -> ExecutorOptions {
    let mut ocr = config.ocr.clone();
    if let Some(lang) = &args.ocr_lang {
        ocr.language = lang.clone();
    }
    ExecutorOptions {
        chunk: ChunkOptions {
            pages_per_chunk: args
                .pages_per_chunk
                .unwrap_or(config.chunk.pages_per_chunk),
            overlap: args.overlap.unwrap_or(config.chunk.overlap),
        },
        table_format: args.table_format.unwrap_or(config.table_format),
        ocr,
    }
}

fn yes_no(value: bool) -> console::StyledObject<&'static str> {
    if value {
        style("yes").yellow()
    } else {
        style("no").dim()
    }
}

fn print_summary(facts: &DocumentFacts) {
    println!("\n{}", style("Document Analysis").bold());
    println!("{}", "-".repeat(50));
    println!("  {:<22} {}", "File:", facts.path.display());
    println!("  {:<22} {:.2} MB", "Size:", facts.size_mb);
    println!("  {:<22} {}", "Pages:", facts.page_count);
    match facts.avg_text_per_page {
        Some(avg) => println!("  {:<22} {:.0} characters", "Avg text per page:", avg),
        None => println!("  {:<22} N/A", "Avg text per page:"),
    }
    println!("  {:<22} {}", "Scanned:", yes_no(facts.is_scanned));
    println!("  {:<22} {}", "Likely has tables:", yes_no(facts.likely_has_tables));
    println!(
        "  {:<22} {}",
        "Safe for direct read:",
        yes_no(facts.is_safe_for_direct_read)
    );
    if let Some(metadata) = &facts.metadata {
        for (label, value) in metadata.entries() {
            println!("  {:<22} {}", format!("{}:", label), value);
        }
    }
    println!(
        "\n  {} {} ({})",
        style("Recommended:").cyan(),
        style(facts.recommendation.strategy).bold(),
        facts.recommendation.reason
    );
}

pub fn cmd_process(args: ProcessArgs) -> anyhow::Result<()> {
    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let config = Config::load(args.config.as_deref()).context("Failed to load configuration")?;
    let options = executor_options(&args, &config);
    options.chunk.validate()?;

    let caps = Capabilities::detect();
    if !caps.can_extract() {
        anyhow::bail!("No PDF text extraction capability is available (install poppler-utils)");
    }

    let analyzer = Analyzer::new(config.thresholds.clone());
    let analyzed = analyzer.analyze(&args.input, &caps)?;
    let facts = &analyzed.facts;
    print_summary(facts);

    let strategy = args
        .strategy
        .explicit()
        .unwrap_or(facts.recommendation.strategy);
    if strategy != facts.recommendation.strategy {
        println!(
            "  {} using '{}' instead of the recommendation",
            style("Override:").yellow(),
            strategy
        );
    }

    if args.analyze_only {
        return Ok(());
    }

    if strategy == Strategy::Direct {
        println!(
            "\n{} The document is small enough to read directly; nothing was extracted.",
            style("✓").green()
        );
        return Ok(());
    }

    let output_dir = args
        .output
        .context("--output is required to run an extraction")?;
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let ocr = TesseractBackend::new(&options.ocr);
    let ctx = ExecutionContext {
        input: &args.input,
        source: &analyzed.document,
        output_dir: &output_dir,
        capabilities: &caps,
        ocr: &ocr,
    };

    println!("\n{} {}", style("Running:").cyan(), style(strategy).bold());
    let result = executors::execute(strategy, &ctx, &options)
        .with_context(|| format!("Strategy '{}' failed", strategy))?;

    let (text, path) = report::generate(facts, strategy, &result, &output_dir)?;
    println!("\n{}", text);
    println!("{} Report saved to {}", style("✓").green(), path.display());
    Ok(())
}
