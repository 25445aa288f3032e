//! CLI definition and entry point.

mod check;
mod process;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use docintake::executors::TableFormat;
use docintake::Strategy;

#[derive(Parser, Debug)]
#[command(name = "process_document")]
#[command(about = "Classify a PDF and extract it with the strategy that fits")]
#[command(version)]
pub struct Cli {
    /// Input PDF
    #[arg(required_unless_present = "check_tools")]
    input: Option<PathBuf>,

    /// Output directory for extracted files and the report
    #[arg(short, long, required_unless_present_any = ["check_tools", "analyze_only"])]
    output: Option<PathBuf>,

    /// Processing strategy
    #[arg(short, long, value_enum, default_value_t = StrategyArg::Auto)]
    strategy: StrategyArg,

    /// Pages per chunk for the chunk strategy [default: 25]
    #[arg(long)]
    pages_per_chunk: Option<usize>,

    /// Pages repeated between adjacent chunks [default: 2]
    #[arg(long)]
    overlap: Option<usize>,

    /// Output format for the tables strategy [default: csv]
    #[arg(long, value_enum)]
    table_format: Option<TableFormat>,

    /// Tesseract language for OCR, e.g. "eng" or "eng+deu" [default: eng]
    #[arg(long, env = "DOCINTAKE_OCR_LANG")]
    ocr_lang: Option<String>,

    /// Config file (TOML or JSON) with thresholds and defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Analyze and print the recommendation without extracting anything
    #[arg(long)]
    analyze_only: bool,

    /// Show which extraction tools are installed and exit
    #[arg(long)]
    check_tools: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// `--strategy` values: `auto` or one concrete strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Auto,
    Chunk,
    Text,
    TextOcr,
    Tables,
    Direct,
}

impl StrategyArg {
    /// The explicit strategy, or `None` to follow the recommendation.
    pub fn explicit(self) -> Option<Strategy> {
        match self {
            StrategyArg::Auto => None,
            StrategyArg::Chunk => Some(Strategy::Chunk),
            StrategyArg::Text => Some(Strategy::Text),
            StrategyArg::TextOcr => Some(Strategy::TextOcr),
            StrategyArg::Tables => Some(Strategy::Tables),
            StrategyArg::Direct => Some(Strategy::Direct),
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.check_tools {
        return check::cmd_check_tools();
    }

    process::cmd_process(process::ProcessArgs::from_cli(cli)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["process_document", "in.pdf", "--output", "out"]).unwrap();
        assert_eq!(cli.strategy, StrategyArg::Auto);
        assert_eq!(cli.input, Some(PathBuf::from("in.pdf")));
        assert!(cli.pages_per_chunk.is_none());
        assert!(!cli.analyze_only);
    }

    #[test]
    fn test_strategy_values() {
        let cli = Cli::try_parse_from([
            "process_document",
            "in.pdf",
            "-o",
            "out",
            "--strategy",
            "text-ocr",
            "--table-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.strategy.explicit(), Some(Strategy::TextOcr));
        assert_eq!(cli.table_format, Some(TableFormat::Json));
        assert_eq!(StrategyArg::Auto.explicit(), None);
    }

    #[test]
    fn test_output_required_unless_tool_check_or_analysis() {
        assert!(Cli::try_parse_from(["process_document", "in.pdf"]).is_err());
        assert!(Cli::try_parse_from(["process_document", "in.pdf", "--analyze-only"]).is_ok());
        assert!(Cli::try_parse_from(["process_document", "--check-tools"]).is_ok());
        assert!(Cli::try_parse_from(["process_document", "in.pdf", "-o", "x", "-s", "auto2"])
            .is_err());
    }
}
