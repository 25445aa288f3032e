//! Extraction tool availability check.

use console::style;

use docintake::ocr::{OcrBackend, TesseractBackend};
use docintake::Capabilities;

/// Print the capability table. Fails when anything is missing.
pub fn cmd_check_tools() -> anyhow::Result<()> {
    let caps = Capabilities::detect();

    println!("\n{}", style("Extraction Tool Status").bold());
    println!("{}", "-".repeat(50));

    let mut all_found = true;
    for (capability, available) in caps.status() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<28} {}", capability.to_string(), status);
        if !available {
            println!("  {:<28} {}", "", style(capability.install_hint()).dim());
        }
    }

    println!("\n{}", style("OCR Backend:").cyan());
    let tesseract = TesseractBackend::default();
    if tesseract.is_available() {
        println!("  {} {}", style("→").green(), tesseract.name());
    } else {
        println!(
            "  {} {}",
            style("!").yellow(),
            style(tesseract.availability_hint()).dim()
        );
    }

    println!();

    if all_found {
        println!("{} All extraction tools are available", style("✓").green());
        Ok(())
    } else {
        println!(
            "{} Some tools are missing; strategies that need them will refuse to run.",
            style("!").yellow()
        );
        anyhow::bail!("missing extraction tools")
    }
}
