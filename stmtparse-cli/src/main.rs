use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use stmtparse_core::render;

#[derive(Parser, Debug)]
#[command(
    name = "stmtparse",
    version,
    about = "Convert an HSBC HK credit-card PDF statement to JSON or CSV"
)]
struct Cli {
    /// Path to the PDF statement
    pdf: PathBuf,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value = "json")]
    output: Format,

    /// Destination path (defaults to the input path with the format's extension)
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Json,
    Csv,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Csv => "csv",
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let text = extract_pdf_text(&cli.pdf)?;
    let statement = stmtparse_core::parse(&text)
        .with_context(|| format!("parsing {}", cli.pdf.display()))?;

    let rendered = match cli.output {
        Format::Json => render::to_json(&statement)?,
        Format::Csv => render::to_csv(&statement)?,
    };

    let out_path = cli
        .out
        .unwrap_or_else(|| cli.pdf.with_extension(cli.output.extension()));
    fs::write(&out_path, rendered).with_context(|| format!("writing {}", out_path.display()))?;

    println!(
        "Wrote {} transactions to {}",
        statement.transactions.len(),
        out_path.display()
    );
    Ok(())
}

/// Run `pdftotext -layout` on the statement and capture its stdout.
///
/// Layout mode keeps the column alignment the parser's phrase splitting
/// depends on.
fn extract_pdf_text(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("statement not found: {}", path.display());
    }
    which::which("pdftotext")
        .context("pdftotext not found on PATH (install poppler-utils)")?;

    let output = Command::new("pdftotext")
        .arg("-layout")
        .arg("-nopgbrk")
        .arg(path)
        .arg("-")
        .output()
        .context("running pdftotext")?;

    if !output.status.success() {
        bail!(
            "pdftotext failed with status {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
