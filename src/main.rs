//! CLI entry point: read an OCR text file, run the extraction pipeline,
//! report the run summary, and optionally write VTT export files.
//!
//! Usage: `bestiary-forge <ocr-text-file> [output-dir]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use bestiary_forge::diagnostics::Severity;
use bestiary_forge::{export, extract_document};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("{} v{} starting", bestiary_forge::NAME, bestiary_forge::VERSION);

    let mut args = std::env::args().skip(1);
    let Some(input) = args.next() else {
        bail!("usage: bestiary-forge <ocr-text-file> [output-dir]");
    };
    let output_dir: Option<PathBuf> = args.next().map(PathBuf::from);

    let text = std::fs::read_to_string(&input)
        .with_context(|| format!("reading OCR text from '{input}'"))?;

    let report = extract_document(&text);

    for diagnostic in &report.diagnostics {
        match diagnostic.severity {
            Severity::Warning => log::warn!("{diagnostic}"),
            Severity::Error => log::error!("{diagnostic}"),
        }
    }
    for failure in &report.failures {
        log::error!(
            "block failed [{}]: {} (header: '{}')",
            failure.monster,
            failure.error,
            failure.header_line
        );
    }

    if let Some(dir) = output_dir {
        let documents = export::actor_documents(&report.monsters);
        export::write_yaml(&dir, &documents)
            .with_context(|| format!("writing export files to '{}'", dir.display()))?;
        log::info!("wrote {} actor files to '{}'", documents.len(), dir.display());
    }

    // A completed batch is a success even when individual blocks failed;
    // the summary is the user-facing contract.
    println!("{}", report.summary());
    Ok(())
}
