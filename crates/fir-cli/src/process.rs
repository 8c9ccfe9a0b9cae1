//! Process a single FIR document into a JSON record.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use fir_core::{open_source, ExtractedRecord, FirError, FirPipeline, PureOcrEngine};

use crate::config::load_config;
use crate::Cli;

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(model_dir) = cli.model_dir {
        config.ocr.model_dir = model_dir;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading document...");
    let source = match open_source(&cli.input) {
        Ok(source) => source,
        Err(e) if e.is_input_error() => return report_input_error(&pb, &e),
        Err(e) => return Err(e).context("failed to open input"),
    };
    info!(
        "Processing file: {} ({} pages)",
        cli.input.display(),
        source.page_count()
    );

    pb.set_message("Loading OCR models...");
    let engine = PureOcrEngine::from_config(config.ocr.clone())
        .context("failed to load OCR models")?;

    let mut pipeline = FirPipeline::new(engine, &config);
    if let Some(dir) = cli.dump_crops {
        pipeline = pipeline.with_dump_dir(dir);
    }

    pb.set_message("Running OCR...");
    let outcome = match pipeline.run(&source) {
        Ok(outcome) => outcome,
        Err(e) if e.is_input_error() => return report_input_error(&pb, &e),
        Err(e) => {
            pb.finish_and_clear();
            return Err(e).context("extraction failed");
        }
    };

    pb.finish_and_clear();
    debug!(
        "Kept page {} of {} after {}ms",
        outcome.page, outcome.page_count, outcome.processing_time_ms
    );

    write_record(&outcome.report.record, &cli.output)?;

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Input errors end the run without output and without failing it.
fn report_input_error(pb: &ProgressBar, error: &FirError) -> anyhow::Result<()> {
    pb.finish_and_clear();
    eprintln!("{} {}", style("✗").red(), error);
    Ok(())
}

/// Echo the record to stdout and write it to `path`.
fn write_record(record: &ExtractedRecord, path: &Path) -> anyhow::Result<()> {
    let json = record.to_json_pretty()?;
    println!("{}", json);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, &json).with_context(|| format!("failed to write {}", path.display()))?;

    eprintln!("{} Output written to {}", style("✓").green(), path.display());

    Ok(())
}
