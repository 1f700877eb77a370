//! Batch command - extract fields from many documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use docfill_core::{ExtractionMethod, ExtractionRequest, SourceMap, TextRecognizer};

use super::config::load_config;
use super::{build_coordinator, build_recognizer, build_request, process_document};
use crate::export::{format_fields, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of input documents (e.g. "inbox/*.pdf")
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use regex patterns only, never the language model
    #[arg(long)]
    no_ai: bool,

    /// Include the source line of every field
    #[arg(long)]
    sources: bool,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Run OCR on images in PDF pages (scanned documents)
    #[arg(long)]
    ocr: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    method: Option<ExtractionMethod>,
    field_count: usize,
    output: Option<String>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "docx" | "txt")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let request = build_request(&config, args.no_ai, Vec::new());
    let resolve_regex_sources = config.extraction.resolve_regex_sources;
    let format = args.format;
    let with_sources = args.sources;
    let continue_on_error = args.continue_on_error;
    let (ocr, model_dir) = (args.ocr, args.model_dir.clone());
    let worker_pb = pb.clone();

    // Documents are processed one after another on a single blocking thread.
    let results = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<FileResult>> {
        let recognizer = build_recognizer(&config, ocr, model_dir)?;
        let coordinator = build_coordinator(&config, request.use_ai);
        let mut results = Vec::with_capacity(files.len());

        for path in files {
            let result = process_file(
                &path,
                &coordinator,
                &request,
                recognizer.as_deref(),
                format,
                with_sources,
                resolve_regex_sources,
            );

            match result {
                Ok(done) => results.push(done),
                Err(e) => {
                    let error_msg = e.to_string();
                    if continue_on_error {
                        warn!("Failed to process {}: {}", path.display(), error_msg);
                        results.push(FileResult {
                            path,
                            method: None,
                            field_count: 0,
                            output: None,
                            error: Some(error_msg),
                        });
                    } else {
                        error!("Failed to process {}: {}", path.display(), error_msg);
                        anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                    }
                }
            }

            worker_pb.inc(1);
        }

        Ok(results)
    })
    .await??;

    pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.error.is_none()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        let Some(output) = &result.output else {
            continue;
        };

        match &args.output_dir {
            Some(output_dir) => {
                let output_name = result
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("document");
                let output_path =
                    output_dir.join(format!("{}.{}", output_name, args.format.extension()));

                fs::write(&output_path, output)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => {
                println!("{}", style(result.path.display()).bold());
                println!("{}", output.trim_end());
                println!();
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    eprintln!();
    eprintln!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for result in &failed {
            eprintln!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_file(
    path: &Path,
    coordinator: &docfill_core::ExtractionCoordinator,
    request: &ExtractionRequest,
    ocr: Option<&dyn TextRecognizer>,
    format: OutputFormat,
    with_sources: bool,
    resolve_regex_sources: bool,
) -> anyhow::Result<FileResult> {
    let (session, outcome) = process_document(path, coordinator, request, ocr)?;
    debug!("{}: {}", path.display(), outcome.status_message());

    let sources: Option<SourceMap> = match (&outcome.sources, with_sources) {
        (_, false) => None,
        (Some(sources), true) => Some(sources.clone()),
        (None, true) if resolve_regex_sources => Some(session.resolve_sources(&outcome.fields)),
        (None, true) => None,
    };

    let output = format_fields(&outcome.fields, sources.as_ref(), format)?;

    Ok(FileResult {
        path: path.to_path_buf(),
        method: Some(outcome.method),
        field_count: outcome.fields.len(),
        output: Some(output),
        error: None,
    })
}

fn write_summary(path: &Path, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record(["file", "method", "fields", "error"])?;

    for result in results {
        let filename = result.path.file_name().and_then(|s| s.to_str()).unwrap_or("");
        let method = result.method.map(|m| m.to_string()).unwrap_or_default();

        wtr.write_record([
            filename,
            method.as_str(),
            result.field_count.to_string().as_str(),
            result.error.as_deref().unwrap_or(""),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
