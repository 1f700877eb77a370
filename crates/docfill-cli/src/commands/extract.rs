//! Extract command - pull form fields out of a single document.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use docfill_core::{ExtractionMethod, FieldKind, SourceMap};

use super::config::load_config;
use super::{build_coordinator, build_recognizer, build_request, process_document};
use crate::export::{describe_source, format_fields, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input document (PDF, DOCX or TXT)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Use regex patterns only, never the language model
    #[arg(long)]
    no_ai: bool,

    /// Include the source line of every field
    #[arg(long)]
    sources: bool,

    /// Only these fields (comma-separated, e.g. "name,email")
    #[arg(long, value_delimiter = ',')]
    fields: Vec<FieldKind>,

    /// Run OCR on images in PDF pages (scanned documents)
    #[arg(long)]
    ocr: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Extracting fields...");

    let request = build_request(&config, args.no_ai, args.fields.clone());
    let input = args.input.clone();
    let worker_config = config.clone();

    let (ocr, model_dir) = (args.ocr, args.model_dir.clone());

    let (session, outcome) = tokio::task::spawn_blocking(move || {
        let recognizer = build_recognizer(&worker_config, ocr, model_dir)?;
        let coordinator = build_coordinator(&worker_config, request.use_ai);
        process_document(&input, &coordinator, &request, recognizer.as_deref())
    })
    .await??;

    pb.finish_and_clear();

    let status = match outcome.method {
        ExtractionMethod::Ai if outcome.fallback.is_none() => style("✓").green(),
        _ => style("ℹ").blue(),
    };
    eprintln!("{} {}", status, outcome.status_message());

    let sources: Option<SourceMap> = if args.sources {
        match outcome.sources.clone() {
            Some(sources) => Some(sources),
            None if config.extraction.resolve_regex_sources => {
                Some(session.resolve_sources(&outcome.fields))
            }
            None => None,
        }
    } else {
        None
    };

    let output = format_fields(&outcome.fields, sources.as_ref(), args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
        if !output.ends_with('\n') {
            println!();
        }
    }

    if let Some(sources) = &sources {
        eprintln!();
        eprintln!("{}", style("Sources:").bold());
        for (kind, meta) in sources {
            eprintln!(
                "  {:<14} {:<18} {}",
                kind.label(),
                describe_source(meta),
                style(&meta.source_text).dim()
            );
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}
