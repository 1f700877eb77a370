//! Subcommands and the document pipeline they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use docfill_core::models::config::DocfillConfig;
use docfill_core::{
    read_document_with, AiExtractor, ExtractionCoordinator, ExtractionOutcome, ExtractionRequest,
    ExtractionSession, FieldKind, TextRecognizer,
};
use tracing::debug;

use crate::gemini::GeminiClient;

/// Build a coordinator for this run.
///
/// Holds a blocking HTTP client, so it must be created, used and dropped
/// off the async runtime.
pub fn build_coordinator(config: &DocfillConfig, use_ai: bool) -> ExtractionCoordinator {
    if !use_ai {
        return ExtractionCoordinator::regex_only();
    }

    let ai = GeminiClient::from_config(&config.ai)
        .map(|client| AiExtractor::new(client).with_max_input_chars(config.ai.max_input_chars));
    ExtractionCoordinator::new(ai.into())
}

/// Request derived from config and command-line switches.
pub fn build_request(config: &DocfillConfig, no_ai: bool, fields: Vec<FieldKind>) -> ExtractionRequest {
    ExtractionRequest::from_config(config)
        .with_ai(config.ai.enabled && !no_ai)
        .with_fields(fields)
}

/// Default location of the OCR models.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("docfill")
        .join("models")
}

/// Load the OCR recognizer when `--ocr` is given or the config enables it.
///
/// Loads models, so call it off the async runtime.
pub fn build_recognizer(
    config: &DocfillConfig,
    ocr_flag: bool,
    model_dir: Option<PathBuf>,
) -> anyhow::Result<Option<Box<dyn TextRecognizer>>> {
    if !(ocr_flag || config.ocr.enabled) {
        return Ok(None);
    }

    let model_dir = model_dir
        .or_else(|| config.ocr.model_dir.clone())
        .unwrap_or_else(default_model_dir);
    load_recognizer(&model_dir, config.ocr.keep_unknown).map(Some)
}

#[cfg(feature = "ocr")]
fn load_recognizer(model_dir: &Path, keep_unknown: bool) -> anyhow::Result<Box<dyn TextRecognizer>> {
    debug!("Loading OCR models from {}", model_dir.display());
    let recognizer = docfill_core::OnnxRecognizer::from_dir(model_dir, keep_unknown)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))?;
    Ok(Box::new(recognizer))
}

#[cfg(not(feature = "ocr"))]
fn load_recognizer(_model_dir: &Path, _keep_unknown: bool) -> anyhow::Result<Box<dyn TextRecognizer>> {
    anyhow::bail!("OCR support is not compiled in; rebuild docfill with `--features ocr`")
}

/// Read one document and run the extraction on it.
pub fn process_document(
    path: &Path,
    coordinator: &ExtractionCoordinator,
    request: &ExtractionRequest,
    ocr: Option<&dyn TextRecognizer>,
) -> anyhow::Result<(ExtractionSession, ExtractionOutcome)> {
    let document = read_document_with(path, ocr)?;
    debug!("{} metadata: {:?}", path.display(), document.metadata);

    let session = ExtractionSession::from_document(document);
    let outcome = coordinator.extract(&session, request);
    Ok((session, outcome))
}
