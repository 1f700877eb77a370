//! Core library for document field extraction.
//!
//! This crate provides:
//! - Document ingestion (PDF, DOCX, TXT) with page markers, and OCR of
//!   scanned PDF pages
//! - Regex field extraction across twelve field kinds
//! - Source-line provenance resolution
//! - AI extraction with fallback to the regex extractor

pub mod error;
pub mod models;
pub mod document;
pub mod extract;
pub mod provenance;
pub mod ai;
pub mod coordinator;

pub use error::{AiError, DocfillError, DocumentError, Result};
pub use models::fields::{FieldKind, FieldMap, FieldMetadata, SourceMap, NOT_FOUND};
pub use models::config::DocfillConfig;
pub use document::{
    read_document, read_document_with, DocumentFormat, DocumentMetadata, ExtractedDocument,
    TextRecognizer,
};
#[cfg(feature = "ocr")]
pub use document::OnnxRecognizer;
pub use document::lines::{build_line_index, StructuredLine};
pub use extract::{FieldExtractor, PatternExtractor};
pub use provenance::{HintMap, MatchStrategy, SourceHint, SourceResolver};
pub use ai::{AiExtractor, AiOutput, ModelClient};
pub use coordinator::{
    AiAvailability, ExtractionCoordinator, ExtractionMethod, ExtractionOutcome, ExtractionRequest,
    ExtractionSession, FallbackReason,
};
