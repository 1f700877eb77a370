//! Error types for the docfill-core library.

use thiserror::Error;

/// Main error type for the docfill library.
#[derive(Error, Debug)]
pub enum DocfillError {
    /// Document ingestion error.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// AI extraction error.
    #[error("AI error: {0}")]
    Ai(#[from] AiError),
}

/// Errors related to reading documents.
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The file could not be read from disk.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file extension is not one of pdf, docx, txt.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Failed to parse or read the PDF.
    #[error("failed to read PDF: {0}")]
    Pdf(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// Failed to read the DOCX package.
    #[error("failed to read DOCX: {0}")]
    Docx(String),

    /// Failed to decode a text file.
    #[error("failed to decode text: {0}")]
    Decode(String),

    /// OCR models failed to load or recognition failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// The document contained no extractable text.
    #[error("no text could be extracted")]
    NoText,
}

/// Errors raised by the AI extraction path.
///
/// None of these reach callers of the coordinator; each one selects a
/// fallback branch instead.
#[derive(Error, Debug)]
pub enum AiError {
    /// No API key configured.
    #[error("API key not found: set {0}")]
    MissingCredential(String),

    /// The model call itself failed (network, HTTP status, timeout).
    #[error("model request failed: {0}")]
    Request(String),

    /// The model answered with something that is not the expected JSON.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    /// The model answered with an empty body.
    #[error("model returned an empty response")]
    EmptyResponse,
}

/// Result type for the docfill library.
pub type Result<T> = std::result::Result<T, DocfillError>;
