//! Document ingestion: turns PDF, DOCX and TXT files into plain text.

mod docx;
pub mod lines;
pub mod ocr;
mod pdf;
mod text;

pub use docx::read_docx;
#[cfg(feature = "ocr")]
pub use ocr::OnnxRecognizer;
pub use ocr::TextRecognizer;
pub use pdf::{PdfReader, page_marker};
pub use text::decode_text;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::DocumentError;

/// Result type for document operations.
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    Txt,
}

impl DocumentFormat {
    /// Detect the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "pdf" => Ok(DocumentFormat::Pdf),
            "docx" => Ok(DocumentFormat::Docx),
            "txt" => Ok(DocumentFormat::Txt),
            other => Err(DocumentError::UnsupportedFormat(format!(".{}", other))),
        }
    }
}

/// Facts about the source document gathered during ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Input format.
    pub format: DocumentFormat,

    /// Total pages (PDF).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u32>,

    /// Pages that yielded text (PDF).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_with_text: Option<u32>,

    /// Pages carrying at least one decodable image (PDF read with OCR).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_with_images: Option<u32>,

    /// Whether embedded images were sent through OCR (PDF).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_used: Option<bool>,

    /// Text encoding that decoded the file (TXT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Raw line count (TXT).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lines: Option<usize>,

    /// Non-empty body paragraphs (DOCX).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paragraphs: Option<usize>,

    /// Tables (DOCX).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<usize>,
}

impl DocumentMetadata {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            total_pages: None,
            pages_with_text: None,
            pages_with_images: None,
            ocr_used: None,
            encoding: None,
            lines: None,
            paragraphs: None,
            tables: None,
        }
    }
}

/// Text and metadata read from a document.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Full text; PDF pages are introduced by `--- Page N ---` lines.
    pub text: String,
    /// Ingestion metadata.
    pub metadata: DocumentMetadata,
}

/// Read a document from disk, dispatching on its extension.
pub fn read_document(path: &Path) -> Result<ExtractedDocument> {
    read_document_with(path, None)
}

/// Read a document from disk, running PDF page images through `ocr` when
/// given. DOCX and TXT files are unaffected by OCR.
pub fn read_document_with(
    path: &Path,
    ocr: Option<&dyn TextRecognizer>,
) -> Result<ExtractedDocument> {
    let format = DocumentFormat::from_path(path)?;
    let data = std::fs::read(path)?;

    info!("Reading {:?} document: {}", format, path.display());
    read_document_bytes_with(&data, format, ocr)
}

/// Read a document already loaded into memory.
pub fn read_document_bytes(data: &[u8], format: DocumentFormat) -> Result<ExtractedDocument> {
    read_document_bytes_with(data, format, None)
}

/// Read a document already loaded into memory, with optional PDF OCR.
pub fn read_document_bytes_with(
    data: &[u8],
    format: DocumentFormat,
    ocr: Option<&dyn TextRecognizer>,
) -> Result<ExtractedDocument> {
    let document = match format {
        DocumentFormat::Pdf => {
            let mut reader = PdfReader::new();
            reader.load(data)?;
            reader.read_with(ocr)?
        }
        DocumentFormat::Docx => read_docx(data)?,
        DocumentFormat::Txt => decode_text(data),
    };

    if document.text.trim().is_empty() {
        return Err(DocumentError::NoText);
    }

    debug!(
        "Extracted {} characters of text ({:?})",
        document.text.len(),
        document.metadata.format
    );
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ocr::testing::ScriptedRecognizer;

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a/b.PDF")).unwrap(), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_path(Path::new("cv.docx")).unwrap(), DocumentFormat::Docx);
        assert_eq!(DocumentFormat::from_path(Path::new("notes.txt")).unwrap(), DocumentFormat::Txt);
        assert!(matches!(
            DocumentFormat::from_path(Path::new("scan.png")),
            Err(DocumentError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_read_text_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("applicant.txt");
        std::fs::write(&path, "Full Name: Jane Smith\nEmail: jane@example.com\n").unwrap();

        let document = read_document(&path).unwrap();
        assert!(document.text.starts_with("Full Name: Jane Smith"));
        assert_eq!(document.metadata.encoding.as_deref(), Some("utf-8"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_document(&dir.path().join("missing.txt"));
        match result {
            Err(DocumentError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("expected I/O error, got {:?}", other.map(|d| d.text)),
        }
    }

    #[test]
    fn test_scanned_pdf_from_disk_with_ocr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, pdf::testing::image_pdf(None)).unwrap();

        let recognizer = ScriptedRecognizer::new("Full Name: Jane Smith\nPhone: 555-867-5309");
        let document = read_document_with(&path, Some(&recognizer)).unwrap();

        let lines = lines::build_line_index(&document.text);
        assert_eq!(lines.len(), 2);
        assert_eq!((lines[1].page, lines[1].line), (Some(1), 2));
        assert_eq!(lines[1].text, "Phone: 555-867-5309");
    }

    #[test]
    fn test_ocr_ignored_for_text_files() {
        let recognizer = ScriptedRecognizer::new("never used");
        let document =
            read_document_bytes_with(b"Name: Jane", DocumentFormat::Txt, Some(&recognizer)).unwrap();
        assert_eq!(document.text, "Name: Jane");
        assert_eq!(recognizer.calls.get(), 0);
    }

    #[test]
    fn test_blank_document_has_no_text() {
        let result = read_document_bytes(b"  \n\n ", DocumentFormat::Txt);
        assert!(matches!(result, Err(DocumentError::NoText)));
    }
}
