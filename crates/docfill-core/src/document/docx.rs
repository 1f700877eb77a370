//! DOCX text extraction: body paragraphs, then table rows.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::{DocumentFormat, DocumentMetadata, ExtractedDocument, Result};
use crate::error::DocumentError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read the text of a DOCX package held in memory.
pub fn read_docx(data: &[u8]) -> Result<ExtractedDocument> {
    let mut archive =
        ZipArchive::new(Cursor::new(data)).map_err(|e| DocumentError::Docx(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| DocumentError::Docx(format!("{}: {}", DOCUMENT_PART, e)))?
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    let body = parse_document_xml(&xml)?;

    let mut parts = body.paragraphs.clone();
    parts.extend(body.rows.iter().cloned());

    let mut metadata = DocumentMetadata::new(DocumentFormat::Docx);
    metadata.paragraphs = Some(body.paragraphs.len());
    metadata.tables = Some(body.tables);

    Ok(ExtractedDocument {
        text: parts.join("\n"),
        metadata,
    })
}

#[derive(Debug, Default)]
struct DocumentBody {
    paragraphs: Vec<String>,
    rows: Vec<String>,
    tables: usize,
}

fn parse_document_xml(xml: &str) -> Result<DocumentBody> {
    let mut reader = Reader::from_str(xml);
    let mut body = DocumentBody::default();

    let mut table_depth = 0usize;
    let mut in_text = false;
    let mut paragraph = String::new();
    let mut cell: Vec<String> = Vec::new();
    let mut row: Vec<String> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .map_err(|e| DocumentError::Docx(format!("invalid XML: {}", e)))?;

        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => {
                    if table_depth == 0 {
                        body.tables += 1;
                    }
                    table_depth += 1;
                }
                b"w:tr" => row.clear(),
                b"w:tc" => cell.clear(),
                b"w:p" => paragraph.clear(),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => paragraph.push('\t'),
                b"w:br" | b"w:cr" => paragraph.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t
                    .unescape()
                    .map_err(|e| DocumentError::Docx(format!("invalid text: {}", e)))?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => {
                    if table_depth > 0 {
                        cell.push(std::mem::take(&mut paragraph));
                    } else if !paragraph.trim().is_empty() {
                        body.paragraphs.push(std::mem::take(&mut paragraph));
                    }
                }
                b"w:tc" => {
                    let text = cell.join("\n");
                    let text = text.trim();
                    if !text.is_empty() {
                        row.push(text.to_string());
                    }
                }
                b"w:tr" => {
                    if !row.is_empty() {
                        body.rows.push(row.join(" | "));
                    }
                }
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const BODY: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>Full Name: Jane Smith</w:t></w:r></w:p><w:p></w:p><w:p><w:r><w:t xml:space="preserve">Email: </w:t></w:r><w:r><w:t>jane@example.com</w:t></w:r></w:p><w:tbl><w:tr><w:tc><w:p><w:r><w:t>Phone</w:t></w:r></w:p></w:tc><w:tc><w:p><w:r><w:t>555-867-5309</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:p></w:p></w:tc><w:tc><w:p><w:r><w:t>R&amp;D</w:t></w:r></w:p></w:tc></w:tr></w:tbl></w:body></w:document>"#;

    fn build_docx(xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);
            writer
                .start_file(DOCUMENT_PART, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buffer.into_inner()
    }

    #[test]
    fn test_paragraphs_then_table_rows() {
        let doc = read_docx(&build_docx(BODY)).unwrap();

        assert_eq!(
            doc.text,
            "Full Name: Jane Smith\nEmail: jane@example.com\nPhone | 555-867-5309\nR&D"
        );
        assert_eq!(doc.metadata.paragraphs, Some(2));
        assert_eq!(doc.metadata.tables, Some(1));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(read_docx(b"plain text"), Err(DocumentError::Docx(_))));
    }
}
