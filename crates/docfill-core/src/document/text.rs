//! Plain-text decoding.

use super::{DocumentFormat, DocumentMetadata, ExtractedDocument};

/// Decode a text file as UTF-8, falling back to Latin-1.
///
/// Latin-1 maps every byte to a code point, so decoding never fails.
pub fn decode_text(data: &[u8]) -> ExtractedDocument {
    let (text, encoding) = match std::str::from_utf8(data) {
        Ok(s) => (s.trim_start_matches('\u{feff}').to_string(), "utf-8"),
        Err(_) => (data.iter().map(|&b| b as char).collect(), "latin-1"),
    };

    let mut metadata = DocumentMetadata::new(DocumentFormat::Txt);
    metadata.encoding = Some(encoding.to_string());
    metadata.lines = Some(text.split('\n').count());

    ExtractedDocument { text, metadata }
}
