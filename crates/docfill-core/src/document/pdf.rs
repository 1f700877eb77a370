//! PDF text extraction using lopdf and pdf-extract, with optional OCR of
//! embedded page images.

use image::{DynamicImage, ImageBuffer, Rgba};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::{debug, trace, warn};

use super::ocr::TextRecognizer;
use super::{DocumentFormat, DocumentMetadata, ExtractedDocument, Result};
use crate::error::DocumentError;

/// Marker line introducing each page in extracted PDF text.
pub fn page_marker(page: u32) -> String {
    format!("--- Page {} ---", page)
}

/// PDF text reader.
pub struct PdfReader {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfReader {
    /// Create a new PDF reader.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Load a PDF from bytes.
    pub fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| DocumentError::Pdf(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DocumentError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| DocumentError::Pdf(format!("failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        debug!("Loaded PDF with {} pages", doc.get_pages().len());
        self.document = Some(doc);
        Ok(())
    }

    /// Number of pages in the loaded document.
    pub fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    /// Text of a single page (1-indexed).
    pub fn page_text(&self, page: u32) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| DocumentError::Pdf("no document loaded".to_string()))?;
        doc.extract_text(&[page])
            .map_err(|e| DocumentError::Pdf(format!("page {}: {}", page, e)))
    }

    /// Extract the text of every page, each introduced by a page marker.
    pub fn read(&self) -> Result<ExtractedDocument> {
        self.read_with(None)
    }

    /// Extract page text, adding OCR text of each page's images when a
    /// recognizer is given.
    ///
    /// OCR text follows the page's own text under the same page marker, so
    /// a scanned page still gets its `--- Page N ---` line. A failed
    /// recognition is logged and skipped.
    pub fn read_with(&self, ocr: Option<&dyn TextRecognizer>) -> Result<ExtractedDocument> {
        let page_count = self.page_count();
        if page_count == 0 {
            return Err(DocumentError::Pdf("PDF has no pages".to_string()));
        }

        let mut parts = Vec::new();
        let mut pages_with_text = 0;
        let mut pages_with_images = 0;

        for page in 1..=page_count {
            let mut blocks = Vec::new();
            match self.page_text(page) {
                Ok(text) if !text.trim().is_empty() => {
                    trace!("Page {} has {} characters", page, text.len());
                    pages_with_text += 1;
                    blocks.push(text);
                }
                Ok(_) => trace!("Page {} has no text", page),
                Err(e) => warn!("Failed to extract text from page {}: {}", page, e),
            }

            if let Some(recognizer) = ocr {
                let images = self.page_images(page)?;
                if !images.is_empty() {
                    pages_with_images += 1;
                }
                for (index, image) in images.iter().enumerate() {
                    match recognizer.recognize(image) {
                        Ok(text) if !text.trim().is_empty() => blocks.push(text),
                        Ok(_) => trace!("No OCR text in page {} image {}", page, index + 1),
                        Err(e) => warn!("OCR failed on page {} image {}: {}", page, index + 1, e),
                    }
                }
            }

            if !blocks.is_empty() {
                parts.push(format!("{}\n{}", page_marker(page), blocks.join("\n")));
            }
        }

        let text = if parts.is_empty() {
            debug!("lopdf found no page text, falling back to pdf-extract");
            pdf_extract::extract_text_from_mem(&self.raw_data)
                .map_err(|e| DocumentError::Pdf(e.to_string()))?
        } else {
            parts.join("\n\n")
        };

        let mut metadata = DocumentMetadata::new(DocumentFormat::Pdf);
        metadata.total_pages = Some(page_count);
        metadata.pages_with_text = Some(pages_with_text);
        metadata.ocr_used = Some(ocr.is_some());
        if ocr.is_some() {
            metadata.pages_with_images = Some(pages_with_images);
        }

        Ok(ExtractedDocument { text, metadata })
    }

    /// Decodable images placed on a page (1-indexed).
    ///
    /// JPEG streams and 8-bit RGB or grayscale raw samples are decoded;
    /// other encodings (JPEG 2000, CCITT fax, JBIG2) are skipped.
    pub fn page_images(&self, page: u32) -> Result<Vec<DynamicImage>> {
        let doc = self
            .document
            .as_ref()
            .ok_or_else(|| DocumentError::Pdf("no document loaded".to_string()))?;
        let page_id = *doc
            .get_pages()
            .get(&page)
            .ok_or_else(|| DocumentError::Pdf(format!("no page {}", page)))?;

        let mut images = Vec::new();
        let Some(resources) = page_resources(doc, page_id) else {
            return Ok(images);
        };
        let Ok(xobjects) = resources.get(b"XObject") else {
            return Ok(images);
        };
        if let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) {
            for (name, reference) in xobjects.iter() {
                if let Ok((_, object)) = doc.dereference(reference) {
                    match decode_image(doc, object) {
                        Some(image) => images.push(image),
                        None => trace!("Skipping XObject {}", String::from_utf8_lossy(name)),
                    }
                }
            }
        }

        debug!("Found {} images on page {}", images.len(), page);
        Ok(images)
    }
}

/// Resources of a page, inherited from the page tree when not set directly.
fn page_resources(doc: &Document, node_id: ObjectId) -> Option<Dictionary> {
    let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
        return None;
    };

    if let Ok(resources) = node.get(b"Resources") {
        if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
            return Some(resources.clone());
        }
    }

    match node.get(b"Parent") {
        Ok(Object::Reference(parent_id)) => page_resources(doc, *parent_id),
        _ => None,
    }
}

fn decode_image(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;
    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!("Image XObject {}x{}", width, height);

    let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.first().and_then(|f| f.as_name().ok()),
        _ => None,
    });
    match filter {
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => return None,
        _ => {}
    }

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);
    if bits != 8 {
        trace!("Unsupported bits per component: {}", bits);
        return None;
    }

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|o| match o {
            Object::Name(name) => Some(name.as_slice()),
            Object::Array(items) => items.first().and_then(|o| o.as_name().ok()),
            Object::Reference(id) => doc.get_object(*id).ok().and_then(|o| o.as_name().ok()),
            _ => None,
        })
        .unwrap_or(b"DeviceRGB");

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    raw_to_image(&data, width, height, color_space)
}

fn raw_to_image(data: &[u8], width: u32, height: u32, color_space: &[u8]) -> Option<DynamicImage> {
    let pixels = (width as usize).checked_mul(height as usize)?;
    let channels = match color_space {
        b"DeviceRGB" | b"RGB" => 3,
        b"DeviceGray" | b"G" => 1,
        _ => return None,
    };
    let samples = data.get(..pixels.checked_mul(channels)?)?;

    let mut rgba = Vec::with_capacity(pixels * 4);
    for pixel in samples.chunks_exact(channels) {
        match pixel {
            [r, g, b] => rgba.extend_from_slice(&[*r, *g, *b, 255]),
            [gray] => rgba.extend_from_slice(&[*gray, *gray, *gray, 255]),
            _ => return None,
        }
    }

    ImageBuffer::<Rgba<u8>, _>::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
}

impl Default for PdfReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// One-page PDF showing a 2x2 grayscale image, with an optional line of
    /// text above it. Resources live on the page tree root.
    pub fn image_pdf(caption: Option<&str>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0, 255, 255, 0],
        ));
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        });

        let mut operations = Vec::new();
        if let Some(caption) = caption {
            operations.extend([
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![50.into(), 750.into()]),
                Operation::new("Tj", vec![Object::string_literal(caption)]),
                Operation::new("ET", vec![]),
            ]);
        }
        operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![200.into(), 0.into(), 0.into(), 200.into(), 50.into(), 500.into()],
            ),
            Operation::new("Do", vec!["Im1".into()]),
            Operation::new("Q", vec![]),
        ]);
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut data = Vec::new();
        doc.save_to(&mut data).unwrap();
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ocr::testing::ScriptedRecognizer;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pdf_reader_new() {
        let reader = PdfReader::new();
        assert!(reader.document.is_none());
        assert_eq!(reader.page_count(), 0);
    }

    #[test]
    fn test_rejects_garbage() {
        let mut reader = PdfReader::new();
        assert!(matches!(reader.load(b"not a pdf"), Err(DocumentError::Pdf(_))));
    }

    #[test]
    fn test_page_marker() {
        assert_eq!(page_marker(3), "--- Page 3 ---");
    }

    #[test]
    fn test_raw_gray_and_rgb_samples() {
        let gray = raw_to_image(&[0, 255, 255, 0], 2, 2, b"DeviceGray").unwrap();
        assert_eq!((gray.width(), gray.height()), (2, 2));
        assert_eq!(gray.to_rgba8().get_pixel(1, 0).0, [255, 255, 255, 255]);

        let rgb = raw_to_image(&[10, 20, 30], 1, 1, b"DeviceRGB").unwrap();
        assert_eq!(rgb.to_rgba8().get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_short_or_unknown_samples_rejected() {
        assert!(raw_to_image(&[0, 255, 255], 2, 2, b"DeviceGray").is_none());
        assert!(raw_to_image(&[0; 16], 2, 2, b"DeviceCMYK").is_none());
    }

    #[test]
    fn test_scanned_page_is_read_through_ocr() {
        let mut reader = PdfReader::new();
        reader.load(&testing::image_pdf(None)).unwrap();

        assert_eq!(reader.page_images(1).unwrap().len(), 1);

        let recognizer = ScriptedRecognizer::new("Full Name: Jane Smith");
        let document = reader.read_with(Some(&recognizer)).unwrap();

        assert_eq!(recognizer.calls.get(), 1);
        assert_eq!(document.text, "--- Page 1 ---\nFull Name: Jane Smith");
        assert_eq!(document.metadata.pages_with_text, Some(0));
        assert_eq!(document.metadata.pages_with_images, Some(1));
        assert_eq!(document.metadata.ocr_used, Some(true));
    }

    #[test]
    fn test_ocr_text_follows_page_text() {
        let mut reader = PdfReader::new();
        reader.load(&testing::image_pdf(Some("Applicant Form"))).unwrap();

        let recognizer = ScriptedRecognizer::new("Email: jane@example.com");
        let document = reader.read_with(Some(&recognizer)).unwrap();

        assert!(document.text.starts_with("--- Page 1 ---\n"));
        let form = document.text.find("Applicant Form").unwrap();
        let email = document.text.find("Email: jane@example.com").unwrap();
        assert!(form < email);
        assert_eq!(document.metadata.pages_with_text, Some(1));
    }

    #[test]
    fn test_without_ocr_images_are_ignored() {
        let mut reader = PdfReader::new();
        reader.load(&testing::image_pdf(Some("Applicant Form"))).unwrap();

        let document = reader.read().unwrap();
        assert!(document.text.contains("Applicant Form"));
        assert_eq!(document.metadata.ocr_used, Some(false));
        assert_eq!(document.metadata.pages_with_images, None);
    }
}
