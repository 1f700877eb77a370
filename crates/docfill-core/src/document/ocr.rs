//! OCR for scanned PDF pages.
//!
//! Recognition sits behind [`TextRecognizer`] so the PDF reader does not
//! depend on a particular engine. The `ocr` feature provides
//! [`OnnxRecognizer`], backed by `pure-onnx-ocr` and PaddleOCR models.

use image::DynamicImage;

use super::Result;

/// Placeholder the recognizer emits for characters outside its dictionary.
const UNKNOWN_GLYPH: &str = "[UNK]";

/// Regions whose top edges fall in the same band of this many pixels are
/// read as one row, left to right.
const ROW_HEIGHT: f32 = 20.0;

/// Turns an image into text.
pub trait TextRecognizer {
    /// Recognize the text of one image, in reading order.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

/// One recognized text region.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRegion {
    /// Left edge in pixels.
    pub x: f32,
    /// Top edge in pixels.
    pub y: f32,
    /// Recognized text.
    pub text: String,
}

/// Join regions top-to-bottom, then left-to-right within a row, one region
/// per line.
pub fn reading_order(mut regions: Vec<TextRegion>, keep_unknown: bool) -> String {
    regions.sort_by(|a, b| {
        let row_a = (a.y / ROW_HEIGHT) as i32;
        let row_b = (b.y / ROW_HEIGHT) as i32;
        row_a
            .cmp(&row_b)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    regions
        .iter()
        .map(|region| {
            if keep_unknown {
                region.text.clone()
            } else {
                region.text.replace(UNKNOWN_GLYPH, " ")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(feature = "ocr")]
pub use onnx::OnnxRecognizer;

#[cfg(feature = "ocr")]
mod onnx {
    use std::path::Path;
    use std::time::Instant;

    use image::{DynamicImage, GenericImageView};
    use tracing::{debug, info};

    use super::{reading_order, TextRecognizer, TextRegion};
    use crate::document::Result;
    use crate::error::DocumentError;

    /// Detection model file inside a model directory.
    pub const DETECTION_MODEL: &str = "det.onnx";
    /// Recognition model file inside a model directory.
    pub const RECOGNITION_MODEL: &str = "latin_rec.onnx";
    /// Character dictionary file inside a model directory.
    pub const DICTIONARY: &str = "latin_dict.txt";

    const MODEL_FILES: [&str; 3] = [DETECTION_MODEL, RECOGNITION_MODEL, DICTIONARY];

    /// Recognizer backed by `pure-onnx-ocr` (pure Rust, no ONNX Runtime).
    pub struct OnnxRecognizer {
        engine: pure_onnx_ocr::engine::OcrEngine,
        keep_unknown: bool,
    }

    impl OnnxRecognizer {
        /// Load the models from a directory holding `det.onnx`,
        /// `latin_rec.onnx` and `latin_dict.txt`.
        pub fn from_dir(model_dir: &Path, keep_unknown: bool) -> Result<Self> {
            for file in MODEL_FILES {
                if !model_dir.join(file).exists() {
                    return Err(DocumentError::Ocr(format!(
                        "missing {} in {}",
                        file,
                        model_dir.display()
                    )));
                }
            }

            let det_path = model_dir.join(DETECTION_MODEL);
            let rec_path = model_dir.join(RECOGNITION_MODEL);
            let dict_path = model_dir.join(DICTIONARY);

            let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
                .det_model_path(&det_path)
                .rec_model_path(&rec_path)
                .dictionary_path(&dict_path)
                .build()
                .map_err(|e| DocumentError::Ocr(format!("failed to load models: {}", e)))?;

            info!("Loaded OCR models from {}", model_dir.display());
            Ok(Self { engine, keep_unknown })
        }
    }

    impl TextRecognizer for OnnxRecognizer {
        fn recognize(&self, image: &DynamicImage) -> Result<String> {
            let start = Instant::now();
            let (width, height) = image.dimensions();

            let results = self
                .engine
                .run_from_image(image)
                .map_err(|e| DocumentError::Ocr(e.to_string()))?;

            let regions: Vec<TextRegion> = results
                .iter()
                .map(|r| {
                    let (x, y) = top_left(&r.bounding_box);
                    TextRegion { x, y, text: r.text.clone() }
                })
                .collect();

            debug!(
                "OCR found {} regions in {}x{} image in {}ms",
                regions.len(),
                width,
                height,
                start.elapsed().as_millis()
            );
            Ok(reading_order(regions, self.keep_unknown))
        }
    }

    fn top_left(polygon: &pure_onnx_ocr::Polygon<f64>) -> (f32, f32) {
        polygon
            .exterior()
            .coords()
            .take(4)
            .fold((f32::INFINITY, f32::INFINITY), |(x, y), c| {
                (x.min(c.x as f32), y.min(c.y as f32))
            })
    }
}
