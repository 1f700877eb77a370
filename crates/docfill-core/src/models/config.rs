//! Configuration structures for the extraction pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main configuration for docfill.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocfillConfig {
    /// Language-model extraction settings.
    pub ai: AiConfig,

    /// Extraction and provenance settings.
    pub extraction: ExtractionConfig,

    /// OCR of scanned PDF pages.
    pub ocr: OcrConfig,
}

/// Language-model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Try the model before the regex extractor.
    pub enabled: bool,

    /// Model name.
    pub model: String,

    /// REST base URL of the model API.
    pub endpoint: String,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Text sent to the model is truncated to this many characters.
    pub max_input_chars: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Sampling temperature.
    pub temperature: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key_env: "GOOGLE_API_KEY".to_string(),
            max_input_chars: 8000,
            timeout_secs: 60,
            temperature: 0.0,
        }
    }
}

/// Extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Ask the model for source lines alongside values.
    pub track_provenance: bool,

    /// Resolve source lines for regex results when they are displayed.
    pub resolve_regex_sources: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            track_provenance: true,
            resolve_regex_sources: true,
        }
    }
}

/// OCR configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Run OCR on PDF page images without being asked on the command line.
    pub enabled: bool,

    /// Directory holding `det.onnx`, `latin_rec.onnx` and `latin_dict.txt`.
    /// Unset means the per-user data directory.
    pub model_dir: Option<PathBuf>,

    /// Keep `[UNK]` placeholders instead of replacing them with spaces.
    pub keep_unknown: bool,
}

impl DocfillConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
