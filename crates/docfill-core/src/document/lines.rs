//! Structured line index: the non-blank lines of a document with their
//! page and per-page line number.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    static ref PAGE_MARKER: Regex = Regex::new(r"^---\s*Page\s+(\d+)\s*---$").unwrap();
}

/// One non-blank line of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredLine {
    /// Page number (1-indexed), when the text carries page markers.
    pub page: Option<u32>,
    /// Line number within the page (1-indexed).
    pub line: u32,
    /// Trimmed, non-empty line text.
    pub text: String,
}

/// Split text into structured lines.
///
/// Blank lines are skipped. A `--- Page N ---` marker line (N ≥ 1) sets the
/// page for the following lines and restarts the line counter; the marker
/// itself is not emitted. `--- Page 0 ---` is ordinary text.
pub fn build_line_index(text: &str) -> Vec<StructuredLine> {
    let mut lines = Vec::new();
    let mut page = None;
    let mut counter = 0u32;

    for raw in text.split('\n') {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        if let Some(caps) = PAGE_MARKER.captures(trimmed) {
            if let Some(number) = caps[1].parse::<u32>().ok().filter(|n| *n >= 1) {
                page = Some(number);
                counter = 0;
                continue;
            }
        }

        counter += 1;
        lines.push(StructuredLine {
            page,
            line: counter,
            text: trimmed.to_string(),
        });
    }

    lines
}
