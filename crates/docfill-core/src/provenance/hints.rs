//! Source hints returned by the model next to its field values.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::models::fields::FieldKind;

lazy_static! {
    static ref LINE_NUMBER_PREFIX: Regex = Regex::new(r"^\d+:\s*").unwrap();
}

/// Where the model says a value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceHint {
    /// 1-based position in the flattened line list.
    Index(usize),
    /// Quoted line text, possibly with the `"<n>: "` prefix of the prompt.
    Text(String),
}

/// Hints keyed by field.
pub type HintMap = BTreeMap<FieldKind, SourceHint>;

impl SourceHint {
    /// Read a hint from a JSON value. `null`, empty strings and anything
    /// that is neither a number nor a string yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(|i| SourceHint::Index(i as usize)),
            Value::String(s) => Self::parse(s),
            _ => None,
        }
    }

    /// Read a hint from text; a bare integer is an index.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(index) = s.parse() {
                return Some(SourceHint::Index(index));
            }
        }
        Some(SourceHint::Text(s.to_string()))
    }

    /// Quoted text with any line-number prefix removed.
    pub fn quoted_text(&self) -> Option<&str> {
        match self {
            SourceHint::Text(text) => {
                let stripped = match LINE_NUMBER_PREFIX.find(text) {
                    Some(m) => &text[m.end()..],
                    None => text.as_str(),
                };
                let stripped = stripped.trim();
                (!stripped.is_empty()).then_some(stripped)
            }
            SourceHint::Index(_) => None,
        }
    }
}
