//! Offline, rule-based field extraction.

pub mod rules;

use tracing::debug;

use crate::models::fields::{FieldKind, FieldMap};

/// Trait for whole-document field extractors.
pub trait FieldExtractor {
    /// Extract a single field from text.
    fn extract(&self, kind: FieldKind, text: &str) -> Option<String>;

    /// Extract every field that has a value.
    fn extract_all(&self, text: &str) -> FieldMap {
        let mut fields = FieldMap::new();
        for kind in FieldKind::ALL {
            if let Some(value) = self.extract(kind, text) {
                if !value.is_empty() {
                    fields.insert(kind, value);
                }
            }
        }
        fields
    }
}

/// Regex-based extractor covering all twelve field kinds.
///
/// Each field is extracted independently from the whole text; no field's
/// result influences another's.
#[derive(Debug, Default, Clone, Copy)]
pub struct PatternExtractor;

impl PatternExtractor {
    /// Create a new pattern extractor.
    pub fn new() -> Self {
        Self
    }
}

impl FieldExtractor for PatternExtractor {
    fn extract(&self, kind: FieldKind, text: &str) -> Option<String> {
        let value = match kind {
            FieldKind::Name => rules::extract_name(text),
            FieldKind::Email => rules::extract_email(text),
            FieldKind::Phone => rules::extract_phone(text),
            FieldKind::Address => rules::extract_address(text),
            FieldKind::DateOfBirth => rules::extract_date_of_birth(text),
            FieldKind::Company => rules::extract_company(text),
            FieldKind::JobTitle => rules::extract_job_title(text),
            FieldKind::Date => rules::extract_date(text),
            FieldKind::Amount => rules::extract_amount(text),
            FieldKind::IdNumber => rules::extract_id_number(text),
            FieldKind::Website => rules::extract_website(text),
            FieldKind::ZipCode => rules::extract_zip_code(text),
        };

        if let Some(ref v) = value {
            debug!("{}: {:?}", kind, v);
        }
        value
    }
}
