//! Field kinds, extracted values and per-field provenance records.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentinel stored in [`FieldMetadata::source_text`] when no line matched.
pub const NOT_FOUND: &str = "Not found";

/// The twelve kinds of field the extractors know about.
///
/// Declaration order is the display order of forms and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Name,
    Email,
    Phone,
    Address,
    DateOfBirth,
    Company,
    JobTitle,
    Date,
    Amount,
    IdNumber,
    Website,
    ZipCode,
}

impl FieldKind {
    /// All field kinds in display order.
    pub const ALL: [FieldKind; 12] = [
        FieldKind::Name,
        FieldKind::Email,
        FieldKind::Phone,
        FieldKind::Address,
        FieldKind::DateOfBirth,
        FieldKind::Company,
        FieldKind::JobTitle,
        FieldKind::Date,
        FieldKind::Amount,
        FieldKind::IdNumber,
        FieldKind::Website,
        FieldKind::ZipCode,
    ];

    /// Machine key, as used in JSON and by the model prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Name => "name",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Address => "address",
            FieldKind::DateOfBirth => "date_of_birth",
            FieldKind::Company => "company",
            FieldKind::JobTitle => "job_title",
            FieldKind::Date => "date",
            FieldKind::Amount => "amount",
            FieldKind::IdNumber => "id_number",
            FieldKind::Website => "website",
            FieldKind::ZipCode => "zip_code",
        }
    }

    /// Human-readable form label.
    pub fn label(&self) -> &'static str {
        match self {
            FieldKind::Name => "Name",
            FieldKind::Email => "Email",
            FieldKind::Phone => "Phone",
            FieldKind::Address => "Address",
            FieldKind::DateOfBirth => "Date of Birth",
            FieldKind::Company => "Company",
            FieldKind::JobTitle => "Job Title",
            FieldKind::Date => "Date",
            FieldKind::Amount => "Amount",
            FieldKind::IdNumber => "ID Number",
            FieldKind::Website => "Website",
            FieldKind::ZipCode => "ZIP Code",
        }
    }

    /// Short description handed to the language model.
    pub fn description(&self) -> &'static str {
        match self {
            FieldKind::Name => "Full name of the person",
            FieldKind::Email => "Email address",
            FieldKind::Phone => "Phone number",
            FieldKind::Address => "Full address",
            FieldKind::DateOfBirth => "Date of birth",
            FieldKind::Company => "Company name",
            FieldKind::JobTitle => "Job title or position",
            FieldKind::Date => "Any relevant date",
            FieldKind::Amount => "Monetary amount",
            FieldKind::IdNumber => "ID number, SSN, passport number, etc.",
            FieldKind::Website => "Website URL",
            FieldKind::ZipCode => "ZIP or postal code",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase();
        FieldKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == key)
            .ok_or_else(|| format!("unknown field: {}", s))
    }
}

/// Extracted values keyed by field. Absent fields are simply not present.
pub type FieldMap = BTreeMap<FieldKind, String>;

/// Provenance records keyed by field.
pub type SourceMap = BTreeMap<FieldKind, FieldMetadata>;

/// A field value together with the document line it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// The extracted value.
    pub value: String,

    /// Page of the source line, if the document has page markers.
    pub source_page: Option<u32>,

    /// Per-page 1-based line number of the source line.
    pub source_line_no: Option<u32>,

    /// The source line verbatim, or [`NOT_FOUND`].
    pub source_text: String,
}

impl FieldMetadata {
    /// Metadata for a value whose source line could not be established.
    pub fn not_found(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source_page: None,
            source_line_no: None,
            source_text: NOT_FOUND.to_string(),
        }
    }

    /// Whether a source line was found.
    pub fn is_resolved(&self) -> bool {
        self.source_line_no.is_some()
    }
}
