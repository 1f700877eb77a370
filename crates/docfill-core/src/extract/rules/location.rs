//! Location fields: address and ZIP code.

use lazy_static::lazy_static;

use super::patterns::{ADDRESS_LABELED, ADDRESS_LABEL_PREFIX, ADDRESS_STREET, ZIP_LABELED, ZIP_US};
use super::{accept_trimmed, first_accepted, truncate_chars, Rule};

const MAX_ADDRESS_CHARS: usize = 200;

lazy_static! {
    pub static ref ADDRESS_RULES: Vec<Rule> = vec![
        Rule::first("address_label", &ADDRESS_LABELED, accept_address),
        Rule::first("street_suffix", &ADDRESS_STREET, accept_address),
    ];

    // The bare ZIP shape is tried before the labeled one.
    pub static ref ZIP_CODE_RULES: Vec<Rule> = vec![
        Rule::first("zip_us", &ZIP_US, accept_trimmed),
        Rule::first("zip_label", &ZIP_LABELED, accept_trimmed),
    ];
}

/// Extract a postal address on a single line.
pub fn extract_address(text: &str) -> Option<String> {
    first_accepted(text, &ADDRESS_RULES)
}

/// Extract a ZIP or postal code.
pub fn extract_zip_code(text: &str) -> Option<String> {
    first_accepted(text, &ZIP_CODE_RULES)
}

fn accept_address(candidate: &str) -> Option<String> {
    let collapsed = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
    let address = ADDRESS_LABEL_PREFIX.replace(&collapsed, "");

    if address.chars().count() > 10 {
        Some(truncate_chars(&address, MAX_ADDRESS_CHARS))
    } else {
        None
    }
}
