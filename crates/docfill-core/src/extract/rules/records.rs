//! Record fields: date, amount and identification number.

use lazy_static::lazy_static;

use super::patterns::{
    AMOUNT_CURRENCY_WORD, AMOUNT_DOLLAR_SIGN, AMOUNT_LABELED, DATE_LABELED_MONTH,
    DATE_LABELED_NUMERIC, DATE_UNLABELED, ID_LABELED, ID_LETTER_PREFIXED, ID_SSN,
};
use super::{accept_trimmed, first_accepted, Rule};

lazy_static! {
    pub static ref DATE_RULES: Vec<Rule> = vec![
        Rule::first("date_label_numeric", &DATE_LABELED_NUMERIC, accept_date),
        Rule::first("date_label_month", &DATE_LABELED_MONTH, accept_date),
        Rule::first("date_unlabeled", &DATE_UNLABELED, accept_date),
    ];

    pub static ref AMOUNT_RULES: Vec<Rule> = vec![
        Rule::first("amount_label", &AMOUNT_LABELED, accept_trimmed),
        Rule::first("amount_dollar_sign", &AMOUNT_DOLLAR_SIGN, accept_trimmed),
        Rule::first("amount_currency_word", &AMOUNT_CURRENCY_WORD, accept_trimmed),
    ];

    // Overlapping shapes: the letter-prefixed token must stay ahead of the SSN shape.
    pub static ref ID_NUMBER_RULES: Vec<Rule> = vec![
        Rule::first("id_label", &ID_LABELED, accept_trimmed),
        Rule::first("id_letter_prefixed", &ID_LETTER_PREFIXED, accept_trimmed),
        Rule::first("id_ssn", &ID_SSN, accept_trimmed),
    ];
}

/// Extract a date, preferring labeled dates.
pub fn extract_date(text: &str) -> Option<String> {
    first_accepted(text, &DATE_RULES)
}

/// Extract a monetary amount exactly as written (`1,250.00`).
pub fn extract_amount(text: &str) -> Option<String> {
    first_accepted(text, &AMOUNT_RULES)
}

/// Extract an identification number (ID, SSN, passport, license).
pub fn extract_id_number(text: &str) -> Option<String> {
    first_accepted(text, &ID_NUMBER_RULES)
}

fn accept_date(candidate: &str) -> Option<String> {
    let date = candidate.trim().split(['\n', '\r']).next().unwrap_or("").trim();
    Some(date.to_string())
}
