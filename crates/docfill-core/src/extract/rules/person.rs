//! Person fields: name and date of birth.

use std::ops::RangeInclusive;

use lazy_static::lazy_static;
use tracing::debug;

use super::patterns::{
    DOB_DAY_FIRST, DOB_MONTH_FIRST, DOB_NUMERIC, FOUR_DIGIT_YEAR, NAME_FULL_LABELED,
    NAME_GREETING, NAME_LABELED, NAME_LINE_START,
};
use super::{first_accepted, Rule};

/// Years accepted for a date of birth. Anything else is taken to be some
/// other date on the document.
pub const BIRTH_YEARS: RangeInclusive<u32> = 1900..=2010;

/// Lines containing any of these are labels, not names.
const LABEL_KEYWORDS: [&str; 6] = ["name:", "email:", "phone:", "address:", "bill to:", "invoice"];

/// How many leading lines the positional name heuristic looks at.
const NAME_SCAN_LINES: usize = 10;

lazy_static! {
    pub static ref NAME_RULES: Vec<Rule> = vec![
        Rule::every("full_name_label", &NAME_FULL_LABELED, accept_name),
        Rule::every("name_label", &NAME_LABELED, accept_name),
        Rule::every("line_start", &NAME_LINE_START, accept_name),
        Rule::every("greeting", &NAME_GREETING, accept_name),
    ];

    pub static ref DATE_OF_BIRTH_RULES: Vec<Rule> = vec![
        Rule::first("dob_numeric", &DOB_NUMERIC, accept_birth_date),
        Rule::first("dob_month_first", &DOB_MONTH_FIRST, accept_birth_date),
        Rule::first("dob_day_first", &DOB_DAY_FIRST, accept_birth_date),
    ];
}

/// Extract a person's name.
///
/// Labeled forms win over positional ones. When no rule matches, the first
/// lines of the document are scanned for two leading capitalized words.
pub fn extract_name(text: &str) -> Option<String> {
    first_accepted(text, &NAME_RULES).or_else(|| {
        let name = name_from_leading_lines(text);
        if name.is_some() {
            debug!("name taken from leading lines");
        }
        name
    })
}

/// Extract a date of birth. Only labeled dates with a plausible birth year
/// are accepted.
pub fn extract_date_of_birth(text: &str) -> Option<String> {
    first_accepted(text, &DATE_OF_BIRTH_RULES)
}

fn is_name_word(word: &str) -> bool {
    word.chars().next().is_some_and(char::is_uppercase) && word.chars().all(char::is_alphabetic)
}

fn accept_name(candidate: &str) -> Option<String> {
    let name = candidate.split([',', '\n', '\r']).next().unwrap_or("").trim();
    let words: Vec<&str> = name.split_whitespace().collect();

    if words.len() < 2 || !words[..2].iter().all(|w| is_name_word(w)) {
        return None;
    }

    let count = if words.len() >= 3 && is_name_word(words[2]) { 3 } else { 2 };
    Some(words[..count].join(" "))
}

fn name_from_leading_lines(text: &str) -> Option<String> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('='))
        .take(NAME_SCAN_LINES)
        .filter(|line| line.chars().count() >= 5)
        .find_map(|line| {
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.len() < 2 || !words[..2].iter().all(|w| is_name_word(w)) {
                return None;
            }

            let lower = line.to_lowercase();
            if LABEL_KEYWORDS.iter().any(|label| lower.contains(label)) {
                return None;
            }

            Some(words[..2].join(" "))
        })
}

fn accept_birth_date(candidate: &str) -> Option<String> {
    let dob = candidate.trim();

    let year: u32 = match FOUR_DIGIT_YEAR.captures(dob) {
        Some(caps) => caps[1].parse().ok()?,
        None => {
            let parts: Vec<&str> = dob.split('/').collect();
            if parts.len() != 3
                || parts[2].is_empty()
                || !parts[2].chars().all(|c| c.is_ascii_digit())
            {
                return None;
            }
            parts[2].parse().ok()?
        }
    };

    if BIRTH_YEARS.contains(&year) {
        Some(dob.to_string())
    } else {
        debug!("rejected date of birth {:?}: year {} out of range", dob, year);
        None
    }
}
