//! Rule-based field extractors.
//!
//! Each field owns an ordered list of [`Rule`]s. [`first_accepted`] walks the
//! list in order and returns the first candidate a rule's validator accepts,
//! so the order of a list is its priority.

pub mod patterns;
pub mod person;
pub mod contact;
pub mod location;
pub mod employment;
pub mod records;

pub use person::{extract_date_of_birth, extract_name};
pub use contact::{extract_email, extract_phone, extract_website};
pub use location::{extract_address, extract_zip_code};
pub use employment::{extract_company, extract_job_title};
pub use records::{extract_amount, extract_date, extract_id_number};

use regex::Regex;
use tracing::trace;

/// Which hits of a rule's pattern are offered to its validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchScope {
    /// Only the first hit; a rejected hit moves on to the next rule.
    First,
    /// Every hit in document order before moving on.
    Every,
}

/// One entry of a field's priority list.
pub struct Rule {
    /// Short identifier, used in logs and tests.
    pub name: &'static str,
    /// Pattern whose group 1 is the candidate value.
    pub pattern: &'static Regex,
    /// Which hits are considered.
    pub scope: MatchScope,
    /// Validates and normalizes a candidate; `None` rejects it.
    pub accept: fn(&str) -> Option<String>,
}

impl Rule {
    pub fn first(
        name: &'static str,
        pattern: &'static Regex,
        accept: fn(&str) -> Option<String>,
    ) -> Self {
        Self { name, pattern, scope: MatchScope::First, accept }
    }

    pub fn every(
        name: &'static str,
        pattern: &'static Regex,
        accept: fn(&str) -> Option<String>,
    ) -> Self {
        Self { name, pattern, scope: MatchScope::Every, accept }
    }

    /// Apply this rule alone to `text`.
    pub fn apply(&self, text: &str) -> Option<String> {
        let mut candidates = self
            .pattern
            .captures_iter(text)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str()));

        match self.scope {
            MatchScope::First => candidates.take(1).find_map(self.accept),
            MatchScope::Every => candidates.find_map(self.accept),
        }
    }
}

/// Return the first value accepted by any rule, trying rules in order.
pub fn first_accepted(text: &str, rules: &[Rule]) -> Option<String> {
    rules.iter().find_map(|rule| {
        let value = rule.apply(text);
        if let Some(ref v) = value {
            trace!("rule {} accepted {:?}", rule.name, v);
        }
        value
    })
}

/// Accept any candidate, trimmed.
pub(crate) fn accept_trimmed(candidate: &str) -> Option<String> {
    Some(candidate.trim().to_string())
}

/// First `max` characters of `s`.
pub(crate) fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazy_static::lazy_static;

    lazy_static! {
        static ref WORD: Regex = Regex::new(r"(\w+)").unwrap();
        static ref NUMBER: Regex = Regex::new(r"(\d+)").unwrap();
    }

    fn accept_long(candidate: &str) -> Option<String> {
        (candidate.len() > 3).then(|| candidate.to_string())
    }

    #[test]
    fn test_first_scope_only_offers_first_hit() {
        let rule = Rule::first("word", &WORD, accept_long);
        assert_eq!(rule.apply("ab abcdef"), None);
    }

    #[test]
    fn test_every_scope_offers_all_hits() {
        let rule = Rule::every("word", &WORD, accept_long);
        assert_eq!(rule.apply("ab abcdef"), Some("abcdef".to_string()));
    }

    #[test]
    fn test_rules_tried_in_order() {
        let rules = [
            Rule::first("word", &WORD, accept_long),
            Rule::first("number", &NUMBER, accept_trimmed),
        ];
        assert_eq!(first_accepted("ab 42", &rules), Some("42".to_string()));
        assert_eq!(first_accepted("abcd 42", &rules), Some("abcd".to_string()));
        assert_eq!(first_accepted("ab", &rules), None);
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("żółw", 2), "żó");
    }
}
