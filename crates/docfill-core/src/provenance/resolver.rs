//! Matching cascade from a value to its best source line.

use tracing::{debug, trace};

use crate::document::lines::StructuredLine;
use crate::models::fields::{FieldMap, FieldMetadata, SourceMap};

use super::hints::{HintMap, SourceHint};

/// How a line was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    /// Model hint naming a line by its 1-based position.
    HintIndex,
    /// Model hint quoting the line text.
    HintText,
    /// Value found verbatim (case-insensitive) in the line.
    Exact,
    /// Value digits found in the line digits.
    Digits,
    /// Value digits found in the line's spelled-out digit words.
    SpelledDigits,
    /// First tokens of the value and the line contain one another.
    PartialTokens,
}

/// A matched line and the strategy that found it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    pub line: &'a StructuredLine,
    pub strategy: MatchStrategy,
}

impl Resolution<'_> {
    /// Provenance record for `value` sourced from this line.
    pub fn to_metadata(&self, value: &str) -> FieldMetadata {
        FieldMetadata {
            value: value.to_string(),
            source_page: self.line.page,
            source_line_no: Some(self.line.line),
            source_text: self.line.text.clone(),
        }
    }
}

/// Number of leading value tokens compared by the partial-token strategy.
const PARTIAL_TOKENS: usize = 3;

/// Resolves values against a document's structured lines.
#[derive(Debug, Clone, Copy)]
pub struct SourceResolver<'a> {
    lines: &'a [StructuredLine],
}

impl<'a> SourceResolver<'a> {
    /// Create a resolver over a line index.
    pub fn new(lines: &'a [StructuredLine]) -> Self {
        Self { lines }
    }

    /// Find the best line for `value`. An empty value never matches.
    pub fn find(&self, value: &str) -> Option<Resolution<'a>> {
        let needle = value.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }

        if let Some(line) = self.scan(|line| line.text.to_lowercase().contains(&needle)) {
            return Some(self.hit(line, MatchStrategy::Exact, value));
        }

        let value_digits = digits_of(&needle);
        if !value_digits.is_empty() {
            if let Some(line) = self.scan(|line| digits_of(&line.text).contains(&value_digits)) {
                return Some(self.hit(line, MatchStrategy::Digits, value));
            }
            if let Some(line) =
                self.scan(|line| spelled_digits(&line.text).contains(&value_digits))
            {
                return Some(self.hit(line, MatchStrategy::SpelledDigits, value));
            }
        }

        let key = needle
            .split_whitespace()
            .take(PARTIAL_TOKENS)
            .collect::<Vec<_>>()
            .join(" ");
        if let Some(line) = self.scan(|line| {
            let text = line.text.to_lowercase();
            text.contains(&key) || key.contains(&text)
        }) {
            return Some(self.hit(line, MatchStrategy::PartialTokens, value));
        }

        trace!("no source line for {:?}", value);
        None
    }

    /// Find the line named by a model hint, falling back to the value cascade.
    pub fn find_with_hint(&self, value: &str, hint: Option<&SourceHint>) -> Option<Resolution<'a>> {
        let hinted = match hint {
            Some(SourceHint::Index(index)) => index
                .checked_sub(1)
                .and_then(|i| self.lines.get(i))
                .map(|line| Resolution { line, strategy: MatchStrategy::HintIndex }),
            Some(hint @ SourceHint::Text(_)) => self.find_hint_text(hint),
            None => None,
        };

        hinted.or_else(|| self.find(value))
    }

    /// Provenance record for one value; misses carry the not-found sentinel.
    pub fn resolve(&self, value: &str) -> FieldMetadata {
        self.find(value)
            .map(|r| r.to_metadata(value))
            .unwrap_or_else(|| FieldMetadata::not_found(value))
    }

    /// Provenance records for every field of a map.
    pub fn resolve_all(&self, fields: &FieldMap) -> SourceMap {
        self.resolve_with_hints(fields, &HintMap::new())
    }

    /// Provenance records using model hints where they point at a real line.
    pub fn resolve_with_hints(&self, fields: &FieldMap, hints: &HintMap) -> SourceMap {
        fields
            .iter()
            .map(|(kind, value)| {
                let meta = self
                    .find_with_hint(value, hints.get(kind))
                    .map(|r| r.to_metadata(value))
                    .unwrap_or_else(|| FieldMetadata::not_found(value.as_str()));
                (*kind, meta)
            })
            .collect()
    }

    /// A quoted hint names a line equal to or containing the quote. A short
    /// line that merely appears inside the quote (a page footer) is no match.
    fn find_hint_text(&self, hint: &SourceHint) -> Option<Resolution<'a>> {
        let quoted = hint.quoted_text()?.to_lowercase();

        let line = self
            .scan(|line| line.text.to_lowercase() == quoted)
            .or_else(|| self.scan(|line| line.text.to_lowercase().contains(&quoted)))?;

        Some(Resolution { line, strategy: MatchStrategy::HintText })
    }

    fn scan<F>(&self, predicate: F) -> Option<&'a StructuredLine>
    where
        F: Fn(&StructuredLine) -> bool,
    {
        self.lines.iter().find(|line| predicate(*line))
    }

    fn hit(&self, line: &'a StructuredLine, strategy: MatchStrategy, value: &str) -> Resolution<'a> {
        debug!("{:?} matched {:?} to line {}", strategy, value, line.line);
        Resolution { line, strategy }
    }
}

fn digits_of(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

/// Digits spelled out as words (`"five five five"` → `"555"`).
fn spelled_digits(s: &str) -> String {
    s.split(|c: char| !c.is_ascii_alphabetic())
        .filter_map(|word| match word.to_ascii_lowercase().as_str() {
            "zero" => Some('0'),
            "one" => Some('1'),
            "two" => Some('2'),
            "three" => Some('3'),
            "four" => Some('4'),
            "five" => Some('5'),
            "six" => Some('6'),
            "seven" => Some('7'),
            "eight" => Some('8'),
            "nine" => Some('9'),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::lines::build_line_index;
    use crate::models::fields::{FieldKind, NOT_FOUND};
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<StructuredLine> {
        build_line_index(text)
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let index = lines("Name: Jane SMITH\nEmail: jane@example.com");
        let hit = SourceResolver::new(&index).find("  jane smith ").unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Exact);
        assert_eq!(hit.line.text, "Name: Jane SMITH");
    }

    #[test]
    fn test_phone_resolves_by_digits() {
        let index = lines("Contact details\nPhone: 555.123.4567");
        let meta = SourceResolver::new(&index).resolve("(555) 123-4567");
        assert_eq!(meta.source_text, "Phone: 555.123.4567");
        assert_eq!(meta.source_line_no, Some(2));
    }

    #[test]
    fn test_spelled_digits() {
        let index = lines("Notes\nCall five five five, one two three four");
        let hit = SourceResolver::new(&index).find("555-1234").unwrap();
        assert_eq!(hit.strategy, MatchStrategy::SpelledDigits);
        assert_eq!(hit.line.line, 2);
    }

    #[test]
    fn test_partial_tokens_either_direction() {
        let index = lines("Applicant\nJohn Carter Jr. of Springfield");
        let hit = SourceResolver::new(&index).find("John Carter Jr of Boston").unwrap();
        assert_eq!(hit.strategy, MatchStrategy::PartialTokens);
        assert_eq!(hit.line.line, 2);

        let index = lines("Signed\nacme");
        let hit = SourceResolver::new(&index).find("Acme Holdings Group Ltd").unwrap();
        assert_eq!(hit.line.text, "acme");
    }

    #[test]
    fn test_first_line_wins() {
        let index = lines("--- Page 1 ---\nTotal 40\n--- Page 2 ---\nTotal 40");
        let meta = SourceResolver::new(&index).resolve("40");
        assert_eq!(meta.source_page, Some(1));
        assert_eq!(meta.source_line_no, Some(1));
    }

    #[test]
    fn test_untraceable_value_is_not_found() {
        let index = lines("Name: Jane Smith");
        let meta = SourceResolver::new(&index).resolve("Globex");
        assert_eq!(meta.source_text, NOT_FOUND);
        assert_eq!(meta.source_page, None);
        assert_eq!(meta.source_line_no, None);
    }

    #[test]
    fn test_empty_value_never_matches() {
        let index = lines("Name: Jane Smith");
        assert!(SourceResolver::new(&index).find("   ").is_none());
    }

    #[test]
    fn test_hint_index_and_text() {
        let index = lines("Name: Jane Smith\nPhone: 555 867 5309\nEmail: jane@example.com");
        let resolver = SourceResolver::new(&index);

        let hit = resolver.find_with_hint("x", Some(&SourceHint::Index(3))).unwrap();
        assert_eq!(hit.strategy, MatchStrategy::HintIndex);
        assert_eq!(hit.line.text, "Email: jane@example.com");

        let hint = SourceHint::Text("2: Phone: 555 867 5309".to_string());
        let hit = resolver.find_with_hint("nope", Some(&hint)).unwrap();
        assert_eq!(hit.strategy, MatchStrategy::HintText);
        assert_eq!(hit.line.line, 2);
    }

    #[test]
    fn test_bad_hint_falls_back_to_value() {
        let index = lines("Name: Jane Smith\nEmail: jane@example.com");
        let resolver = SourceResolver::new(&index);

        let hit = resolver
            .find_with_hint("jane@example.com", Some(&SourceHint::Index(9)))
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Exact);
        assert_eq!(hit.line.line, 2);

        let hint = SourceHint::Text("Signature block".to_string());
        let hit = resolver.find_with_hint("Jane Smith", Some(&hint)).unwrap();
        assert_eq!(hit.line.line, 1);
    }

    #[test]
    fn test_footer_line_does_not_capture_hint() {
        let index = lines("Acme Corp\n1\nPhone: 555 123 4567");
        let hint = SourceHint::Text("3: Phone: (555) 123-4567".to_string());

        let hit = SourceResolver::new(&index)
            .find_with_hint("(555) 123-4567", Some(&hint))
            .unwrap();
        assert_eq!(hit.strategy, MatchStrategy::Digits);
        assert_eq!(hit.line.text, "Phone: 555 123 4567");
    }

    #[test]
    fn test_partial_quote_inside_line() {
        let index = lines("Acme Corp\nRef 7\nShip to: 42 Elm Street, Dayton");
        let hint = SourceHint::Text("42 Elm Street".to_string());

        let hit = SourceResolver::new(&index).find_with_hint("x", Some(&hint)).unwrap();
        assert_eq!(hit.strategy, MatchStrategy::HintText);
        assert_eq!(hit.line.line, 3);
    }

    #[test]
    fn test_resolve_with_hints_covers_every_field() {
        let index = lines("Name: Jane Smith\nEmail: jane@example.com");
        let mut fields = FieldMap::new();
        fields.insert(FieldKind::Name, "Jane Smith".to_string());
        fields.insert(FieldKind::Company, "Initech".to_string());

        let mut hints = HintMap::new();
        hints.insert(FieldKind::Name, SourceHint::Index(1));

        let sources = SourceResolver::new(&index).resolve_with_hints(&fields, &hints);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[&FieldKind::Name].source_text, "Name: Jane Smith");
        assert_eq!(sources[&FieldKind::Company].source_text, NOT_FOUND);
    }
}
