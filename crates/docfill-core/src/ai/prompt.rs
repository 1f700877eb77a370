//! Prompt construction for the language model.

use std::borrow::Cow;

use crate::document::lines::StructuredLine;
use crate::models::fields::FieldKind;

/// Appended to text cut at the input limit.
pub const TRUNCATION_SUFFIX: &str = "\n\n[Text truncated...]";

const SYSTEM_PROMPT: &str = "You are an expert at extracting structured information from documents.
Only extract information that is clearly present in the text. If a field is not found, set it to null.
Return ONLY a JSON object, no commentary.";

/// Cut `text` to at most `max_chars` characters, marking the cut.
pub fn truncate_input(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_SUFFIX)),
        None => Cow::Borrowed(text),
    }
}

fn field_list(kinds: &[FieldKind]) -> String {
    kinds
        .iter()
        .map(|kind| format!("- \"{}\": {}", kind.as_str(), kind.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prompt for values only: the answer is a flat field → value object.
pub fn fields_prompt(text: &str, kinds: &[FieldKind]) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nThe JSON object has these keys:\n{}\n\nExtract information from the following text:\n\n{text}",
        field_list(kinds)
    )
}

/// Prompt for values and source lines over a numbered line listing.
pub fn sources_prompt(listing: &str, kinds: &[FieldKind]) -> String {
    format!(
        "{SYSTEM_PROMPT}\n\nThe JSON object has exactly two keys:\n\
         - \"fields\": an object with these keys:\n{}\n\
         - \"source_lines\": an object mapping each non-null field to the number of the line it was taken from\n\n\
         The document lines are numbered as \"<number>: <text>\".\n\n\
         Extract information from the following lines:\n\n{listing}",
        field_list(kinds)
    )
}

/// Number lines as `"<n>: <text>"` using their flattened 1-based position.
pub fn number_lines(lines: &[StructuredLine]) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{}: {}", i + 1, line.text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::lines::build_line_index;

    #[test]
    fn test_truncate_input() {
        assert_eq!(truncate_input("short", 10), "short");
        assert_eq!(truncate_input("exactly", 7), "exactly");
        assert_eq!(truncate_input("ąęółżźć", 3), "ąęó\n\n[Text truncated...]");
    }

    #[test]
    fn test_number_lines_flattens_pages() {
        let lines = build_line_index("--- Page 1 ---\nName: A\n--- Page 2 ---\nEmail: a@b.co");
        assert_eq!(number_lines(&lines), "1: Name: A\n2: Email: a@b.co");
    }

    #[test]
    fn test_prompts_list_requested_fields() {
        let prompt = fields_prompt("Name: A", &[FieldKind::Name, FieldKind::ZipCode]);
        assert!(prompt.contains("\"zip_code\": ZIP or postal code"));
        assert!(!prompt.contains("\"email\""));
        assert!(prompt.ends_with("Name: A"));

        let prompt = sources_prompt("1: Name: A", &FieldKind::ALL);
        assert!(prompt.contains("\"source_lines\""));
        assert!(prompt.contains("\"id_number\""));
    }
}
