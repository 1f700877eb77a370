//! Language-model field extraction.
//!
//! The model itself sits behind [`ModelClient`]; this module owns prompt
//! construction, input truncation and answer parsing.

pub mod prompt;
pub mod response;

use tracing::debug;

use crate::document::lines::StructuredLine;
use crate::error::AiError;
use crate::models::fields::{FieldKind, FieldMap};
use crate::provenance::HintMap;

/// Default input limit, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 8000;

/// A text-in, text-out language model.
pub trait ModelClient: Send {
    /// Model name, for logs.
    fn name(&self) -> &str {
        "model"
    }

    /// Send a prompt and return the raw answer.
    fn invoke(&self, prompt: &str) -> Result<String, AiError>;
}

impl<T: ModelClient + ?Sized> ModelClient for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn invoke(&self, prompt: &str) -> Result<String, AiError> {
        (**self).invoke(prompt)
    }
}

/// Values and source hints from one model call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiOutput {
    pub fields: FieldMap,
    pub hints: HintMap,
}

/// Field extraction through a [`ModelClient`].
pub struct AiExtractor {
    client: Box<dyn ModelClient>,
    max_input_chars: usize,
}

impl AiExtractor {
    /// Create an extractor over a model client.
    pub fn new(client: impl ModelClient + 'static) -> Self {
        Self {
            client: Box::new(client),
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    /// Set the input limit in characters.
    pub fn with_max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = max;
        self
    }

    /// Extract all twelve fields, values only.
    pub fn extract_fields(&self, text: &str) -> Result<FieldMap, AiError> {
        self.extract_custom(text, &FieldKind::ALL)
    }

    /// Extract only the given fields, values only.
    pub fn extract_custom(&self, text: &str, kinds: &[FieldKind]) -> Result<FieldMap, AiError> {
        let input = prompt::truncate_input(text, self.max_input_chars);
        let answer = self.call(&prompt::fields_prompt(&input, kinds))?;

        let mut fields = response::parse_fields(&answer)?;
        fields.retain(|kind, _| kinds.contains(kind));
        Ok(fields)
    }

    /// Extract all fields together with the line each one came from.
    pub fn extract_with_sources(&self, lines: &[StructuredLine]) -> Result<AiOutput, AiError> {
        let listing = prompt::number_lines(lines);
        let input = prompt::truncate_input(&listing, self.max_input_chars);
        let answer = self.call(&prompt::sources_prompt(&input, &FieldKind::ALL))?;

        let (fields, hints) = response::parse_fields_with_sources(&answer)?;
        Ok(AiOutput { fields, hints })
    }

    fn call(&self, prompt: &str) -> Result<String, AiError> {
        debug!("invoking {} with {} chars", self.client.name(), prompt.chars().count());
        let answer = self.client.invoke(prompt)?;
        if answer.trim().is_empty() {
            return Err(AiError::EmptyResponse);
        }
        Ok(answer)
    }
}

impl std::fmt::Debug for AiExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiExtractor")
            .field("client", &self.client.name())
            .field("max_input_chars", &self.max_input_chars)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedClient;
    use super::*;
    use crate::document::lines::build_line_index;
    use crate::provenance::SourceHint;

    #[test]
    fn test_extract_fields() {
        let client = ScriptedClient::new(vec![Ok(
            "```json\n{\"name\": \"Jane Smith\", \"email\": null}\n```".to_string(),
        )]);
        let extractor = AiExtractor::new(client.clone());

        let fields = extractor.extract_fields("Name: Jane Smith").unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[&FieldKind::Name], "Jane Smith");
        assert_eq!(client.calls(), 1);
    }

    #[test]
    fn test_input_is_truncated() {
        let client = ScriptedClient::new(vec![Ok("{}".to_string())]);
        let extractor = AiExtractor::new(client.clone()).with_max_input_chars(5);

        extractor.extract_fields("abcdefghij").unwrap();
        let prompt = client.prompts.lock().unwrap()[0].clone();
        assert!(prompt.ends_with("abcde\n\n[Text truncated...]"));
    }

    #[test]
    fn test_custom_fields_drop_extras() {
        let client = ScriptedClient::new(vec![Ok(
            r#"{"name": "Jane Smith", "phone": "555-867-5309"}"#.to_string(),
        )]);
        let extractor = AiExtractor::new(client);

        let fields = extractor.extract_custom("...", &[FieldKind::Phone]).unwrap();
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec![&FieldKind::Phone]);
    }

    #[test]
    fn test_extract_with_sources_numbers_lines() {
        let client = ScriptedClient::new(vec![Ok(
            r#"{"fields": {"email": "jane@example.com"}, "source_lines": {"email": 2}}"#
                .to_string(),
        )]);
        let extractor = AiExtractor::new(client.clone());
        let lines = build_line_index("Name: Jane Smith\n\nEmail: jane@example.com");

        let output = extractor.extract_with_sources(&lines).unwrap();
        assert_eq!(output.hints[&FieldKind::Email], SourceHint::Index(2));
        assert!(client.prompts.lock().unwrap()[0].contains("2: Email: jane@example.com"));
    }

    #[test]
    fn test_blank_answer_is_empty_response() {
        let extractor = AiExtractor::new(ScriptedClient::new(vec![Ok("  \n".to_string())]));
        assert!(matches!(
            extractor.extract_fields("x"),
            Err(AiError::EmptyResponse)
        ));
    }
}
