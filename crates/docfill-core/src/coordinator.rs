//! Extraction method selection and fallback policy.
//!
//! One run walks a small state machine: try the model (with or without
//! source lines), retry once for values only when the model's answer could
//! not be read, and fall back to the regex extractor on anything else.

use std::fmt;

use tracing::{debug, info, warn};

use crate::ai::AiExtractor;
use crate::document::lines::{build_line_index, StructuredLine};
use crate::document::{DocumentMetadata, ExtractedDocument};
use crate::error::AiError;
use crate::extract::{FieldExtractor, PatternExtractor};
use crate::models::config::DocfillConfig;
use crate::models::fields::{FieldKind, FieldMap, SourceMap};
use crate::provenance::SourceResolver;

/// Text of one document plus its line index, built once per run.
#[derive(Debug, Clone)]
pub struct ExtractionSession {
    text: String,
    lines: Vec<StructuredLine>,
    metadata: Option<DocumentMetadata>,
}

impl ExtractionSession {
    /// Create a session over raw text.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let lines = build_line_index(&text);
        Self { text, lines, metadata: None }
    }

    /// Create a session from an ingested document.
    pub fn from_document(document: ExtractedDocument) -> Self {
        let mut session = Self::new(document.text);
        session.metadata = Some(document.metadata);
        session
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> &[StructuredLine] {
        &self.lines
    }

    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }

    /// Resolver over this session's lines.
    pub fn resolver(&self) -> SourceResolver<'_> {
        SourceResolver::new(&self.lines)
    }

    /// Source lines for an already extracted field map.
    pub fn resolve_sources(&self, fields: &FieldMap) -> SourceMap {
        self.resolver().resolve_all(fields)
    }
}

/// What the caller wants from one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    /// Try the model first.
    pub use_ai: bool,
    /// Ask the model for source lines.
    pub track_provenance: bool,
    /// Fields to report.
    pub fields: Vec<FieldKind>,
}

impl Default for ExtractionRequest {
    fn default() -> Self {
        Self {
            use_ai: true,
            track_provenance: true,
            fields: FieldKind::ALL.to_vec(),
        }
    }
}

impl ExtractionRequest {
    pub fn from_config(config: &DocfillConfig) -> Self {
        Self {
            use_ai: config.ai.enabled,
            track_provenance: config.extraction.track_provenance,
            ..Self::default()
        }
    }

    pub fn with_ai(mut self, use_ai: bool) -> Self {
        self.use_ai = use_ai;
        self
    }

    pub fn with_provenance(mut self, track: bool) -> Self {
        self.track_provenance = track;
        self
    }

    /// Restrict the report to `fields`; an empty list means all fields.
    pub fn with_fields(mut self, fields: Vec<FieldKind>) -> Self {
        self.fields = if fields.is_empty() { FieldKind::ALL.to_vec() } else { fields };
        self
    }

    fn wants_all_fields(&self) -> bool {
        FieldKind::ALL.iter().all(|kind| self.fields.contains(kind))
    }
}

/// Which extractor produced the values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Ai,
    Regex,
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtractionMethod::Ai => f.write_str("ai"),
            ExtractionMethod::Regex => f.write_str("regex"),
        }
    }
}

/// Why a run did not take the full AI path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// No API key in the named variable.
    MissingCredential(String),
    /// The model client could not be set up.
    Unavailable(String),
    /// The model found nothing.
    EmptyResult,
    /// The model answer could not be read.
    MalformedOutput(String),
    /// The model call failed.
    Failed(String),
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MissingCredential(var) => write!(f, "API key not found: set {}", var),
            FallbackReason::Unavailable(msg) => write!(f, "AI unavailable: {}", msg),
            FallbackReason::EmptyResult => f.write_str("AI returned no fields"),
            FallbackReason::MalformedOutput(msg) => write!(f, "AI output malformed: {}", msg),
            FallbackReason::Failed(msg) => write!(f, "AI extraction failed: {}", msg),
        }
    }
}

impl From<AiError> for FallbackReason {
    fn from(err: AiError) -> Self {
        match err {
            AiError::MissingCredential(var) => FallbackReason::MissingCredential(var),
            AiError::MalformedOutput(msg) => FallbackReason::MalformedOutput(msg),
            AiError::EmptyResponse => FallbackReason::EmptyResult,
            AiError::Request(msg) => FallbackReason::Failed(msg),
        }
    }
}

/// Result of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOutcome {
    pub method: ExtractionMethod,
    pub fields: FieldMap,
    /// Per-field provenance; set on the AI path when it was requested.
    pub sources: Option<SourceMap>,
    /// Set whenever the run left the plain AI path.
    pub fallback: Option<FallbackReason>,
}

impl ExtractionOutcome {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// One-line summary for the user.
    pub fn status_message(&self) -> String {
        let count = self.fields.len();
        let noun = if count == 1 { "field" } else { "fields" };

        match (self.method, &self.fallback) {
            (ExtractionMethod::Ai, None) => format!("Extracted {} {} with AI", count, noun),
            (ExtractionMethod::Ai, Some(_)) => {
                format!("Extracted {} {} with AI (source lines resolved locally)", count, noun)
            }
            (ExtractionMethod::Regex, None) => {
                format!("Extracted {} {} with regex patterns", count, noun)
            }
            (ExtractionMethod::Regex, Some(reason)) => {
                format!("Extracted {} {} with regex patterns ({})", count, noun, reason)
            }
        }
    }
}

/// Whether the model path can be taken at all.
#[derive(Debug)]
pub enum AiAvailability {
    /// Switched off in configuration.
    Disabled,
    /// Configured but could not be set up.
    Unavailable(AiError),
    Ready(AiExtractor),
}

impl From<Result<AiExtractor, AiError>> for AiAvailability {
    fn from(result: Result<AiExtractor, AiError>) -> Self {
        match result {
            Ok(extractor) => AiAvailability::Ready(extractor),
            Err(err) => AiAvailability::Unavailable(err),
        }
    }
}

enum Stage {
    Ai,
    AiFieldsOnly(FallbackReason),
    Regex(Option<FallbackReason>),
    Done(ExtractionOutcome),
}

/// Chooses between the model and the regex extractor for each run.
#[derive(Debug)]
pub struct ExtractionCoordinator {
    ai: AiAvailability,
    regex: PatternExtractor,
}

impl ExtractionCoordinator {
    pub fn new(ai: AiAvailability) -> Self {
        Self { ai, regex: PatternExtractor::new() }
    }

    /// Coordinator that only ever uses the regex extractor.
    pub fn regex_only() -> Self {
        Self::new(AiAvailability::Disabled)
    }

    pub fn ai(&self) -> &AiAvailability {
        &self.ai
    }

    /// Run one extraction. Never fails: every model problem ends on the
    /// regex path with the reason recorded.
    pub fn extract(&self, session: &ExtractionSession, request: &ExtractionRequest) -> ExtractionOutcome {
        let mut stage = match (&self.ai, request.use_ai) {
            (_, false) | (AiAvailability::Disabled, _) => Stage::Regex(None),
            (AiAvailability::Unavailable(err), true) => Stage::Regex(Some(unavailable_reason(err))),
            (AiAvailability::Ready(_), true) => Stage::Ai,
        };

        loop {
            stage = match stage {
                Stage::Ai => self.run_ai(session, request),
                Stage::AiFieldsOnly(reason) => self.run_ai_fields_only(session, request, reason),
                Stage::Regex(reason) => {
                    if let Some(ref r) = reason {
                        warn!("Falling back to regex extraction: {}", r);
                    }
                    Stage::Done(self.run_regex(session, request, reason))
                }
                Stage::Done(outcome) => {
                    info!("{}", outcome.status_message());
                    return outcome;
                }
            };
        }
    }

    fn extractor(&self) -> Option<&AiExtractor> {
        match &self.ai {
            AiAvailability::Ready(extractor) => Some(extractor),
            _ => None,
        }
    }

    fn run_ai(&self, session: &ExtractionSession, request: &ExtractionRequest) -> Stage {
        let Some(extractor) = self.extractor() else {
            return Stage::Regex(None);
        };

        if !request.track_provenance {
            return match extractor.extract_custom(session.text(), &request.fields) {
                Ok(fields) if fields.is_empty() => Stage::Regex(Some(FallbackReason::EmptyResult)),
                Ok(fields) => Stage::Done(ExtractionOutcome {
                    method: ExtractionMethod::Ai,
                    fields,
                    sources: None,
                    fallback: None,
                }),
                Err(err) => Stage::Regex(Some(err.into())),
            };
        }

        match extractor.extract_with_sources(session.lines()) {
            Ok(mut output) => {
                output.fields.retain(|kind, _| request.fields.contains(kind));
                if output.fields.is_empty() {
                    return Stage::Regex(Some(FallbackReason::EmptyResult));
                }
                let sources = session.resolver().resolve_with_hints(&output.fields, &output.hints);
                Stage::Done(ExtractionOutcome {
                    method: ExtractionMethod::Ai,
                    fields: output.fields,
                    sources: Some(sources),
                    fallback: None,
                })
            }
            Err(AiError::MalformedOutput(msg)) => {
                warn!("Model answer without readable source lines, retrying for values only: {}", msg);
                Stage::AiFieldsOnly(FallbackReason::MalformedOutput(msg))
            }
            Err(err) => Stage::Regex(Some(err.into())),
        }
    }

    fn run_ai_fields_only(
        &self,
        session: &ExtractionSession,
        request: &ExtractionRequest,
        reason: FallbackReason,
    ) -> Stage {
        let Some(extractor) = self.extractor() else {
            return Stage::Regex(Some(reason));
        };

        match extractor.extract_custom(session.text(), &request.fields) {
            Ok(fields) if fields.is_empty() => Stage::Regex(Some(reason)),
            Ok(fields) => {
                let sources = session.resolve_sources(&fields);
                Stage::Done(ExtractionOutcome {
                    method: ExtractionMethod::Ai,
                    fields,
                    sources: Some(sources),
                    fallback: Some(reason),
                })
            }
            Err(err) => Stage::Regex(Some(err.into())),
        }
    }

    fn run_regex(
        &self,
        session: &ExtractionSession,
        request: &ExtractionRequest,
        fallback: Option<FallbackReason>,
    ) -> ExtractionOutcome {
        let fields: FieldMap = if request.wants_all_fields() {
            self.regex.extract_all(session.text())
        } else {
            request
                .fields
                .iter()
                .filter_map(|kind| self.regex.extract(*kind, session.text()).map(|v| (*kind, v)))
                .filter(|(_, v)| !v.is_empty())
                .collect()
        };
        debug!("regex extraction found {} fields", fields.len());

        ExtractionOutcome {
            method: ExtractionMethod::Regex,
            fields,
            sources: None,
            fallback,
        }
    }
}

fn unavailable_reason(err: &AiError) -> FallbackReason {
    match err {
        AiError::MissingCredential(var) => FallbackReason::MissingCredential(var.clone()),
        other => FallbackReason::Unavailable(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::testing::ScriptedClient;
    use crate::models::fields::NOT_FOUND;
    use pretty_assertions::assert_eq;

    const TEXT: &str = "Full Name: John Carter\n\
        Email: john.carter@example.com\n\
        Phone: 555-867-5309\n\
        Address: 123 Main Street, Springfield";

    fn with_answers(answers: Vec<Result<String, AiError>>) -> (ExtractionCoordinator, ScriptedClient) {
        let client = ScriptedClient::new(answers);
        let coordinator =
            ExtractionCoordinator::new(AiAvailability::Ready(AiExtractor::new(client.clone())));
        (coordinator, client)
    }

    fn ok(json: &str) -> Result<String, AiError> {
        Ok(json.to_string())
    }

    #[test]
    fn test_regex_when_ai_not_requested() {
        let (coordinator, client) = with_answers(vec![]);
        let session = ExtractionSession::new(TEXT);

        let outcome = coordinator.extract(&session, &ExtractionRequest::default().with_ai(false));
        assert_eq!(outcome.method, ExtractionMethod::Regex);
        assert_eq!(outcome.fallback, None);
        assert_eq!(outcome.sources, None);
        assert_eq!(outcome.fields.len(), 4);
        assert_eq!(client.calls(), 0);
        assert_eq!(outcome.status_message(), "Extracted 4 fields with regex patterns");
    }

    #[test]
    fn test_missing_credential_goes_straight_to_regex() {
        let coordinator = ExtractionCoordinator::new(AiAvailability::Unavailable(
            AiError::MissingCredential("GOOGLE_API_KEY".to_string()),
        ));
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        assert_eq!(outcome.method, ExtractionMethod::Regex);
        assert_eq!(
            outcome.fallback,
            Some(FallbackReason::MissingCredential("GOOGLE_API_KEY".to_string()))
        );
        assert!(outcome.status_message().contains("API key not found: set GOOGLE_API_KEY"));
    }

    #[test]
    fn test_ai_with_sources() {
        let (coordinator, client) = with_answers(vec![ok(r#"{
            "fields": {"name": "John Carter", "phone": "(555) 867-5309", "company": "Initech"},
            "source_lines": {"name": 1, "phone": "99: nowhere", "company": 2}
        }"#)]);
        let session = ExtractionSession::new(TEXT);

        let outcome = coordinator.extract(&session, &ExtractionRequest::default());
        assert_eq!(outcome.method, ExtractionMethod::Ai);
        assert_eq!(outcome.fallback, None);
        assert_eq!(client.calls(), 1);

        let sources = outcome.sources.unwrap();
        assert_eq!(sources.len(), 3);
        assert_eq!(sources[&FieldKind::Name].source_text, "Full Name: John Carter");
        assert_eq!(sources[&FieldKind::Phone].source_text, "Phone: 555-867-5309");
        // a hint naming a real line is trusted as is
        assert_eq!(sources[&FieldKind::Company].source_line_no, Some(2));
    }

    #[test]
    fn test_untraceable_ai_value_is_not_found() {
        let (coordinator, _) = with_answers(vec![ok(
            r#"{"fields": {"company": "Globex"}, "source_lines": {}}"#,
        )]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        let sources = outcome.sources.unwrap();
        assert_eq!(sources[&FieldKind::Company].source_text, NOT_FOUND);
        assert_eq!(sources[&FieldKind::Company].value, "Globex");
    }

    #[test]
    fn test_empty_ai_result_falls_back() {
        let (coordinator, _) = with_answers(vec![ok(r#"{"fields": {"name": null}}"#)]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        assert_eq!(outcome.method, ExtractionMethod::Regex);
        assert_eq!(outcome.fallback, Some(FallbackReason::EmptyResult));
        assert_eq!(outcome.fields[&FieldKind::Name], "John Carter");
    }

    #[test]
    fn test_malformed_answer_retries_for_values() {
        let (coordinator, client) = with_answers(vec![
            ok("Sure! Here is the data you asked for."),
            ok(r#"{"email": "john.carter@example.com"}"#),
        ]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        assert_eq!(client.calls(), 2);
        assert_eq!(outcome.method, ExtractionMethod::Ai);
        assert!(matches!(outcome.fallback, Some(FallbackReason::MalformedOutput(_))));
        let sources = outcome.sources.unwrap();
        assert_eq!(sources[&FieldKind::Email].source_line_no, Some(2));
    }

    #[test]
    fn test_malformed_then_empty_falls_back() {
        let (coordinator, client) = with_answers(vec![ok(r#"{"name": "John"}"#), ok("{}")]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        assert_eq!(client.calls(), 2);
        assert_eq!(outcome.method, ExtractionMethod::Regex);
        assert!(matches!(outcome.fallback, Some(FallbackReason::MalformedOutput(_))));
    }

    #[test]
    fn test_request_failure_falls_back_without_retry() {
        let (coordinator, client) =
            with_answers(vec![Err(AiError::Request("timeout".to_string()))]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &ExtractionRequest::default());

        assert_eq!(client.calls(), 1);
        assert_eq!(outcome.method, ExtractionMethod::Regex);
        assert_eq!(outcome.fallback, Some(FallbackReason::Failed("timeout".to_string())));
        assert_eq!(outcome.sources, None);
    }

    #[test]
    fn test_ai_without_provenance() {
        let (coordinator, client) = with_answers(vec![ok(r#"{"name": "John Carter"}"#)]);
        let request = ExtractionRequest::default().with_provenance(false);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &request);

        assert_eq!(outcome.method, ExtractionMethod::Ai);
        assert_eq!(outcome.sources, None);
        assert!(!client.prompts.lock().unwrap()[0].contains("source_lines"));
        assert_eq!(outcome.status_message(), "Extracted 1 field with AI");
    }

    #[test]
    fn test_field_subset() {
        let coordinator = ExtractionCoordinator::regex_only();
        let request = ExtractionRequest::default().with_fields(vec![FieldKind::Email, FieldKind::ZipCode]);
        let outcome = coordinator.extract(&ExtractionSession::new(TEXT), &request);

        assert_eq!(outcome.fields.keys().collect::<Vec<_>>(), vec![&FieldKind::Email]);
    }

    #[test]
    fn test_regex_sources_on_demand() {
        let session = ExtractionSession::new(TEXT);
        let outcome = ExtractionCoordinator::regex_only().extract(&session, &ExtractionRequest::default());

        let sources = session.resolve_sources(&outcome.fields);
        assert_eq!(sources.len(), outcome.fields.len());
        assert!(sources.values().all(|meta| meta.is_resolved()));
        assert_eq!(sources[&FieldKind::Address].source_line_no, Some(4));
    }
}
