//! Recovering structured values from free-form backend text.
//!
//! [`reconcile`] runs in two stages. Decoding finds the JSON object inside the
//! text and parses it ([`CaseError::MalformedOutput`] on failure). Validation
//! checks the decoded value against the contract's JSON Schema and converts
//! it into a typed result ([`CaseError::SchemaViolation`] on failure). Both
//! failures carry the raw text. Nothing here panics on backend input.

use crate::document::{SectionId, ensure_unique_ids};
use crate::error::CaseError;
use crate::json_schema_for;
use crate::options::{OptionTable, OptionsPhase};
use crate::request::OutputContract;
use crate::templates::{CasePart, REFUSAL_SENTENCE};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Generated content for one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SectionContent {
    pub content: String,
}

/// One entry of a generated case part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratedSection {
    pub id: SectionId,
    pub name: String,
    pub body: String,
}

/// The reconciled reply to a full-case request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseDraft {
    Sections {
        part: CasePart,
        sections: Vec<GeneratedSection>,
    },
    /// The backend judged the input insufficient and explained why.
    Insufficient { message: String },
}

impl CaseDraft {
    /// Wire form: `{"<part>": [...]}` or `{"error": "..."}`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Sections { part, sections } => json!({ part.key(): sections }),
            Self::Insufficient { message } => json!({ "error": message }),
        }
    }
}

/// Whether the backend can reference a named document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentKnowledge {
    pub accessible: bool,
    pub url: Option<String>,
    pub name: String,
}

/// The backend's half of a knowledge probe. `{}` means "not known".
#[derive(Debug, Deserialize, JsonSchema)]
struct KnowledgeReply {
    #[serde(default)]
    accessible: bool,
    #[serde(default)]
    url: Option<String>,
}

/// A revised excerpt, exactly as the backend returned it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisedExcerpt(pub String);

impl RevisedExcerpt {
    /// Whether the backend declined the revision.
    pub fn is_refusal(&self) -> bool {
        self.0.trim() == REFUSAL_SENTENCE
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A successfully reconciled value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Text(String),
    Section(SectionContent),
    Case(CaseDraft),
    Knowledge(DocumentKnowledge),
}

impl Reconciled {
    pub fn to_value(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Section(section) => json!({ "content": section.content }),
            Self::Case(draft) => draft.to_value(),
            Self::Knowledge(knowledge) => json!({
                "accessible": knowledge.accessible,
                "url": knowledge.url,
                "name": knowledge.name,
            }),
        }
    }
}

/// Reconcile raw backend text against a contract.
pub fn reconcile(raw: &str, contract: &OutputContract) -> Result<Reconciled, CaseError> {
    match contract {
        OutputContract::RawText { trim_quotes } => Ok(Reconciled::Text(reconcile_text(raw, *trim_quotes))),
        OutputContract::SectionContent => reconcile_section(raw).map(Reconciled::Section),
        OutputContract::OptionsSection(phase) => {
            reconcile_options_section(raw, *phase).map(Reconciled::Section)
        }
        OutputContract::CaseSections(part) => reconcile_case(raw, *part).map(Reconciled::Case),
        OutputContract::DocumentKnowledge { name } => {
            reconcile_knowledge(raw, name).map(Reconciled::Knowledge)
        }
    }
}

/// Raw text, optionally with one pair of wrapping quotes removed.
pub fn reconcile_text(raw: &str, trim_quotes: bool) -> String {
    if trim_quotes {
        trim_wrapping_quotes(raw).to_string()
    } else {
        raw.to_string()
    }
}

/// `{"content": html}` and nothing else.
pub fn reconcile_section(raw: &str) -> Result<SectionContent, CaseError> {
    let value = decode(raw)?;
    validate(&value, &json_schema_for::<SectionContent>(), raw)?;
    typed(value, raw)
}

/// A section reply whose option table, when there is one, obeys the
/// rating rules. Content without a readable table passes through.
pub fn reconcile_options_section(raw: &str, phase: OptionsPhase) -> Result<SectionContent, CaseError> {
    let section = reconcile_section(raw)?;
    let Some(table) = OptionTable::from_html(phase, &section.content) else {
        debug!("No option table found in the {} options section", phase.noun());
        return Ok(section);
    };
    if let Err(violations) = table.check() {
        let message = violations
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        warn!("Generated {} option table breaks the rating rules: {message}", phase.noun());
        return Err(CaseError::SchemaViolation {
            message: format!("{} option table: {message}", phase.noun()),
            value: json!({ "content": section.content }),
            raw: raw.to_string(),
        });
    }
    Ok(section)
}

/// `{"<part>": [{id, name, body}, ...]}` or `{"error": text}`.
pub fn reconcile_case(raw: &str, part: CasePart) -> Result<CaseDraft, CaseError> {
    let value = decode(raw)?;
    validate(&value, &case_schema(part), raw)?;
    case_draft(part, value, raw)
}

/// `{"accessible", "url"}` with the caller's title attached as `name`.
pub fn reconcile_knowledge(raw: &str, name: &str) -> Result<DocumentKnowledge, CaseError> {
    let value = decode(raw)?;
    validate(&value, &json_schema_for::<KnowledgeReply>(), raw)?;
    let reply: KnowledgeReply = typed(value, raw)?;
    Ok(DocumentKnowledge {
        accessible: reply.accessible,
        url: reply.url,
        name: name.to_string(),
    })
}

/// The slice of `raw` from the first `{`, with a trailing code fence removed.
pub fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let (_, tail) = raw.split_at(start);
    let tail = tail.trim_end();
    Some(tail.strip_suffix("```").unwrap_or(tail).trim_end())
}

/// Decode the JSON object embedded in `raw`.
pub fn decode(raw: &str) -> Result<Value, CaseError> {
    // An empty slice still produces a proper serde error below.
    let candidate = extract_json(raw).unwrap_or_default();
    serde_json::from_str::<Value>(candidate).map_err(|source| {
        warn!("Backend output is not valid JSON: {source}");
        CaseError::MalformedOutput {
            source,
            raw: raw.to_string(),
        }
    })
}

fn validate(value: &Value, schema: &Value, raw: &str) -> Result<(), CaseError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| CaseError::SchemaViolation {
        message: format!("output schema is invalid: {e}"),
        value: value.clone(),
        raw: raw.to_string(),
    })?;

    let errors: Vec<String> = validator
        .iter_errors(value)
        .map(|e| format!("{}: {e}", e.instance_path()))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        let message = errors.join("; ");
        warn!("Backend output violates the output contract: {message}");
        Err(CaseError::SchemaViolation {
            message,
            value: value.clone(),
            raw: raw.to_string(),
        })
    }
}

fn typed<T: for<'de> Deserialize<'de>>(value: Value, raw: &str) -> Result<T, CaseError> {
    serde_json::from_value::<T>(value.clone()).map_err(|e| CaseError::SchemaViolation {
        message: e.to_string(),
        value,
        raw: raw.to_string(),
    })
}

fn case_schema(part: CasePart) -> Value {
    // Nested schemas resolve `$ref`s against the root, so hoist definitions.
    let mut entry = json_schema_for::<GeneratedSection>();
    let definitions = entry
        .as_object_mut()
        .and_then(|o| {
            o.remove("$schema");
            o.remove("definitions")
        })
        .unwrap_or_else(|| json!({}));
    let mut sections = serde_json::Map::new();
    sections.insert(
        part.key().to_string(),
        json!({ "type": "array", "minItems": 1, "items": entry }),
    );
    json!({
        "definitions": definitions,
        "oneOf": [
            {
                "type": "object",
                "properties": { "error": { "type": "string" } },
                "required": ["error"],
                "additionalProperties": false
            },
            {
                "type": "object",
                "properties": sections,
                "required": [part.key()],
                "additionalProperties": false
            }
        ]
    })
}

fn case_draft(part: CasePart, value: Value, raw: &str) -> Result<CaseDraft, CaseError> {
    if let Some(Value::String(message)) = value.get("error") {
        debug!("Backend reported insufficient input for {}", part.key());
        return Ok(CaseDraft::Insufficient {
            message: message.clone(),
        });
    }
    let entries = value.get(part.key()).cloned().unwrap_or(Value::Null);
    let sections: Vec<GeneratedSection> = typed(entries, raw)?;
    ensure_unique_ids(sections.iter().map(|s| &s.id)).map_err(|e| CaseError::SchemaViolation {
        message: e.to_string(),
        value: value.clone(),
        raw: raw.to_string(),
    })?;
    Ok(CaseDraft::Sections { part, sections })
}

fn trim_wrapping_quotes(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn section(raw: &str) -> Result<Reconciled, CaseError> {
        reconcile(raw, &OutputContract::SectionContent)
    }

    #[test]
    fn section_content_round_trips_exactly() {
        let got = section("{\"content\": \"<p>x</p>\"}").unwrap();
        assert_eq!(
            got,
            Reconciled::Section(SectionContent {
                content: "<p>x</p>".into()
            })
        );
    }

    #[test]
    fn prose_and_fence_are_stripped() {
        let raw = "Sure! Here is the section:\n```json\n{\"content\": \"<p>a {b}</p>\"}\n```\n";
        let got = section(raw).unwrap();
        assert_eq!(got.to_value(), json!({"content": "<p>a {b}</p>"}));
    }

    #[test]
    fn invalid_json_is_malformed_and_keeps_raw() {
        for raw in ["{\"content\": \"<p>", "no json at all", "", "{\"content\": \"a\"} trailing"] {
            let err = section(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedOutput, "{raw:?}");
            assert_eq!(err.raw_output(), Some(raw));
        }
    }

    #[test]
    fn wrong_fields_are_schema_violations() {
        let err = section("{\"body\": \"<p>x</p>\"}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let err = section("{\"content\": \"x\", \"extra\": 1}").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);

        let err = section("{\"content\": 7}").unwrap_err();
        match err {
            CaseError::SchemaViolation { value, .. } => assert_eq!(value, json!({"content": 7})),
            other => panic!("expected schema violation, got {other:?}"),
        }
    }

    #[test]
    fn empty_content_is_valid_and_distinct_from_failure() {
        let got = section("{\"content\": \"\"}").unwrap();
        assert_eq!(got.to_value(), json!({"content": ""}));
    }

    #[test]
    fn case_sections_decode() {
        let raw = json!({
            "strategic": [
                {"id": "1-1", "name": "1.1 Strategic Context", "description": "...", "body": "<p>a</p>"},
                {"id": "1-2", "name": "1.2 Organisational Overview", "body": ""}
            ]
        })
        .to_string();
        let got = reconcile(&raw, &OutputContract::CaseSections(CasePart::Strategic)).unwrap();
        match got {
            Reconciled::Case(CaseDraft::Sections { part, sections }) => {
                assert_eq!(part, CasePart::Strategic);
                assert_eq!(sections.len(), 2);
                assert_eq!(sections[0].id.as_str(), "1-1");
                assert_eq!(sections[0].body, "<p>a</p>");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn case_error_object_is_insufficient_input() {
        let raw = "{\"error\": \"<p>Please provide a location.</p>\"}";
        let got = reconcile(raw, &OutputContract::CaseSections(CasePart::Economic)).unwrap();
        assert_eq!(
            got.to_value(),
            json!({"error": "<p>Please provide a location.</p>"})
        );
    }

    #[test]
    fn case_with_wrong_part_or_shape_is_violation() {
        let contract = OutputContract::CaseSections(CasePart::Economic);
        let wrong_key = json!({"strategic": [{"id": "1-1", "name": "n", "body": "b"}]}).to_string();
        assert_eq!(
            reconcile(&wrong_key, &contract).unwrap_err().kind(),
            ErrorKind::SchemaViolation
        );

        let missing_body = json!({"economic1": [{"id": "2-1", "name": "n"}]}).to_string();
        assert_eq!(
            reconcile(&missing_body, &contract).unwrap_err().kind(),
            ErrorKind::SchemaViolation
        );

        let bad_id = json!({"economic1": [{"id": "two", "name": "n", "body": "b"}]}).to_string();
        assert_eq!(
            reconcile(&bad_id, &contract).unwrap_err().kind(),
            ErrorKind::SchemaViolation
        );

        let dup = json!({"economic1": [
            {"id": "2-1", "name": "n", "body": "b"},
            {"id": "2-1", "name": "n", "body": "c"}
        ]})
        .to_string();
        assert_eq!(
            reconcile(&dup, &contract).unwrap_err().kind(),
            ErrorKind::SchemaViolation
        );
    }

    #[test]
    fn knowledge_probe_attaches_name() {
        let contract = OutputContract::DocumentKnowledge {
            name: "Net Zero Strategy".into(),
        };
        let got = reconcile("{}", &contract).unwrap();
        assert_eq!(
            got.to_value(),
            json!({"accessible": false, "url": null, "name": "Net Zero Strategy"})
        );

        let raw = "{\"accessible\": true, \"url\": \"https://www.gov.uk/x\", \"name\": \"Ignored\"}";
        let got = reconcile(raw, &contract).unwrap();
        assert_eq!(
            got.to_value(),
            json!({"accessible": true, "url": "https://www.gov.uk/x", "name": "Net Zero Strategy"})
        );
    }

    #[test]
    fn knowledge_probe_rejects_wrong_types() {
        let contract = OutputContract::DocumentKnowledge { name: "X".into() };
        let err = reconcile("{\"accessible\": \"yes\"}", &contract).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    }

    #[test]
    fn raw_text_is_untouched_unless_asked() {
        let raw = " \"Updated text.\" \n";
        assert_eq!(
            reconcile(raw, &OutputContract::RawText { trim_quotes: false }).unwrap(),
            Reconciled::Text(raw.into())
        );
        assert_eq!(
            reconcile(raw, &OutputContract::RawText { trim_quotes: true }).unwrap(),
            Reconciled::Text("Updated text.".into())
        );
        assert_eq!(
            reconcile("\"", &OutputContract::RawText { trim_quotes: true }).unwrap(),
            Reconciled::Text("\"".into())
        );
    }

    fn options_reply(conclusions: [&str; 2]) -> String {
        let rows: String = crate::options::CriticalSuccessFactor::ALL
            .iter()
            .map(|f| format!("<tr><td>{}</td><td>🔴 Weak</td><td>🟢 Strong</td></tr>", f.label()))
            .collect();
        let html = format!(
            "<table><tr><th>Critical Success Factors</th><th>Option 1: Do minimum</th><th>Option 2: Full scheme</th></tr>{rows}<tr><td>Conclusion</td><td>{}</td><td>{}</td></tr></table>",
            conclusions[0], conclusions[1]
        );
        json!({ "content": html }).to_string()
    }

    #[test]
    fn options_section_checks_conclusion_row() {
        let contract = OutputContract::OptionsSection(OptionsPhase::Scope);
        let good = options_reply(["🔴", "🟢"]);
        assert!(matches!(reconcile(&good, &contract).unwrap(), Reconciled::Section(_)));

        let bad = options_reply(["🟢", "🟢"]);
        let err = reconcile(&bad, &contract).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.raw_output(), Some(bad.as_str()));
        let message = err.to_string();
        assert!(message.contains("scope option table"), "{message}");
        assert!(message.contains("option 1 (Option 1: Do minimum)"), "{message}");
        assert!(message.contains("options 1, 2 are all concluded green"), "{message}");

        // The plain section contract does not look inside the content.
        assert!(section(&bad).is_ok());
    }

    #[test]
    fn options_section_without_table_passes_through() {
        let raw = "{\"content\": \"<p>Options to follow.</p>\"}";
        let got = reconcile(raw, &OutputContract::OptionsSection(OptionsPhase::Funding)).unwrap();
        assert_eq!(
            got,
            Reconciled::Section(SectionContent {
                content: "<p>Options to follow.</p>".into()
            })
        );
    }

    #[test]
    fn refusal_is_detected() {
        assert!(RevisedExcerpt(REFUSAL_SENTENCE.into()).is_refusal());
        assert!(!RevisedExcerpt("The scope was narrowed.".into()).is_refusal());
    }

    #[test]
    fn extract_json_cases() {
        assert_eq!(extract_json("abc {\"a\":1}```"), Some("{\"a\":1}"));
        assert_eq!(extract_json("{\"a\":1}\n```\n"), Some("{\"a\":1}"));
        assert_eq!(extract_json("none"), None);
    }
}
