//! Section orchestration.
//!
//! Each operation is split into a pure `build_*` function that composes a
//! [`GenerationRequest`] and an async method on [`Orchestrator`] that runs it:
//! one backend call, then reconciliation. Caller payloads are checked before
//! the backend is touched, so [`CaseError::InvalidInput`] never costs a call.
//!
//! The orchestrator holds no per-document state. Callers generating several
//! sections of one document in sequence pass the accumulated content back in
//! on each call.

use crate::backend::{GenerationBackend, GenerationOptions, merge_params};
use crate::compose::{Instruction, InstructionBuilder};
use crate::document::{DocumentSpec, SectionId, SupplementaryItem};
use crate::error::CaseError;
use crate::options::{OptionsPhase, protocol_text};
use crate::reconcile::{
    CaseDraft, DocumentKnowledge, Reconciled, RevisedExcerpt, SectionContent, reconcile,
    reconcile_case, reconcile_knowledge, reconcile_options_section, reconcile_section,
    reconcile_text,
};
use crate::request::{
    GenerationRequest, InstructionPair, OperationKind, OutputContract, ProjectParameters,
    RevisionInput, SectionContext,
};
use crate::templates::directives::{
    EVIDENCE_REMINDER, EVIDENCE_RULES, JSON_ESCAPING, NO_HEADINGS, REVISION_STYLE,
    SECTION_JSON_CONTRACT, SYSTEM_CREATE_CASE, SYSTEM_PROBE_DOCUMENT, SYSTEM_SUMMARISE,
    system_revise_excerpt,
};
use crate::templates::{self, CasePart, RenderStage};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, trace, warn};

// ── Shared fragments ───────────────────────────────────────────────

fn frameworks_directive(document: &DocumentSpec) -> Option<String> {
    let active = document.active_frameworks();
    (!active.is_empty()).then(|| {
        format!(
            "**Crucially, you MUST incorporate your understanding of each of these government frameworks when considering your output:**\n{}",
            active.join(", ")
        )
    })
}

fn supplementary_directive(items: &[SupplementaryItem]) -> Option<String> {
    let entries: Vec<String> = items
        .iter()
        .filter(|item| !item.text().trim().is_empty() || !item.title.trim().is_empty())
        .map(|item| format!("{}\n{}", item.title, item.text()))
        .collect();
    (!entries.is_empty()).then(|| {
        format!(
            "**Crucially, for every section below, you MUST incorporate this context:**\n\n{}",
            entries.join("\n\n")
        )
    })
}

fn provided_content(document: &DocumentSpec) -> String {
    let mut blocks = Vec::new();
    if let Some(brief) = document.brief() {
        for (heading, value) in brief.entries() {
            blocks.push(format!("### {heading}\n{value}"));
        }
    }
    if let Some(prior) = document.prior_case() {
        blocks.push(format!("### {}\n{prior}", CasePart::Strategic.title()));
    }
    if !document.success_factors().is_empty() {
        let lines: Vec<String> = document
            .success_factors()
            .iter()
            .map(|f| format!("- {}: {}", f.category.label(), f.description))
            .collect();
        blocks.push(format!("### Critical Success Factors\n{}", lines.join("\n")));
    }
    for section in document.completed_sections() {
        let heading = if section.title.is_empty() {
            section.id.dotted()
        } else {
            section.title.clone()
        };
        blocks.push(format!("### {heading}\n{}", section.content));
    }
    blocks.join("\n\n")
}

fn full_case_preamble(part: CasePart) -> String {
    let role = match part {
        CasePart::Strategic => {
            "You respond as if your temperature is set to 0.2 - responses must always be consistent, structured, and deterministic. Never invent or speculate.
You are a professional UK public sector assistant specialising in the Strategic Case under HM Treasury's Five Case Model. You help users construct a compelling, evidence-based Strategic Case for Strategic Outline Cases (SOC) and Outline Business Cases (OBC), using the structure set out in the Project and Programme Business Case guidance.
Your purpose is to help users clearly define and justify proposals using the following elements of the Strategic Case."
        }
        CasePart::Economic => "You are a UK public sector business case assistant.",
    };
    format!(
        "{role}\n\nPlease provide a response that is strictly factual, verifiable, and aligned with any mandatory government frameworks and supplementary materials given above.\n\n{EVIDENCE_RULES}\n\nYour task is to co-design the input for the **{}** of a Five Case Model Business Case.",
        part.title()
    )
}

fn full_case_outline(part: CasePart) -> String {
    let outline = templates::outline(part);
    let outline = serde_json::to_string_pretty(&outline).unwrap_or_else(|e| {
        warn!("Pretty-printing the {} outline failed: {e}", part.key());
        outline.to_string()
    });
    format!(
        "If you are unable to generate the case content due to insufficient user input, you must return the following JSON schema:
{{\"error\": \"List out the error message and required information, with appropriate HTML elements such as <p> and <li>\"}}
{JSON_ESCAPING}

Otherwise, you must generate the **{title}** in JSON format with the following JSON structure, adding to each JSON object in the list a \"body\": \"<html string>\" attribute. The \"body\" is where you provide the required content as a HTML snippet as described in the Five Case Model Business Case guidance and the \"description\" element of that item:

{outline}

{EVIDENCE_REMINDER}
Your response must be in a *valid JSON* format. Only provide the JSON object in your response.",
        title = part.title(),
    )
}

// ── Request builders ───────────────────────────────────────────────

/// Build the single aggregated request for one case part.
///
/// Fragment order: provided content, frameworks, supplementary context,
/// preamble, outline.
pub fn build_full_case(part: CasePart, document: &DocumentSpec) -> Result<GenerationRequest, CaseError> {
    let provided = provided_content(document);
    if provided.trim().is_empty() {
        return Err(CaseError::invalid_input(format!(
            "no project information supplied for the {}",
            part.title()
        )));
    }

    let user = InstructionBuilder::new()
        .fragment("provided", provided)
        .fragment_opt("frameworks", frameworks_directive(document))
        .fragment_opt("supplementary", supplementary_directive(document.supplementary()))
        .fragment("preamble", full_case_preamble(part))
        .fragment("outline", full_case_outline(part))
        .build();

    Ok(GenerationRequest {
        kind: OperationKind::CreateFullCase,
        instructions: InstructionPair::new(SYSTEM_CREATE_CASE, user),
        contract: OutputContract::CaseSections(part),
        options: GenerationOptions::default(),
    })
}

/// Build the request for one section.
///
/// `initial_params` is decoded as [`ProjectParameters`] when possible and
/// embedded verbatim otherwise.
pub fn build_section(
    document: &DocumentSpec,
    target: &SectionId,
    initial_params: &str,
) -> Result<GenerationRequest, CaseError> {
    let brief = templates::render(target, RenderStage::Section)?;

    let others: Vec<String> = document
        .completed_sections()
        .filter(|s| &s.id != target)
        .map(|s| format!("Section {}\n{}", s.id.dotted(), s.content))
        .collect();

    let parameters = match ProjectParameters::parse(initial_params) {
        Some(params) => params.render(),
        None => {
            if !initial_params.trim().is_empty() {
                debug!("initialParams is not a parameter object; embedding it verbatim");
            }
            initial_params.trim().to_string()
        }
    };

    let user = InstructionBuilder::new()
        .fragment(
            "intro",
            "You are a UK public sector business case assistant. Generate a section of a business case report according to the following prompt:",
        )
        .fragment("brief", brief)
        .fragment_if(!others.is_empty(), "sections", || {
            format!(
                "The generated content must follow on from and/or reference the content of the other sections in the business case:\n\n{}",
                others.join("\n\n")
            )
        })
        .fragment_opt("frameworks", frameworks_directive(document))
        .fragment_opt("supplementary", supplementary_directive(document.supplementary()))
        .fragment_if(!parameters.is_empty(), "parameters", || {
            format!(
                "The generated content must consider the project information provided in the parameters:\n{parameters}"
            )
        })
        .fragment("format", NO_HEADINGS)
        .fragment("contract", SECTION_JSON_CONTRACT)
        .build();

    let contract = match OptionsPhase::from_section_id(target.as_str()) {
        Some(phase) => OutputContract::OptionsSection(phase),
        None => OutputContract::SectionContent,
    };

    Ok(GenerationRequest {
        kind: OperationKind::CreateSection,
        instructions: InstructionPair::new(SYSTEM_CREATE_CASE, user),
        contract,
        options: GenerationOptions::default(),
    })
}

/// Build the request for an excerpt revision.
///
/// The first context section decides whether the options protocol is added.
pub fn build_revision(input: &RevisionInput) -> Result<GenerationRequest, CaseError> {
    if input.user_query.trim().is_empty() {
        return Err(CaseError::invalid_input("userQuery is empty"));
    }
    if input.original_text.trim().is_empty() {
        return Err(CaseError::invalid_input("originalText is empty"));
    }
    let sections = input
        .sections
        .iter()
        .map(SectionContext::to_section)
        .collect::<Result<Vec<_>, _>>()?;
    let phase = sections
        .first()
        .and_then(|s| OptionsPhase::from_section_id(s.id.as_str()));

    let context = serde_json::to_string(&input.sections)
        .map_err(|e| CaseError::invalid_input(format!("sections cannot be encoded: {e}")))?;
    let history = serde_json::to_string(&input.prompts)
        .map_err(|e| CaseError::invalid_input(format!("prompts cannot be encoded: {e}")))?;

    let user = InstructionBuilder::new()
        .fragment("context", format!("Additional context: {context}"))
        .fragment("history", format!("Conversation history: {history}"))
        .fragment("original", format!("Original text: \"{}\"", input.original_text))
        .fragment("query", format!("User query: {}", input.user_query))
        .fragment("style", REVISION_STYLE)
        .fragment_opt(
            "options_protocol",
            phase.map(|p| {
                format!(
                    "Use the following prompt for further context and instruction:\n{}",
                    protocol_text(p)
                )
            }),
        )
        .build();

    Ok(GenerationRequest {
        kind: OperationKind::ReviseExcerpt,
        instructions: InstructionPair::new(Instruction::from(system_revise_excerpt().as_str()), user),
        contract: OutputContract::RawText { trim_quotes: true },
        options: GenerationOptions::default(),
    })
}

/// Build the request for a summary of supplementary material.
pub fn build_summary(text: &str) -> Result<GenerationRequest, CaseError> {
    if text.trim().is_empty() {
        return Err(CaseError::invalid_input("text to summarise is empty"));
    }
    let user = InstructionBuilder::new()
        .fragment("document", format!("Summarise the following document: {text}"))
        .build();
    Ok(GenerationRequest {
        kind: OperationKind::Summarize,
        instructions: InstructionPair::new(SYSTEM_SUMMARISE, user),
        contract: OutputContract::RawText { trim_quotes: false },
        options: GenerationOptions::default(),
    })
}

/// Build the request asking whether the backend knows a document.
pub fn build_probe(title: &str) -> Result<GenerationRequest, CaseError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CaseError::invalid_input("document title is empty"));
    }
    let user = InstructionBuilder::new()
        .fragment(
            "question",
            format!(
                "Are you able to reference the document entitled: {title}? Are you able to provide the url to the latest version?"
            ),
        )
        .build();
    Ok(GenerationRequest {
        kind: OperationKind::ProbeDocumentKnowledge,
        instructions: InstructionPair::new(SYSTEM_PROBE_DOCUMENT, user),
        contract: OutputContract::DocumentKnowledge {
            name: title.to_string(),
        },
        options: GenerationOptions::default(),
    })
}

// ── Orchestrator ───────────────────────────────────────────────────

/// Result of probing one title in a batch. Failures are folded in rather
/// than aborting the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentProbe {
    pub accessible: bool,
    pub url: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DocumentProbe {
    /// Wire form; `message` appears only on failures.
    pub fn to_value(&self) -> Value {
        let mut value = json!({
            "accessible": self.accessible,
            "url": self.url,
            "name": self.name,
        });
        if let (Some(message), Some(map)) = (&self.message, value.as_object_mut()) {
            map.insert("message".into(), Value::String(message.clone()));
        }
        value
    }
}

impl From<DocumentKnowledge> for DocumentProbe {
    fn from(k: DocumentKnowledge) -> Self {
        Self {
            accessible: k.accessible,
            url: k.url,
            name: k.name,
            message: None,
        }
    }
}

/// Runs generation requests against a backend.
#[derive(Clone)]
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    options: GenerationOptions,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("backend", &self.backend.name())
            .field("options", &self.options)
            .finish()
    }
}

impl Orchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            options: GenerationOptions::default(),
        }
    }

    /// Options applied to every request this orchestrator sends.
    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    async fn call(&self, request: &GenerationRequest) -> Result<String, CaseError> {
        let system = request.instructions.system.text();
        let user = request.instructions.user.text();
        debug!(
            "{}: system={} chars, user={} chars, fragments={:?}",
            request.kind,
            system.len(),
            user.len(),
            request.instructions.user.names(),
        );
        trace!("{} system instruction:\n{system}", request.kind);
        trace!("{} user instruction:\n{user}", request.kind);

        let options = GenerationOptions {
            ignore_defaults: self.options.ignore_defaults || request.options.ignore_defaults,
            overrides: merge_params(self.options.overrides.clone(), &request.options.overrides),
        };

        let start = Instant::now();
        let raw = self
            .backend
            .generate(&system, &user, &options)
            .await
            .inspect_err(|e| warn!("{} backend call failed: {e}", request.kind))?;
        info!(
            "{} completed via {} in {:.1}s ({} chars)",
            request.kind,
            self.backend.name(),
            start.elapsed().as_secs_f64(),
            raw.len()
        );
        trace!("{} raw output:\n{raw}", request.kind);
        Ok(raw)
    }

    /// Run any request and reconcile against its own contract.
    pub async fn execute(&self, request: &GenerationRequest) -> Result<Reconciled, CaseError> {
        let raw = self.call(request).await?;
        reconcile(&raw, &request.contract)
    }

    /// Generate one case part in a single backend call.
    pub async fn create_full_case(
        &self,
        part: CasePart,
        document: &DocumentSpec,
    ) -> Result<CaseDraft, CaseError> {
        let request = build_full_case(part, document)?;
        let raw = self.call(&request).await?;
        reconcile_case(&raw, part)
    }

    /// Generate the content of one section.
    pub async fn create_section(
        &self,
        document: &DocumentSpec,
        target: &SectionId,
        initial_params: &str,
    ) -> Result<SectionContent, CaseError> {
        let request = build_section(document, target, initial_params)?;
        let raw = self.call(&request).await?;
        match request.contract {
            OutputContract::OptionsSection(phase) => reconcile_options_section(&raw, phase),
            _ => reconcile_section(&raw),
        }
    }

    /// Rewrite an excerpt to satisfy the user's request.
    pub async fn revise_excerpt(&self, input: &RevisionInput) -> Result<RevisedExcerpt, CaseError> {
        let request = build_revision(input)?;
        let raw = self.call(&request).await?;
        let excerpt = RevisedExcerpt(reconcile_text(&raw, true));
        if excerpt.is_refusal() {
            info!("Revision request was refused by the backend");
        }
        Ok(excerpt)
    }

    /// Summarise supplementary material.
    pub async fn summarize(&self, text: &str) -> Result<String, CaseError> {
        let request = build_summary(text)?;
        let raw = self.call(&request).await?;
        Ok(reconcile_text(&raw, false))
    }

    /// Ask whether the backend can reference a document by title.
    pub async fn probe_document_knowledge(&self, title: &str) -> Result<DocumentKnowledge, CaseError> {
        let request = build_probe(title)?;
        let raw = self.call(&request).await?;
        reconcile_knowledge(&raw, title.trim())
    }

    /// Probe several titles one after another. Never fails as a whole.
    pub async fn probe_documents<I, S>(&self, titles: I) -> Vec<DocumentProbe>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut results = Vec::new();
        for title in titles {
            let title = title.as_ref().trim();
            let probe = match self.probe_document_knowledge(title).await {
                Ok(knowledge) => knowledge.into(),
                Err(e) => {
                    warn!("Probe for {title:?} failed: {e}");
                    DocumentProbe {
                        accessible: false,
                        url: None,
                        name: title.to_string(),
                        message: Some(e.to_string()),
                    }
                }
            };
            results.push(probe);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ScriptedBackend;
    use crate::document::{ProjectBrief, Section};
    use crate::error::{BackendError, ErrorKind};
    use crate::request::{HistoryEntry, Sender};
    use crate::templates::{DEFERRED_PLACEHOLDER, REFUSAL_SENTENCE};
    use serde_json::json;

    fn id(raw: &str) -> SectionId {
        SectionId::parse(raw).unwrap()
    }

    fn orchestrator(backend: &Arc<ScriptedBackend>) -> Orchestrator {
        Orchestrator::new(backend.clone())
    }

    fn brief() -> ProjectBrief {
        ProjectBrief {
            project_title: "Active Travel".into(),
            project_description: "A £2.5m cycling scheme in Oxford".into(),
            location: Some("Oxford".into()),
            ..Default::default()
        }
    }

    fn revision(section: &str, query: &str) -> RevisionInput {
        RevisionInput {
            sections: vec![SectionContext {
                section_id: section.into(),
                content: "<table></table>".into(),
            }],
            prompts: vec![HistoryEntry {
                text: "Earlier turn".into(),
                sender: Some(Sender::User),
            }],
            original_text: "The scope was wide.".into(),
            user_query: query.into(),
        }
    }

    #[test]
    fn section_without_context_omits_framework_and_supplementary() {
        let doc = DocumentSpec::new();
        let request = build_section(&doc, &id("1-1"), "").unwrap();
        let user = &request.instructions.user;
        assert!(!user.has("frameworks"));
        assert!(!user.has("supplementary"));
        assert!(!user.has("sections"));
        assert!(!user.has("parameters"));
        assert_eq!(request.contract, OutputContract::SectionContent);
    }

    #[test]
    fn document_context_stays_out_of_the_brief() {
        let target = id("2-2");
        let rendered = templates::render(&target, RenderStage::Section).unwrap();
        let bare = build_section(&DocumentSpec::new(), &target, "").unwrap();
        let rich = DocumentSpec::new()
            .with_brief(brief())
            .with_frameworks(["Green Book"]);
        let rich = build_section(&rich, &target, "{\"projectTitle\": \"Active Travel\"}").unwrap();
        assert_eq!(bare.instructions.user.fragment("brief"), Some(rendered.as_str()));
        assert_eq!(rich.instructions.user.fragment("brief"), Some(rendered.as_str()));
        assert!(rich.instructions.user.has("frameworks"));
    }

    #[test]
    fn placeholder_framework_emits_no_directive() {
        let doc = DocumentSpec::new().with_frameworks(["string"]);
        let request = build_section(&doc, &id("1-1"), "").unwrap();
        assert!(!request.instructions.user.has("frameworks"));

        let doc = DocumentSpec::new().with_brief(brief()).with_frameworks(["string"]);
        let request = build_full_case(CasePart::Strategic, &doc).unwrap();
        assert!(!request.instructions.user.has("frameworks"));
    }

    #[test]
    fn section_instruction_fragment_order() {
        let doc = DocumentSpec::new()
            .with_frameworks(["Green Book"])
            .with_supplementary([SupplementaryItem::new("Survey", "Numbers fell")])
            .with_sections([
                Section::new(id("1-1"), "1.1 Strategic Context", "<p>Trends</p>"),
                Section::new(id("1-2"), "1.2 Organisational Overview", ""),
                Section::new(id("1-3"), "1.3 Strategic Drivers", "<p>old</p>"),
            ])
            .unwrap();
        let params = json!({"projectTitle": "Active Travel", "estimatedBudget": "2.5"}).to_string();
        let request = build_section(&doc, &id("1-3"), &params).unwrap();
        let user = &request.instructions.user;
        assert_eq!(
            user.names(),
            vec![
                "intro",
                "brief",
                "sections",
                "frameworks",
                "supplementary",
                "parameters",
                "format",
                "contract"
            ]
        );
        let sections = user.fragment("sections").unwrap();
        assert!(sections.contains("Section 1.1\n<p>Trends</p>"));
        assert!(!sections.contains("Section 1.2"));
        assert!(!sections.contains("Section 1.3"));
        let parameters = user.fragment("parameters").unwrap();
        assert!(parameters.contains("Project title: Active Travel"));
        assert!(parameters.contains("Estimated budget: £2.5 million"));
        assert!(user.fragment("frameworks").unwrap().ends_with("Green Book"));
    }

    #[test]
    fn unparseable_params_are_embedded_verbatim() {
        let request = build_section(&DocumentSpec::new(), &id("2-2"), "projectDescription: buses").unwrap();
        let parameters = request.instructions.user.fragment("parameters").unwrap();
        assert!(parameters.ends_with("projectDescription: buses"));
    }

    #[test]
    fn unknown_section_is_invalid_input() {
        let err = build_section(&DocumentSpec::new(), &id("7-7"), "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn full_case_fragment_order_and_outline() {
        let doc = DocumentSpec::new()
            .with_brief(brief())
            .with_frameworks(["Green Book", "string"])
            .with_supplementary([SupplementaryItem::new("Survey", "Numbers fell")]);
        let request = build_full_case(CasePart::Strategic, &doc).unwrap();
        let user = &request.instructions.user;
        assert_eq!(
            user.names(),
            vec!["provided", "frameworks", "supplementary", "preamble", "outline"]
        );
        let provided = user.fragment("provided").unwrap();
        assert!(provided.starts_with("### Project Title\nActive Travel"));
        assert!(provided.contains("### Location\nOxford"));
        assert!(!provided.contains("### Sector"));
        assert_eq!(
            user.fragment("frameworks").unwrap().lines().last(),
            Some("Green Book")
        );
        let outline = user.fragment("outline").unwrap();
        assert!(outline.contains("\"strategic\""));
        assert!(outline.contains(DEFERRED_PLACEHOLDER));
        assert!(outline.contains("{\"error\":"));
        assert_eq!(request.contract, OutputContract::CaseSections(CasePart::Strategic));
    }

    #[test]
    fn economic_case_uses_prior_case() {
        let doc = DocumentSpec::new().with_prior_case("<p>Strategic case text</p>");
        let request = build_full_case(CasePart::Economic, &doc).unwrap();
        let user = &request.instructions.user;
        assert!(
            user.fragment("provided")
                .unwrap()
                .starts_with("### Strategic Case\n<p>Strategic case text</p>")
        );
        assert!(user.fragment("outline").unwrap().contains("\"economic1\""));
        assert!(user.fragment("preamble").unwrap().contains("**Economic Case Part 1**"));
    }

    #[test]
    fn empty_document_cannot_start_a_case() {
        let err = build_full_case(CasePart::Strategic, &DocumentSpec::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn options_sections_get_protocol_on_revision() {
        let request = build_revision(&revision("2-3-3", "Add an option")).unwrap();
        let protocol = request.instructions.user.fragment("options_protocol").unwrap();
        assert!(protocol.contains("This is part 2 of 5 sections."));

        let request = build_revision(&revision("1-4", "Add an objective")).unwrap();
        assert!(!request.instructions.user.has("options_protocol"));
        assert_eq!(
            request.contract,
            OutputContract::RawText { trim_quotes: true }
        );
    }

    #[test]
    fn revision_requires_query_and_text() {
        let err = build_revision(&revision("1-1", "  ")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let mut input = revision("1-1", "Shorten");
        input.original_text.clear();
        assert!(build_revision(&input).is_err());
    }

    #[test]
    fn probe_and_summary_reject_blank_input() {
        assert!(build_probe(" ").is_err());
        assert!(build_summary("").is_err());
    }

    #[tokio::test]
    async fn create_section_returns_content() {
        let backend = Arc::new(ScriptedBackend::with_replies([
            "Here you go:\n{\"content\": \"<p>x</p>\"}\n```",
        ]));
        let got = orchestrator(&backend)
            .create_section(&DocumentSpec::new(), &id("1-1"), "")
            .await
            .unwrap();
        assert_eq!(got.content, "<p>x</p>");
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].system.starts_with("You are a Local Government Consultant"));
    }

    #[tokio::test]
    async fn options_section_rejects_two_preferred_options() {
        let rows: String = crate::options::CriticalSuccessFactor::ALL
            .iter()
            .map(|f| format!("<tr><td>{}</td><td>🟡 Partial</td><td>🟢 Full</td></tr>", f.label()))
            .collect();
        let content = format!(
            "<table><tr><th>CSF</th><th>Option 1</th><th>Option 2</th></tr>{rows}<tr><td>Conclusion</td><td>🟢</td><td>🟢</td></tr></table>"
        );
        let reply = json!({ "content": content }).to_string();
        let backend = Arc::new(ScriptedBackend::with_replies([reply.clone()]));

        let request = build_section(&DocumentSpec::new(), &id("2-3-3"), "").unwrap();
        assert_eq!(
            request.contract,
            OutputContract::OptionsSection(OptionsPhase::Solution)
        );

        let err = orchestrator(&backend)
            .create_section(&DocumentSpec::new(), &id("2-3-3"), "")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaViolation);
        assert_eq!(err.raw_output(), Some(reply.as_str()));
        assert!(err.to_string().contains("solution option table"));
    }

    #[tokio::test]
    async fn invalid_input_makes_no_backend_call() {
        let backend = Arc::new(ScriptedBackend::new());
        let err = orchestrator(&backend)
            .revise_excerpt(&revision("1-1", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn refusal_passes_through_exactly() {
        let backend = Arc::new(ScriptedBackend::with_replies([REFUSAL_SENTENCE]));
        let got = orchestrator(&backend)
            .revise_excerpt(&revision("1-1", "What is the weather in Leeds?"))
            .await
            .unwrap();
        assert_eq!(got.as_str(), REFUSAL_SENTENCE);
        assert!(got.is_refusal());
    }

    #[tokio::test]
    async fn probe_with_empty_reply_is_not_accessible() {
        let backend = Arc::new(ScriptedBackend::with_replies(["{}"]));
        let got = orchestrator(&backend)
            .probe_document_knowledge("Net Zero Strategy")
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&got).unwrap(),
            json!({"accessible": false, "url": null, "name": "Net Zero Strategy"})
        );
    }

    #[tokio::test]
    async fn batch_probe_folds_failures() {
        let backend = Arc::new(ScriptedBackend::with_replies([
            "{\"accessible\": true, \"url\": \"https://www.gov.uk/green-book\"}",
            "I am not sure",
        ]));
        backend.push_error(BackendError::Stream("overloaded".into()));
        let results = orchestrator(&backend)
            .probe_documents(["Green Book", " Mystery Report ", "  Third\n"])
            .await;
        assert_eq!(results.len(), 3);
        assert!(results[0].accessible);
        assert!(results[0].message.is_none());
        assert!(!results[1].accessible);
        assert_eq!(results[1].name, "Mystery Report");
        assert!(results[1].message.as_deref().unwrap().contains("not valid JSON"));
        assert_eq!(results[2].name, "Third");
        assert!(results[2].message.as_deref().unwrap().contains("overloaded"));

        assert!(results[0].to_value().get("message").is_none());
        assert_eq!(results[0].to_value()["url"], "https://www.gov.uk/green-book");
        let failed = results[2].to_value();
        assert_eq!(failed["accessible"], false);
        assert!(failed["url"].is_null());
        assert_eq!(failed["name"], "Third");
        assert!(failed["message"].as_str().unwrap().contains("overloaded"));
    }

    #[tokio::test]
    async fn backend_failure_surfaces_as_backend_kind() {
        let backend = Arc::new(ScriptedBackend::new());
        backend.push_error(BackendError::Auth {
            status: 401,
            body: "no".into(),
        });
        let err = orchestrator(&backend).summarize("Some text").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Backend);
    }

    #[tokio::test]
    async fn malformed_case_keeps_raw_output() {
        let backend = Arc::new(ScriptedBackend::with_replies(["{\"strategic\": ["]));
        let doc = DocumentSpec::new().with_brief(brief());
        let err = orchestrator(&backend)
            .create_full_case(CasePart::Strategic, &doc)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedOutput);
        assert_eq!(err.raw_output(), Some("{\"strategic\": ["));
    }

    #[tokio::test]
    async fn orchestrator_options_reach_backend() {
        let backend = Arc::new(ScriptedBackend::new().with_fallback("Short summary."));
        let orchestrator = Orchestrator::new(backend.clone())
            .with_options(GenerationOptions::default().with("temperature", 0.0));
        let summary = orchestrator.summarize("Long text").await.unwrap();
        assert_eq!(summary, "Short summary.");
        assert_eq!(
            backend.calls()[0].options.overrides["temperature"],
            json!(0.0)
        );
    }

    #[tokio::test]
    async fn execute_reconciles_against_request_contract() {
        let backend = Arc::new(ScriptedBackend::with_replies(["{\"content\": \"<p>y</p>\"}"]));
        let request = build_section(&DocumentSpec::new(), &id("2-1"), "").unwrap();
        let got = orchestrator(&backend).execute(&request).await.unwrap();
        assert_eq!(got.to_value(), json!({"content": "<p>y</p>"}));
    }
}
