//! Generation requests and the caller payloads they are built from.
//!
//! Payload types keep the legacy camelCase wire names so existing front ends
//! can post to the new service unchanged.

use crate::backend::GenerationOptions;
use crate::compose::Instruction;
use crate::document::{
    Budget, DocumentSpec, ProjectBrief, ProjectSector, Section, SectionId, SuccessFactorNote,
    SupplementaryItem,
};
use crate::error::CaseError;
use crate::options::OptionsPhase;
use crate::templates::{self, CasePart};
use serde::{Deserialize, Serialize};
use std::fmt;

// ── Requests ───────────────────────────────────────────────────────

/// Which orchestrator operation a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    CreateFullCase,
    CreateSection,
    ReviseExcerpt,
    Summarize,
    ProbeDocumentKnowledge,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreateFullCase => "create_full_case",
            Self::CreateSection => "create_section",
            Self::ReviseExcerpt => "revise_excerpt",
            Self::Summarize => "summarize",
            Self::ProbeDocumentKnowledge => "probe_document_knowledge",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape the backend's text must reconcile into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputContract {
    /// Free text, returned as-is. With `trim_quotes`, surrounding whitespace
    /// and one pair of wrapping double quotes are removed.
    RawText { trim_quotes: bool },
    /// `{"content": html}` and nothing else.
    SectionContent,
    /// `{"content": html}` for an options-framework section. An option
    /// table in the content must have a conclusion row that obeys the
    /// rating rules.
    OptionsSection(OptionsPhase),
    /// `{"<part>": [{id, name, body}, ...]}` or `{"error": text}`.
    CaseSections(CasePart),
    /// `{"accessible": bool, "url": text|null}`; the probed title is
    /// attached as `name` after decoding.
    DocumentKnowledge { name: String },
}

/// System and user instructions for one backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionPair {
    pub system: Instruction,
    pub user: Instruction,
}

impl InstructionPair {
    pub fn new(system: impl Into<Instruction>, user: Instruction) -> Self {
        Self {
            system: system.into(),
            user,
        }
    }
}

/// Everything needed to make and reconcile one backend call.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub kind: OperationKind,
    pub instructions: InstructionPair,
    pub contract: OutputContract,
    pub options: GenerationOptions,
}

// ── Payloads ───────────────────────────────────────────────────────

/// Legacy `{"document": ...}` wrapper used by the case and section routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentEnvelope<T> {
    pub document: T,
}

/// Inputs for generating the strategic case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategicCaseInput {
    #[serde(flatten)]
    pub brief: ProjectBrief,
    #[serde(default)]
    pub frameworks: Option<Vec<String>>,
    #[serde(default)]
    pub supplementary_information: Option<Vec<SupplementaryItem>>,
}

impl StrategicCaseInput {
    pub fn into_document(self) -> Result<DocumentSpec, CaseError> {
        if self.brief.project_title.trim().is_empty() && self.brief.project_description.trim().is_empty()
        {
            return Err(CaseError::invalid_input(
                "projectTitle and projectDescription are both empty",
            ));
        }
        Ok(DocumentSpec::new()
            .with_brief(self.brief)
            .with_frameworks(self.frameworks.unwrap_or_default())
            .with_supplementary(self.supplementary_information.unwrap_or_default()))
    }
}

/// Inputs for generating part 1 of the economic case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EconomicCaseInput {
    pub strategic_case: String,
    #[serde(default)]
    pub critical_success_factors: Option<Vec<SuccessFactorNote>>,
    #[serde(default)]
    pub frameworks: Option<Vec<String>>,
    #[serde(default)]
    pub supplementary_information: Option<Vec<SupplementaryItem>>,
}

impl EconomicCaseInput {
    pub fn into_document(self) -> Result<DocumentSpec, CaseError> {
        if self.strategic_case.trim().is_empty() {
            return Err(CaseError::invalid_input("strategicCase is empty"));
        }
        Ok(DocumentSpec::new()
            .with_prior_case(self.strategic_case)
            .with_success_factors(self.critical_success_factors.unwrap_or_default())
            .with_frameworks(self.frameworks.unwrap_or_default())
            .with_supplementary(self.supplementary_information.unwrap_or_default()))
    }
}

/// A section supplied as context, in the legacy `{sectionID, content}` shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContext {
    #[serde(rename = "sectionID", alias = "sectionId")]
    pub section_id: String,
    #[serde(default)]
    pub content: String,
}

impl SectionContext {
    pub fn to_section(&self) -> Result<Section, CaseError> {
        let id = SectionId::parse(&self.section_id)?;
        let title = templates::template(&id).map(|t| t.name).unwrap_or_default();
        Ok(Section::new(id, title, self.content.clone()))
    }
}

/// Inputs for generating one section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionInput {
    pub section_id: String,
    #[serde(default)]
    pub sections: Vec<SectionContext>,
    /// A JSON-encoded [`ProjectParameters`] object, or free text.
    #[serde(default)]
    pub initial_params: String,
}

impl SectionInput {
    /// Split into the target id, a document holding the context sections,
    /// and the raw parameter string.
    pub fn into_parts(self) -> Result<(SectionId, DocumentSpec, String), CaseError> {
        let target = SectionId::parse(&self.section_id)?;
        let sections = self
            .sections
            .iter()
            .map(SectionContext::to_section)
            .collect::<Result<Vec<_>, _>>()?;
        let document = DocumentSpec::new().with_sections(sections)?;
        Ok((target, document, self.initial_params))
    }
}

/// Project facts recovered from a section request's `initialParams`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    #[serde(default)]
    pub project_title: Option<String>,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub key_facts_issues: Option<String>,
    #[serde(default)]
    pub estimated_budget: Option<Budget>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub project_sector: Option<ProjectSector>,
    #[serde(default)]
    pub supplementary_information: Vec<SupplementaryItem>,
}

impl ProjectParameters {
    /// Decode `initialParams`. `None` if it is not a JSON object of this shape.
    pub fn parse(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// The parameter block embedded in a section instruction.
    pub fn render(&self) -> String {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        let mut out = String::new();
        out.push_str(&format!("Project title: {}\n", field(&self.project_title)));
        out.push_str(&format!("Project description: {}\n", field(&self.project_description)));
        out.push_str(&format!("Key facts and issues: {}\n", field(&self.key_facts_issues)));
        out.push_str(&format!(
            "Estimated budget: {}\n",
            self.estimated_budget
                .as_ref()
                .map(Budget::display_millions)
                .unwrap_or_default()
        ));
        out.push_str(&format!("Location: {}\n", field(&self.location)));
        out.push_str(&format!(
            "Sector: {}\n",
            self.project_sector.map(|s| s.label()).unwrap_or_default()
        ));
        out.push_str("Supplementary information:\n");
        for item in &self.supplementary_information {
            out.push_str(&format!("Document title: {}\n", item.title));
            out.push_str(&format!("Document summary: {}\n\n", item.text()));
        }
        out.push_str("End of supplementary information");
        out
    }
}

/// Who wrote a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    #[serde(rename = "AI")]
    Ai,
    #[serde(rename = "USER")]
    User,
}

/// One turn of the revision conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub text: String,
    #[serde(default)]
    pub sender: Option<Sender>,
}

/// Inputs for revising an excerpt of a section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionInput {
    #[serde(default)]
    pub sections: Vec<SectionContext>,
    #[serde(default)]
    pub prompts: Vec<HistoryEntry>,
    pub original_text: String,
    pub user_query: String,
}

/// Inputs for summarising supplementary material.
pub type SummaryInput = SupplementaryItem;

/// One document title to probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub title: String,
}

/// Inputs for the batch document probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeInput {
    pub documents: Vec<PolicyDocument>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strategic_payload_uses_legacy_names() {
        let input: DocumentEnvelope<StrategicCaseInput> = serde_json::from_value(json!({
            "document": {
                "projectTitle": "Badger Recovery",
                "projectDescription": "Repopulate the countryside",
                "estimatedBudget": "1.5",
                "projectSector": "Environment & Sustainability",
                "frameworks": ["string"],
                "supplementaryInformation": [{"title": "Survey", "text": "Numbers fell"}]
            }
        }))
        .unwrap();
        let doc = input.document.into_document().unwrap();
        assert_eq!(doc.brief().unwrap().project_title, "Badger Recovery");
        assert!(doc.active_frameworks().is_empty());
        assert_eq!(doc.supplementary()[0].text(), "Numbers fell");
    }

    #[test]
    fn empty_strategic_brief_is_invalid() {
        let input: StrategicCaseInput = serde_json::from_value(json!({
            "projectTitle": " ",
            "projectDescription": ""
        }))
        .unwrap();
        assert!(input.into_document().is_err());
    }

    #[test]
    fn economic_payload_requires_strategic_case() {
        let input: EconomicCaseInput = serde_json::from_value(json!({
            "strategicCase": "",
            "criticalSuccessFactors": [{"category": "Affordability", "description": "Within £4m"}]
        }))
        .unwrap();
        assert!(input.into_document().is_err());
    }

    #[test]
    fn section_payload_parses_context() {
        let input: SectionInput = serde_json::from_value(json!({
            "sectionId": "1-2",
            "sections": [{"sectionID": "1-1", "content": "<p>Context</p>"}],
            "initialParams": "{}"
        }))
        .unwrap();
        let (target, doc, params) = input.into_parts().unwrap();
        assert_eq!(target.as_str(), "1-2");
        assert_eq!(doc.sections()[0].title, "1.1 Strategic Context");
        assert_eq!(params, "{}");
    }

    #[test]
    fn section_payload_rejects_bad_ids() {
        let input: SectionInput = serde_json::from_value(json!({
            "sectionId": "one",
            "sections": [],
            "initialParams": ""
        }))
        .unwrap();
        assert!(input.into_parts().is_err());

        let input: SectionInput = serde_json::from_value(json!({
            "sectionId": "1-3",
            "sections": [{"sectionID": "1-1", "content": "a"}, {"sectionID": "1-1", "content": "b"}]
        }))
        .unwrap();
        assert!(input.into_parts().is_err());
    }

    #[test]
    fn parameters_render_in_fixed_order() {
        let params = ProjectParameters::parse(
            &json!({
                "projectTitle": "Active Travel",
                "projectDescription": "Cycle lanes",
                "keyFactsIssues": "Congestion",
                "estimatedBudget": 2.5,
                "location": "Oxford",
                "projectSector": "Transport & Infrastructure",
                "supplementaryInformation": [{"title": "EVs in Bristol", "text": "Hidden costs"}]
            })
            .to_string(),
        )
        .unwrap();
        let text = params.render();
        let expected = "Project title: Active Travel\n\
Project description: Cycle lanes\n\
Key facts and issues: Congestion\n\
Estimated budget: £2.5 million\n\
Location: Oxford\n\
Sector: Transport & Infrastructure\n\
Supplementary information:\n\
Document title: EVs in Bristol\n\
Document summary: Hidden costs\n\n\
End of supplementary information";
        assert_eq!(text, expected);
    }

    #[test]
    fn unparseable_parameters_are_none() {
        assert!(ProjectParameters::parse("projectDescription: not json").is_none());
        assert!(ProjectParameters::parse("[1, 2]").is_none());
    }

    #[test]
    fn revision_history_senders() {
        let input: RevisionInput = serde_json::from_value(json!({
            "sections": [{"sectionID": "2-3-2", "content": "<table></table>"}],
            "prompts": [{"text": "Make it shorter", "sender": "USER"}, {"text": "Done"}],
            "originalText": "The scope was wide.",
            "userQuery": "Shorten"
        }))
        .unwrap();
        assert_eq!(input.prompts[0].sender, Some(Sender::User));
        assert_eq!(input.prompts[1].sender, None);
    }
}
