//! The business case under construction.
//!
//! A [`DocumentSpec`] is created empty by the caller and grows as reconciled
//! section results are applied to it. Nothing in this crate mutates a
//! document on the caller's behalf: the orchestrator only reads it.

use crate::error::CaseError;
use crate::options::CriticalSuccessFactor;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Placeholder framework label that means "nothing supplied".
pub const PLACEHOLDER_FRAMEWORK: &str = "string";

// ── Section identifiers ────────────────────────────────────────────

/// Stable section identifier of the form `<major>-<minor>[-<sub>]`, e.g. `1-1`
/// or `2-3-4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "String", into = "String")]
pub struct SectionId(String);

impl SectionId {
    pub fn parse(raw: &str) -> Result<Self, CaseError> {
        let raw = raw.trim();
        let parts: Vec<&str> = raw.split('-').collect();
        let well_formed = (2..=3).contains(&parts.len())
            && parts
                .iter()
                .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
        if well_formed {
            Ok(Self(raw.to_string()))
        } else {
            Err(CaseError::invalid_input(format!(
                "section id {raw:?} is not of the form <major>-<minor>[-<sub>]"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Dotted form used in rendered text: `2-3-4` → `2.3.4`.
    pub fn dotted(&self) -> String {
        self.0.replace('-', ".")
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SectionId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).map_err(|e| e.to_string())
    }
}

impl From<SectionId> for String {
    fn from(id: SectionId) -> Self {
        id.0
    }
}

// ── Document content ───────────────────────────────────────────────

/// One unit of document content. Content may be empty while the section is
/// still pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

impl Section {
    pub fn new(id: SectionId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.content.trim().is_empty()
    }
}

/// Caller-supplied reference material, mandatory context for every section
/// generated after it was added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SupplementaryItem {
    pub title: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl SupplementaryItem {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: Some(text.into()),
        }
    }

    pub fn text(&self) -> &str {
        self.text.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ProjectSector {
    #[serde(rename = "Transport & Infrastructure")]
    Transport,
    #[serde(rename = "Health & Social Care")]
    Health,
    #[serde(rename = "Education")]
    Education,
    #[serde(rename = "Housing & Planning")]
    Housing,
    #[serde(rename = "Environment & Sustainability")]
    Environment,
    #[serde(rename = "Digital & Technology")]
    Digital,
    #[serde(rename = "Economic Development")]
    Economic,
    #[serde(rename = "Other")]
    Other,
}

impl ProjectSector {
    pub fn label(self) -> &'static str {
        match self {
            Self::Transport => "Transport & Infrastructure",
            Self::Health => "Health & Social Care",
            Self::Education => "Education",
            Self::Housing => "Housing & Planning",
            Self::Environment => "Environment & Sustainability",
            Self::Digital => "Digital & Technology",
            Self::Economic => "Economic Development",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ProjectSector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Estimated budget in £ millions, accepted as text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Budget {
    Amount(f64),
    Text(String),
}

impl Budget {
    /// `£{n} million`, or the caller's own text if it already names a currency.
    pub fn display_millions(&self) -> String {
        match self {
            Self::Amount(n) => format!("£{n} million"),
            Self::Text(t) if t.trim_start().starts_with('£') => t.trim().to_string(),
            Self::Text(t) => format!("£{} million", t.trim()),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(t) if t.trim().is_empty())
    }
}

/// Landing-page facts about the project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProjectBrief {
    pub project_title: String,
    pub project_description: String,
    #[serde(default)]
    pub key_facts_issues: Option<String>,
    #[serde(default)]
    pub estimated_budget: Option<Budget>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub project_sector: Option<ProjectSector>,
}

impl ProjectBrief {
    /// Non-empty `(heading, value)` pairs in display order.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        let mut push = |heading: &'static str, value: Option<String>| {
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                entries.push((heading, value));
            }
        };
        push("Project Title", Some(self.project_title.clone()));
        push("Project Description", Some(self.project_description.clone()));
        push("Key Facts & Issues", self.key_facts_issues.clone());
        push(
            "Estimated Budget",
            self.estimated_budget
                .as_ref()
                .filter(|b| !b.is_blank())
                .map(Budget::display_millions),
        );
        push("Location", self.location.clone());
        push("Sector", self.project_sector.map(|s| s.label().to_string()));
        entries
    }
}

/// A caller-defined critical success factor for the economic case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuccessFactorNote {
    pub category: CriticalSuccessFactor,
    pub description: String,
}

// ── DocumentSpec ───────────────────────────────────────────────────

/// The evolving case.
///
/// Section ids are unique and never change once a section exists. Frameworks
/// and supplementary items are append-only, so later operations never see
/// less context than earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSpec {
    brief: Option<ProjectBrief>,
    prior_case: Option<String>,
    success_factors: Vec<SuccessFactorNote>,
    sections: Vec<Section>,
    frameworks: Vec<String>,
    supplementary: Vec<SupplementaryItem>,
}

impl DocumentSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_brief(mut self, brief: ProjectBrief) -> Self {
        self.brief = Some(brief);
        self
    }

    /// Text of an earlier case part that this part must build on.
    pub fn with_prior_case(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.prior_case = (!text.trim().is_empty()).then_some(text);
        self
    }

    pub fn with_success_factors(mut self, factors: Vec<SuccessFactorNote>) -> Self {
        self.success_factors.extend(factors);
        self
    }

    pub fn with_frameworks<I, S>(mut self, frameworks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for f in frameworks {
            self.add_framework(f);
        }
        self
    }

    pub fn with_supplementary(mut self, items: impl IntoIterator<Item = SupplementaryItem>) -> Self {
        for item in items {
            self.add_supplementary(item);
        }
        self
    }

    /// Build a document from sections, rejecting duplicate ids.
    pub fn with_sections(mut self, sections: impl IntoIterator<Item = Section>) -> Result<Self, CaseError> {
        for section in sections {
            self.insert_section(section)?;
        }
        Ok(self)
    }

    pub fn add_framework(&mut self, framework: impl Into<String>) {
        let framework = framework.into();
        if !self.frameworks.contains(&framework) {
            self.frameworks.push(framework);
        }
    }

    pub fn add_supplementary(&mut self, item: SupplementaryItem) {
        self.supplementary.push(item);
    }

    /// Add a new section. Fails if the id is already present.
    pub fn insert_section(&mut self, section: Section) -> Result<(), CaseError> {
        if self.section(&section.id).is_some() {
            return Err(CaseError::invalid_input(format!(
                "duplicate section id {}",
                section.id
            )));
        }
        self.sections.push(section);
        Ok(())
    }

    /// Replace a section's content, creating the section if it is new. The id
    /// and position of an existing section are kept.
    pub fn apply_content(&mut self, id: &SectionId, title: &str, content: impl Into<String>) {
        let content = content.into();
        match self.sections.iter_mut().find(|s| &s.id == id) {
            Some(existing) => {
                existing.content = content;
                if existing.title.is_empty() {
                    existing.title = title.to_string();
                }
            }
            None => self.sections.push(Section::new(id.clone(), title, content)),
        }
    }

    pub fn brief(&self) -> Option<&ProjectBrief> {
        self.brief.as_ref()
    }

    pub fn prior_case(&self) -> Option<&str> {
        self.prior_case.as_deref()
    }

    pub fn success_factors(&self) -> &[SuccessFactorNote] {
        &self.success_factors
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: &SectionId) -> Option<&Section> {
        self.sections.iter().find(|s| &s.id == id)
    }

    /// Sections with content, in document order.
    pub fn completed_sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter().filter(|s| s.is_complete())
    }

    pub fn frameworks(&self) -> &[String] {
        &self.frameworks
    }

    /// Frameworks with placeholder and blank labels removed.
    pub fn active_frameworks(&self) -> Vec<&str> {
        self.frameworks
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty() && !f.eq_ignore_ascii_case(PLACEHOLDER_FRAMEWORK))
            .collect()
    }

    pub fn supplementary(&self) -> &[SupplementaryItem] {
        &self.supplementary
    }
}

/// Fail if any id appears twice.
pub fn ensure_unique_ids<'a>(ids: impl IntoIterator<Item = &'a SectionId>) -> Result<(), CaseError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(CaseError::invalid_input(format!("duplicate section id {id}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> SectionId {
        SectionId::parse(raw).unwrap()
    }

    #[test]
    fn section_ids_parse_and_dot() {
        assert_eq!(id("1-1").dotted(), "1.1");
        assert_eq!(id("2-3-4").dotted(), "2.3.4");
        assert_eq!(id(" 1-10 ").as_str(), "1-10");
        for bad in ["1", "1-", "a-1", "1-2-3-4", "1.1", ""] {
            assert!(SectionId::parse(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn section_id_deserializes_with_validation() {
        let ok: SectionId = serde_json::from_str("\"2-3\"").unwrap();
        assert_eq!(ok.as_str(), "2-3");
        assert!(serde_json::from_str::<SectionId>("\"two-three\"").is_err());
    }

    #[test]
    fn placeholder_frameworks_are_ignored() {
        let doc = DocumentSpec::new().with_frameworks(["string", " String ", ""]);
        assert!(doc.active_frameworks().is_empty());

        let doc = DocumentSpec::new().with_frameworks(["string", "Green Book"]);
        assert_eq!(doc.active_frameworks(), vec!["Green Book"]);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let err = DocumentSpec::new()
            .with_sections([
                Section::new(id("1-1"), "Strategic Context", "a"),
                Section::new(id("1-1"), "Strategic Context", "b"),
            ])
            .unwrap_err();
        assert!(err.to_string().contains("duplicate section id 1-1"));
    }

    #[test]
    fn apply_content_keeps_id_and_position() {
        let mut doc = DocumentSpec::new()
            .with_sections([
                Section::new(id("1-1"), "Strategic Context", ""),
                Section::new(id("1-2"), "Organisational Overview", ""),
            ])
            .unwrap();
        doc.apply_content(&id("1-1"), "ignored", "<p>x</p>");
        doc.apply_content(&id("1-3"), "Strategic Drivers", "<p>y</p>");

        let ids: Vec<&str> = doc.sections().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["1-1", "1-2", "1-3"]);
        assert_eq!(doc.sections()[0].title, "Strategic Context");
        assert_eq!(doc.completed_sections().count(), 2);
    }

    #[test]
    fn context_only_grows() {
        let mut doc = DocumentSpec::new().with_frameworks(["Green Book"]);
        doc.add_framework("Green Book");
        doc.add_framework("Net Zero");
        doc.add_supplementary(SupplementaryItem::new("A", "one"));
        doc.add_supplementary(SupplementaryItem::new("B", "two"));
        assert_eq!(doc.frameworks().len(), 2);
        assert_eq!(doc.supplementary().len(), 2);
    }

    #[test]
    fn brief_entries_skip_blanks_and_format_budget() {
        let brief: ProjectBrief = serde_json::from_value(serde_json::json!({
            "projectTitle": "Active Travel",
            "projectDescription": "A cycling scheme",
            "keyFactsIssues": "",
            "estimatedBudget": 2.5,
            "projectSector": "Transport & Infrastructure"
        }))
        .unwrap();
        let entries = brief.entries();
        let headings: Vec<&str> = entries.iter().map(|(h, _)| *h).collect();
        assert_eq!(
            headings,
            vec!["Project Title", "Project Description", "Estimated Budget", "Sector"]
        );
        assert_eq!(entries[2].1, "£2.5 million");
        assert_eq!(entries[3].1, "Transport & Infrastructure");
    }

    #[test]
    fn budget_text_forms() {
        assert_eq!(Budget::Text("3".into()).display_millions(), "£3 million");
        assert_eq!(Budget::Text("£2.5m".into()).display_millions(), "£2.5m");
        assert_eq!(Budget::Amount(40.0).display_millions(), "£40 million");
    }

    #[test]
    fn unique_id_check() {
        let ids = [id("1-1"), id("1-2"), id("1-1")];
        assert!(ensure_unique_ids(ids.iter()).is_err());
        assert!(ensure_unique_ids(ids.iter().take(2)).is_ok());
    }
}
