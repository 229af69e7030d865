//! Prompt template library.
//!
//! A static catalogue of [`SectionTemplate`]s keyed by section id, plus the
//! pure [`render`] function that turns a template into instruction text for a
//! given [`RenderStage`]. Nothing here holds state: rendering the same id at
//! the same stage always yields the same text.

pub mod briefs;
pub mod directives;

use crate::document::SectionId;
use crate::error::CaseError;
use crate::options::{OptionsPhase, protocol_text};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub use directives::{DEFERRED_PLACEHOLDER, REFUSAL_SENTENCE, SHARED_DIRECTIVES};

/// A part of the Five Case Model generated in one full-case request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CasePart {
    #[serde(rename = "strategic")]
    Strategic,
    #[serde(rename = "economic1")]
    Economic,
}

impl CasePart {
    /// Top-level key of the generated JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::Strategic => "strategic",
            Self::Economic => "economic1",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Strategic => "Strategic Case",
            Self::Economic => "Economic Case Part 1",
        }
    }
}

/// Where a template is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    /// Inside the outline of a full-case request. Only lead sections carry a
    /// brief; the rest are deferred.
    FullCase,
    /// A single-section generation request.
    Section,
}

/// Immutable description of one section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub brief: &'static str,
    pub part: CasePart,
    /// Generated as part of the full-case request rather than deferred.
    pub lead: bool,
}

impl SectionTemplate {
    /// The options phase, for sections that must follow the options protocol.
    pub fn options_phase(&self) -> Option<OptionsPhase> {
        OptionsPhase::from_section_id(self.id)
    }

    pub fn is_options_framework(&self) -> bool {
        self.options_phase().is_some()
    }
}

const fn t(
    id: &'static str,
    name: &'static str,
    brief: &'static str,
    part: CasePart,
    lead: bool,
) -> SectionTemplate {
    SectionTemplate {
        id,
        name,
        brief,
        part,
        lead,
    }
}

use CasePart::{Economic, Strategic};

/// Every known section, in document order.
pub static CATALOGUE: &[SectionTemplate] = &[
    t("1-1", "1.1 Strategic Context", briefs::STRATEGIC_CONTEXT, Strategic, true),
    t("1-2", "1.2 Organisational Overview", briefs::ORGANISATIONAL_OVERVIEW, Strategic, false),
    t("1-3", "1.3 Strategic Drivers", briefs::STRATEGIC_DRIVERS, Strategic, false),
    t("1-4", "1.4 Spending Objectives", briefs::SPENDING_OBJECTIVES, Strategic, false),
    t("1-5", "1.5 Existing Arrangements", briefs::EXISTING_ARRANGEMENTS, Strategic, false),
    t("1-6", "1.6 Business Needs", briefs::BUSINESS_NEEDS, Strategic, false),
    t("1-7", "1.7 Case for Change Summary", briefs::CASE_FOR_CHANGE, Strategic, false),
    t("1-8", "1.8 Potential Benefits", briefs::POTENTIAL_BENEFITS, Strategic, false),
    t("1-9", "1.9 Potential Risks", briefs::POTENTIAL_RISKS, Strategic, false),
    t("1-10", "1.10 Constraints", briefs::CONSTRAINTS, Strategic, false),
    t("1-11", "1.11 Dependencies", briefs::DEPENDENCIES, Strategic, false),
    t("2-1", "2.1 Purpose of Economic Case", briefs::ECONOMIC_PURPOSE, Economic, true),
    t("2-2", "2.2 Market Failure", briefs::MARKET_FAILURE, Economic, true),
    t(
        "2-3",
        "2.3 Longlist to Shortlist using the Options Framework",
        briefs::LONGLIST_TO_SHORTLIST,
        Economic,
        true,
    ),
    t("2-3-1", "2.3.1 Critical Success Factors", briefs::CRITICAL_SUCCESS_FACTORS, Economic, false),
    t("2-3-2", "2.3.2 Scope Options", briefs::SCOPE_OPTIONS, Economic, false),
    t("2-3-3", "2.3.3 Solution Options", briefs::SOLUTION_OPTIONS, Economic, false),
    t("2-3-4", "2.3.4 Delivery Options", briefs::DELIVERY_OPTIONS, Economic, false),
    t("2-3-5", "2.3.5 Implementation", briefs::IMPLEMENTATION_OPTIONS, Economic, false),
    t("2-3-6", "2.3.6 Funding Options", briefs::FUNDING_OPTIONS, Economic, false),
    t("2-4", "2.4 Options Framework Summary", briefs::OPTIONS_SUMMARY, Economic, false),
    t("2-5", "2.5 Shortlist of Options", briefs::SHORTLIST, Economic, false),
];

/// Look up a template by id.
pub fn template(id: &SectionId) -> Option<&'static SectionTemplate> {
    CATALOGUE.iter().find(|t| t.id == id.as_str())
}

/// Templates belonging to one case part, in document order.
pub fn templates_for(part: CasePart) -> impl Iterator<Item = &'static SectionTemplate> {
    CATALOGUE.iter().filter(move |t| t.part == part)
}

/// Instruction text for one section.
///
/// Order: brief, options protocol (option sections only), shared directives.
/// In a full-case outline every non-lead section renders to
/// [`DEFERRED_PLACEHOLDER`].
///
/// The only context a brief depends on is the [`RenderStage`]. Document
/// content (frameworks, supplementary items, completed sections, project
/// parameters) never changes the brief; the request builders in
/// [`crate::orchestrator`] add it as separate fragments around the rendered
/// text.
pub fn render(section_id: &SectionId, stage: RenderStage) -> Result<String, CaseError> {
    let template = template(section_id)
        .ok_or_else(|| CaseError::invalid_input(format!("unknown section id {section_id}")))?;
    Ok(render_template(template, stage))
}

fn render_template(template: &SectionTemplate, stage: RenderStage) -> String {
    if stage == RenderStage::FullCase && !template.lead {
        return DEFERRED_PLACEHOLDER.to_string();
    }
    let mut parts = vec![template.brief.to_string()];
    if let Some(phase) = template.options_phase() {
        parts.push(protocol_text(phase));
    }
    parts.push(SHARED_DIRECTIVES.to_string());
    parts.join("\n\n")
}

/// The `{ "<part>": [{id, name, description}, ...] }` outline embedded in a
/// full-case request.
pub fn outline(part: CasePart) -> Value {
    let entries: Vec<Value> = templates_for(part)
        .map(|t| {
            json!({
                "id": t.id,
                "name": t.name,
                "description": render_template(t, RenderStage::FullCase),
            })
        })
        .collect();
    json!({ part.key(): entries })
}
