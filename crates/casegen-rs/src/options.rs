//! The options framework: five phases, five critical success factors, and
//! red/amber/green ratings.
//!
//! The backend writes the option tables and picks the preferred option. This
//! module renders the protocol text appended to the options-framework
//! templates and reads generated tables back so their conclusion rows can be
//! checked against the same factor list.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tri-state rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rag {
    Red,
    Amber,
    Green,
}

impl Rag {
    /// Coloured dot placed at the start of each table cell.
    pub fn dot(self) -> &'static str {
        match self {
            Self::Red => "🔴",
            Self::Amber => "🟡",
            Self::Green => "🟢",
        }
    }

    /// Read a rating from a leading dot, as written in generated tables.
    pub fn from_dot(cell: &str) -> Option<Self> {
        let cell = cell.trim_start();
        [Self::Red, Self::Amber, Self::Green]
            .into_iter()
            .find(|r| cell.starts_with(r.dot()))
    }
}

/// The five fixed evaluation dimensions, in table row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum CriticalSuccessFactor {
    #[serde(rename = "Strategic Fit", alias = "Strategic fit and meets business needs")]
    StrategicFit,
    #[serde(rename = "Value for Money", alias = "Potential value for money")]
    ValueForMoney,
    #[serde(
        rename = "Supply Side Capability and Capacity",
        alias = "Supplier capability and capacity"
    )]
    SupplierCapability,
    #[serde(rename = "Affordability", alias = "Potential affordability")]
    Affordability,
    #[serde(rename = "Achievability", alias = "Potential achievability")]
    Achievability,
}

impl CriticalSuccessFactor {
    pub const ALL: [Self; 5] = [
        Self::StrategicFit,
        Self::ValueForMoney,
        Self::SupplierCapability,
        Self::Affordability,
        Self::Achievability,
    ];

    /// Row label used in option tables.
    pub fn label(self) -> &'static str {
        match self {
            Self::StrategicFit => "Strategic fit and meets business needs",
            Self::ValueForMoney => "Potential value for money",
            Self::SupplierCapability => "Supplier capability and capacity",
            Self::Affordability => "Potential affordability",
            Self::Achievability => "Potential achievability",
        }
    }

    /// The factor a table row label names, matched loosely.
    pub fn from_row_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        let key = |f: Self| match f {
            Self::StrategicFit => "strategic fit",
            Self::ValueForMoney => "value for money",
            Self::SupplierCapability => "capability",
            Self::Affordability => "affordab",
            Self::Achievability => "achievab",
        };
        Self::ALL.into_iter().find(|f| label.contains(key(*f)))
    }

    fn index(self) -> usize {
        match self {
            Self::StrategicFit => 0,
            Self::ValueForMoney => 1,
            Self::SupplierCapability => 2,
            Self::Affordability => 3,
            Self::Achievability => 4,
        }
    }
}

/// One category of choice, worked through in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionsPhase {
    Scope,
    Solution,
    Delivery,
    Implementation,
    Funding,
}

impl OptionsPhase {
    pub const ALL: [Self; 5] = [
        Self::Scope,
        Self::Solution,
        Self::Delivery,
        Self::Implementation,
        Self::Funding,
    ];

    /// Section that holds this phase's option table.
    pub fn section_id(self) -> &'static str {
        match self {
            Self::Scope => "2-3-2",
            Self::Solution => "2-3-3",
            Self::Delivery => "2-3-4",
            Self::Implementation => "2-3-5",
            Self::Funding => "2-3-6",
        }
    }

    pub fn from_section_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.section_id() == id)
    }

    /// 1-based position in the sequence.
    pub fn ordinal(self) -> usize {
        match self {
            Self::Scope => 1,
            Self::Solution => 2,
            Self::Delivery => 3,
            Self::Implementation => 4,
            Self::Funding => 5,
        }
    }

    pub fn noun(self) -> &'static str {
        match self {
            Self::Scope => "scope",
            Self::Solution => "solution",
            Self::Delivery => "delivery",
            Self::Implementation => "implementation",
            Self::Funding => "funding",
        }
    }
}

/// One option's ratings, one per critical success factor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAssessment {
    pub label: String,
    /// Ratings in [`CriticalSuccessFactor::ALL`] order.
    pub ratings: [Rag; 5],
}

impl OptionAssessment {
    pub fn new(label: impl Into<String>, ratings: [Rag; 5]) -> Self {
        Self {
            label: label.into(),
            ratings,
        }
    }

    /// A red factor forces a red conclusion.
    pub fn has_red(&self) -> bool {
        self.ratings.contains(&Rag::Red)
    }
}

/// A rule broken by a generated option table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsViolation {
    /// The table has no conclusion row.
    MissingConclusions,
    /// The conclusion row does not have one entry per option.
    WrongLength { expected: usize, found: usize },
    /// An option with a red factor was not concluded red.
    RedNotDiscounted { option: usize, label: String },
    /// More than one option concluded green.
    MultiplePreferred { options: Vec<usize> },
}

impl fmt::Display for OptionsViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingConclusions => f.write_str("the table has no conclusion row"),
            Self::WrongLength { expected, found } => {
                write!(f, "expected {expected} conclusions, found {found}")
            }
            Self::RedNotDiscounted { option, label } => {
                write!(f, "option {} ({label}) has a red factor but is not concluded red", option + 1)
            }
            Self::MultiplePreferred { options } => {
                let numbered: Vec<String> = options.iter().map(|i| (i + 1).to_string()).collect();
                write!(f, "options {} are all concluded green", numbered.join(", "))
            }
        }
    }
}

/// The option table of one phase, as written by the backend.
///
/// Which option is preferred is the backend's call. This type only checks
/// that the conclusion row it wrote obeys the rating rules: a red factor
/// forces a red conclusion, and at most one option is concluded green.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionTable {
    pub phase: OptionsPhase,
    /// Least ambitious first.
    pub options: Vec<OptionAssessment>,
    pub conclusions: Option<Vec<Rag>>,
}

impl OptionTable {
    /// Read the first table in generated section HTML.
    ///
    /// Returns `None` when there is no table with a dot-rated row for every
    /// critical success factor. The conclusion row is the last row that is
    /// not a factor row.
    pub fn from_html(phase: OptionsPhase, html: &str) -> Option<Self> {
        let rows = table_rows(html)?;
        let (header, body) = rows.split_first()?;
        let labels = header.get(1..).filter(|l| !l.is_empty())?;

        let mut factor_rows: [Option<Vec<Rag>>; 5] = Default::default();
        let mut conclusions = None;
        for row in body {
            let Some((name, cells)) = row.split_first() else {
                continue;
            };
            let dots: Option<Vec<Rag>> = cells.iter().map(|c| Rag::from_dot(c)).collect();
            match CriticalSuccessFactor::from_row_label(name) {
                Some(factor) => factor_rows[factor.index()] = dots.filter(|d| d.len() == labels.len()),
                None => {
                    if let Some(dots) = dots.filter(|d| !d.is_empty()) {
                        conclusions = Some(dots);
                    }
                }
            }
        }

        let mut options = Vec::with_capacity(labels.len());
        for (i, label) in labels.iter().enumerate() {
            let mut ratings = [Rag::Amber; 5];
            for factor in CriticalSuccessFactor::ALL {
                ratings[factor.index()] = *factor_rows[factor.index()].as_ref()?.get(i)?;
            }
            options.push(OptionAssessment::new(label.clone(), ratings));
        }
        Some(Self {
            phase,
            options,
            conclusions,
        })
    }

    /// Check the conclusion row against the rating rules.
    pub fn check(&self) -> Result<(), Vec<OptionsViolation>> {
        let Some(conclusions) = &self.conclusions else {
            return Err(vec![OptionsViolation::MissingConclusions]);
        };
        check_conclusions(&self.options, conclusions)
    }
}

/// Check a conclusion row for `options` against the rating rules.
pub fn check_conclusions(
    options: &[OptionAssessment],
    conclusions: &[Rag],
) -> Result<(), Vec<OptionsViolation>> {
    if conclusions.len() != options.len() {
        return Err(vec![OptionsViolation::WrongLength {
            expected: options.len(),
            found: conclusions.len(),
        }]);
    }

    let mut violations = Vec::new();
    for (i, (option, conclusion)) in options.iter().zip(conclusions).enumerate() {
        if option.has_red() && *conclusion != Rag::Red {
            violations.push(OptionsViolation::RedNotDiscounted {
                option: i,
                label: option.label.clone(),
            });
        }
    }

    let greens: Vec<usize> = conclusions
        .iter()
        .enumerate()
        .filter(|(_, c)| **c == Rag::Green)
        .map(|(i, _)| i)
        .collect();
    if greens.len() > 1 {
        violations.push(OptionsViolation::MultiplePreferred { options: greens });
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Cell text of the first `<table>` in `html`, row by row.
fn table_rows(html: &str) -> Option<Vec<Vec<String>>> {
    let lower = html.to_ascii_lowercase();
    let start = lower.find("<table")?;
    let (_, table) = html.split_at(start);
    let end = lower
        .split_at(start)
        .1
        .find("</table")
        .unwrap_or(table.len());
    let (table, _) = table.split_at(end);

    let rows: Vec<Vec<String>> = pieces(table, &["<tr"])
        .into_iter()
        .map(|row| pieces(row, &["<td", "<th"]).into_iter().map(cell_text).collect())
        .filter(|cells: &Vec<String>| !cells.is_empty())
        .collect();
    Some(rows)
}

/// Pieces of `text` starting at each case-insensitive match of a marker.
/// Anything before the first match is dropped.
fn pieces<'a>(text: &'a str, markers: &[&str]) -> Vec<&'a str> {
    let lower = text.to_ascii_lowercase();
    let mut starts: Vec<usize> = markers
        .iter()
        .flat_map(|m| lower.match_indices(m).map(|(i, _)| i))
        .collect();
    starts.sort_unstable();
    starts
        .iter()
        .enumerate()
        .filter_map(|(n, &from)| {
            let to = starts.get(n + 1).copied().unwrap_or(text.len());
            text.get(from..to)
        })
        .collect()
}

/// Visible text of one cell: tags dropped, common entities decoded.
fn cell_text(cell: &str) -> String {
    let mut text = String::with_capacity(cell.len());
    let mut in_tag = false;
    for c in cell.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Instructions for writing one phase's option table.
pub fn protocol_text(phase: OptionsPhase) -> String {
    let factors: Vec<String> = CriticalSuccessFactor::ALL
        .iter()
        .map(|f| format!("    - {}", f.label()))
        .collect();
    let dots = format!("{}{}{}", Rag::Red.dot(), Rag::Amber.dot(), Rag::Green.dot());

    format!(
        "Before the table, there should be a small section explaining each of the options considered. \
Begin this with a sentence like 'The {noun} options considered were:' Then list a brief description of each option.\n\
The first column should be titled 'Critical Success Factors' and should contain the five CSF categories, one for each row:\n\
{factors}\n\
Each subsequent column should be reserved for each option. They should be given a header containing each option description. Number the options numerically.\n\
Columns should be ordered from least ambitious on the left to most ambitious on the right. Don't specifically refer to this in the column headings.\n\
Each option should be rated against the critical success factors in each row using the Red Amber Green (RAG) rating system.\n\
There should be a very brief sentence in each cell explaining how the option applies to the CSF. Use coloured dots ({dots}) at the beginning of each cell.\n\
All assessments should be qualitative - **do not perform quantitative analysis at this stage.**\n\
The last row should be a conclusion row, accounting for all CSF applicability for that specific option.\n\
Out of all the option conclusions, **there MUST only be ONE preferred option (green dot {green}).**\n\
**If there is at least one red dot for that option, the conclusion dot MUST be red {red} and the option must be discounted**.\n\
Otherwise, if it is a combination of amber and green, the conclusion should be decided accordingly, with green conclusions being more preferable.\n\
These options should consider all previous sections as context (particularly business needs and market failure sections) in suggesting first cut of options and RAG ratings.\n\
After the table, include a brief discussion and summary of options considered. This should be around 50 words long.\n\
This is part {n} of {total} sections. Each category of choice (scope, solution, delivery, implementation and funding) \
builds on the previous category of choice and the preferred and carry forward options selected.",
        noun = phase.noun(),
        factors = factors.join("\n"),
        green = Rag::Green.dot(),
        red = Rag::Red.dot(),
        n = phase.ordinal(),
        total = OptionsPhase::ALL.len(),
    )
}
