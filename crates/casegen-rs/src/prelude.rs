//! Convenience re-exports for common `casegen-rs` types.
//!
//! ```ignore
//! use casegen_rs::prelude::*;
//! ```
//!
//! Covers what a caller needs to run operations end to end. Reconciliation
//! helpers and the options framework are left in their modules.

// ── Backend ─────────────────────────────────────────────────────────
pub use crate::backend::{GenerationBackend, GenerationOptions, MessagesBackend, ScriptedBackend};
pub use crate::config::BackendConfig;

// ── Document model ──────────────────────────────────────────────────
pub use crate::document::{DocumentSpec, ProjectBrief, Section, SectionId, SupplementaryItem};
pub use crate::templates::CasePart;

// ── Operations ──────────────────────────────────────────────────────
pub use crate::orchestrator::{DocumentProbe, Orchestrator};
pub use crate::reconcile::{CaseDraft, DocumentKnowledge, RevisedExcerpt, SectionContent};
pub use crate::request::{
    EconomicCaseInput, ProbeInput, RevisionInput, SectionInput, StrategicCaseInput, SummaryInput,
};

// ── Errors ──────────────────────────────────────────────────────────
pub use crate::error::{BackendError, CaseError, ErrorKind};
pub use crate::json_schema_for;
