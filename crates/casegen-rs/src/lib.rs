//! Section orchestration and response reconciliation for generated business
//! cases.
//!
//! `casegen-rs` turns a partially filled business case into generation
//! requests for a text-generation backend, sends them, and reconciles the
//! free-form output back into typed results. Every operation makes exactly one
//! backend call. The crate holds no per-document state: callers own the
//! [`DocumentSpec`](document::DocumentSpec) and feed accumulated content back
//! in on each call.
//!
//! # Getting started
//!
//! ```ignore
//! use casegen_rs::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), CaseError> {
//!     let config = BackendConfig::from_env()?;
//!     let backend = Arc::new(MessagesBackend::new(config)?);
//!     let orchestrator = Orchestrator::new(backend);
//!
//!     let document = DocumentSpec::new().with_brief(ProjectBrief {
//!         project_title: "Active Travel".into(),
//!         project_description: "A cycling scheme in Oxford".into(),
//!         ..Default::default()
//!     });
//!
//!     let draft = orchestrator
//!         .create_full_case(CasePart::Strategic, &document)
//!         .await?;
//!     println!("{}", draft.to_value());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`document`] | Section ids, sections, project brief, the evolving [`DocumentSpec`](document::DocumentSpec) |
//! | [`templates`] | Static section catalogue and the pure [`render`](templates::render) function |
//! | [`options`] | RAG ratings, critical success factors, option-table checks |
//! | [`compose`] | Named-fragment instruction builder |
//! | [`request`] | Operation payloads and the [`GenerationRequest`](request::GenerationRequest) they become |
//! | [`orchestrator`] | Request builders and the [`Orchestrator`](orchestrator::Orchestrator) that runs them |
//! | [`reconcile`] | Decoding and contract checks on raw backend text |
//! | [`backend`] | The [`GenerationBackend`](backend::GenerationBackend) trait, Messages API adapter, scripted replies |
//! | [`config`] | Backend connection settings |
//! | [`error`] | [`CaseError`](error::CaseError) and [`BackendError`](error::BackendError) |

pub mod backend;
pub mod compose;
pub mod config;
pub mod document;
pub mod error;
pub mod options;
pub mod orchestrator;
pub mod prelude;
pub mod reconcile;
pub mod request;
pub mod templates;

use schemars::JsonSchema;

// Re-export schemars for downstream crates.
pub use schemars;

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`. Reconciliation validates decoded backend output
/// against these schemas.
///
/// # Example
///
/// ```
/// use casegen_rs::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct Excerpt {
///     content: String,
///     #[serde(default)]
///     source: Option<String>,
/// }
///
/// let schema = json_schema_for::<Excerpt>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"content".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}
