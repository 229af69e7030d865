//! REST endpoint handlers.
//!
//! Every response uses the same envelope: `{status, message, data, date}` on
//! success and `{status, message, kind, raw_output?, date}` on failure.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use casegen_rs::error::{CaseError, ErrorKind};
use casegen_rs::orchestrator::{DocumentProbe, Orchestrator};
use casegen_rs::request::{
    DocumentEnvelope, EconomicCaseInput, ProbeInput, RevisionInput, SectionInput,
    StrategicCaseInput, SummaryInput,
};
use casegen_rs::templates::CasePart;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::warn;

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

/// The response body of every route.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    pub date: DateTime<Utc>,
}

impl Envelope {
    pub fn success(data: Value) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
            kind: None,
            raw_output: None,
            date: Utc::now(),
        }
    }

    pub fn failure(err: &CaseError) -> Self {
        Self {
            status: "error",
            message: Some(err.to_string()),
            data: None,
            kind: Some(err.kind()),
            raw_output: err.raw_output().map(str::to_string),
            date: Utc::now(),
        }
    }
}

/// HTTP status for a failure kind.
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::BackendTimeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Backend | ErrorKind::MalformedOutput | ErrorKind::SchemaViolation => {
            StatusCode::BAD_GATEWAY
        }
    }
}

/// A [`CaseError`] rendered as an error envelope.
pub struct ApiError(CaseError);

impl From<CaseError> for ApiError {
    fn from(err: CaseError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(CaseError::invalid_input(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(self.0.kind());
        if status != StatusCode::BAD_REQUEST {
            warn!("Request failed with {status}: {}", self.0);
        }
        (status, Json(Envelope::failure(&self.0))).into_response()
    }
}

type ApiResult = Result<Json<Envelope>, ApiError>;

fn ok(data: Value) -> ApiResult {
    Ok(Json(Envelope::success(data)))
}

/// GET /health
pub async fn health() -> Json<Envelope> {
    Json(Envelope::success(json!("ok")))
}

/// POST /api/ai/policy-docs: probe each title in turn.
///
/// Per-title failures are reported inside the list, never as a route error.
pub async fn policy_docs(
    State(app): State<AppState>,
    payload: Result<Json<ProbeInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let probes = app
        .orchestrator
        .probe_documents(input.documents.into_iter().map(|d| d.title))
        .await;
    ok(Value::Array(probes.iter().map(DocumentProbe::to_value).collect()))
}

/// POST /api/ai/create/strategic-case
pub async fn strategic_case(
    State(app): State<AppState>,
    payload: Result<Json<DocumentEnvelope<StrategicCaseInput>>, JsonRejection>,
) -> ApiResult {
    let Json(envelope) = payload?;
    let document = envelope.document.into_document()?;
    let draft = app
        .orchestrator
        .create_full_case(CasePart::Strategic, &document)
        .await?;
    ok(draft.to_value())
}

/// POST /api/ai/create/economic-case
pub async fn economic_case(
    State(app): State<AppState>,
    payload: Result<Json<DocumentEnvelope<EconomicCaseInput>>, JsonRejection>,
) -> ApiResult {
    let Json(envelope) = payload?;
    let document = envelope.document.into_document()?;
    let draft = app
        .orchestrator
        .create_full_case(CasePart::Economic, &document)
        .await?;
    ok(draft.to_value())
}

/// POST /api/ai/create/section
pub async fn create_section(
    State(app): State<AppState>,
    payload: Result<Json<SectionInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let (target, document, params) = input.into_parts()?;
    let section = app
        .orchestrator
        .create_section(&document, &target, &params)
        .await?;
    ok(json!({ "content": section.content }))
}

/// POST /api/ai/update/section/additional
pub async fn revise_section(
    State(app): State<AppState>,
    payload: Result<Json<RevisionInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let excerpt = app.orchestrator.revise_excerpt(&input).await?;
    ok(Value::String(excerpt.0))
}

/// POST /api/ai/summarise
pub async fn summarise(
    State(app): State<AppState>,
    payload: Result<Json<SummaryInput>, JsonRejection>,
) -> ApiResult {
    let Json(input) = payload?;
    let summary = app.orchestrator.summarize(input.text()).await?;
    ok(Value::String(summary))
}
