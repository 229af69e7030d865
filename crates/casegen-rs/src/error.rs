//! Failure taxonomy for generation and reconciliation.
//!
//! [`BackendError`] covers everything that can go wrong while talking to the
//! generation backend. [`CaseError`] is what every orchestrator operation
//! returns: a backend failure, unusable backend output, or a caller payload
//! rejected before any backend call was made.

use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Transport, authentication, or provider-side failure. Never retried.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The connect or read timeout configured on the adapter elapsed.
    #[error("backend request timed out after {limit:?}: {source}")]
    Timeout {
        limit: Duration,
        #[source]
        source: reqwest::Error,
    },

    /// Connection, TLS, or body-read failure below the HTTP layer.
    #[error("backend request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The backend rejected the configured credentials.
    #[error("backend rejected credentials (HTTP {status}): {body}")]
    Auth { status: u16, body: String },

    /// Any other non-success HTTP status.
    #[error("backend HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The backend reported an error inside an otherwise successful stream.
    #[error("backend stream error: {0}")]
    Stream(String),

    /// The adapter could not be constructed or the request could not be encoded.
    #[error("backend misconfigured: {0}")]
    Misconfiguration(String),
}

/// Every failure an orchestrator operation can surface.
///
/// Reconciliation failures keep the raw backend text so an operator can see
/// exactly what the backend produced.
#[derive(Debug, Error)]
pub enum CaseError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// The backend text could not be decoded as the required structure.
    #[error("backend output is not valid JSON: {source}")]
    MalformedOutput {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    /// The backend text decoded, but not into the shape the operation promised.
    #[error("backend output violates the output contract: {message}")]
    SchemaViolation {
        message: String,
        value: serde_json::Value,
        raw: String,
    },

    /// The caller's payload is unusable; no backend call was made.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Fieldless classification of a [`CaseError`], stable on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BackendTimeout,
    Backend,
    MalformedOutput,
    SchemaViolation,
    InvalidInput,
}

impl ErrorKind {
    /// The wire name, as serialised.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BackendTimeout => "backend_timeout",
            Self::Backend => "backend",
            Self::MalformedOutput => "malformed_output",
            Self::SchemaViolation => "schema_violation",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl CaseError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Backend(BackendError::Timeout { .. }) => ErrorKind::BackendTimeout,
            Self::Backend(_) => ErrorKind::Backend,
            Self::MalformedOutput { .. } => ErrorKind::MalformedOutput,
            Self::SchemaViolation { .. } => ErrorKind::SchemaViolation,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    /// The backend text behind a reconciliation failure, if any.
    pub fn raw_output(&self) -> Option<&str> {
        match self {
            Self::MalformedOutput { raw, .. } | Self::SchemaViolation { raw, .. } => Some(raw),
            _ => None,
        }
    }
}
