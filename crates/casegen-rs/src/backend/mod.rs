//! Generation backend adapter.
//!
//! The orchestrator only ever sees [`GenerationBackend::generate`]: a system
//! instruction and a user instruction in, one complete text out. Streaming,
//! request framing and error translation stay inside the implementation.
//!
//! - [`messages`]: [`MessagesBackend`], the HTTP adapter for a Messages-style
//!   streaming endpoint.
//! - [`streaming`]: SSE parser that reassembles text deltas in order.
//! - [`scripted`]: [`ScriptedBackend`], a deterministic stand-in for tests
//!   and offline runs.

pub mod messages;
pub mod scripted;
pub mod streaming;

pub use messages::MessagesBackend;
pub use scripted::ScriptedBackend;

use crate::error::BackendError;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by [`GenerationBackend::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<String, BackendError>> + Send + 'a>>;

/// A generative-text capability.
///
/// Implementations make at most one attempt per call: no retries, no
/// backoff. Uses a boxed future so the trait stays dyn-compatible.
pub trait GenerationBackend: Send + Sync {
    /// Produce the complete response text for one instruction pair.
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        options: &'a GenerationOptions,
    ) -> GenerateFuture<'a>;

    /// Short provider label used in logs.
    fn name(&self) -> &str {
        "backend"
    }
}

/// Per-call request parameters layered over the adapter's baseline.
///
/// With `ignore_defaults` unset, the baseline body is built first and every
/// entry in `overrides` replaces the baseline entry of the same name. With it
/// set, `overrides` is the entire request body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationOptions {
    pub ignore_defaults: bool,
    pub overrides: Map<String, Value>,
}

impl GenerationOptions {
    /// Options that send exactly `params` and nothing else.
    pub fn raw(params: Map<String, Value>) -> Self {
        Self {
            ignore_defaults: true,
            overrides: params,
        }
    }

    /// Add or replace one override entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Resolve the final request body from a baseline.
    pub fn resolve(&self, baseline: Map<String, Value>) -> Map<String, Value> {
        if self.ignore_defaults {
            self.overrides.clone()
        } else {
            merge_params(baseline, &self.overrides)
        }
    }
}

/// Shallow merge where `overrides` wins on every shared key.
pub fn merge_params(mut base: Map<String, Value>, overrides: &Map<String, Value>) -> Map<String, Value> {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
    base
}
