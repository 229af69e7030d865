//! Deterministic backend that replays queued replies.
//!
//! Used by tests across the workspace and by the CLI's `--replay` option.
//! Every call records the instruction pair and options it was given.

use super::{GenerateFuture, GenerationBackend, GenerationOptions};
use crate::error::BackendError;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One recorded call to [`ScriptedBackend::generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub options: GenerationOptions,
}

/// A queued outcome.
#[derive(Debug)]
enum Reply {
    Text(String),
    Fail(BackendError),
}

/// Backend stand-in that returns queued replies in order.
///
/// When the queue is empty the fallback reply is returned, or a
/// [`BackendError::Stream`] if none is set.
#[derive(Debug, Default)]
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies in order.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let backend = Self::new();
        for reply in replies {
            backend.push_reply(reply);
        }
        backend
    }

    /// Reply returned once the queue is drained.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(reply.into());
        self
    }

    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(Reply::Text(reply.into()));
        }
    }

    pub fn push_error(&self, error: BackendError) {
        if let Ok(mut queue) = self.replies.lock() {
            queue.push_back(Reply::Fail(error));
        }
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    fn next_reply(&self) -> Result<String, BackendError> {
        let next = self.replies.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(err)) => Err(err),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| BackendError::Stream("scripted backend has no reply queued".into())),
        }
    }
}

impl GenerationBackend for ScriptedBackend {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        options: &'a GenerationOptions,
    ) -> GenerateFuture<'a> {
        Box::pin(async move {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(RecordedCall {
                    system: system.to_string(),
                    user: user.to_string(),
                    options: options.clone(),
                });
            }
            self.next_reply()
        })
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replies_in_order_then_fallback() {
        let backend = ScriptedBackend::with_replies(["one", "two"]).with_fallback("rest");
        let options = GenerationOptions::default();
        assert_eq!(backend.generate("s", "a", &options).await.unwrap(), "one");
        assert_eq!(backend.generate("s", "b", &options).await.unwrap(), "two");
        assert_eq!(backend.generate("s", "c", &options).await.unwrap(), "rest");

        let calls = backend.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].user, "b");
    }

    #[tokio::test]
    async fn queued_error_is_returned() {
        let backend = ScriptedBackend::new();
        backend.push_error(BackendError::Http {
            status: 500,
            body: "boom".into(),
        });
        let err = backend
            .generate("s", "u", &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Http { status: 500, .. }));
    }

    #[tokio::test]
    async fn empty_queue_without_fallback_fails() {
        let backend = ScriptedBackend::new();
        assert!(
            backend
                .generate("s", "u", &GenerationOptions::default())
                .await
                .is_err()
        );
        assert_eq!(backend.call_count(), 1);
    }
}
