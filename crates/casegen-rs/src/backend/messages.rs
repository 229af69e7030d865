//! HTTP adapter for a Messages-style streaming endpoint.

use super::streaming::{SseDecoder, collect_text, output_tokens, stream_error};
use super::{GenerateFuture, GenerationBackend, GenerationOptions};
use crate::config::BackendConfig;
use crate::error::BackendError;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::time::Instant;
use tracing::{debug, trace};

/// Streams one completion per call from the configured endpoint and returns
/// the concatenated text.
pub struct MessagesBackend {
    client: reqwest::Client,
    config: BackendConfig,
}

impl std::fmt::Debug for MessagesBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessagesBackend")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Non-streaming reply body, used when the caller's overrides turn streaming off.
#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl MessagesBackend {
    pub fn new(config: BackendConfig) -> Result<Self, BackendError> {
        if config.api_key.trim().is_empty() {
            return Err(BackendError::Misconfiguration("API key is empty".into()));
        }
        let client = reqwest::Client::builder()
            .user_agent(concat!("casegen-rs/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.read_timeout)
            .build()
            .map_err(|e| BackendError::Misconfiguration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Request body before per-call overrides are applied.
    pub fn baseline_body(&self, system: &str, user: &str) -> Map<String, Value> {
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "system": system,
            "messages": [
                {
                    "role": "user",
                    "content": [{ "type": "text", "text": user }]
                }
            ],
            "stream": true,
        });
        match body {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> BackendError {
        if e.is_timeout() {
            let limit = if e.is_connect() {
                self.config.connect_timeout
            } else {
                self.config.read_timeout
            };
            BackendError::Timeout { limit, source: e }
        } else {
            BackendError::Transport(e)
        }
    }

    async fn send(&self, body: Map<String, Value>) -> Result<String, BackendError> {
        let model = body.get("model").and_then(|v| v.as_str()).unwrap_or("(none)");
        debug!(
            "Backend request: model={model}, url={}, keys={}",
            self.config.base_url,
            body.len(),
        );
        let start = Instant::now();

        let mut resp = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(if status.as_u16() == 401 || status.as_u16() == 403 {
                BackendError::Auth {
                    status: status.as_u16(),
                    body: text,
                }
            } else {
                BackendError::Http {
                    status: status.as_u16(),
                    body: text,
                }
            });
        }

        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/json"));

        if is_json {
            let text = resp.text().await.map_err(|e| self.map_send_error(e))?;
            let parsed: MessageBody = serde_json::from_str(&text)
                .map_err(|e| BackendError::Stream(format!("unreadable response body: {e}")))?;
            let out: String = parsed.content.into_iter().filter_map(|b| b.text).collect();
            debug!(
                "Backend response: HTTP {status} in {:.1}s ({} chars, unstreamed)",
                start.elapsed().as_secs_f64(),
                out.len()
            );
            return Ok(out);
        }

        let mut decoder = SseDecoder::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| self.map_send_error(e))? {
            decoder.feed(&chunk);
            if decoder.is_done() {
                break;
            }
        }
        let events = decoder.finish();
        trace!("Stream completed with {} events", events.len());

        if let Some(message) = stream_error(&events) {
            return Err(BackendError::Stream(message.to_string()));
        }

        let text = collect_text(&events);
        debug!(
            "Backend response: HTTP {status} in {:.1}s ({} chars, output_tokens={})",
            start.elapsed().as_secs_f64(),
            text.len(),
            output_tokens(&events).unwrap_or(0),
        );
        Ok(text)
    }
}

impl GenerationBackend for MessagesBackend {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        user: &'a str,
        options: &'a GenerationOptions,
    ) -> GenerateFuture<'a> {
        Box::pin(async move {
            let body = options.resolve(self.baseline_body(system, user));
            self.send(body).await
        })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
