//! HTTP surface for `casegen-rs` business case generation.
//!
//! `casegen-web` exposes each orchestrator operation as a JSON route on an
//! axum server with permissive CORS, so an existing front end can post its
//! payloads unchanged. Handlers hold no business logic: they decode the
//! payload, call the [`Orchestrator`], and wrap the result in the response
//! envelope.
//!
//! # Quick start
//!
//! ```ignore
//! use casegen_rs::prelude::*;
//! use casegen_web::{WebConfig, spawn_web};
//! use std::sync::Arc;
//!
//! let backend = Arc::new(MessagesBackend::new(BackendConfig::from_env()?)?);
//! let orchestrator = Orchestrator::new(backend);
//!
//! let addr = spawn_web(orchestrator, WebConfig::default()).await?;
//! println!("Listening on http://{addr}");
//! ```
//!
//! # Routes
//!
//! | Route | Operation |
//! |-------|-----------|
//! | `GET /health` | liveness |
//! | `POST /api/ai/policy-docs` | batch document probe |
//! | `POST /api/ai/create/strategic-case` | full strategic case |
//! | `POST /api/ai/create/economic-case` | economic case part 1 |
//! | `POST /api/ai/create/section` | one section |
//! | `POST /api/ai/update/section/additional` | excerpt revision |
//! | `POST /api/ai/summarise` | supplementary summary |

mod api;
mod server;

pub use api::{Envelope, status_for};
pub use server::{build_router, start_server};

use casegen_rs::orchestrator::Orchestrator;
use std::net::SocketAddr;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// Address to bind to. Default: `127.0.0.1:3001`.
    pub bind_addr: SocketAddr,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3001)),
        }
    }
}

/// Spawn the web server on a Tokio task and return the bound address.
///
/// The server runs until the Tokio runtime shuts down.
pub async fn spawn_web(orchestrator: Orchestrator, config: WebConfig) -> std::io::Result<SocketAddr> {
    let router = build_router(orchestrator);
    start_server(router, config.bind_addr).await
}
