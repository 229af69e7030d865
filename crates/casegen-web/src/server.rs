//! Axum server setup and router construction.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use casegen_rs::orchestrator::Orchestrator;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::api::{self, AppState};

/// Build the full axum router. Each route is registered exactly once.
pub fn build_router(orchestrator: Orchestrator) -> Router {
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
    };

    // Front ends are served from other origins.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(api::health))
        .route("/api/ai/policy-docs", post(api::policy_docs))
        .route("/api/ai/create/strategic-case", post(api::strategic_case))
        .route("/api/ai/create/economic-case", post(api::economic_case))
        .route("/api/ai/create/section", post(api::create_section))
        .route("/api/ai/update/section/additional", post(api::revise_section))
        .route("/api/ai/summarise", post(api::summarise))
        .with_state(state)
        .layer(cors)
}

/// Bind the listener, serve the router on a spawned task, and return the
/// bound address.
pub async fn start_server(router: Router, bind_addr: SocketAddr) -> std::io::Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let addr = listener.local_addr()?;
    info!("casegen-web listening on {addr}");

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            error!("Server stopped: {e}");
        }
    });

    Ok(addr)
}
