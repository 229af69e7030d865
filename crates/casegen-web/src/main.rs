//! Business case generation server.
//!
//! # Usage
//!
//! ```bash
//! CASEGEN_API_KEY=sk-... cargo run -p casegen-web
//! CASEGEN_API_KEY=sk-... cargo run -p casegen-web -- --port 8080
//! CASEGEN_API_KEY=sk-... cargo run -p casegen-web -- --model claude-sonnet-4-20250514 --log-level debug
//! ```
//!
//! Then post payloads to the routes listed in the crate docs, e.g.
//!
//! ```bash
//! curl -X POST localhost:3001/api/ai/summarise \
//!   -H 'content-type: application/json' \
//!   -d '{"title": "Survey", "text": "Cycling fell by 12% in 2023."}'
//! ```

use std::net::IpAddr;
use std::sync::Arc;

use casegen_rs::backend::MessagesBackend;
use casegen_rs::config::BackendConfig;
use casegen_rs::orchestrator::Orchestrator;
use casegen_web::{WebConfig, spawn_web};
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Business case generation server.
#[derive(Parser)]
#[command(about = "HTTP server for business case generation")]
struct Args {
    /// Address to bind to.
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on.
    #[arg(long, default_value_t = 3001)]
    port: u16,

    /// Model identifier sent to the backend (overrides CASEGEN_MODEL).
    #[arg(long)]
    model: Option<String>,

    /// Messages endpoint URL (overrides CASEGEN_BASE_URL).
    #[arg(long)]
    base_url: Option<String>,

    /// Log verbosity.
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(args.log_level)
        .init();

    let mut config = BackendConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = &args.model {
        config = config.with_model(model);
    }
    if let Some(url) = &args.base_url {
        config = config.with_base_url(url);
    }
    let backend = MessagesBackend::new(config).map_err(|e| e.to_string())?;
    let orchestrator = Orchestrator::new(Arc::new(backend));

    let web_config = WebConfig {
        bind_addr: (args.host, args.port).into(),
    };
    let addr = spawn_web(orchestrator, web_config)
        .await
        .map_err(|e| format!("failed to bind: {e}"))?;
    println!("Listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| format!("failed to wait for shutdown signal: {e}"))?;
    Ok(())
}
