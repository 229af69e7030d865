//! Run one business case operation and print the reconciled result.
//!
//! Reads the API key from the `CASEGEN_API_KEY` environment variable unless
//! `--replay` is given.
//!
//! # Examples
//!
//! ```sh
//! # Strategic case from a landing-page payload
//! casegen case --input brief.json
//!
//! # Economic case part 1, payload on stdin
//! cat strategic.json | casegen case --part economic --input -
//!
//! # One section, answered from a recorded reply
//! casegen section --input section.json --replay reply.txt
//!
//! # Probe policy documents with verbose logging
//! casegen probe --input docs.json --log-level debug
//! ```

use casegen_rs::backend::{GenerationBackend, MessagesBackend, ScriptedBackend};
use casegen_rs::config::BackendConfig;
use casegen_rs::error::CaseError;
use casegen_rs::orchestrator::{DocumentProbe, Orchestrator};
use casegen_rs::request::{
    EconomicCaseInput, ProbeInput, RevisionInput, SectionInput, StrategicCaseInput, SummaryInput,
};
use casegen_rs::templates::CasePart;
use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Generate business case content from a JSON payload.
#[derive(Parser)]
#[command(name = "casegen", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Payload file, or `-` for stdin
    #[arg(long, global = true, default_value = "-")]
    input: String,

    // ── Backend ────────────────────────────────────────────────
    /// Model identifier sent to the backend
    #[arg(long, global = true)]
    model: Option<String>,

    /// Messages endpoint URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Answer from a recorded reply file instead of the network
    #[arg(long, global = true)]
    replay: Option<PathBuf>,

    // ── Output ─────────────────────────────────────────────────
    /// Log verbosity written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: LevelFilter,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a whole case part in one call
    Case {
        #[arg(long, value_enum, default_value_t = PartArg::Strategic)]
        part: PartArg,
    },
    /// Generate the content of one section
    Section,
    /// Rewrite an excerpt to satisfy a user query
    Revise,
    /// Summarise supplementary material
    Summarise,
    /// Ask whether policy documents can be referenced
    Probe,
}

#[derive(Clone, Copy, ValueEnum)]
enum PartArg {
    Strategic,
    Economic,
}

impl From<PartArg> for CasePart {
    fn from(part: PartArg) -> Self {
        match part {
            PartArg::Strategic => CasePart::Strategic,
            PartArg::Economic => CasePart::Economic,
        }
    }
}

// ── Input ──────────────────────────────────────────────────────────

fn read_input(source: &str) -> Result<String, String> {
    if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {e}"))?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).map_err(|e| format!("failed to read {source}: {e}"))
    }
}

/// Decode a payload, accepting it bare or inside a `{"document": ...}` wrapper.
fn parse_payload<T: DeserializeOwned>(raw: &str) -> Result<T, CaseError> {
    let mut value: Value = serde_json::from_str(raw)
        .map_err(|e| CaseError::invalid_input(format!("payload is not valid JSON: {e}")))?;
    if let Some(obj) = value.as_object_mut()
        && obj.len() == 1
        && let Some(inner) = obj.remove("document")
    {
        value = inner;
    }
    serde_json::from_value(value)
        .map_err(|e| CaseError::invalid_input(format!("payload has the wrong shape: {e}")))
}

// ── Backend selection ──────────────────────────────────────────────

/// Replies recorded in a file: a JSON array of strings queues one reply per
/// element, anything else is a single fallback reply.
fn replay_backend(path: &Path) -> Result<ScriptedBackend, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    match serde_json::from_str::<Vec<String>>(&text) {
        Ok(replies) => Ok(ScriptedBackend::with_replies(replies)),
        Err(_) => Ok(ScriptedBackend::new().with_fallback(text)),
    }
}

fn build_backend(cli: &Cli) -> Result<Arc<dyn GenerationBackend>, String> {
    if let Some(path) = &cli.replay {
        debug!("Replaying backend replies from {}", path.display());
        return Ok(Arc::new(replay_backend(path)?));
    }
    let mut config = BackendConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(model) = &cli.model {
        config = config.with_model(model);
    }
    if let Some(url) = &cli.base_url {
        config = config.with_base_url(url);
    }
    let backend = MessagesBackend::new(config).map_err(|e| e.to_string())?;
    Ok(Arc::new(backend))
}

// ── Dispatch ───────────────────────────────────────────────────────

async fn run(cli: &Cli, orchestrator: &Orchestrator, raw: &str) -> Result<Value, CaseError> {
    let value = match cli.command {
        Command::Case { part } => {
            let part = CasePart::from(part);
            let document = match part {
                CasePart::Strategic => parse_payload::<StrategicCaseInput>(raw)?.into_document()?,
                CasePart::Economic => parse_payload::<EconomicCaseInput>(raw)?.into_document()?,
            };
            orchestrator.create_full_case(part, &document).await?.to_value()
        }
        Command::Section => {
            let (target, document, params) = parse_payload::<SectionInput>(raw)?.into_parts()?;
            let section = orchestrator.create_section(&document, &target, &params).await?;
            serde_json::json!({ "content": section.content })
        }
        Command::Revise => {
            let input: RevisionInput = parse_payload(raw)?;
            Value::String(orchestrator.revise_excerpt(&input).await?.0)
        }
        Command::Summarise => {
            let input: SummaryInput = parse_payload(raw)?;
            Value::String(orchestrator.summarize(input.text()).await?)
        }
        Command::Probe => {
            let input: ProbeInput = parse_payload(raw)?;
            let probes = orchestrator
                .probe_documents(input.documents.into_iter().map(|d| d.title))
                .await;
            Value::Array(probes.iter().map(DocumentProbe::to_value).collect())
        }
    };
    Ok(value)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(cli.log_level)
        .init();

    let raw = match read_input(&cli.input) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let backend = match build_backend(&cli) {
        Ok(backend) => backend,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };
    let orchestrator = Orchestrator::new(backend);

    match run(&cli, &orchestrator, &raw).await {
        Ok(value) => println!("{}", render(&value)),
        Err(e) => {
            eprintln!("Error ({}): {e}", e.kind().as_str());
            if let Some(raw_output) = e.raw_output() {
                eprintln!("--- backend output ---\n{raw_output}");
            }
            process::exit(1);
        }
    }
}
