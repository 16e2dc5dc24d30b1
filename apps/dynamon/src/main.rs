//! Dynamon - DynamoDB admin client.
//!
//! Drives the engine from the command line and prints JSON on stdout.
//!
//! # Usage
//!
//! ```text
//! dynamon tables
//! dynamon --endpoint prod scan users --where N@age:gt:30 --where name:beginsWith:A
//! echo '{"type":"read endpoints","universal":false}' | dynamon dispatch
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `DYNAMON_ENDPOINTS` | *(unset)* | JSON file holding an array of endpoints |
//! | `DYNAMON_ENDPOINT` | *(first endpoint)* | Endpoint name to act on |
//! | `DEFAULT_REGION` | `us-east-1` | Region of the built-in local endpoint |
//! | `DYNAMON_LOCAL_ENDPOINT` | `http://localhost:8000` | URL of the built-in local endpoint |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use dynamon_core::{DynamonConfig, Engine, EngineRequest, TableRequest};
use dynamon_model::condition::{Condition, ConditionOperator};
use dynamon_model::endpoint::Endpoint;
use dynamon_model::input::{CreateTableInput, DeleteTableInput};
use dynamon_state::{Message, Store};

#[derive(Debug, Parser)]
#[command(name = "dynamon", version, about = "DynamoDB admin client")]
struct Cli {
    /// Name of the configured endpoint to act on.
    #[arg(long, short, global = true, env = "DYNAMON_ENDPOINT")]
    endpoint: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the configured endpoints.
    Endpoints,
    /// Describe every table of the endpoint.
    Tables,
    /// Describe one table.
    Describe { table: String },
    /// Read the first page of a table.
    Records { table: String },
    /// Read the first page of a table through a filter.
    Scan {
        table: String,
        /// `[TYPE@]PROPERTY:OPERATOR[:VALUE]`, repeatable, ANDed in order.
        #[arg(long = "where", value_parser = parse_condition)]
        conditions: Vec<Condition>,
    },
    /// Create a table from a `CreateTable` JSON document.
    CreateTable { file: PathBuf },
    /// Delete a table.
    DeleteTable { table: String },
    /// Feed JSON-lines messages through the engine and the state store.
    Dispatch {
        /// Read messages from this file instead of stdin.
        #[arg(long)]
        input: Option<PathBuf>,
        /// Print snapshots as they change, not just the final one. Changes
        /// that land before the printer catches up are coalesced into the
        /// latest snapshot.
        #[arg(long)]
        follow: bool,
    },
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Parse `[TYPE@]PROPERTY:OPERATOR[:VALUE]`.
fn parse_condition(raw: &str) -> Result<Condition, String> {
    // A type prefix never contains ':'; any later '@' belongs to the value.
    let (value_type, rest) = match raw.split_once('@').filter(|(t, _)| !t.contains(':')) {
        Some((t, rest)) => (Some(t), rest),
        None => (None, raw),
    };
    let mut parts = rest.splitn(3, ':');
    let property = parts.next().unwrap_or_default();
    let operator = parts
        .next()
        .ok_or_else(|| format!("missing operator in {raw:?}"))?;
    let operator = ConditionOperator::from_name(operator)
        .ok_or_else(|| format!("unknown operator {operator:?}"))?;
    let value = parts.next().unwrap_or_default();

    Ok(Condition::new(property, operator, value, value_type))
}

fn select_endpoint(engine: &Engine, name: Option<&str>) -> Result<Endpoint> {
    let endpoints = engine.endpoints();
    match name {
        Some(name) => endpoints
            .iter()
            .find(|e| e.name == name)
            .cloned()
            .ok_or_else(|| anyhow!("no endpoint named {name:?}")),
        None => endpoints
            .first()
            .cloned()
            .context("no endpoints configured"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Fold every message of `input` through `store`, serving intents with
/// `engine` and dispatching their responses.
async fn dispatch<R>(engine: &Engine, store: &Store, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let message: Message = serde_json::from_str(&line)
            .with_context(|| format!("invalid message: {line}"))?;
        store.dispatch(&message);

        let Message::Intent(action) = message else {
            continue;
        };
        match engine.handle(&action).await {
            Ok(Some(response)) => {
                store.dispatch(&response.into());
            }
            Ok(None) => {}
            Err(e) => warn!(action = %action.action_type, error = %e, "action failed"),
        }
    }
    Ok(())
}

async fn run(cli: Cli, engine: Engine) -> Result<()> {
    let endpoint = || select_endpoint(&engine, cli.endpoint.as_deref());

    match cli.command {
        Command::Endpoints => print_json(&engine.endpoints()),
        Command::Tables => {
            let tables = engine.list_tables(&endpoint()?).await?;
            print_json(&tables)
        }
        Command::Describe { table } => {
            let table = engine.describe_table(&endpoint()?, &table).await?;
            print_json(&table)
        }
        Command::Records { table } => {
            let mut request = EngineRequest::new(endpoint()?);
            request.table_name = Some(table);
            print_json(&engine.list_records(&request).await?)
        }
        Command::Scan { table, conditions } => {
            let mut request = EngineRequest::new(endpoint()?);
            request.table_name = Some(table);
            request.conditions = Some(conditions);
            print_json(&engine.scan(&request).await?)
        }
        Command::CreateTable { file } => {
            let raw = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let table: CreateTableInput = serde_json::from_slice(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;
            let output = engine
                .create_table(TableRequest {
                    endpoint: endpoint()?,
                    table,
                })
                .await?;
            print_json(&output)
        }
        Command::DeleteTable { table } => {
            let output = engine
                .delete_table(TableRequest {
                    endpoint: endpoint()?,
                    table: DeleteTableInput { table_name: table },
                })
                .await?;
            print_json(&output)
        }
        Command::Dispatch { input, follow } => {
            let store = Store::default();
            let printer = follow.then(|| {
                let mut rx = store.subscribe();
                tokio::spawn(async move {
                    while rx.changed().await.is_ok() {
                        let snapshot = rx.borrow_and_update().clone();
                        if let Ok(line) = serde_json::to_string(&*snapshot) {
                            println!("{line}");
                        }
                    }
                })
            });

            match input {
                Some(path) => {
                    let file = tokio::fs::File::open(&path)
                        .await
                        .with_context(|| format!("opening {}", path.display()))?;
                    dispatch(&engine, &store, BufReader::new(file)).await?;
                }
                None => dispatch(&engine, &store, BufReader::new(tokio::io::stdin())).await?,
            }

            let state = store.state();
            drop(store);
            match printer {
                Some(printer) => printer.await.context("snapshot printer panicked")?,
                None => print_json(&*state)?,
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = DynamonConfig::from_env();
    init_tracing(&config.log_level)?;

    let engine = Engine::from_config(&config).context("failed to load endpoints")?;
    info!(endpoints = engine.endpoints().len(), "dynamon ready");

    if engine.endpoints().is_empty() {
        bail!("endpoint list is empty");
    }
    run(cli, engine).await
}
