//! `kgraph call` command
//!
//! Runs any graph operation with a JSON payload and prints the JSON result.
//!
//! # Usage
//! ```bash
//! kgraph call read_graph
//! kgraph call search_nodes '{"query": "coffee"}'
//! kgraph call create_entities -f entities.json
//! echo '{"entityNames": ["Acme"]}' | kgraph call delete_entities -
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;

use super::utils::{open_engine, print_json};
use crate::error::GraphError;
use crate::ops::dispatch;

#[derive(Args, Debug)]
pub struct CallArgs {
    /// Operation name (create_entities, search_nodes, read_graph, ...)
    pub operation: String,

    /// JSON payload, or '-' to read stdin
    pub payload: Option<String>,

    /// Read payload from file
    #[arg(short = 'f', long, conflicts_with = "payload")]
    pub file: Option<PathBuf>,

    /// Print compact JSON
    #[arg(long)]
    pub compact: bool,
}

fn read_payload(args: &CallArgs) -> Result<String> {
    if let Some(file) = &args.file {
        return std::fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()));
    }

    match args.payload.as_deref() {
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read payload from stdin")?;
            Ok(text)
        }
        Some(text) => Ok(text.to_string()),
        None => Ok(String::new()),
    }
}

pub fn run(args: CallArgs, config_path: Option<&Path>) -> Result<()> {
    let text = read_payload(&args)?;
    let payload: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text)
            .map_err(|e| GraphError::invalid(format!("payload is not valid JSON: {}", e)))?
    };

    let (mut engine, config, _) = open_engine(config_path)?;
    let result = dispatch(&mut engine, &args.operation, &payload)?;

    print_json(&result, config.output.pretty && !args.compact)
}
