//! `kgraph search` command
//!
//! Case-insensitive substring search over entity names, types and
//! observations. Relations are shown only when both endpoints matched.
//!
//! # Usage
//! ```bash
//! kgraph search coffee
//! kgraph search "works at" --json
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::utils::{open_engine, print_graph, print_json};

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: SearchArgs, config_path: Option<&Path>) -> Result<()> {
    let (mut engine, config, _) = open_engine(config_path)?;
    let graph = engine.search_nodes(&args.query)?;

    if args.json {
        print_json(&graph, config.output.pretty)
    } else {
        print_graph(&graph);
        Ok(())
    }
}
