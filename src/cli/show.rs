//! `kgraph graph` and `kgraph open` commands
//!
//! # Usage
//! ```bash
//! kgraph graph                 # Whole graph as tables
//! kgraph graph --json          # Whole graph as JSON
//! kgraph open Alice Acme       # Named entities and relations among them
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;

use super::utils::{open_engine, print_graph, print_json};

#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct OpenArgs {
    /// Entity names
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run_graph(args: GraphArgs, config_path: Option<&Path>) -> Result<()> {
    let (mut engine, config, _) = open_engine(config_path)?;
    let graph = engine.read_graph()?;

    if args.json {
        print_json(&graph, config.output.pretty)
    } else {
        print_graph(&graph);
        Ok(())
    }
}

pub fn run_open(args: OpenArgs, config_path: Option<&Path>) -> Result<()> {
    let (mut engine, config, _) = open_engine(config_path)?;
    let graph = engine.open_nodes(&args.names)?;

    if args.json {
        print_json(&graph, config.output.pretty)
    } else {
        print_graph(&graph);
        Ok(())
    }
}
