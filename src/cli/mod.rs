//! CLI module - Command definitions and handlers

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod call;
pub mod config;
pub mod init;
pub mod search;
pub mod show;
pub mod stats;
pub mod utils;

/// kgraph - Knowledge-graph memory for AI agents
///
/// Entities, relations and observations in a local SQLite store.
#[derive(Parser, Debug)]
#[command(name = "kgraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true, env = "KGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new kgraph store
    Init(init::InitArgs),

    /// Run a graph operation with a JSON payload
    Call(call::CallArgs),

    /// Search entities by name, type or observation
    Search(search::SearchArgs),

    /// Show the whole graph
    Graph(show::GraphArgs),

    /// Show specific entities and the relations among them
    Open(show::OpenArgs),

    /// Show store statistics
    Stats(stats::StatsArgs),

    /// Show configuration
    Config(config::ConfigArgs),
}
