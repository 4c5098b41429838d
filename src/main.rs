//! kgraph CLI - Entry point
//!
//! Usage: kgraph <command> [options]

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use kgraph::cli::{Cli, Commands};
use kgraph::GraphError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean
    let filter = if cli.verbose {
        EnvFilter::new("kgraph=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init(args) => kgraph::cli::init::run(args),
        Commands::Call(args) => kgraph::cli::call::run(args, config),
        Commands::Search(args) => kgraph::cli::search::run(args, config),
        Commands::Graph(args) => kgraph::cli::show::run_graph(args, config),
        Commands::Open(args) => kgraph::cli::show::run_open(args, config),
        Commands::Stats(args) => kgraph::cli::stats::execute(args, config),
        Commands::Config(args) => kgraph::cli::config::run(args, config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            exit_code(&err)
        }
    }
}

/// 2 for rejected input, 3 for an unreachable store, 1 otherwise
fn exit_code(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<GraphError>() {
        Some(e) if e.is_invalid_argument() => ExitCode::from(2),
        Some(e) if e.is_store_unavailable() => ExitCode::from(3),
        _ => ExitCode::from(1),
    }
}
