//! Stats command - Show store statistics

use std::path::Path;

use clap::Args;
use colored::Colorize;

use super::utils::open_engine;

/// Stats command arguments
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Execute stats command
pub fn execute(args: StatsArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let (mut engine, _, store) = open_engine(config_path)?;
    let stats = engine.stats()?;

    if args.json {
        let json = serde_json::json!({
            "entities": stats.entities,
            "relations": stats.relations,
            "observations": stats.observations,
            "database": store.path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        println!("{}\n", "Knowledge Graph Statistics".bold());
        println!("  Entities:       {}", stats.entities);
        println!("  Relations:      {}", stats.relations);
        println!("  Observations:   {}", stats.observations);
        if stats.entities > 0 {
            println!(
                "  Avg obs/entity: {:.1}",
                stats.observations as f64 / stats.entities as f64
            );
        }
        println!("\nDatabase: {}", store.path.display());
    }

    Ok(())
}
