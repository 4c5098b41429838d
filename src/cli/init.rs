//! `kgraph init` command
//!
//! Initializes a new kgraph store.
//!
//! # Usage
//! ```bash
//! kgraph init                    # Initialize in current directory
//! kgraph init /path/to/project   # Initialize in specific path
//! kgraph init --global           # Initialize global ~/.kgraph
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use crate::config::{Config, CONFIG_FILE, DB_FILE, DIR_NAME};
use crate::core::storage::Storage;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path to initialize (default: current directory)
    pub path: Option<PathBuf>,

    /// Initialize global store (~/.kgraph)
    #[arg(long)]
    pub global: bool,

    /// Force re-initialization (keeps existing data)
    #[arg(short, long)]
    pub force: bool,
}

pub fn run(args: InitArgs) -> Result<()> {
    // 1. Determine target path
    let base_path = if args.global {
        directories::UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not determine home directory")?
    } else {
        args.path.unwrap_or_else(|| PathBuf::from("."))
    };

    let kgraph_dir = base_path.join(DIR_NAME);

    // 2. Check if already initialized
    if kgraph_dir.exists() && !args.force {
        bail!(
            "Directory {} is already a kgraph store. Use --force to reinitialize.",
            base_path.display()
        );
    }

    fs::create_dir_all(&kgraph_dir)
        .with_context(|| format!("Failed to create {}", kgraph_dir.display()))?;

    // 3. Write default config (keep an existing one)
    let config_path = kgraph_dir.join(CONFIG_FILE);
    if !config_path.exists() {
        Config::default().save_to(&config_path)?;
    }

    // 4. Create the database with schema
    let db_path = kgraph_dir.join(DB_FILE);
    Storage::open(&db_path)?;

    tracing::info!(path = %kgraph_dir.display(), "initialized kgraph store");

    println!("{} Initialized kgraph store", "✓".green());
    println!("   Config:   {}", config_path.display());
    println!("   Database: {}", db_path.display());
    println!("\nNext steps:");
    println!(
        "  kgraph call create_entities '{{\"entities\": [{{\"name\": \"Alice\", \"entityType\": \"Person\", \"observations\": []}}]}}'"
    );
    println!("  kgraph search alice");
    println!("  kgraph graph");

    Ok(())
}
