//! `kgraph config` command
//!
//! Shows the effective configuration.
//!
//! # Usage
//! ```bash
//! kgraph config            # Show effective config
//! kgraph config --path     # Show config file locations
//! ```

use std::path::Path;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use crate::config::{Config, CONFIG_FILE, DIR_NAME};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Show config file paths
    #[arg(long)]
    pub path: bool,
}

pub fn run(args: ConfigArgs, config_path: Option<&Path>) -> Result<()> {
    if args.path {
        let global = Config::global_config_path()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(no home directory)".to_string());
        let local = Config::find_local_config()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| format!("(none; would be ./{}/{})", DIR_NAME, CONFIG_FILE));

        println!("Global: {}", global);
        println!("Local:  {}", local);
        return Ok(());
    }

    let config = Config::load_with(config_path)?;
    let store = config.store_config()?;

    let source = config
        .source
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(defaults)".to_string());

    println!("{} {}", "Config:".bold(), source);
    println!("{} {}", "Database:".bold(), store.path.display());
    println!();
    print!("{}", toml::to_string_pretty(&config)?);

    Ok(())
}
