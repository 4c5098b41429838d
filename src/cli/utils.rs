//! CLI utility functions
//!
//! Common helpers shared across CLI commands:
//! - Engine construction from config (open_engine)
//! - JSON and table output (print_json, print_graph)

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::{Config, StoreConfig};
use crate::core::engine::GraphEngine;
use crate::core::model::KnowledgeGraph;

/// Load config, validate the store settings and open the engine
///
/// # Errors
/// Returns an error if the config can't be read, the store settings are
/// invalid, or the database can't be opened.
pub fn open_engine(config_path: Option<&Path>) -> Result<(GraphEngine, Config, StoreConfig)> {
    let config = Config::load_with(config_path)?;
    let store = config.store_config()?;

    if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let engine = GraphEngine::open(&store)?;
    Ok((engine, config, store))
}

/// Print a value as JSON on stdout
pub fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", text);
    Ok(())
}

#[derive(Tabled)]
struct EntityRow {
    name: String,
    #[tabled(rename = "type")]
    entity_type: String,
    observations: String,
}

#[derive(Tabled)]
struct RelationRow {
    from: String,
    #[tabled(rename = "relation")]
    relation_type: String,
    to: String,
}

/// Print a graph as two tables
pub fn print_graph(graph: &KnowledgeGraph) {
    if graph.entities.is_empty() {
        println!("{}", "No entities found.".dimmed());
        return;
    }

    let entities: Vec<EntityRow> = graph
        .entities
        .iter()
        .map(|e| EntityRow {
            name: e.name.clone(),
            entity_type: e.entity_type.clone(),
            observations: e.observations.join("\n"),
        })
        .collect();

    println!("{} ({})", "Entities".bold(), graph.entities.len());
    println!("{}", Table::new(entities).with(Style::rounded()));

    if !graph.relations.is_empty() {
        let relations: Vec<RelationRow> = graph
            .relations
            .iter()
            .map(|r| RelationRow {
                from: r.from.clone(),
                relation_type: r.relation_type.clone(),
                to: r.to.clone(),
            })
            .collect();

        println!("\n{} ({})", "Relations".bold(), graph.relations.len());
        println!("{}", Table::new(relations).with(Style::rounded()));
    }
}
