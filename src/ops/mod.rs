//! Operation dispatch
//!
//! Maps an operation name plus a JSON payload onto a [`GraphEngine`] call
//! and returns the JSON-serialized result. Used by `kgraph call`, and by any
//! embedding that receives loosely-typed requests.
//!
//! # Operations
//! - `create_entities` - `{"entities": [{name, entityType, observations}]}`
//! - `create_relations` - `{"relations": [{from, to, relationType}]}`
//! - `add_observations` - `{"observations": [{entityName, contents}]}`
//! - `delete_entities` - `{"entityNames": [..]}`
//! - `delete_observations` - `{"deletions": [{entityName, observations}]}`
//! - `delete_relations` - `{"relations": [{from, to, relationType}]}`
//! - `read_graph` - `{}`
//! - `search_nodes` - `{"query": ".."}`
//! - `open_nodes` - `{"names": [..]}`

pub mod args;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::core::backend::GraphBackend;
use crate::core::engine::GraphEngine;
use crate::error::{GraphError, Result};
use args::*;

/// Every operation name `dispatch` understands
pub const OPERATIONS: &[&str] = &[
    "create_entities",
    "create_relations",
    "add_observations",
    "delete_entities",
    "delete_observations",
    "delete_relations",
    "read_graph",
    "search_nodes",
    "open_nodes",
];

fn parse<T: DeserializeOwned>(operation: &str, payload: &Value) -> Result<T> {
    serde_json::from_value(payload.clone())
        .map_err(|e| GraphError::invalid(format!("{}: {}", operation, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Run one operation against the engine
pub fn dispatch<B: GraphBackend>(
    engine: &mut GraphEngine<B>,
    operation: &str,
    payload: &Value,
) -> Result<Value> {
    // `read_graph` takes no arguments; accept a missing payload too
    let empty = Value::Object(Default::default());
    let payload = if payload.is_null() { &empty } else { payload };

    match operation {
        "create_entities" => {
            let args: CreateEntitiesArgs = parse(operation, payload)?;
            to_json(&engine.create_entities(&args.entities)?)
        }
        "create_relations" => {
            let args: CreateRelationsArgs = parse(operation, payload)?;
            to_json(&engine.create_relations(&args.relations)?)
        }
        "add_observations" => {
            let args: AddObservationsArgs = parse(operation, payload)?;
            to_json(&engine.add_observations(&args.observations)?)
        }
        "delete_entities" => {
            let args: DeleteEntitiesArgs = parse(operation, payload)?;
            to_json(&engine.delete_entities(&args.entity_names)?)
        }
        "delete_observations" => {
            let args: DeleteObservationsArgs = parse(operation, payload)?;
            to_json(&engine.delete_observations(&args.deletions)?)
        }
        "delete_relations" => {
            let args: DeleteRelationsArgs = parse(operation, payload)?;
            to_json(&engine.delete_relations(&args.relations)?)
        }
        "read_graph" => {
            if !payload.is_object() {
                return Err(GraphError::invalid("read_graph: expected an object"));
            }
            to_json(&engine.read_graph()?)
        }
        "search_nodes" => {
            let args: SearchNodesArgs = parse(operation, payload)?;
            to_json(&engine.search_nodes(&args.query)?)
        }
        "open_nodes" => {
            let args: OpenNodesArgs = parse(operation, payload)?;
            to_json(&engine.open_nodes(&args.names)?)
        }
        _ => Err(GraphError::invalid(format!(
            "Unknown operation: {}. Available: {}",
            operation,
            OPERATIONS.join(", ")
        ))),
    }
}
