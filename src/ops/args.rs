//! Operation argument structs
//!
//! Simple structs for deserializing operation payloads. Field names follow
//! the memory-server wire format (`entityNames`, `relationType`, ...).
//! Unknown fields are rejected so typos surface as invalid arguments.

use serde::{Deserialize, Serialize};

use crate::core::model::{Entity, ObservationDeletion, ObservationInput, Relation};

/// Create multiple new entities
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEntitiesArgs {
    pub entities: Vec<Entity>,
}

/// Create multiple new relations between existing entities
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CreateRelationsArgs {
    pub relations: Vec<Relation>,
}

/// Add observations to existing entities
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AddObservationsArgs {
    pub observations: Vec<ObservationInput>,
}

/// Delete entities and their relations
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteEntitiesArgs {
    #[serde(rename = "entityNames")]
    pub entity_names: Vec<String>,
}

/// Delete specific observations from entities
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteObservationsArgs {
    pub deletions: Vec<ObservationDeletion>,
}

/// Delete specific relations
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRelationsArgs {
    pub relations: Vec<Relation>,
}

/// Search entities by name, type and observation content
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SearchNodesArgs {
    pub query: String,
}

/// Open specific entities by name
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenNodesArgs {
    pub names: Vec<String>,
}
