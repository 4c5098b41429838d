//! Model - Core graph data structures
//!
//! # Key Properties
//! - **Entity**: uniquely named typed node with an ordered observation list
//! - **Relation**: directed typed edge, identified by (from, to, relationType)
//! - **Observation**: free-text fact, only exists inside an entity
//!
//! Serialized names are camelCase (`entityType`, `relationType`,
//! `entityName`) so payloads stay compatible with existing memory-server
//! clients.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

/// A node in the knowledge graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique, case-sensitive name (serves as ID)
    pub name: String,

    /// Free-form type (Person, Company, concept, ...)
    #[serde(rename = "entityType")]
    pub entity_type: String,

    /// Facts about the entity, in insertion order
    #[serde(default)]
    pub observations: Vec<String>,
}

impl Entity {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            observations: Vec::new(),
        }
    }

    pub fn with_observations<I, S>(mut self, observations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observations = observations.into_iter().map(Into::into).collect();
        self
    }
}

/// A directed edge between two existing entities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// Source entity name
    pub from: String,

    /// Target entity name
    pub to: String,

    /// Relation type, stored and compared verbatim
    #[serde(rename = "relationType")]
    pub relation_type: String,
}

impl Relation {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        relation_type: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relation_type: relation_type.into(),
        }
    }
}

/// A materialized (sub)graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub entities: Vec<Entity>,
    pub relations: Vec<Relation>,
}

impl KnowledgeGraph {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relations.is_empty()
    }

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }
}

/// Observations to append to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationInput {
    #[serde(rename = "entityName")]
    pub entity_name: String,
    pub contents: Vec<String>,
}

/// Observations to remove from one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationDeletion {
    #[serde(rename = "entityName")]
    pub entity_name: String,
    pub observations: Vec<String>,
}

// ---------------------------------------------------------------------------
// Operation results
// ---------------------------------------------------------------------------

/// Outcome of `create_entities`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEntitiesResult {
    /// Entities persisted by this call, as stored
    pub created: Vec<Entity>,
    /// Names that already existed (no-op)
    pub skipped: Vec<String>,
}

/// A relation that could not be created because an endpoint is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFailure {
    pub relation: Relation,
    #[serde(rename = "missingEntities")]
    pub missing_entities: Vec<String>,
}

impl RelationFailure {
    /// The error for the first missing endpoint
    pub fn error(&self) -> GraphError {
        let name = self
            .missing_entities
            .first()
            .cloned()
            .unwrap_or_else(|| self.relation.from.clone());
        GraphError::not_found(name)
    }
}

/// Outcome of `create_relations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateRelationsResult {
    pub created: Vec<Relation>,
    /// Triples that already existed (no-op)
    pub skipped: Vec<Relation>,
    pub failed: Vec<RelationFailure>,
}

/// Observations newly added to one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationResult {
    #[serde(rename = "entityName")]
    pub entity_name: String,
    #[serde(rename = "addedObservations")]
    pub added_observations: Vec<String>,
}

/// An observation batch targeting a missing entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationFailure {
    #[serde(rename = "entityName")]
    pub entity_name: String,
}

impl ObservationFailure {
    pub fn error(&self) -> GraphError {
        GraphError::not_found(self.entity_name.clone())
    }
}

/// Outcome of `add_observations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddObservationsResult {
    /// One entry per existing entity; empty list means all were duplicates
    pub added: Vec<ObservationResult>,
    pub failed: Vec<ObservationFailure>,
}

/// Outcome of `delete_entities`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteEntitiesResult {
    pub deleted: Vec<String>,
    /// Names that did not exist (no-op)
    pub absent: Vec<String>,
    /// Relations removed by the cascade
    #[serde(rename = "relationsRemoved")]
    pub relations_removed: usize,
}

/// Outcome of `delete_relations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRelationsResult {
    pub deleted: Vec<Relation>,
    pub absent: Vec<Relation>,
}

/// Observations actually removed from one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationRemoval {
    #[serde(rename = "entityName")]
    pub entity_name: String,
    #[serde(rename = "removedObservations")]
    pub removed_observations: Vec<String>,
}

/// Outcome of `delete_observations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteObservationsResult {
    pub removed: Vec<ObservationRemoval>,
    /// Entity names that did not exist (no-op)
    pub absent: Vec<String>,
}

/// Row counts for the whole store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub entities: usize,
    pub relations: usize,
    pub observations: usize,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check an identifier (entity name, relation endpoint, relation type)
pub fn validate_identifier(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(GraphError::invalid(format!("{} cannot be empty", field)));
    }
    if value.contains('\0') {
        return Err(GraphError::invalid(format!(
            "{} contains a NUL character",
            field
        )));
    }
    Ok(())
}

/// Check free text (entity type, observation content)
pub fn validate_text(value: &str, field: &str) -> Result<()> {
    if value.contains('\0') {
        return Err(GraphError::invalid(format!(
            "{} contains a NUL character",
            field
        )));
    }
    Ok(())
}

impl Entity {
    pub fn validate(&self, index: usize) -> Result<()> {
        validate_identifier(&self.name, &format!("entities[{}].name", index))?;
        validate_text(&self.entity_type, &format!("entities[{}].entityType", index))?;
        for (i, obs) in self.observations.iter().enumerate() {
            validate_text(obs, &format!("entities[{}].observations[{}]", index, i))?;
        }
        Ok(())
    }
}

impl Relation {
    pub fn validate(&self, index: usize) -> Result<()> {
        validate_identifier(&self.from, &format!("relations[{}].from", index))?;
        validate_identifier(&self.to, &format!("relations[{}].to", index))?;
        validate_identifier(
            &self.relation_type,
            &format!("relations[{}].relationType", index),
        )
    }
}

impl ObservationInput {
    pub fn validate(&self, index: usize) -> Result<()> {
        validate_identifier(
            &self.entity_name,
            &format!("observations[{}].entityName", index),
        )?;
        for (i, obs) in self.contents.iter().enumerate() {
            validate_text(obs, &format!("observations[{}].contents[{}]", index, i))?;
        }
        Ok(())
    }
}

impl ObservationDeletion {
    pub fn validate(&self, index: usize) -> Result<()> {
        validate_identifier(
            &self.entity_name,
            &format!("deletions[{}].entityName", index),
        )?;
        for (i, obs) in self.observations.iter().enumerate() {
            validate_text(obs, &format!("deletions[{}].observations[{}]", index, i))?;
        }
        Ok(())
    }
}

/// Drop repeated strings, keeping first-occurrence order
pub fn dedup_preserving_order(items: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|item| seen.insert(item.as_str()))
        .cloned()
        .collect()
}
