//! Backing store abstraction
//!
//! The engine talks to persistence only through [`GraphBackend`].
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │           GraphEngine               │
//! │   validation, logging, no-op paths  │
//! │  ┌───────────────────────────────┐  │
//! │  │      dyn GraphBackend         │  │
//! │  │  Storage (SQLite / rusqlite)  │  │
//! │  └───────────────────────────────┘  │
//! └─────────────────────────────────────┘
//! ```
//!
//! Every method is one transaction: it either commits all of its mutations
//! or none. Arguments reaching a backend are already validated, so a backend
//! only fails with `StoreUnavailable` (per-item misses are part of the
//! returned result, never an `Err`).

use super::model::{
    AddObservationsResult, CreateEntitiesResult, CreateRelationsResult, DeleteEntitiesResult,
    DeleteObservationsResult, DeleteRelationsResult, Entity, GraphStats, KnowledgeGraph,
    ObservationDeletion, ObservationInput, Relation,
};
use crate::error::Result;

/// Transactional graph operations a backing store must provide
pub trait GraphBackend: Send {
    /// Insert entities that don't exist yet. Observations arrive deduplicated.
    fn create_entities(&mut self, entities: &[Entity]) -> Result<CreateEntitiesResult>;

    /// Insert relations whose endpoints exist and whose triple is new.
    fn create_relations(&mut self, relations: &[Relation]) -> Result<CreateRelationsResult>;

    /// Append observations that are not present yet.
    fn add_observations(&mut self, inputs: &[ObservationInput]) -> Result<AddObservationsResult>;

    /// Remove entities and every relation touching them.
    fn delete_entities(&mut self, names: &[String]) -> Result<DeleteEntitiesResult>;

    /// Remove exact relation triples.
    fn delete_relations(&mut self, relations: &[Relation]) -> Result<DeleteRelationsResult>;

    /// Remove observation texts from entities.
    fn delete_observations(
        &mut self,
        deletions: &[ObservationDeletion],
    ) -> Result<DeleteObservationsResult>;

    /// Every entity and relation.
    fn read_graph(&mut self) -> Result<KnowledgeGraph>;

    /// Entities matching a non-empty query plus the relations among them.
    fn search_nodes(&mut self, query: &str) -> Result<KnowledgeGraph>;

    /// Named entities plus the relations among them.
    fn open_nodes(&mut self, names: &[String]) -> Result<KnowledgeGraph>;

    /// Row counts.
    fn stats(&mut self) -> Result<GraphStats>;

    /// Open another independent handle onto the same store.
    fn try_clone(&self) -> Result<Box<dyn GraphBackend>>;

    /// Human-readable location (file path or `:memory:`)
    fn location(&self) -> String;
}

impl GraphBackend for Box<dyn GraphBackend> {
    fn create_entities(&mut self, entities: &[Entity]) -> Result<CreateEntitiesResult> {
        (**self).create_entities(entities)
    }

    fn create_relations(&mut self, relations: &[Relation]) -> Result<CreateRelationsResult> {
        (**self).create_relations(relations)
    }

    fn add_observations(&mut self, inputs: &[ObservationInput]) -> Result<AddObservationsResult> {
        (**self).add_observations(inputs)
    }

    fn delete_entities(&mut self, names: &[String]) -> Result<DeleteEntitiesResult> {
        (**self).delete_entities(names)
    }

    fn delete_relations(&mut self, relations: &[Relation]) -> Result<DeleteRelationsResult> {
        (**self).delete_relations(relations)
    }

    fn delete_observations(
        &mut self,
        deletions: &[ObservationDeletion],
    ) -> Result<DeleteObservationsResult> {
        (**self).delete_observations(deletions)
    }

    fn read_graph(&mut self) -> Result<KnowledgeGraph> {
        (**self).read_graph()
    }

    fn search_nodes(&mut self, query: &str) -> Result<KnowledgeGraph> {
        (**self).search_nodes(query)
    }

    fn open_nodes(&mut self, names: &[String]) -> Result<KnowledgeGraph> {
        (**self).open_nodes(names)
    }

    fn stats(&mut self) -> Result<GraphStats> {
        (**self).stats()
    }

    fn try_clone(&self) -> Result<Box<dyn GraphBackend>> {
        (**self).try_clone()
    }

    fn location(&self) -> String {
        (**self).location()
    }
}
