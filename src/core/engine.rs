//! Graph Store Engine
//!
//! The only mutator and reader of persisted graph state. Each public
//! operation:
//! 1. validates its arguments (`InvalidArgument` before any store access)
//! 2. normalizes input (observation dedup, blank queries, empty batches)
//! 3. runs exactly one backend transaction
//!
//! The engine keeps no cache between calls. Concurrent callers each hold
//! their own engine (see [`GraphEngine::try_clone`]); isolation is the
//! store's job.

use tracing::{debug, info, warn};

use super::backend::GraphBackend;
use super::model::{
    dedup_preserving_order, validate_identifier, AddObservationsResult, CreateEntitiesResult,
    CreateRelationsResult, DeleteEntitiesResult, DeleteObservationsResult, DeleteRelationsResult,
    Entity, GraphStats, KnowledgeGraph, ObservationDeletion, ObservationInput, Relation,
};
use super::search::SearchQuery;
use super::storage::Storage;
use crate::config::StoreConfig;
use crate::error::Result;

/// Knowledge-graph engine over an owned backing store
pub struct GraphEngine<B: GraphBackend = Box<dyn GraphBackend>> {
    backend: B,
}

impl GraphEngine {
    /// Open the configured SQLite store
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let storage = Storage::open_with_timeout(&config.path, config.busy_timeout())?;
        Ok(Self::new(Box::new(storage) as Box<dyn GraphBackend>))
    }

    /// Engine over a fresh in-memory store (for testing)
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Box::new(Storage::open_memory()?) as Box<dyn GraphBackend>))
    }
}

impl<B: GraphBackend> GraphEngine<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Independent engine with its own connection to the same store
    pub fn try_clone(&self) -> Result<GraphEngine> {
        Ok(GraphEngine::new(self.backend.try_clone()?))
    }

    /// Where the data lives
    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Release the engine, returning the store handle
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Create entities that don't exist yet; existing names are skipped
    pub fn create_entities(&mut self, entities: &[Entity]) -> Result<CreateEntitiesResult> {
        for (i, entity) in entities.iter().enumerate() {
            entity.validate(i)?;
        }
        debug!(count = entities.len(), "create_entities");
        if entities.is_empty() {
            return Ok(CreateEntitiesResult::default());
        }

        let normalized: Vec<Entity> = entities
            .iter()
            .map(|e| Entity {
                name: e.name.clone(),
                entity_type: e.entity_type.clone(),
                observations: dedup_preserving_order(&e.observations),
            })
            .collect();

        let result = self.backend.create_entities(&normalized)?;
        info!(
            created = result.created.len(),
            skipped = result.skipped.len(),
            "entities created"
        );
        Ok(result)
    }

    /// Create relations between existing entities (skip-and-report)
    pub fn create_relations(&mut self, relations: &[Relation]) -> Result<CreateRelationsResult> {
        for (i, rel) in relations.iter().enumerate() {
            rel.validate(i)?;
        }
        debug!(count = relations.len(), "create_relations");
        if relations.is_empty() {
            return Ok(CreateRelationsResult::default());
        }

        let result = self.backend.create_relations(relations)?;
        for failure in &result.failed {
            warn!(
                from = %failure.relation.from,
                to = %failure.relation.to,
                relation_type = %failure.relation.relation_type,
                missing = ?failure.missing_entities,
                "relation skipped: endpoint not found"
            );
        }
        info!(
            created = result.created.len(),
            skipped = result.skipped.len(),
            failed = result.failed.len(),
            "relations created"
        );
        Ok(result)
    }

    /// Append new observations to existing entities (skip-and-report)
    pub fn add_observations(
        &mut self,
        inputs: &[ObservationInput],
    ) -> Result<AddObservationsResult> {
        for (i, input) in inputs.iter().enumerate() {
            input.validate(i)?;
        }
        debug!(count = inputs.len(), "add_observations");
        if inputs.is_empty() {
            return Ok(AddObservationsResult::default());
        }

        let normalized: Vec<ObservationInput> = inputs
            .iter()
            .map(|input| ObservationInput {
                entity_name: input.entity_name.clone(),
                contents: dedup_preserving_order(&input.contents),
            })
            .collect();

        let result = self.backend.add_observations(&normalized)?;
        for failure in &result.failed {
            warn!(entity = %failure.entity_name, "observations skipped: entity not found");
        }
        info!(
            entities = result.added.len(),
            added = result
                .added
                .iter()
                .map(|r| r.added_observations.len())
                .sum::<usize>(),
            failed = result.failed.len(),
            "observations added"
        );
        Ok(result)
    }

    /// Delete entities and every relation touching them; missing names are no-ops
    pub fn delete_entities(&mut self, names: &[String]) -> Result<DeleteEntitiesResult> {
        for (i, name) in names.iter().enumerate() {
            validate_identifier(name, &format!("entityNames[{}]", i))?;
        }
        debug!(count = names.len(), "delete_entities");
        if names.is_empty() {
            return Ok(DeleteEntitiesResult::default());
        }

        let result = self.backend.delete_entities(names)?;
        info!(
            deleted = result.deleted.len(),
            absent = result.absent.len(),
            relations_removed = result.relations_removed,
            "entities deleted"
        );
        Ok(result)
    }

    /// Delete exact relation triples; missing triples are no-ops
    pub fn delete_relations(&mut self, relations: &[Relation]) -> Result<DeleteRelationsResult> {
        for (i, rel) in relations.iter().enumerate() {
            rel.validate(i)?;
        }
        debug!(count = relations.len(), "delete_relations");
        if relations.is_empty() {
            return Ok(DeleteRelationsResult::default());
        }

        let result = self.backend.delete_relations(relations)?;
        info!(
            deleted = result.deleted.len(),
            absent = result.absent.len(),
            "relations deleted"
        );
        Ok(result)
    }

    /// Remove observation texts; missing entities or texts are no-ops
    pub fn delete_observations(
        &mut self,
        deletions: &[ObservationDeletion],
    ) -> Result<DeleteObservationsResult> {
        for (i, deletion) in deletions.iter().enumerate() {
            deletion.validate(i)?;
        }
        debug!(count = deletions.len(), "delete_observations");
        if deletions.is_empty() {
            return Ok(DeleteObservationsResult::default());
        }

        let result = self.backend.delete_observations(deletions)?;
        info!(
            entities = result.removed.len(),
            absent = result.absent.len(),
            "observations deleted"
        );
        Ok(result)
    }

    /// Every entity and relation
    pub fn read_graph(&mut self) -> Result<KnowledgeGraph> {
        let graph = self.backend.read_graph()?;
        debug!(
            entities = graph.entities.len(),
            relations = graph.relations.len(),
            "read_graph"
        );
        Ok(graph)
    }

    /// Matching entities plus the relations among them. Blank query: empty graph.
    pub fn search_nodes(&mut self, query: &str) -> Result<KnowledgeGraph> {
        let Some(parsed) = SearchQuery::parse(query) else {
            debug!("search_nodes: blank query");
            return Ok(KnowledgeGraph::default());
        };

        let graph = self.backend.search_nodes(parsed.needle())?;
        debug!(
            query = parsed.needle(),
            entities = graph.entities.len(),
            relations = graph.relations.len(),
            "search_nodes"
        );
        Ok(graph)
    }

    /// The named entities that exist, plus the relations among them
    pub fn open_nodes(&mut self, names: &[String]) -> Result<KnowledgeGraph> {
        for (i, name) in names.iter().enumerate() {
            validate_identifier(name, &format!("names[{}]", i))?;
        }
        if names.is_empty() {
            return Ok(KnowledgeGraph::default());
        }

        let graph = self.backend.open_nodes(names)?;
        debug!(
            requested = names.len(),
            found = graph.entities.len(),
            "open_nodes"
        );
        Ok(graph)
    }

    pub fn stats(&mut self) -> Result<GraphStats> {
        self.backend.stats()
    }
}
