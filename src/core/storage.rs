//! Storage - SQLite backend
//!
//! # Key Points
//! - One connection per `Storage`; concurrent callers each open their own
//! - WAL mode + busy timeout so writers queue on SQLite's lock, not ours
//! - Writes run in `BEGIN IMMEDIATE` transactions, reads in deferred ones
//! - Uniqueness lives in the schema: entity `name` is the primary key,
//!   relation triples and (entity, observation) pairs are `UNIQUE`
//! - Relations and observations cascade on entity delete

use std::collections::HashMap;
use std::os::raw::c_int;
use std::path::{Path as FilePath, PathBuf};
use std::time::Duration;

use rusqlite::{ffi, params, Connection, OpenFlags, Transaction, TransactionBehavior};
use tracing::debug;

use super::backend::GraphBackend;
use super::model::{
    dedup_preserving_order, AddObservationsResult, CreateEntitiesResult, CreateRelationsResult,
    DeleteEntitiesResult, DeleteObservationsResult, DeleteRelationsResult, Entity, GraphStats,
    KnowledgeGraph, ObservationDeletion, ObservationFailure, ObservationInput, ObservationRemoval,
    ObservationResult, Relation, RelationFailure,
};
use super::search::{relations_within, SearchQuery};
use crate::error::{GraphError, Result, StoreContext};

/// Default time a writer waits for SQLite's lock
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entities (
    name TEXT PRIMARY KEY NOT NULL,
    entity_type TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS observations (
    entity_name TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    position INTEGER NOT NULL,
    content TEXT NOT NULL,
    UNIQUE(entity_name, content)
);

CREATE TABLE IF NOT EXISTS relations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_entity TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    to_entity TEXT NOT NULL REFERENCES entities(name) ON DELETE CASCADE,
    relation_type TEXT NOT NULL,
    UNIQUE(from_entity, to_entity, relation_type)
);

CREATE INDEX IF NOT EXISTS idx_observations_entity ON observations(entity_name, position);
CREATE INDEX IF NOT EXISTS idx_relations_from ON relations(from_entity);
CREATE INDEX IF NOT EXISTS idx_relations_to ON relations(to_entity);
"#;

/// Database storage
pub struct Storage {
    conn: Connection,
    path: Option<PathBuf>,
    busy_timeout: Duration,
}

impl Storage {
    /// Open or create a database
    pub fn open(path: &FilePath) -> Result<Self> {
        Self::open_with_timeout(path, DEFAULT_BUSY_TIMEOUT)
    }

    /// Open or create a database with an explicit busy timeout
    pub fn open_with_timeout(path: &FilePath, busy_timeout: Duration) -> Result<Self> {
        let context = format!("opening database {}", path.display());
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .store_context(&context)?;

        conn.busy_timeout(busy_timeout).store_context(&context)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .store_context(&context)?;

        debug!(path = %path.display(), "opened graph database");

        let storage = Self {
            conn,
            path: Some(path.to_path_buf()),
            busy_timeout,
        };
        storage.init_schema()?;

        Ok(storage)
    }

    /// Open an in-memory database (for testing)
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().store_context("opening in-memory database")?;
        let storage = Self {
            conn,
            path: None,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        };
        storage.init_schema()?;
        Ok(storage)
    }

    /// Open a new connection to the same database file
    pub fn clone_connection(&self) -> Result<Self> {
        match &self.path {
            Some(path) => Self::open_with_timeout(path, self.busy_timeout),
            None => Err(GraphError::unavailable(
                "an in-memory database cannot be shared across connections",
            )),
        }
    }

    /// Database file path, if any
    pub fn path(&self) -> Option<&FilePath> {
        self.path.as_deref()
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .store_context("enabling foreign keys")?;
        self.conn
            .execute_batch(SCHEMA)
            .store_context("initializing schema")?;
        debug!("graph schema ready");
        Ok(())
    }

    /// Start a write transaction, taking SQLite's write lock up front
    fn begin_write(&mut self, context: &str) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .store_context(context)
    }

    /// Start a read transaction (one consistent snapshot)
    fn begin_read(&mut self, context: &str) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .store_context(context)
    }
}

/// Extended constraint code of a failed statement, if it was a constraint violation
fn constraint_code(err: &rusqlite::Error) -> Option<c_int> {
    match err {
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            Some(e.extended_code)
        }
        _ => None,
    }
}

/// Lost a uniqueness race or hit an existing key
fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        constraint_code(err),
        Some(ffi::SQLITE_CONSTRAINT_PRIMARYKEY) | Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    constraint_code(err) == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
}

fn entity_exists(conn: &Connection, name: &str) -> rusqlite::Result<bool> {
    conn.prepare_cached("SELECT 1 FROM entities WHERE name = ?1")?
        .exists([name])
}

/// Endpoints of `rel` that are not stored, without repeats
fn missing_endpoints(conn: &Connection, rel: &Relation) -> rusqlite::Result<Vec<String>> {
    let mut missing = Vec::new();
    for endpoint in [&rel.from, &rel.to] {
        if !missing.contains(endpoint) && !entity_exists(conn, endpoint)? {
            missing.push(endpoint.clone());
        }
    }
    Ok(missing)
}

/// Load entities (all, or only `names`) with their observations in order
fn load_entities(conn: &Connection, names: Option<&[String]>) -> rusqlite::Result<Vec<Entity>> {
    let mut entities = Vec::new();

    match names {
        None => {
            let mut stmt =
                conn.prepare("SELECT name, entity_type FROM entities ORDER BY rowid")?;
            let rows = stmt.query_map([], |row| {
                Ok(Entity::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                entities.push(row?);
            }
        }
        Some(names) => {
            let mut stmt =
                conn.prepare_cached("SELECT name, entity_type FROM entities WHERE name = ?1")?;
            for name in dedup_preserving_order(names) {
                let mut rows = stmt.query_map([&name], |row| {
                    Ok(Entity::new(row.get::<_, String>(0)?, row.get::<_, String>(1)?))
                })?;
                if let Some(entity) = rows.next() {
                    entities.push(entity?);
                }
            }
        }
    }

    attach_observations(conn, &mut entities, names.is_some())?;
    Ok(entities)
}

/// Fill in observations. `scoped` reads only the given entities' rows
/// instead of scanning the whole table.
fn attach_observations(
    conn: &Connection,
    entities: &mut [Entity],
    scoped: bool,
) -> rusqlite::Result<()> {
    if entities.is_empty() {
        return Ok(());
    }

    if scoped {
        let mut stmt = conn.prepare_cached(
            "SELECT content FROM observations WHERE entity_name = ?1 ORDER BY position",
        )?;
        for entity in entities.iter_mut() {
            let rows = stmt.query_map([&entity.name], |row| row.get::<_, String>(0))?;
            for row in rows {
                entity.observations.push(row?);
            }
        }
        return Ok(());
    }

    let index: HashMap<String, usize> = entities
        .iter()
        .enumerate()
        .map(|(i, e)| (e.name.clone(), i))
        .collect();

    let mut stmt = conn.prepare(
        "SELECT entity_name, content FROM observations ORDER BY entity_name, position",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
    })?;

    for row in rows {
        let (name, content) = row?;
        if let Some(&i) = index.get(&name) {
            entities[i].observations.push(content);
        }
    }
    Ok(())
}

fn row_to_relation(row: &rusqlite::Row) -> rusqlite::Result<Relation> {
    Ok(Relation {
        from: row.get("from_entity")?,
        to: row.get("to_entity")?,
        relation_type: row.get("relation_type")?,
    })
}

fn load_relations(conn: &Connection) -> rusqlite::Result<Vec<Relation>> {
    let mut stmt = conn
        .prepare("SELECT from_entity, to_entity, relation_type FROM relations ORDER BY id")?;
    let relations = stmt
        .query_map([], row_to_relation)?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    Ok(relations)
}

/// Relations leaving any of `entities`, restricted to those landing inside the set
fn load_relations_among(conn: &Connection, entities: &[Entity]) -> rusqlite::Result<Vec<Relation>> {
    let mut stmt = conn.prepare_cached(
        "SELECT from_entity, to_entity, relation_type FROM relations WHERE from_entity = ?1 ORDER BY id",
    )?;

    let mut outgoing = Vec::new();
    for entity in entities {
        let rows = stmt.query_map([&entity.name], row_to_relation)?;
        for row in rows {
            outgoing.push(row?);
        }
    }
    Ok(relations_within(entities, outgoing))
}

impl GraphBackend for Storage {
    fn create_entities(&mut self, entities: &[Entity]) -> Result<CreateEntitiesResult> {
        let tx = self.begin_write("starting create_entities")?;
        let mut result = CreateEntitiesResult::default();

        {
            let mut insert_entity = tx
                .prepare_cached("INSERT INTO entities (name, entity_type) VALUES (?1, ?2)")
                .store_context("preparing entity insert")?;
            let mut insert_observation = tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO observations (entity_name, position, content) VALUES (?1, ?2, ?3)",
                )
                .store_context("preparing observation insert")?;

            for entity in entities {
                match insert_entity.execute(params![&entity.name, &entity.entity_type]) {
                    Ok(_) => {
                        let observations = dedup_preserving_order(&entity.observations);
                        for (position, content) in observations.iter().enumerate() {
                            insert_observation
                                .execute(params![&entity.name, position as i64, content])
                                .store_context("inserting observation")?;
                        }
                        result.created.push(Entity {
                            name: entity.name.clone(),
                            entity_type: entity.entity_type.clone(),
                            observations,
                        });
                    }
                    // Existing name, or a concurrent creator got there first
                    Err(e) if is_unique_violation(&e) => result.skipped.push(entity.name.clone()),
                    Err(e) => return Err(GraphError::store("inserting entity", e)),
                }
            }
        }

        tx.commit().store_context("committing create_entities")?;
        Ok(result)
    }

    fn create_relations(&mut self, relations: &[Relation]) -> Result<CreateRelationsResult> {
        let tx = self.begin_write("starting create_relations")?;
        let mut result = CreateRelationsResult::default();

        {
            let mut insert = tx
                .prepare_cached(
                    "INSERT INTO relations (from_entity, to_entity, relation_type) VALUES (?1, ?2, ?3)",
                )
                .store_context("preparing relation insert")?;

            for rel in relations {
                let missing =
                    missing_endpoints(&tx, rel).store_context("checking relation endpoints")?;
                if !missing.is_empty() {
                    result.failed.push(RelationFailure {
                        relation: rel.clone(),
                        missing_entities: missing,
                    });
                    continue;
                }

                match insert.execute(params![&rel.from, &rel.to, &rel.relation_type]) {
                    Ok(_) => result.created.push(rel.clone()),
                    Err(e) if is_unique_violation(&e) => result.skipped.push(rel.clone()),
                    Err(e) if is_foreign_key_violation(&e) => {
                        let missing = missing_endpoints(&tx, rel)
                            .store_context("checking relation endpoints")?;
                        result.failed.push(RelationFailure {
                            relation: rel.clone(),
                            missing_entities: missing,
                        });
                    }
                    Err(e) => return Err(GraphError::store("inserting relation", e)),
                }
            }
        }

        tx.commit().store_context("committing create_relations")?;
        Ok(result)
    }

    fn add_observations(&mut self, inputs: &[ObservationInput]) -> Result<AddObservationsResult> {
        let tx = self.begin_write("starting add_observations")?;
        let mut result = AddObservationsResult::default();

        {
            let mut next_position = tx
                .prepare_cached(
                    "SELECT COALESCE(MAX(position), -1) + 1 FROM observations WHERE entity_name = ?1",
                )
                .store_context("preparing position lookup")?;
            let mut insert = tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO observations (entity_name, position, content) VALUES (?1, ?2, ?3)",
                )
                .store_context("preparing observation insert")?;

            for input in inputs {
                if !entity_exists(&tx, &input.entity_name).store_context("looking up entity")? {
                    result.failed.push(ObservationFailure {
                        entity_name: input.entity_name.clone(),
                    });
                    continue;
                }

                let mut position: i64 = next_position
                    .query_row([&input.entity_name], |row| row.get(0))
                    .store_context("reading observation position")?;

                let mut added = Vec::new();
                for content in &input.contents {
                    let inserted = insert
                        .execute(params![&input.entity_name, position, content])
                        .store_context("inserting observation")?;
                    if inserted > 0 {
                        added.push(content.clone());
                        position += 1;
                    }
                }

                result.added.push(ObservationResult {
                    entity_name: input.entity_name.clone(),
                    added_observations: added,
                });
            }
        }

        tx.commit().store_context("committing add_observations")?;
        Ok(result)
    }

    fn delete_entities(&mut self, names: &[String]) -> Result<DeleteEntitiesResult> {
        let tx = self.begin_write("starting delete_entities")?;
        let mut result = DeleteEntitiesResult::default();

        for name in names {
            if !entity_exists(&tx, name).store_context("looking up entity")? {
                result.absent.push(name.clone());
                continue;
            }

            result.relations_removed += tx
                .execute(
                    "DELETE FROM relations WHERE from_entity = ?1 OR to_entity = ?1",
                    [name],
                )
                .store_context("deleting entity relations")?;
            tx.execute("DELETE FROM observations WHERE entity_name = ?1", [name])
                .store_context("deleting entity observations")?;
            tx.execute("DELETE FROM entities WHERE name = ?1", [name])
                .store_context("deleting entity")?;

            result.deleted.push(name.clone());
        }

        tx.commit().store_context("committing delete_entities")?;
        Ok(result)
    }

    fn delete_relations(&mut self, relations: &[Relation]) -> Result<DeleteRelationsResult> {
        let tx = self.begin_write("starting delete_relations")?;
        let mut result = DeleteRelationsResult::default();

        {
            let mut delete = tx
                .prepare_cached(
                    "DELETE FROM relations WHERE from_entity = ?1 AND to_entity = ?2 AND relation_type = ?3",
                )
                .store_context("preparing relation delete")?;

            for rel in relations {
                let deleted = delete
                    .execute(params![&rel.from, &rel.to, &rel.relation_type])
                    .store_context("deleting relation")?;
                if deleted > 0 {
                    result.deleted.push(rel.clone());
                } else {
                    result.absent.push(rel.clone());
                }
            }
        }

        tx.commit().store_context("committing delete_relations")?;
        Ok(result)
    }

    fn delete_observations(
        &mut self,
        deletions: &[ObservationDeletion],
    ) -> Result<DeleteObservationsResult> {
        let tx = self.begin_write("starting delete_observations")?;
        let mut result = DeleteObservationsResult::default();

        {
            let mut delete = tx
                .prepare_cached(
                    "DELETE FROM observations WHERE entity_name = ?1 AND content = ?2",
                )
                .store_context("preparing observation delete")?;

            for deletion in deletions {
                if !entity_exists(&tx, &deletion.entity_name).store_context("looking up entity")? {
                    result.absent.push(deletion.entity_name.clone());
                    continue;
                }

                let mut removed = Vec::new();
                for content in dedup_preserving_order(&deletion.observations) {
                    let deleted = delete
                        .execute(params![&deletion.entity_name, &content])
                        .store_context("deleting observation")?;
                    if deleted > 0 {
                        removed.push(content);
                    }
                }

                result.removed.push(ObservationRemoval {
                    entity_name: deletion.entity_name.clone(),
                    removed_observations: removed,
                });
            }
        }

        tx.commit().store_context("committing delete_observations")?;
        Ok(result)
    }

    fn read_graph(&mut self) -> Result<KnowledgeGraph> {
        let tx = self.begin_read("starting read_graph")?;
        let entities = load_entities(&tx, None).store_context("reading entities")?;
        let relations = load_relations(&tx).store_context("reading relations")?;
        tx.commit().store_context("finishing read_graph")?;

        Ok(KnowledgeGraph {
            entities,
            relations,
        })
    }

    fn search_nodes(&mut self, query: &str) -> Result<KnowledgeGraph> {
        let Some(query) = SearchQuery::parse(query) else {
            return Ok(KnowledgeGraph::default());
        };

        let tx = self.begin_read("starting search_nodes")?;
        let entities: Vec<Entity> = load_entities(&tx, None)
            .store_context("reading entities")?
            .into_iter()
            .filter(|e| query.matches(e))
            .collect();
        let relations =
            load_relations_among(&tx, &entities).store_context("reading relations")?;
        tx.commit().store_context("finishing search_nodes")?;

        Ok(KnowledgeGraph {
            entities,
            relations,
        })
    }

    fn open_nodes(&mut self, names: &[String]) -> Result<KnowledgeGraph> {
        if names.is_empty() {
            return Ok(KnowledgeGraph::default());
        }

        let tx = self.begin_read("starting open_nodes")?;
        let entities = load_entities(&tx, Some(names)).store_context("reading entities")?;
        let relations =
            load_relations_among(&tx, &entities).store_context("reading relations")?;
        tx.commit().store_context("finishing open_nodes")?;

        Ok(KnowledgeGraph {
            entities,
            relations,
        })
    }

    fn stats(&mut self) -> Result<GraphStats> {
        let tx = self.begin_read("starting stats")?;
        let count = |table: &str| -> Result<usize> {
            let n: i64 = tx
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })
                .store_context("counting rows")?;
            Ok(n as usize)
        };

        let stats = GraphStats {
            entities: count("entities")?,
            relations: count("relations")?,
            observations: count("observations")?,
        };
        tx.commit().store_context("finishing stats")?;
        Ok(stats)
    }

    fn try_clone(&self) -> Result<Box<dyn GraphBackend>> {
        Ok(Box::new(self.clone_connection()?))
    }

    fn location(&self) -> String {
        self.path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn seeded() -> Result<Storage> {
        let mut storage = Storage::open_memory()?;
        storage.create_entities(&[
            Entity::new("Alice", "Person").with_observations(["engineer", "likes coffee"]),
            Entity::new("Bob", "Person"),
            Entity::new("Acme", "Company"),
        ])?;
        Ok(storage)
    }

    #[test]
    fn test_create_and_read() -> Result<()> {
        let mut storage = seeded()?;

        let graph = storage.read_graph()?;
        let names: Vec<_> = graph.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Acme"]);
        assert_eq!(
            graph.entity("Alice").unwrap().observations,
            vec!["engineer", "likes coffee"]
        );

        Ok(())
    }

    #[test]
    fn test_create_existing_is_skipped() -> Result<()> {
        let mut storage = seeded()?;

        let result = storage.create_entities(&[
            Entity::new("Alice", "Robot").with_observations(["other"]),
            Entity::new("Carol", "Person"),
        ])?;

        assert_eq!(result.skipped, vec!["Alice"]);
        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].name, "Carol");

        // First write wins; nothing merged into the existing entity
        let graph = storage.read_graph()?;
        let alice = graph.entity("Alice").unwrap();
        assert_eq!(alice.entity_type, "Person");
        assert!(!alice.observations.contains(&"other".to_string()));

        Ok(())
    }

    #[test]
    fn test_duplicate_name_within_batch() -> Result<()> {
        let mut storage = Storage::open_memory()?;

        let result = storage.create_entities(&[
            Entity::new("Dup", "First"),
            Entity::new("Dup", "Second"),
        ])?;

        assert_eq!(result.created.len(), 1);
        assert_eq!(result.created[0].entity_type, "First");
        assert_eq!(result.skipped, vec!["Dup"]);

        Ok(())
    }

    #[test]
    fn test_relation_missing_endpoint_reported() -> Result<()> {
        let mut storage = seeded()?;

        let result = storage.create_relations(&[
            Relation::new("Alice", "Acme", "works_at"),
            Relation::new("Alice", "Ghost", "knows"),
            Relation::new("Nobody", "Nobody", "is"),
        ])?;

        assert_eq!(result.created, vec![Relation::new("Alice", "Acme", "works_at")]);
        assert_eq!(result.failed.len(), 2);
        assert_eq!(result.failed[0].missing_entities, vec!["Ghost"]);
        assert_eq!(result.failed[1].missing_entities, vec!["Nobody"]);

        assert_eq!(storage.read_graph()?.relations.len(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_relation_skipped() -> Result<()> {
        let mut storage = seeded()?;
        let rel = Relation::new("Alice", "Bob", "knows");

        storage.create_relations(std::slice::from_ref(&rel))?;
        let again = storage.create_relations(std::slice::from_ref(&rel))?;

        assert!(again.created.is_empty());
        assert_eq!(again.skipped, vec![rel]);
        assert_eq!(storage.stats()?.relations, 1);
        Ok(())
    }

    #[test]
    fn test_relation_direction_matters() -> Result<()> {
        let mut storage = seeded()?;

        let result = storage.create_relations(&[
            Relation::new("Alice", "Bob", "knows"),
            Relation::new("Bob", "Alice", "knows"),
        ])?;

        assert_eq!(result.created.len(), 2);
        Ok(())
    }

    #[test]
    fn test_add_observations() -> Result<()> {
        let mut storage = seeded()?;

        let result = storage.add_observations(&[
            ObservationInput {
                entity_name: "Alice".to_string(),
                contents: vec![
                    "likes coffee".to_string(),
                    "plays chess".to_string(),
                    "plays chess".to_string(),
                ],
            },
            ObservationInput {
                entity_name: "Ghost".to_string(),
                contents: vec!["boo".to_string()],
            },
        ])?;

        assert_eq!(result.added.len(), 1);
        assert_eq!(result.added[0].added_observations, vec!["plays chess"]);
        assert_eq!(result.failed[0].entity_name, "Ghost");

        let graph = storage.read_graph()?;
        assert_eq!(
            graph.entity("Alice").unwrap().observations,
            vec!["engineer", "likes coffee", "plays chess"]
        );
        Ok(())
    }

    #[test]
    fn test_delete_entity_cascades() -> Result<()> {
        let mut storage = seeded()?;
        storage.create_relations(&[
            Relation::new("Alice", "Bob", "knows"),
            Relation::new("Bob", "Alice", "knows"),
            Relation::new("Bob", "Acme", "works_at"),
        ])?;

        let result = storage.delete_entities(&["Alice".to_string(), "Ghost".to_string()])?;
        assert_eq!(result.deleted, vec!["Alice"]);
        assert_eq!(result.absent, vec!["Ghost"]);
        assert_eq!(result.relations_removed, 2);

        let graph = storage.read_graph()?;
        assert_eq!(graph.entities.len(), 2);
        assert_eq!(graph.relations, vec![Relation::new("Bob", "Acme", "works_at")]);

        let stats = storage.stats()?;
        assert_eq!(stats.observations, 0);
        Ok(())
    }

    #[test]
    fn test_delete_relations() -> Result<()> {
        let mut storage = seeded()?;
        storage.create_relations(&[Relation::new("Alice", "Bob", "knows")])?;

        let result = storage.delete_relations(&[
            Relation::new("Alice", "Bob", "knows"),
            Relation::new("Alice", "Bob", "KNOWS"),
        ])?;

        assert_eq!(result.deleted.len(), 1);
        assert_eq!(result.absent, vec![Relation::new("Alice", "Bob", "KNOWS")]);
        assert_eq!(storage.read_graph()?.entities.len(), 3);
        Ok(())
    }

    #[test]
    fn test_delete_observations_keeps_entity() -> Result<()> {
        let mut storage = seeded()?;

        let result = storage.delete_observations(&[
            ObservationDeletion {
                entity_name: "Alice".to_string(),
                observations: vec![
                    "engineer".to_string(),
                    "likes coffee".to_string(),
                    "never said".to_string(),
                ],
            },
            ObservationDeletion {
                entity_name: "Ghost".to_string(),
                observations: vec!["x".to_string()],
            },
        ])?;

        assert_eq!(
            result.removed[0].removed_observations,
            vec!["engineer", "likes coffee"]
        );
        assert_eq!(result.absent, vec!["Ghost"]);

        let graph = storage.read_graph()?;
        let alice = graph.entity("Alice").unwrap();
        assert!(alice.observations.is_empty());
        Ok(())
    }

    #[test]
    fn test_positions_continue_after_delete() -> Result<()> {
        let mut storage = seeded()?;
        storage.delete_observations(&[ObservationDeletion {
            entity_name: "Alice".to_string(),
            observations: vec!["engineer".to_string()],
        }])?;
        storage.add_observations(&[ObservationInput {
            entity_name: "Alice".to_string(),
            contents: vec!["engineer".to_string()],
        }])?;

        let graph = storage.read_graph()?;
        assert_eq!(
            graph.entity("Alice").unwrap().observations,
            vec!["likes coffee", "engineer"]
        );
        Ok(())
    }

    #[test]
    fn test_search_scopes_relations() -> Result<()> {
        let mut storage = seeded()?;
        storage.create_relations(&[
            Relation::new("Alice", "Acme", "works_at"),
            Relation::new("Alice", "Bob", "knows"),
        ])?;

        let graph = storage.search_nodes("cof")?;
        assert_eq!(graph.entities.len(), 1);
        assert_eq!(graph.entities[0].name, "Alice");
        assert!(graph.relations.is_empty());

        let graph = storage.search_nodes("person")?;
        assert_eq!(graph.entities.len(), 2);
        assert_eq!(graph.relations, vec![Relation::new("Alice", "Bob", "knows")]);

        assert!(storage.search_nodes("   ")?.is_empty());
        Ok(())
    }

    #[test]
    fn test_open_nodes() -> Result<()> {
        let mut storage = seeded()?;
        storage.create_relations(&[
            Relation::new("Alice", "Acme", "works_at"),
            Relation::new("Bob", "Acme", "works_at"),
        ])?;

        let graph = storage.open_nodes(&[
            "Acme".to_string(),
            "Alice".to_string(),
            "Ghost".to_string(),
        ])?;

        let names: Vec<_> = graph.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Alice"]);
        assert_eq!(graph.relations, vec![Relation::new("Alice", "Acme", "works_at")]);
        Ok(())
    }

    #[test]
    fn test_open_nodes_reads_only_requested_observations() -> Result<()> {
        let mut storage = seeded()?;
        storage.add_observations(&[ObservationInput {
            entity_name: "Acme".into(),
            contents: vec!["founded 1990".into()],
        }])?;

        let graph = storage.open_nodes(&["Alice".to_string(), "Bob".to_string()])?;
        assert_eq!(graph.entities[0].observations, vec!["engineer", "likes coffee"]);
        assert!(graph.entities[1].observations.is_empty());

        let graph = storage.open_nodes(&["Acme".to_string()])?;
        assert_eq!(graph.entities[0].observations, vec!["founded 1990"]);
        Ok(())
    }

    #[test]
    fn test_stats_counts() -> Result<()> {
        let mut storage = seeded()?;
        storage.create_relations(&[Relation::new("Bob", "Acme", "works_at")])?;

        let stats = storage.stats()?;
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.relations, 1);
        assert_eq!(stats.observations, 2);
        Ok(())
    }

    #[test]
    fn test_memory_store_cannot_clone() -> Result<()> {
        let storage = Storage::open_memory()?;
        let err = storage.clone_connection().err().unwrap();
        assert!(err.is_store_unavailable());
        assert!(std::error::Error::source(&err).is_none());
        Ok(())
    }

    #[test]
    fn test_file_store_shared_between_connections() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("graph.db");

        let mut first = Storage::open(&path)?;
        let mut second = first.clone_connection()?;

        first.create_entities(&[Entity::new("Alice", "Person")])?;
        let result = second.create_entities(&[Entity::new("Alice", "Person")])?;

        assert!(result.created.is_empty());
        assert_eq!(second.read_graph()?.entities.len(), 1);
        assert_eq!(second.location(), path.display().to_string());
        Ok(())
    }
}
