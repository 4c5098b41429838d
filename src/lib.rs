//! kgraph - Knowledge-graph memory for AI agents
//!
//! A persistent store of typed entities, directed typed relations between
//! them, and free-text observations attached to entities.
//!
//! ## Key Concepts
//!
//! - **Entity**: uniquely named node with a type and observation list
//! - **Relation**: directed edge `(from, to, relationType)` between existing entities
//! - **Idempotent writes**: re-creating entities/relations or re-adding
//!   observations is a no-op, never an error
//! - **Skip-and-report batches**: one failed item never blocks its siblings
//! - **One transaction per operation**: SQLite does the isolation

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod ops;

pub use config::{Config, StoreConfig};
pub use core::backend::GraphBackend;
pub use core::engine::GraphEngine;
pub use core::model::{Entity, KnowledgeGraph, ObservationDeletion, ObservationInput, Relation};
pub use core::storage::Storage;
pub use error::{GraphError, Result};
pub use ops::dispatch;
