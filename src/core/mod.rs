//! Core module - Graph data model and storage
//!
//! Contains the data structures, the backing-store seam and the engine.

pub mod backend;
pub mod engine;
pub mod model;
pub mod search;
pub mod storage;
