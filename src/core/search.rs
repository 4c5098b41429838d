//! Search - Substring matching over entities
//!
//! Matching is case-insensitive (Unicode lowercase) and looks at the entity
//! name, its type and each observation. SQLite's `lower()`/`LIKE` only fold
//! ASCII, so rows are matched here instead of in SQL.

use std::collections::HashSet;

use super::model::{Entity, Relation};

/// A lowercased search needle
#[derive(Debug, Clone)]
pub struct SearchQuery {
    needle: String,
}

impl SearchQuery {
    /// Build a query; `None` when the text is blank.
    ///
    /// Surrounding whitespace is part of the needle.
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            needle: text.to_lowercase(),
        })
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }

    fn hit(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    /// Whether the entity's name, type or any observation contains the needle
    pub fn matches(&self, entity: &Entity) -> bool {
        self.hit(&entity.name)
            || self.hit(&entity.entity_type)
            || entity.observations.iter().any(|obs| self.hit(obs))
    }
}

/// Keep only relations whose both endpoints are in `entities`
pub fn relations_within(entities: &[Entity], relations: Vec<Relation>) -> Vec<Relation> {
    let names: HashSet<&str> = entities.iter().map(|e| e.name.as_str()).collect();
    relations
        .into_iter()
        .filter(|r| names.contains(r.from.as_str()) && names.contains(r.to.as_str()))
        .collect()
}
