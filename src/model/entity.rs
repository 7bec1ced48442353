//! Entity types that categories can resolve foreign keys into.

use serde::{Deserialize, Serialize};

/// An entity table reachable from the articles table by foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Medium,
}

impl Entity {
    pub fn name(&self) -> &'static str {
        match self {
            Entity::Medium => "medium",
        }
    }

    /// Foreign-key column on the articles table, also the entity table's key.
    pub fn key_column(&self) -> &'static str {
        match self {
            Entity::Medium => "medium_id",
        }
    }

    /// Human readable column on the entity table.
    pub fn label_column(&self) -> &'static str {
        match self {
            Entity::Medium => "name",
        }
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A resolved entity row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntityObject {
    pub entity: Entity,
    pub id: i64,
    pub name: String,
}

impl EntityObject {
    pub fn new(entity: Entity, id: i64, name: impl Into<String>) -> Self {
        Self {
            entity,
            id,
            name: name.into(),
        }
    }
}
