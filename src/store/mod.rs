//! Key-addressed entity storage.
//!
//! Stores offer per-key load and upsert. A store may additionally apply a
//! whole batch atomically through [`EntityStore::save_all`]; the default
//! writes key by key. Handlers never talk to a store directly, they go
//! through a [`Batch`] that buffers one event's writes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::{Entity, EntityKind};

pub mod batch;
pub mod database;
pub mod memory;

pub use batch::Batch;
pub use database::SeaOrmStore;
pub use memory::MemoryStore;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityKey {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn of(entity: &Entity) -> Self {
        Self::new(entity.kind(), entity.key())
    }
}

/// One entity mutation, as published downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityChange {
    pub entity_type: EntityKind,
    pub key: String,
    pub value: Entity,
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn load(&self, key: &EntityKey) -> Result<Option<Entity>, StoreError>;

    /// Insert or replace the entity under its own key.
    async fn save(&self, entity: &Entity) -> Result<(), StoreError>;

    /// Write entities in order, stopping at the first failure.
    async fn save_all(&self, entities: &[Entity]) -> Result<(), StoreError> {
        for entity in entities {
            self.save(entity).await?;
        }
        Ok(())
    }
}
