use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use super::{EntityKey, EntityStore};
use crate::error::StoreError;
use crate::models::{Entity, EntityKind, Record};

/// In-process store used for replays and tests.
#[derive(Default)]
pub struct MemoryStore {
    entities: RwLock<HashMap<EntityKey, Entity>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed read outside of a batch.
    pub fn get<T: Record>(&self, id: &str) -> Option<T> {
        let key = EntityKey::new(T::KIND, id);
        self.entities
            .read()
            .get(&key)
            .cloned()
            .and_then(|entity| T::from_entity(entity).ok())
    }

    /// All entities of one kind, ordered by key.
    pub fn all<T: Record>(&self) -> Vec<T> {
        let mut items: Vec<(String, T)> = self
            .entities
            .read()
            .iter()
            .filter(|(key, _)| key.kind == T::KIND)
            .filter_map(|(key, entity)| {
                T::from_entity(entity.clone())
                    .ok()
                    .map(|value| (key.id.clone(), value))
            })
            .collect();
        items.sort_by(|a, b| a.0.cmp(&b.0));
        items.into_iter().map(|(_, value)| value).collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.entities
            .read()
            .keys()
            .filter(|key| key.kind == kind)
            .count()
    }

    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Copy of the full contents, for comparing replays.
    pub fn snapshot(&self) -> HashMap<EntityKey, Entity> {
        self.entities.read().clone()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn load(&self, key: &EntityKey) -> Result<Option<Entity>, StoreError> {
        Ok(self.entities.read().get(key).cloned())
    }

    async fn save(&self, entity: &Entity) -> Result<(), StoreError> {
        self.entities
            .write()
            .insert(EntityKey::of(entity), entity.clone());
        Ok(())
    }

    async fn save_all(&self, entities: &[Entity]) -> Result<(), StoreError> {
        let mut stored = self.entities.write();
        for entity in entities {
            stored.insert(EntityKey::of(entity), entity.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Holding;

    #[tokio::test]
    async fn test_save_is_last_write_wins() {
        let store = MemoryStore::new();
        let mut holding = Holding::new("0xc", "0xa");
        store.save(&holding.clone().into_entity()).await.unwrap();

        holding.balance = alloy::primitives::U256::from(9u64);
        store.save(&holding.clone().into_entity()).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get::<Holding>(&holding.id), Some(holding));
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let store = MemoryStore::new();
        let key = EntityKey::new(EntityKind::Asset, "0xabc");
        assert!(store.load(&key).await.unwrap().is_none());
        assert!(store.is_empty());
    }
}
