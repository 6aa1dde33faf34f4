//! Per-event unit of work.
//!
//! Reads see the batch's own pending writes first, then the store. Nothing
//! reaches the store until [`Batch::commit`], which writes in last-save order
//! and returns the changelog for the event. A handler that fails leaves the
//! store untouched.

use std::collections::HashMap;

use super::{EntityChange, EntityKey, EntityStore};
use crate::error::StoreError;
use crate::models::{Entity, Record};

pub struct Batch<'a> {
    store: &'a dyn EntityStore,
    pending: HashMap<EntityKey, Entity>,
    order: Vec<EntityKey>,
}

impl<'a> Batch<'a> {
    pub fn new(store: &'a dyn EntityStore) -> Self {
        Self {
            store,
            pending: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub async fn load<T: Record>(&self, id: &str) -> Result<Option<T>, StoreError> {
        let key = EntityKey::new(T::KIND, id);
        let entity = match self.pending.get(&key) {
            Some(entity) => Some(entity.clone()),
            None => self.store.load(&key).await?,
        };

        match entity {
            None => Ok(None),
            Some(entity) => T::from_entity(entity)
                .map(Some)
                .map_err(|found| StoreError::KindMismatch {
                    key: id.to_string(),
                    expected: T::KIND,
                    found: found.kind(),
                }),
        }
    }

    pub async fn exists<T: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let key = EntityKey::new(T::KIND, id);
        if self.pending.contains_key(&key) {
            return Ok(true);
        }
        Ok(self.store.load(&key).await?.is_some())
    }

    /// Stage a write. Re-saving a key moves it to the end of the commit order.
    pub fn save<T: Record>(&mut self, value: T) {
        let entity = value.into_entity();
        let key = EntityKey::of(&entity);
        if self.pending.insert(key.clone(), entity).is_some() {
            self.order.retain(|existing| existing != &key);
        }
        self.order.push(key);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Write every staged entity in one [`EntityStore::save_all`] call.
    pub async fn commit(mut self) -> Result<Vec<EntityChange>, StoreError> {
        let entities: Vec<Entity> = std::mem::take(&mut self.order)
            .into_iter()
            .filter_map(|key| self.pending.remove(&key))
            .collect();

        self.store.save_all(&entities).await?;

        Ok(entities
            .into_iter()
            .map(|entity| EntityChange {
                entity_type: entity.kind(),
                key: entity.key().to_string(),
                value: entity,
            })
            .collect())
    }
}
