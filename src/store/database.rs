//! Postgres-backed store over the `entity_records` table.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::error;

use super::{EntityKey, EntityStore};
use crate::entities::{entity_records, prelude::EntityRecords};
use crate::error::StoreError;
use crate::models::{Entity, EntityKind};

#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EntityStore for SeaOrmStore {
    async fn load(&self, key: &EntityKey) -> Result<Option<Entity>, StoreError> {
        let row = EntityRecords::find_by_id((key.kind.as_str().to_string(), key.id.clone()))
            .one(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let entity: Entity =
            serde_json::from_value(row.data).map_err(|source| StoreError::Corrupt {
                kind: key.kind,
                key: key.id.clone(),
                source,
            })?;

        if entity.kind() != key.kind {
            return Err(StoreError::KindMismatch {
                key: key.id.clone(),
                expected: key.kind,
                found: entity.kind(),
            });
        }

        Ok(Some(entity))
    }

    async fn save(&self, entity: &Entity) -> Result<(), StoreError> {
        upsert(&self.db, entity).await
    }

    /// All rows in one transaction: either the whole event lands or none of it.
    async fn save_all(&self, entities: &[Entity]) -> Result<(), StoreError> {
        let txn = self.db.begin().await?;
        for entity in entities {
            upsert(&txn, entity).await?;
        }
        txn.commit().await.map_err(|e| {
            error!(entities = entities.len(), error = %e, "Failed to commit entity batch");
            StoreError::Database(e)
        })
    }
}

async fn upsert<C: ConnectionTrait>(conn: &C, entity: &Entity) -> Result<(), StoreError> {
    let kind: EntityKind = entity.kind();
    let data = serde_json::to_value(entity).map_err(|source| StoreError::Serialize {
        kind,
        key: entity.key().to_string(),
        source,
    })?;

    let model = entity_records::ActiveModel {
        entity_type: Set(kind.as_str().to_string()),
        entity_id: Set(entity.key().to_string()),
        data: Set(data),
        updated_at: Set(Utc::now().into()),
    };

    EntityRecords::insert(model)
        .on_conflict(
            OnConflict::columns([
                entity_records::Column::EntityType,
                entity_records::Column::EntityId,
            ])
            .update_columns([
                entity_records::Column::Data,
                entity_records::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| {
            error!(entity_type = %kind, key = %entity.key(), error = %e, "Failed to save entity");
            StoreError::Database(e)
        })?;

    Ok(())
}
