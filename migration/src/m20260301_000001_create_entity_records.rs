use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (entity type, key); the payload is the serialized entity
        manager
            .create_table(
                Table::create()
                    .table(EntityRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EntityRecords::EntityType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EntityRecords::EntityId)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EntityRecords::Data).json_binary().not_null())
                    .col(
                        ColumnDef::new(EntityRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(EntityRecords::EntityType)
                            .col(EntityRecords::EntityId),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_entity_records_type")
                    .table(EntityRecords::Table)
                    .col(EntityRecords::EntityType)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(EntityRecords::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum EntityRecords {
    Table,
    EntityType,
    EntityId,
    Data,
    UpdatedAt,
}
