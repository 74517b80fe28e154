//! Create `service_category` table.
//!
//! Admin-managed catalog of professions; image upload stays outside
//! the database, only a URL reference is kept.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ServiceCategory::Table)
                    .if_not_exists()
                    .col(uuid(ServiceCategory::Id).primary_key())
                    .col(string_len(ServiceCategory::Name, 100).unique_key().not_null())
                    .col(ColumnDef::new(ServiceCategory::ImageUrl).string_len(255).null())
                    .col(timestamp_with_time_zone(ServiceCategory::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ServiceCategory::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ServiceCategory { Table, Id, Name, ImageUrl, CreatedAt }
