//! Create `provider` table with FK to `user`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Provider::Table)
                    .if_not_exists()
                    .col(uuid(Provider::Id).primary_key())
                    .col(uuid(Provider::UserId).unique_key().not_null())
                    .col(timestamp_with_time_zone(Provider::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_user")
                            .from(Provider::Table, Provider::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Provider::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Provider { Table, Id, UserId, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
