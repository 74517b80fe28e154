//! Create `provider_earning` table with unique FK to `provider`.
//!
//! One accumulator row per provider, created lazily on first credit.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ProviderEarning::Table)
                    .if_not_exists()
                    .col(uuid(ProviderEarning::Id).primary_key())
                    .col(uuid(ProviderEarning::ProviderId).unique_key().not_null())
                    .col(decimal_len(ProviderEarning::TotalEarnings, 10, 2).not_null())
                    .col(timestamp_with_time_zone(ProviderEarning::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_provider_earning_provider")
                            .from(ProviderEarning::Table, ProviderEarning::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProviderEarning::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum ProviderEarning { Table, Id, ProviderId, TotalEarnings, UpdatedAt }

#[derive(DeriveIden)]
enum Provider { Table, Id }
