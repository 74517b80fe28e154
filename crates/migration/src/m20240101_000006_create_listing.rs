//! Create `listing` table with FKs to `provider` and `service_category`.
//!
//! A provider's priced offering of a category.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Listing::Table)
                    .if_not_exists()
                    .col(uuid(Listing::Id).primary_key())
                    .col(uuid(Listing::ProviderId).not_null())
                    .col(uuid(Listing::CategoryId).not_null())
                    .col(text(Listing::Address).not_null())
                    .col(string_len(Listing::Phone, 15).not_null())
                    .col(string_len(Listing::Experience, 10).not_null())
                    .col(decimal_len(Listing::Price, 10, 2).not_null())
                    .col(timestamp_with_time_zone(Listing::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_provider")
                            .from(Listing::Table, Listing::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listing_category")
                            .from(Listing::Table, Listing::CategoryId)
                            .to(ServiceCategory::Table, ServiceCategory::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Listing::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Listing { Table, Id, ProviderId, CategoryId, Address, Phone, Experience, Price, CreatedAt }

#[derive(DeriveIden)]
enum Provider { Table, Id }

#[derive(DeriveIden)]
enum ServiceCategory { Table, Id }
