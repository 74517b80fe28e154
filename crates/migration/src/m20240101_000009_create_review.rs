//! Create `review` table with FK to `customer`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Review::Table)
                    .if_not_exists()
                    .col(uuid(Review::Id).primary_key())
                    .col(uuid(Review::CustomerId).not_null())
                    .col(text(Review::Content).not_null())
                    .col(timestamp_with_time_zone(Review::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_review_customer")
                            .from(Review::Table, Review::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Review::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Review { Table, Id, CustomerId, Content, CreatedAt }

#[derive(DeriveIden)]
enum Customer { Table, Id }
