//! Create `customer` table with FK to `user`.
//!
//! Contact profile; phone and address stay nullable until the
//! customer completes the profile.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Customer::Table)
                    .if_not_exists()
                    .col(uuid(Customer::Id).primary_key())
                    .col(uuid(Customer::UserId).unique_key().not_null())
                    .col(ColumnDef::new(Customer::Address).text().null())
                    .col(ColumnDef::new(Customer::Phone).string_len(15).null())
                    .col(timestamp_with_time_zone(Customer::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customer_user")
                            .from(Customer::Table, Customer::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Customer::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Customer { Table, Id, UserId, Address, Phone, CreatedAt }

#[derive(DeriveIden)]
enum User { Table, Id }
