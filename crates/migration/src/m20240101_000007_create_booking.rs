//! Create `booking` table with FKs to `customer`, `provider`, `listing`.
//!
//! Bookings are never hard-deleted; cancellation is a status value.
//! `earnings_credited` guards the accrual side effect against running twice.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Booking::Table)
                    .if_not_exists()
                    .col(uuid(Booking::Id).primary_key())
                    .col(uuid(Booking::CustomerId).not_null())
                    .col(uuid(Booking::ProviderId).not_null())
                    .col(uuid(Booking::ListingId).not_null())
                    .col(date(Booking::ScheduleDate).not_null())
                    .col(string_len(Booking::Timing, 50).not_null())
                    .col(string_len(Booking::Status, 20).not_null())
                    .col(ColumnDef::new(Booking::PaymentMethod).string_len(20).null())
                    .col(boolean(Booking::EarningsCredited).not_null().default(false))
                    .col(timestamp_with_time_zone(Booking::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_customer")
                            .from(Booking::Table, Booking::CustomerId)
                            .to(Customer::Table, Customer::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_provider")
                            .from(Booking::Table, Booking::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_booking_listing")
                            .from(Booking::Table, Booking::ListingId)
                            .to(Listing::Table, Listing::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Booking::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Booking { Table, Id, CustomerId, ProviderId, ListingId, ScheduleDate, Timing, Status, PaymentMethod, EarningsCredited, CreatedAt }

#[derive(DeriveIden)]
enum Customer { Table, Id }

#[derive(DeriveIden)]
enum Provider { Table, Id }

#[derive(DeriveIden)]
enum Listing { Table, Id }
