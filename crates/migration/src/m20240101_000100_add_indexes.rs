use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing: lookup by provider and by category
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_provider")
                    .table(Listing::Table)
                    .col(Listing::ProviderId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_listing_category")
                    .table(Listing::Table)
                    .col(Listing::CategoryId)
                    .to_owned(),
            )
            .await?;

        // Booking: dashboards filter by customer / provider
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_customer")
                    .table(Booking::Table)
                    .col(Booking::CustomerId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_booking_provider")
                    .table(Booking::Table)
                    .col(Booking::ProviderId)
                    .to_owned(),
            )
            .await?;

        // Review: customer's review history
        manager
            .create_index(
                Index::create()
                    .name("idx_review_customer")
                    .table(Review::Table)
                    .col(Review::CustomerId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_listing_provider").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_listing_category").table(Listing::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_customer").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_booking_provider").table(Booking::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_review_customer").table(Review::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Listing { Table, ProviderId, CategoryId }

#[derive(DeriveIden)]
enum Booking { Table, CustomerId, ProviderId }

#[derive(DeriveIden)]
enum Review { Table, CustomerId }
