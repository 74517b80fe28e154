//! Migrator registering entity-specific migrations in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240101_000001_create_user;
mod m20240101_000002_create_user_credentials;
mod m20240101_000003_create_customer;
mod m20240101_000004_create_provider;
mod m20240101_000005_create_service_category;
mod m20240101_000006_create_listing;
mod m20240101_000007_create_booking;
mod m20240101_000008_create_provider_earning;
mod m20240101_000009_create_review;
mod m20240101_000100_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_user::Migration),
            Box::new(m20240101_000002_create_user_credentials::Migration),
            Box::new(m20240101_000003_create_customer::Migration),
            Box::new(m20240101_000004_create_provider::Migration),
            Box::new(m20240101_000005_create_service_category::Migration),
            Box::new(m20240101_000006_create_listing::Migration),
            Box::new(m20240101_000007_create_booking::Migration),
            Box::new(m20240101_000008_create_provider_earning::Migration),
            Box::new(m20240101_000009_create_review::Migration),
            // Indexes should always be applied last
            Box::new(m20240101_000100_add_indexes::Migration),
        ]
    }
}
