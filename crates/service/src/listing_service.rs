use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{listing, provider, service_category};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingInput {
    pub category_id: Uuid,
    pub address: String,
    pub phone: String,
    pub experience: String,
    pub price: Decimal,
}

/// Provider lists an offering of a catalog category.
#[instrument(skip(db, input), fields(provider_user = %provider_user_id))]
pub async fn create_listing(
    db: &DatabaseConnection,
    provider_user_id: Uuid,
    input: CreateListingInput,
) -> Result<listing::Model, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;

    let category = service_category::Entity::find_by_id(input.category_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    let created = listing::create(
        db,
        provider.id,
        category.id,
        &input.address,
        &input.phone,
        &input.experience,
        input.price,
    )
    .await?;
    info!(listing_id = %created.id, provider_id = %provider.id, category = %category.name, "listing_created");
    Ok(created)
}

/// All listings of the provider behind a user account.
pub async fn provider_listings(
    db: &DatabaseConnection,
    provider_user_id: Uuid,
) -> Result<Vec<listing::Model>, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;
    listing::Entity::find()
        .filter(listing::Column::ProviderId.eq(provider.id))
        .order_by_desc(listing::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

/// Prefill values for the listing form, taken from the most recent listing.
#[derive(Debug, Clone, Serialize)]
pub struct ListingDefaults {
    pub category_id: Uuid,
    pub address: String,
    pub phone: String,
    pub experience: String,
}

pub async fn listing_defaults(
    db: &DatabaseConnection,
    provider_user_id: Uuid,
) -> Result<Option<ListingDefaults>, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;
    let last = listing::latest_for_provider(db, provider.id).await?;
    Ok(last.map(|l| ListingDefaults {
        category_id: l.category_id,
        address: l.address,
        phone: l.phone,
        experience: l.experience,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::user;

    #[tokio::test]
    async fn listing_flow_with_defaults() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let pu = user::create(&db, &format!("ls_prov_{}", Uuid::new_v4()), &format!("ls_{}@example.com", Uuid::new_v4()), user::ROLE_PROVIDER).await?;
        let _p = models::provider::create(&db, pu.id).await?;
        let cat = models::service_category::create(&db, &format!("gardener_{}", Uuid::new_v4()), None).await?;

        assert!(listing_defaults(&db, pu.id).await?.is_none());

        let input = CreateListingInput {
            category_id: cat.id,
            address: "7 Lake View".into(),
            phone: "8887776665".into(),
            experience: "6-10".into(),
            price: Decimal::new(55000, 2),
        };
        let created = create_listing(&db, pu.id, input).await?;

        let mine = provider_listings(&db, pu.id).await?;
        assert!(mine.iter().any(|l| l.id == created.id));

        let defaults = listing_defaults(&db, pu.id).await?.unwrap();
        assert_eq!(defaults.phone, "8887776665");
        assert_eq!(defaults.category_id, cat.id);

        // invalid phone bubbles up from the model layer
        let bad = CreateListingInput {
            category_id: cat.id,
            address: "7 Lake View".into(),
            phone: "123".into(),
            experience: "6-10".into(),
            price: Decimal::ONE,
        };
        assert!(create_listing(&db, pu.id, bad).await.is_err());

        user::hard_delete(&db, pu.id).await?;
        models::service_category::hard_delete(&db, cat.id).await?;
        Ok(())
    }
}
