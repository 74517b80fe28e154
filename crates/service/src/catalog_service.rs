use std::collections::HashSet;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{listing, provider, service_category, user};

use crate::errors::ServiceError;

/// Admin adds a catalog entry (profession).
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    name: &str,
    image_url: Option<String>,
) -> Result<service_category::Model, ServiceError> {
    if service_category::find_by_name(db, name.trim()).await?.is_some() {
        return Err(ServiceError::Conflict(format!("category '{}' already exists", name.trim())));
    }
    let created = service_category::create(db, name, image_url).await?;
    info!(category_id = %created.id, name = %created.name, "category_created");
    Ok(created)
}

pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<service_category::Model>, ServiceError> {
    service_category::Entity::find()
        .order_by_asc(service_category::Column::Name)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))
}

pub async fn delete_category(db: &DatabaseConnection, id: Uuid) -> Result<(), ServiceError> {
    let found = service_category::Entity::find_by_id(id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    if found.is_none() {
        return Err(ServiceError::not_found("category"));
    }
    service_category::hard_delete(db, id).await?;
    info!(category_id = %id, "category_deleted");
    Ok(())
}

/// One provider's visible offering within a category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryProvider {
    pub provider_id: Uuid,
    pub listing_id: Uuid,
    pub username: String,
    pub category: String,
    pub experience: String,
    pub price: Decimal,
    pub address: String,
    pub phone: String,
}

/// Listings for a named category, one entry per provider (first listing
/// wins, matching the browse page behavior).
pub async fn providers_by_category(
    db: &DatabaseConnection,
    category_name: &str,
) -> Result<Vec<CategoryProvider>, ServiceError> {
    let category = service_category::find_by_name(db, category_name)
        .await?
        .ok_or_else(|| ServiceError::not_found("category"))?;

    let listings = listing::Entity::find()
        .filter(listing::Column::CategoryId.eq(category.id))
        .order_by_asc(listing::Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut seen: HashSet<Uuid> = HashSet::new();
    let mut out = Vec::new();
    for l in listings {
        if !seen.insert(l.provider_id) {
            continue;
        }
        let Some(p) = provider::Entity::find_by_id(l.provider_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        else { continue };
        let Some(u) = user::Entity::find_by_id(p.user_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        else { continue };
        out.push(CategoryProvider {
            provider_id: p.id,
            listing_id: l.id,
            username: u.username,
            category: category.name.clone(),
            experience: l.experience,
            price: l.price,
            address: l.address,
            phone: l.phone,
        });
    }
    Ok(out)
}
