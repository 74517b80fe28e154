use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{customer, listing, provider, service_category, user};

use crate::earnings_service;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub customers: Vec<CustomerSummary>,
    pub providers: Vec<ProviderSummary>,
    pub total_earnings: Decimal,
}

async fn customer_summary(db: &DatabaseConnection, c: customer::Model) -> Result<Option<CustomerSummary>, ServiceError> {
    let found = user::Entity::find_by_id(c.user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.map(|u| CustomerSummary {
        id: c.id,
        user_id: u.id,
        username: u.username,
        email: u.email,
        phone: c.phone,
        address: c.address,
    }))
}

async fn provider_summary(db: &DatabaseConnection, p: &provider::Model) -> Result<Option<ProviderSummary>, ServiceError> {
    let found = user::Entity::find_by_id(p.user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(found.map(|u| ProviderSummary { id: p.id, user_id: u.id, username: u.username, email: u.email }))
}

/// Admin dashboard: everyone on the platform plus the earnings sum.
pub async fn dashboard(db: &DatabaseConnection) -> Result<DashboardSummary, ServiceError> {
    let mut customers = Vec::new();
    for c in customer::Entity::find().all(db).await.map_err(|e| ServiceError::Db(e.to_string()))? {
        if let Some(s) = customer_summary(db, c).await? {
            customers.push(s);
        }
    }
    let mut providers = Vec::new();
    for p in provider::Entity::find().all(db).await.map_err(|e| ServiceError::Db(e.to_string()))? {
        if let Some(s) = provider_summary(db, &p).await? {
            providers.push(s);
        }
    }
    let total_earnings = earnings_service::platform_total(db).await?;
    Ok(DashboardSummary { customers, providers, total_earnings })
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingSummary {
    pub id: Uuid,
    pub category: String,
    pub experience: String,
    pub price: Decimal,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProviderWithListing {
    pub provider: ProviderSummary,
    pub listing: ListingSummary,
}

/// Providers that have at least one listing, each with their latest one.
pub async fn providers_with_listings(db: &DatabaseConnection) -> Result<Vec<ProviderWithListing>, ServiceError> {
    let providers = provider::Entity::find()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;

    let mut out = Vec::new();
    for p in providers {
        let Some(latest) = listing::latest_for_provider(db, p.id).await? else { continue };
        let Some(summary) = provider_summary(db, &p).await? else { continue };
        let category = service_category::Entity::find_by_id(latest.category_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
            .map(|c| c.name)
            .unwrap_or_default();
        out.push(ProviderWithListing {
            provider: summary,
            listing: ListingSummary {
                id: latest.id,
                category,
                experience: latest.experience,
                price: latest.price,
                address: latest.address,
                phone: latest.phone,
            },
        });
    }
    Ok(out)
}

/// Customers that have filled in a phone number, one page at a time.
pub async fn customers_with_phone(
    db: &DatabaseConnection,
    opts: Pagination,
) -> Result<Vec<CustomerSummary>, ServiceError> {
    let (page_idx, per_page) = opts.normalize();
    let rows = customer::Entity::find()
        .filter(customer::Column::Phone.is_not_null())
        .filter(customer::Column::Phone.ne(""))
        .order_by_asc(customer::Column::CreatedAt)
        .paginate(db, per_page)
        .fetch_page(page_idx)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    let mut out = Vec::new();
    for c in rows {
        if let Some(s) = customer_summary(db, c).await? {
            out.push(s);
        }
    }
    Ok(out)
}

/// Remove a provider together with the underlying account.
/// Listings, bookings and earnings follow via FK cascade.
#[instrument(skip(db), fields(provider = %provider_id))]
pub async fn delete_provider(db: &DatabaseConnection, provider_id: Uuid) -> Result<String, ServiceError> {
    let p = provider::Entity::find_by_id(provider_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("provider"))?;
    let u = user::Entity::find_by_id(p.user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let username = u.username.clone();
    user::hard_delete(db, u.id).await?;
    info!(%username, "provider_deleted");
    Ok(username)
}

/// Remove a customer together with the underlying account.
#[instrument(skip(db), fields(customer = %customer_id))]
pub async fn delete_customer(db: &DatabaseConnection, customer_id: Uuid) -> Result<String, ServiceError> {
    let c = customer::Entity::find_by_id(customer_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("customer"))?;
    let u = user::Entity::find_by_id(c.user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let username = u.username.clone();
    user::hard_delete(db, u.id).await?;
    info!(%username, "customer_deleted");
    Ok(username)
}
