use chrono::{DateTime, FixedOffset};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{customer, review, user};

use crate::errors::ServiceError;

/// Review with the reviewer's username, as shown on the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewView {
    pub id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<FixedOffset>,
}

#[instrument(skip(db, content), fields(customer_user = %customer_user_id))]
pub async fn submit_review(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
    content: &str,
) -> Result<review::Model, ServiceError> {
    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;
    let created = review::create(db, customer.id, content).await?;
    info!(review_id = %created.id, "review_submitted");
    Ok(created)
}

pub async fn customer_reviews(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
) -> Result<Vec<review::Model>, ServiceError> {
    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;
    Ok(review::for_customer(db, customer.id).await?)
}

/// Latest reviews across all customers, annotated with usernames.
pub async fn latest_reviews(db: &DatabaseConnection, limit: u64) -> Result<Vec<ReviewView>, ServiceError> {
    let rows = review::latest(db, limit).await?;
    let mut out = Vec::with_capacity(rows.len());
    for r in rows {
        let Some(c) = customer::Entity::find_by_id(r.customer_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        else { continue };
        let Some(u) = user::Entity::find_by_id(c.user_id)
            .one(db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?
        else { continue };
        out.push(ReviewView { id: r.id, username: u.username, content: r.content, created_at: r.created_at });
    }
    Ok(out)
}
