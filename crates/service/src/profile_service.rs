use sea_orm::{DatabaseConnection, EntityTrait};
use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use models::{customer, user};

use crate::errors::ServiceError;

#[derive(Debug, Clone, Serialize)]
pub struct CustomerProfile {
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub username: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub complete: bool,
}

fn build(u: user::Model, c: customer::Model) -> CustomerProfile {
    let complete = c.profile_complete();
    CustomerProfile {
        user_id: u.id,
        customer_id: c.id,
        username: u.username,
        email: u.email,
        phone: c.phone,
        address: c.address,
        complete,
    }
}

pub async fn customer_profile(db: &DatabaseConnection, user_id: Uuid) -> Result<CustomerProfile, ServiceError> {
    let u = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let c = customer::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;
    Ok(build(u, c))
}

/// Update contact details; blank strings clear the field.
#[instrument(skip(db, phone, address), fields(user = %user_id))]
pub async fn update_customer_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    phone: Option<String>,
    address: Option<String>,
) -> Result<CustomerProfile, ServiceError> {
    let u = user::Entity::find_by_id(user_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("user"))?;
    let c = customer::find_by_user(db, user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;

    let normalize = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
    let updated = customer::update_contact(db, c.id, normalize(phone), normalize(address)).await?;
    info!(customer_id = %updated.id, complete = updated.profile_complete(), "customer_profile_updated");
    Ok(build(u, updated))
}
