use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::provider;
use crate::service_category;

/// Experience bands offered on the listing form.
pub const EXPERIENCE_BANDS: [&str; 5] = ["0-1", "2-3", "4-5", "6-10", "10+"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    pub category_id: Uuid,
    pub address: String,
    pub phone: String,
    pub experience: String,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub price: Decimal,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Provider,
    Category,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Provider => Entity::belongs_to(provider::Entity).from(Column::ProviderId).to(provider::Column::Id).into(),
            Relation::Category => Entity::belongs_to(service_category::Entity).from(Column::CategoryId).to(service_category::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_phone(phone: &str) -> Result<(), errors::ModelError> {
    if phone.len() != 10 || !phone.bytes().all(|b| b.is_ascii_digit()) {
        return Err(errors::ModelError::Validation("phone number must be exactly 10 digits".into()));
    }
    Ok(())
}

pub fn validate_experience(experience: &str) -> Result<(), errors::ModelError> {
    if !EXPERIENCE_BANDS.contains(&experience) {
        return Err(errors::ModelError::Validation(format!("unknown experience band: {experience}")));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), errors::ModelError> {
    if price.is_sign_negative() {
        return Err(errors::ModelError::Validation("price must be >= 0".into()));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    provider_id: Uuid,
    category_id: Uuid,
    address: &str,
    phone: &str,
    experience: &str,
    price: Decimal,
) -> Result<Model, errors::ModelError> {
    if address.trim().is_empty() { return Err(errors::ModelError::Validation("address required".into())); }
    validate_phone(phone)?;
    validate_experience(experience)?;
    validate_price(price)?;
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(provider_id),
        category_id: Set(category_id),
        address: Set(address.to_string()),
        phone: Set(phone.to_string()),
        experience: Set(experience.to_string()),
        price: Set(price),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Most recent listing for a provider, used to prefill the listing form.
pub async fn latest_for_provider(db: &DatabaseConnection, provider_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ProviderId.eq(provider_id))
        .order_by_desc(Column::CreatedAt)
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
