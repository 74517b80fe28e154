use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::provider;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider_earning")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub provider_id: Uuid,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub total_earnings: Decimal,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Provider,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Provider => Entity::belongs_to(provider::Entity).from(Column::ProviderId).to(provider::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Accumulator row, created lazily on first access.
pub async fn get_or_create(db: &impl ConnectionTrait, provider_id: Uuid) -> Result<Model, errors::ModelError> {
    if let Some(existing) = Entity::find()
        .filter(Column::ProviderId.eq(provider_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))? {
        return Ok(existing);
    }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        provider_id: Set(provider_id),
        total_earnings: Set(Decimal::ZERO),
        updated_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn add_amount(db: &impl ConnectionTrait, provider_id: Uuid, amount: Decimal) -> Result<Model, errors::ModelError> {
    let current = get_or_create(db, provider_id).await?;
    let new_total = current.total_earnings + amount;
    let mut am: ActiveModel = current.into();
    am.total_earnings = Set(new_total);
    am.updated_at = Set(Utc::now().into());
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
