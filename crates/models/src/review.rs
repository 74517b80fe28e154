use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder, QuerySelect};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::customer;
use crate::errors;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub content: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::Customer => Entity::belongs_to(customer::Entity).from(Column::CustomerId).to(customer::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, customer_id: Uuid, content: &str) -> Result<Model, errors::ModelError> {
    if content.trim().is_empty() { return Err(errors::ModelError::Validation("review content required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        content: Set(content.trim().to_string()),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn for_customer(db: &DatabaseConnection, customer_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Newest reviews for the landing page.
pub async fn latest(db: &DatabaseConnection, limit: u64) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .order_by_desc(Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
