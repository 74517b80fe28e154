use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "customer")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Booking requires both contact fields to be filled in.
    pub fn profile_complete(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().map(|s| !s.trim().is_empty()).unwrap_or(false);
        filled(&self.phone) && filled(&self.address)
    }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self { Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into() }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(db: &DatabaseConnection, user_id: Uuid) -> Result<Model, errors::ModelError> {
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        address: Set(None),
        phone: Set(None),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::UserId.eq(user_id))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn update_contact(db: &DatabaseConnection, id: Uuid, phone: Option<String>, address: Option<String>) -> Result<Model, errors::ModelError> {
    let mut am: ActiveModel = Entity::find_by_id(id)
        .one(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?
        .ok_or_else(|| errors::ModelError::Validation("customer not found".into()))?
        .into();
    am.phone = Set(phone);
    am.address = Set(address);
    am.update(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}
