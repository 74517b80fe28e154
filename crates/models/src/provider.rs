use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::user;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "provider")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTimeWithTimeZone,
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
