use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryFilter, ColumnTrait, EntityTrait};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

pub const ROLE_CUSTOMER: &str = "customer";
pub const ROLE_PROVIDER: &str = "provider";
pub const ROLE_ADMIN: &str = "admin";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef { panic!("no relations defined here") }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    if !email.contains('@') { return Err(errors::ModelError::Validation("invalid email".into())); }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<(), errors::ModelError> {
    if username.trim().is_empty() { return Err(errors::ModelError::Validation("username required".into())); }
    if username.len() > 150 { return Err(errors::ModelError::Validation("username too long (<=150)".into())); }
    Ok(())
}

pub fn validate_role(role: &str) -> Result<(), errors::ModelError> {
    match role {
        ROLE_CUSTOMER | ROLE_PROVIDER | ROLE_ADMIN => Ok(()),
        other => Err(errors::ModelError::Validation(format!("unknown role: {other}"))),
    }
}

pub async fn create(db: &DatabaseConnection, username: &str, email: &str, role: &str) -> Result<Model, errors::ModelError> {
    validate_username(username)?;
    validate_email(email)?;
    validate_role(role)?;
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        role: Set(role.to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_username(db: &DatabaseConnection, username: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Username.eq(username))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::Email.eq(email))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn hard_delete(db: &DatabaseConnection, id: Uuid) -> Result<(), errors::ModelError> {
    Entity::delete_by_id(id).exec(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))?;
    Ok(())
}
