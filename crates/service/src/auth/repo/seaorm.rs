use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::domain::{AuthUser, Credentials};
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;

pub struct SeaOrmAuthRepository {
    pub db: DatabaseConnection,
}

fn to_auth_user(u: models::user::Model) -> AuthUser {
    AuthUser { id: u.id, username: u.username, email: u.email, role: u.role }
}

#[async_trait::async_trait]
impl AuthRepository for SeaOrmAuthRepository {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_username(&self.db, username)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>, AuthError> {
        let res = models::user::find_by_email(&self.db, email)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_auth_user))
    }

    async fn create_user(&self, username: &str, email: &str, role: &str) -> Result<AuthUser, AuthError> {
        let created = models::user::create(&self.db, username, email, role)
            .await
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        // Role profile row is part of account creation
        match role {
            models::user::ROLE_CUSTOMER => {
                models::customer::create(&self.db, created.id)
                    .await
                    .map_err(|e| AuthError::Repository(e.to_string()))?;
            }
            models::user::ROLE_PROVIDER => {
                models::provider::create(&self.db, created.id)
                    .await
                    .map_err(|e| AuthError::Repository(e.to_string()))?;
            }
            _ => {}
        }
        Ok(to_auth_user(created))
    }

    async fn get_credentials(&self, user_id: Uuid) -> Result<Option<Credentials>, AuthError> {
        let res = models::user_credentials::find_by_user(&self.db, user_id)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(|c| Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm }))
    }

    async fn upsert_password(&self, user_id: Uuid, password_hash: String, password_algorithm: String) -> Result<Credentials, AuthError> {
        let c = models::user_credentials::upsert_password(&self.db, user_id, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Credentials { user_id: c.user_id, password_hash: c.password_hash, password_algorithm: c.password_algorithm })
    }
}
