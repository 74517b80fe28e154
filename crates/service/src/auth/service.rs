use std::sync::Arc;

use argon2::{Argon2, password_hash::{PasswordHasher, PasswordVerifier, SaltString}, PasswordHash};
use jsonwebtoken::{encode, Header as JwtHeader, EncodingKey};
use rand::rngs::OsRng;
use tracing::{info, debug, instrument};

use super::domain::{RegisterInput, LoginInput, AuthSession, AuthUser};
use super::errors::AuthError;
use super::repository::AuthRepository;

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: Option<String>,
    pub password_algorithm: String,
}

/// Signup form rules: at least 8 chars with upper, lower, digit and a
/// special character.
pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::Validation("password must be at least 8 characters long".into()));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AuthError::Validation("password must contain at least one uppercase letter".into()));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AuthError::Validation("password must contain at least one lowercase letter".into()));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AuthError::Validation("password must contain at least one number".into()));
    }
    if !password.chars().any(|c| "!@#$%^&*(),.?\":{}|<>".contains(c)) {
        return Err(AuthError::Validation("password must contain at least one special character".into()));
    }
    Ok(())
}

/// Auth business service independent of web framework
pub struct AuthService<R: AuthRepository> {
    repo: Arc<R>,
    cfg: AuthConfig,
}

impl<R: AuthRepository> AuthService<R> {
    pub fn new(repo: Arc<R>, cfg: AuthConfig) -> Self { Self { repo, cfg } }

    /// Register a new account with the given role and a hashed password.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::RegisterInput;
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo, AuthConfig { jwt_secret: None, password_algorithm: "argon2".into() });
    /// let input = RegisterInput { username: "asha".into(), email: "asha@example.com".into(), password: "Secret12!".into(), password_confirm: "Secret12!".into() };
    /// let user = tokio_test::block_on(svc.register(input, "customer")).unwrap();
    /// assert_eq!(user.role, "customer");
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, role = %role))]
    pub async fn register(&self, input: RegisterInput, role: &str) -> Result<AuthUser, AuthError> {
        if input.password != input.password_confirm {
            return Err(AuthError::Validation("passwords do not match".into()));
        }
        validate_password_strength(&input.password)?;
        if let Some(existing) = self.repo.find_user_by_username(&input.username).await? {
            debug!("username taken: {}", existing.username);
            return Err(AuthError::Conflict);
        }
        if self.repo.find_user_by_email(&input.email).await?.is_some() {
            return Err(AuthError::Validation("email is already registered".into()));
        }

        let user = self.repo.create_user(&input.username, &input.email, role).await?;
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        let _cred = self.repo.upsert_password(user.id, hash, self.cfg.password_algorithm.clone()).await?;
        info!(user_id = %user.id, username = %user.username, role = %user.role, "user_registered");
        Ok(user)
    }

    /// Authenticate a user, enforce the expected role, and optionally issue
    /// a token.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::MockAuthRepository};
    /// use service::auth::domain::{RegisterInput, LoginInput};
    /// use std::sync::Arc;
    /// let repo = Arc::new(MockAuthRepository::default());
    /// let svc = AuthService::new(repo.clone(), AuthConfig { jwt_secret: Some("secret".into()), password_algorithm: "argon2".into() });
    /// let _ = tokio_test::block_on(svc.register(RegisterInput { username: "ravi".into(), email: "r@e.com".into(), password: "Passw0rd!".into(), password_confirm: "Passw0rd!".into() }, "provider"));
    /// let session = tokio_test::block_on(svc.login(LoginInput { username: "ravi".into(), password: "Passw0rd!".into() }, "provider")).unwrap();
    /// assert_eq!(session.user.username, "ravi");
    /// assert!(session.token.is_some());
    /// ```
    #[instrument(skip(self, input), fields(username = %input.username, role = %expected_role))]
    pub async fn login(&self, input: LoginInput, expected_role: &str) -> Result<AuthSession, AuthError> {
        let user = self.repo
            .find_user_by_username(&input.username)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        if user.role != expected_role {
            return Err(AuthError::WrongRole(expected_role.to_string()));
        }

        let cred = self.repo
            .get_credentials(user.id)
            .await?
            .ok_or(AuthError::Unauthorized)?;

        let parsed = PasswordHash::new(&cred.password_hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        if Argon2::default().verify_password(input.password.as_bytes(), &parsed).is_err() {
            return Err(AuthError::Unauthorized);
        }

        let mut token = None;
        if let Some(secret) = &self.cfg.jwt_secret {
            #[derive(serde::Serialize)]
            struct Claims { sub: String, uid: String, role: String, exp: usize }
            let exp = (chrono::Utc::now() + chrono::Duration::hours(12)).timestamp() as usize;
            let claims = Claims { sub: user.username.clone(), uid: user.id.to_string(), role: user.role.clone(), exp };
            token = Some(encode(&JwtHeader::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).map_err(|e| AuthError::TokenError(e.to_string()))?);
        }

        Ok(AuthSession { user, token })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::auth::domain::{LoginInput, RegisterInput};
    use crate::auth::repository::mock::MockAuthRepository;

    fn svc() -> AuthService<MockAuthRepository> {
        AuthService::new(
            Arc::new(MockAuthRepository::default()),
            AuthConfig { jwt_secret: Some("test-secret".into()), password_algorithm: "argon2".into() },
        )
    }

    fn register_input(username: &str) -> RegisterInput {
        RegisterInput {
            username: username.into(),
            email: format!("{username}@example.com"),
            password: "Str0ngPass!".into(),
            password_confirm: "Str0ngPass!".into(),
        }
    }

    #[tokio::test]
    async fn register_then_login_issues_token() {
        let svc = svc();
        svc.register(register_input("meera"), "customer").await.unwrap();
        let session = svc
            .login(LoginInput { username: "meera".into(), password: "Str0ngPass!".into() }, "customer")
            .await
            .unwrap();
        assert_eq!(session.user.role, "customer");
        assert!(session.token.is_some());
    }

    #[tokio::test]
    async fn login_rejects_role_mismatch() {
        let svc = svc();
        svc.register(register_input("meera"), "customer").await.unwrap();
        let err = svc
            .login(LoginInput { username: "meera".into(), password: "Str0ngPass!".into() }, "provider")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::WrongRole(_)));
        assert_eq!(err.code(), 1005);
    }

    #[tokio::test]
    async fn login_rejects_wrong_password() {
        let svc = svc();
        svc.register(register_input("meera"), "customer").await.unwrap();
        let err = svc
            .login(LoginInput { username: "meera".into(), password: "nope".into() }, "customer")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized));
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let svc = svc();
        svc.register(register_input("meera"), "customer").await.unwrap();
        let mut second = register_input("meera");
        second.email = "other@example.com".into();
        let err = svc.register(second, "customer").await.unwrap_err();
        assert!(matches!(err, AuthError::Conflict));
    }

    #[tokio::test]
    async fn register_rejects_mismatched_confirmation() {
        let svc = svc();
        let mut input = register_input("meera");
        input.password_confirm = "Different1!".into();
        assert!(svc.register(input, "customer").await.is_err());
    }

    #[test]
    fn password_strength_rules() {
        assert!(validate_password_strength("Str0ngPass!").is_ok());
        assert!(validate_password_strength("short1!A").is_ok());
        assert!(validate_password_strength("sh0rt!").is_err());
        assert!(validate_password_strength("alllower1!").is_err());
        assert!(validate_password_strength("ALLUPPER1!").is_err());
        assert!(validate_password_strength("NoDigits!!").is_err());
        assert!(validate_password_strength("NoSpecial1").is_err());
    }
}
