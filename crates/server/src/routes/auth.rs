use axum::{Json, extract::{State, Request}, http::StatusCode, middleware::Next, response::Response, Extension};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use service::auth::{domain::{LoginInput, RegisterInput}, errors::AuthError, service::{AuthConfig, AuthService}};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use std::sync::Arc;
use models::user::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_PROVIDER};
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};

#[derive(Clone)]
pub struct ServerAuthConfig {
    pub jwt_secret: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
    pub auth: ServerAuthConfig,
}

/// Authenticated caller, injected into request extensions by the token
/// middleware.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub username: String,
    pub role: String,
}

// RegisterInput / LoginInput are provided by service::auth::domain

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput { pub user_id: Uuid, pub username: String, pub email: String, pub role: String, pub token: String }

#[derive(Serialize)]
pub struct MeOutput { pub user_id: Uuid, pub username: String, pub role: String }

fn auth_service(state: &ServerState) -> AuthService<SeaOrmAuthRepository> {
    let repo = Arc::new(SeaOrmAuthRepository { db: state.db.clone() });
    AuthService::new(repo, AuthConfig {
        jwt_secret: Some(state.auth.jwt_secret.clone()),
        password_algorithm: "argon2".into(),
    })
}

fn auth_error_status(e: &AuthError) -> StatusCode {
    match e {
        AuthError::Validation(_) => StatusCode::BAD_REQUEST,
        AuthError::Conflict => StatusCode::CONFLICT,
        AuthError::NotFound => StatusCode::NOT_FOUND,
        AuthError::Unauthorized | AuthError::WrongRole(_) => StatusCode::UNAUTHORIZED,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

async fn register_with_role(
    state: &ServerState,
    input: RegisterInput,
    role: &str,
) -> Result<Json<RegisterOutput>, (StatusCode, String)> {
    let svc = auth_service(state);
    let user = svc
        .register(input, role)
        .await
        .map_err(|e| (auth_error_status(&e), e.to_string()))?;
    Ok(Json(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/signup/customer", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn signup_customer(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, (StatusCode, String)> {
    register_with_role(&state, input, ROLE_CUSTOMER).await
}

#[utoipa::path(post, path = "/auth/signup/provider", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 200, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn signup_provider(State(state): State<ServerState>, Json(input): Json<RegisterInput>) -> Result<Json<RegisterOutput>, (StatusCode, String)> {
    register_with_role(&state, input, ROLE_PROVIDER).await
}

async fn login_with_role(
    state: &ServerState,
    jar: CookieJar,
    input: LoginInput,
    role: &str,
) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    let svc = auth_service(state);
    let session = svc
        .login(input, role)
        .await
        .map_err(|e| (auth_error_status(&e), e.to_string()))?;
    let user = session.user;
    if let Some(token) = session.token {
        let mut cookie = Cookie::new("auth_token", token.clone());
        cookie.set_path("/");
        cookie.set_http_only(true);
        cookie.set_secure(false);
        cookie.set_same_site(axum_extra::extract::cookie::SameSite::Lax);
        let jar = jar.add(cookie);
        let out = LoginOutput { user_id: user.id, username: user.username, email: user.email, role: user.role, token };
        return Ok((jar, Json(out)));
    }
    Err((StatusCode::INTERNAL_SERVER_ERROR, "token generation failed".into()))
}

#[utoipa::path(post, path = "/auth/login/customer", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login_customer(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    login_with_role(&state, jar, input, ROLE_CUSTOMER).await
}

#[utoipa::path(post, path = "/auth/login/provider", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login_provider(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    login_with_role(&state, jar, input, ROLE_PROVIDER).await
}

#[utoipa::path(post, path = "/auth/login/admin", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login_admin(State(state): State<ServerState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), (StatusCode, String)> {
    login_with_role(&state, jar, input, ROLE_ADMIN).await
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::from("auth_token"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(Extension(ctx): Extension<AuthContext>) -> Json<MeOutput> {
    Json(MeOutput { user_id: ctx.user_id, username: ctx.username, role: ctx.role })
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: Option<String>,
    uid: Option<String>,
    role: Option<String>,
    exp: Option<usize>,
}

/// Global middleware: outside the public allow-list, require a valid
/// `Authorization: Bearer <token>` (falling back to the `auth_token`
/// cookie). Missing token yields 400, invalid or expired 401.
pub async fn require_bearer_token_state(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();

    // Allow-list: health, landing reviews, signup/login, docs, CORS preflight
    if path == "/health"
        || path == "/reviews/latest"
        || path == "/auth/logout"
        || path.starts_with("/auth/signup/")
        || path.starts_with("/auth/login/")
        || path.starts_with("/docs")
        || path.starts_with("/api-docs")
        || method == axum::http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Read the Authorization header; fall back to the auth_token cookie
    let token = {
        let authz = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        if let Some(h) = authz {
            let prefix = "Bearer ";
            if !h.starts_with(prefix) {
                tracing::warn!(path = %path, "invalid Authorization format (expect Bearer)");
                return Err(StatusCode::UNAUTHORIZED);
            }
            h[prefix.len()..].to_string()
        } else {
            let cookie_header = req
                .headers()
                .get(axum::http::header::COOKIE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let mut token_val: Option<String> = None;
            for part in cookie_header.split(';') {
                let kv = part.trim();
                if let Some(rest) = kv.strip_prefix("auth_token=") {
                    token_val = Some(rest.to_string());
                    break;
                }
            }

            match token_val {
                Some(t) if !t.is_empty() => t,
                _ => {
                    tracing::warn!(path = %path, "missing Authorization header and auth_token cookie");
                    return Err(StatusCode::BAD_REQUEST);
                }
            }
        }
    };

    let key = DecodingKey::from_secret(state.auth.jwt_secret.as_bytes());
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    match decode::<Claims>(&token, &key, &validation) {
        Ok(data) => {
            let claims = data.claims;
            let ctx = match (claims.uid.as_deref().and_then(|u| Uuid::parse_str(u).ok()), claims.sub, claims.role) {
                (Some(user_id), Some(username), Some(role)) => AuthContext { user_id, username, role },
                _ => {
                    tracing::error!(path = %path, "token missing uid/sub/role claims");
                    return Err(StatusCode::UNAUTHORIZED);
                }
            };
            req.extensions_mut().insert(ctx);
            Ok(next.run(req).await)
        }
        Err(e) => {
            tracing::error!(path = %path, err = %e, "token validation failed");
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

fn role_guard(req: &Request, expected: &str) -> Result<(), StatusCode> {
    match req.extensions().get::<AuthContext>() {
        Some(ctx) if ctx.role == expected => Ok(()),
        Some(_) => Err(StatusCode::FORBIDDEN),
        None => Err(StatusCode::UNAUTHORIZED),
    }
}

pub async fn require_customer(req: Request, next: Next) -> Result<Response, StatusCode> {
    role_guard(&req, ROLE_CUSTOMER)?;
    Ok(next.run(req).await)
}

pub async fn require_provider(req: Request, next: Next) -> Result<Response, StatusCode> {
    role_guard(&req, ROLE_PROVIDER)?;
    Ok(next.run(req).await)
}

pub async fn require_admin(req: Request, next: Next) -> Result<Response, StatusCode> {
    role_guard(&req, ROLE_ADMIN)?;
    Ok(next.run(req).await)
}
