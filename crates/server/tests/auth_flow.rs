use axum::Router;
use axum::http::{Request, StatusCode};
use axum::body::Body;
use tower::Service;
use serde_json::json;
use uuid::Uuid;
use migration::MigratorTrait;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<Router> {
    let db = models::db::connect().await?;
    // Run migrations to ensure schema; re-running may hit already-applied entries
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into() },
    };
    Ok(routes::build_router(cors(), state))
}

fn signup_body(username: &str, email: &str, password: &str) -> serde_json::Value {
    json!({"username": username, "email": email, "password": password, "password_confirm": password})
}

#[tokio::test]
async fn test_signup_and_login_flow() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let username = format!("user_{}", Uuid::new_v4());
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let password = "S3curePass!";

    // Signup
    let req = Request::builder()
        .method("POST")
        .uri("/auth/signup/customer")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body(&username, &email, password))?))?;
    let resp = app.clone().call(req).await?;
    eprintln!("signup status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::OK);

    // Login
    let req = Request::builder()
        .method("POST")
        .uri("/auth/login/customer")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": username, "password": password}))?))?;
    let resp = app.clone().call(req).await?;
    eprintln!("login status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::OK);
    // Must set cookie
    let cookie = resp.headers().get("set-cookie");
    assert!(cookie.is_some());
    Ok(())
}

#[tokio::test]
async fn test_login_wrong_password() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let username = format!("user_{}", Uuid::new_v4());
    let email = format!("user_{}@example.com", Uuid::new_v4());

    let req = Request::builder().method("POST").uri("/auth/signup/customer").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body(&username, &email, "StrongPass123!"))?))?;
    let _ = app.clone().call(req).await?;

    let req = Request::builder().method("POST").uri("/auth/login/customer").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": username, "password": "wrong"}))?))?;
    let resp = app.clone().call(req).await?;
    eprintln!("login wrong pass status={}", resp.status());
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_login_role_mismatch_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let username = format!("user_{}", Uuid::new_v4());
    let email = format!("user_{}@example.com", Uuid::new_v4());
    let password = "StrongPass123!";

    // Customer account...
    let req = Request::builder().method("POST").uri("/auth/signup/customer").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body(&username, &email, password))?))?;
    let _ = app.clone().call(req).await?;

    // ...must not pass the provider login
    let req = Request::builder().method("POST").uri("/auth/login/provider").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json!({"username": username, "password": password}))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn test_signup_weak_password_rejected() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    // no uppercase, no special char
    let req = Request::builder().method("POST").uri("/auth/signup/provider").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body("weakling", "weak@example.com", "weakpass1"))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_username_conflict() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    let username = format!("user_{}", Uuid::new_v4());
    let password = "StrongPass123!";

    let req = Request::builder().method("POST").uri("/auth/signup/customer").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body(&username, &format!("a_{}@example.com", Uuid::new_v4()), password))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder().method("POST").uri("/auth/signup/customer").header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&signup_body(&username, &format!("b_{}@example.com", Uuid::new_v4()), password))?))?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    Ok(())
}

#[tokio::test]
async fn test_protected_route_without_token() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let app = build_app().await?;

    // Global middleware: missing Authorization and auth_token cookie -> 400
    let req = Request::builder().method("GET").uri("/customer/profile").body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Garbage token -> 401
    let req = Request::builder().method("GET").uri("/customer/profile")
        .header("Authorization", "Bearer not-a-jwt")
        .body(Body::empty())?;
    let resp = app.clone().call(req).await?;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}
