use std::{env, net::SocketAddr};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes::{self, auth};
use service::auth::{domain::RegisterInput, repo::seaorm::SeaOrmAuthRepository, service::{AuthConfig, AuthService}};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load host/port from configs or env vars, with sensible fallbacks
fn load_bind_addr() -> anyhow::Result<SocketAddr> {
    let (host, port) = match configs::load_default() {
        Ok(cfg) => {
            let s = cfg.server;
            (s.host, s.port)
        }
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8081);
            (host, port)
        }
    };
    Ok(format!("{}:{}", host, port).parse()?)
}

/// Create the admin account from ADMIN_USERNAME / ADMIN_PASSWORD when the
/// platform has none yet. Without those vars nothing happens.
async fn seed_admin(db: &sea_orm::DatabaseConnection, jwt_secret: &str) -> anyhow::Result<()> {
    let (Ok(username), Ok(password)) = (env::var("ADMIN_USERNAME"), env::var("ADMIN_PASSWORD")) else {
        return Ok(());
    };
    if models::user::find_by_username(db, &username).await?.is_some() {
        return Ok(());
    }
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| format!("{username}@example.com"));
    let repo = std::sync::Arc::new(SeaOrmAuthRepository { db: db.clone() });
    let svc = AuthService::new(repo, AuthConfig { jwt_secret: Some(jwt_secret.to_string()), password_algorithm: "argon2".into() });
    let input = RegisterInput { username: username.clone(), email, password: password.clone(), password_confirm: password };
    match svc.register(input, models::user::ROLE_ADMIN).await {
        Ok(admin) => info!(admin_id = %admin.id, %username, "admin account seeded"),
        Err(e) => warn!(%username, error = %e, "admin seeding failed"),
    }
    Ok(())
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    // DB connection: pooled settings from config when available
    let db = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => models::db::connect_with(&cfg.database).await?,
        Err(_) => models::db::connect().await?,
    };

    // Apply pending schema migrations before serving
    migration::Migrator::up(&db, None).await?;

    // JWT secret
    let jwt_secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".to_string());

    seed_admin(&db, &jwt_secret).await?;

    let state = auth::ServerState {
        db,
        auth: auth::ServerAuthConfig { jwt_secret },
    };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr = load_bind_addr()?;
    info!(%addr, "starting booking service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
