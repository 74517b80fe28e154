pub mod auth;
pub mod customer;
pub mod provider;
pub mod admin;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;
use axum::middleware;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;
use service::review_service;

use crate::errors::to_tuple;
use crate::openapi::ApiDoc;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK")))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

#[derive(Deserialize)]
pub struct LatestReviewsQuery {
    pub limit: Option<u64>,
}

/// Landing page feed: newest reviews across all customers.
pub async fn latest_reviews(
    State(state): State<auth::ServerState>,
    Query(q): Query<LatestReviewsQuery>,
) -> Result<Json<Vec<review_service::ReviewView>>, (StatusCode, String)> {
    let limit = q.limit.unwrap_or(10).clamp(1, 50);
    let reviews = review_service::latest_reviews(&state.db, limit)
        .await
        .map_err(to_tuple)?;
    Ok(Json(reviews))
}

/// Build the full application router: public, customer, provider and admin
/// scopes, wrapped by the bearer-token middleware and request tracing.
pub fn build_router(cors: CorsLayer, state: auth::ServerState) -> Router {
    // Public routes (health, landing feed, signup/login)
    let public = Router::new()
        .route("/health", get(health))
        .route("/reviews/latest", get(latest_reviews))
        .route("/auth/signup/customer", post(auth::signup_customer))
        .route("/auth/signup/provider", post(auth::signup_provider))
        .route("/auth/login/customer", post(auth::login_customer))
        .route("/auth/login/provider", post(auth::login_provider))
        .route("/auth/login/admin", post(auth::login_admin))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    // Customer scope
    let customer_routes = Router::new()
        .route("/customer/profile", get(customer::profile).put(customer::update_profile))
        .route("/customer/categories", get(customer::categories))
        .route("/customer/categories/:name/providers", get(customer::providers_by_category))
        .route("/customer/bookings", get(customer::bookings).post(customer::create_booking))
        .route("/customer/bookings/:id/cancel", post(customer::cancel_booking))
        .route("/customer/bookings/:id/payment", post(customer::payment))
        .route("/customer/reviews", get(customer::reviews).post(customer::submit_review))
        .route_layer(middleware::from_fn(auth::require_customer));

    // Provider scope
    let provider_routes = Router::new()
        .route("/provider/dashboard", get(provider::dashboard))
        .route("/provider/profile", get(provider::profile))
        .route("/provider/listings", get(provider::listings).post(provider::create_listing))
        .route("/provider/listings/defaults", get(provider::listing_defaults))
        .route("/provider/bookings", get(provider::bookings))
        .route("/provider/bookings/:id/status", post(provider::update_status))
        .route_layer(middleware::from_fn(auth::require_provider));

    // Admin scope
    let admin_routes = Router::new()
        .route("/admin/dashboard", get(admin::dashboard))
        .route("/admin/categories", get(admin::list_categories).post(admin::create_category))
        .route("/admin/categories/:id", delete(admin::delete_category))
        .route("/admin/categories/:id/providers", get(admin::category_providers))
        .route("/admin/providers", get(admin::providers))
        .route("/admin/providers/:id", delete(admin::delete_provider))
        .route("/admin/customers", get(admin::customers))
        .route("/admin/customers/:id", delete(admin::delete_customer))
        .route_layer(middleware::from_fn(auth::require_admin));

    // Compose
    public
        .merge(customer_routes)
        .merge(provider_routes)
        .merge(admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token_state,
        ))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
