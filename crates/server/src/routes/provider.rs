use axum::{extract::{Path, State}, http::StatusCode, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{booking_service, earnings_service, listing_service};
use models::{booking, listing};

use crate::errors::to_tuple;
use crate::routes::auth::{AuthContext, ServerState};

#[derive(Serialize)]
pub struct DashboardOutput {
    pub username: String,
    pub listings: Vec<listing::Model>,
    pub total_earnings: Decimal,
}

pub async fn dashboard(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<DashboardOutput>, (StatusCode, String)> {
    let listings = listing_service::provider_listings(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    let total_earnings = earnings_service::provider_total(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(DashboardOutput { username: ctx.username, listings, total_earnings }))
}

#[derive(Serialize)]
pub struct ProfileOutput {
    pub user_id: Uuid,
    pub username: String,
    pub latest_listing: Option<listing::Model>,
}

pub async fn profile(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<ProfileOutput>, (StatusCode, String)> {
    let mut listings = listing_service::provider_listings(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    let latest_listing = if listings.is_empty() { None } else { Some(listings.remove(0)) };
    Ok(Json(ProfileOutput { user_id: ctx.user_id, username: ctx.username, latest_listing }))
}

pub async fn listings(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<listing::Model>>, (StatusCode, String)> {
    let out = listing_service::provider_listings(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

pub async fn create_listing(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<listing_service::CreateListingInput>,
) -> Result<Json<listing::Model>, (StatusCode, String)> {
    let created = listing_service::create_listing(&state.db, ctx.user_id, input)
        .await
        .map_err(to_tuple)?;
    Ok(Json(created))
}

pub async fn listing_defaults(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Option<listing_service::ListingDefaults>>, (StatusCode, String)> {
    let out = listing_service::listing_defaults(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

pub async fn bookings(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<booking::Model>>, (StatusCode, String)> {
    let out = booking_service::provider_bookings(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct StatusUpdateInput {
    pub status: String,
}

#[utoipa::path(post, path = "/provider/bookings/{id}/status", tag = "provider", request_body = crate::openapi::StatusUpdateRequest, responses((status = 200, description = "Updated"), (status = 400, description = "Invalid transition"), (status = 404, description = "Not Found")))]
pub async fn update_status(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusUpdateInput>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let updated = booking_service::update_status(&state.db, ctx.user_id, id, &input.status)
        .await
        .map_err(to_tuple)?;
    Ok(Json(serde_json::json!({
        "success": true,
        "new_status": updated.status,
        "earnings_credited": updated.earnings_credited,
    })))
}
