use axum::{extract::{Path, State}, http::StatusCode, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use service::{booking_service, catalog_service, profile_service, review_service};
use models::{booking, review, service_category};

use crate::errors::to_tuple;
use crate::routes::auth::{AuthContext, ServerState};

pub async fn profile(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<profile_service::CustomerProfile>, (StatusCode, String)> {
    let out = profile_service::customer_profile(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct UpdateProfileInput {
    pub phone: Option<String>,
    pub address: Option<String>,
}

pub async fn update_profile(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<UpdateProfileInput>,
) -> Result<Json<profile_service::CustomerProfile>, (StatusCode, String)> {
    let out = profile_service::update_customer_profile(&state.db, ctx.user_id, input.phone, input.address)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

pub async fn categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<service_category::Model>>, (StatusCode, String)> {
    let out = catalog_service::list_categories(&state.db).await.map_err(to_tuple)?;
    Ok(Json(out))
}

pub async fn providers_by_category(
    State(state): State<ServerState>,
    Path(name): Path<String>,
) -> Result<Json<Vec<catalog_service::CategoryProvider>>, (StatusCode, String)> {
    let out = catalog_service::providers_by_category(&state.db, &name)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

#[derive(Serialize)]
pub struct CreatedBookingOutput {
    pub booking_id: Uuid,
    pub status: String,
    pub message: String,
}

#[utoipa::path(post, path = "/customer/bookings", tag = "customer", request_body = crate::openapi::CreateBookingRequest, responses((status = 200, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Duplicate booking")))]
pub async fn create_booking(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<booking_service::CreateBookingInput>,
) -> Result<Json<CreatedBookingOutput>, (StatusCode, String)> {
    let created = booking_service::create_booking(&state.db, ctx.user_id, input)
        .await
        .map_err(to_tuple)?;
    Ok(Json(CreatedBookingOutput {
        booking_id: created.id,
        status: created.status,
        message: "booking created successfully".into(),
    }))
}

#[derive(Serialize)]
pub struct BookingListOutput {
    pub current: Vec<booking::Model>,
    pub past: Vec<booking::Model>,
}

pub async fn bookings(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<BookingListOutput>, (StatusCode, String)> {
    let (current, past) = booking_service::customer_bookings(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(BookingListOutput { current, past }))
}

pub async fn cancel_booking(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let cancelled = booking_service::cancel_booking(&state.db, ctx.user_id, id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(serde_json::json!({"success": true, "status": cancelled.status})))
}

#[derive(Deserialize)]
pub struct PaymentInput {
    pub method: String,
}

#[derive(Serialize)]
pub struct PaymentOutput {
    pub booking_id: Uuid,
    pub status: String,
    pub method: String,
    pub amount: Decimal,
    pub message: String,
}

#[utoipa::path(post, path = "/customer/bookings/{id}/payment", tag = "customer", request_body = crate::openapi::PaymentRequest, responses((status = 200, description = "Recorded"), (status = 400, description = "Bad Request"), (status = 404, description = "Not Found")))]
pub async fn payment(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<PaymentInput>,
) -> Result<Json<PaymentOutput>, (StatusCode, String)> {
    let receipt = booking_service::record_payment(&state.db, ctx.user_id, id, &input.method)
        .await
        .map_err(to_tuple)?;
    let message = if input.method == booking_service::PAYMENT_COD {
        "booking placed; the provider will confirm soon, pay cash after service completion".to_string()
    } else {
        format!("payment successful, {} credited to the provider", receipt.amount)
    };
    Ok(Json(PaymentOutput {
        booking_id: receipt.booking.id,
        status: receipt.booking.status,
        method: input.method,
        amount: receipt.amount,
        message,
    }))
}

pub async fn reviews(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Vec<review::Model>>, (StatusCode, String)> {
    let out = review_service::customer_reviews(&state.db, ctx.user_id)
        .await
        .map_err(to_tuple)?;
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct ReviewInput {
    pub content: String,
}

pub async fn submit_review(
    State(state): State<ServerState>,
    Extension(ctx): Extension<AuthContext>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<review::Model>, (StatusCode, String)> {
    let created = review_service::submit_review(&state.db, ctx.user_id, &input.content)
        .await
        .map_err(to_tuple)?;
    Ok(Json(created))
}
