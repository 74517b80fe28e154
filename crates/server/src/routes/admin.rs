use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use sea_orm::EntityTrait;
use serde::Deserialize;
use uuid::Uuid;

use service::{admin_service, catalog_service, pagination::Pagination};
use models::service_category;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

pub async fn dashboard(
    State(state): State<ServerState>,
) -> Result<Json<admin_service::DashboardSummary>, JsonApiError> {
    let out = admin_service::dashboard(&state.db).await?;
    Ok(Json(out))
}

#[utoipa::path(get, path = "/admin/categories", tag = "admin", responses((status = 200, description = "OK")))]
pub async fn list_categories(
    State(state): State<ServerState>,
) -> Result<Json<Vec<service_category::Model>>, JsonApiError> {
    let out = catalog_service::list_categories(&state.db).await?;
    Ok(Json(out))
}

#[derive(Deserialize)]
pub struct CategoryInput {
    pub name: String,
    pub image_url: Option<String>,
}

#[utoipa::path(post, path = "/admin/categories", tag = "admin", request_body = crate::openapi::CategoryRequest, responses((status = 200, description = "Created"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn create_category(
    State(state): State<ServerState>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<service_category::Model>, JsonApiError> {
    let created = catalog_service::create_category(&state.db, &input.name, input.image_url).await?;
    Ok(Json(created))
}

pub async fn delete_category(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, JsonApiError> {
    catalog_service::delete_category(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Providers offering the category behind `id`, one entry per provider.
pub async fn category_providers(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<catalog_service::CategoryProvider>>, JsonApiError> {
    let category = service_category::Entity::find_by_id(id)
        .one(&state.db)
        .await
        .map_err(|e| JsonApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", Some(e.to_string())))?
        .ok_or_else(|| JsonApiError::new(StatusCode::NOT_FOUND, "Not Found", Some("category not found".into())))?;
    let out = catalog_service::providers_by_category(&state.db, &category.name).await?;
    Ok(Json(out))
}

pub async fn providers(
    State(state): State<ServerState>,
) -> Result<Json<Vec<admin_service::ProviderWithListing>>, JsonApiError> {
    let out = admin_service::providers_with_listings(&state.db).await?;
    Ok(Json(out))
}

pub async fn delete_provider(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let username = admin_service::delete_provider(&state.db, id).await?;
    Ok(Json(serde_json::json!({"deleted": username})))
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn customers(
    State(state): State<ServerState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Vec<admin_service::CustomerSummary>>, JsonApiError> {
    let defaults = Pagination::default();
    let opts = Pagination {
        page: q.page.unwrap_or(defaults.page),
        per_page: q.per_page.unwrap_or(defaults.per_page),
    };
    let out = admin_service::customers_with_phone(&state.db, opts).await?;
    Ok(Json(out))
}

pub async fn delete_customer(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, JsonApiError> {
    let username = admin_service::delete_customer(&state.db, id).await?;
    Ok(Json(serde_json::json!({"deleted": username})))
}
