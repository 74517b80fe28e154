use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest { pub username: String, pub email: String, pub password: String, pub password_confirm: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct CategoryRequest { pub name: String, pub image_url: Option<String> }

#[derive(utoipa::ToSchema)]
pub struct CreateBookingRequest {
    pub provider_id: Uuid,
    pub listing_id: Uuid,
    /// ISO date, e.g. 2026-09-14
    pub schedule_date: String,
    pub timing: String,
}

#[derive(utoipa::ToSchema)]
pub struct PaymentRequest {
    /// `online` or `cod`
    pub method: String,
}

#[derive(utoipa::ToSchema)]
pub struct StatusUpdateRequest {
    /// One of: confirmed, arriving, arrived, completed, cancelled
    pub status: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::signup_customer,
        crate::routes::auth::signup_provider,
        crate::routes::auth::login_customer,
        crate::routes::auth::login_provider,
        crate::routes::auth::login_admin,
        crate::routes::customer::create_booking,
        crate::routes::customer::payment,
        crate::routes::provider::update_status,
        crate::routes::admin::list_categories,
        crate::routes::admin::create_category,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            CategoryRequest,
            CreateBookingRequest,
            PaymentRequest,
            StatusUpdateRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "customer"),
        (name = "provider"),
        (name = "admin")
    )
)]
pub struct ApiDoc;
