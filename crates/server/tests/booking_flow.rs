use axum::Router;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::Service;
use uuid::Uuid;
use migration::MigratorTrait;

use server::routes::{self, auth};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app() -> anyhow::Result<(Router, sea_orm::DatabaseConnection)> {
    let db = models::db::connect().await?;
    if let Err(e) = migration::Migrator::up(&db, None).await {
        let msg = format!("{}", e);
        if msg.contains("duplicate key value violates unique constraint") {
            eprintln!("migrations already applied, continue: {}", msg);
        } else {
            return Err(e.into());
        }
    }
    let state = auth::ServerState {
        db: db.clone(),
        auth: auth::ServerAuthConfig { jwt_secret: "test-secret".into() },
    };
    Ok((routes::build_router(cors(), state), db))
}

async fn call_json(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = token {
        builder = builder.header("Authorization", format!("Bearer {}", t));
    }
    let req = match body {
        Some(v) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&v)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().call(req).await?;
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await?;
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, value))
}

/// Signup + login, returning the bearer token.
async fn make_account(app: &Router, role: &str) -> anyhow::Result<String> {
    let username = format!("{}_{}", role, Uuid::new_v4());
    let email = format!("{}_{}@example.com", role, Uuid::new_v4());
    let password = "S3curePass!";
    let body = json!({"username": username, "email": email, "password": password, "password_confirm": password});
    let (status, _) = call_json(app, "POST", &format!("/auth/signup/{}", role), None, Some(body)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, out) = call_json(
        app,
        "POST",
        &format!("/auth/login/{}", role),
        None,
        Some(json!({"username": username, "password": password})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    Ok(out["token"].as_str().expect("token in login output").to_string())
}

#[tokio::test]
async fn test_full_booking_flow_with_single_credit() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, db) = build_app().await?;

    let customer_token = make_account(&app, "customer").await?;
    let provider_token = make_account(&app, "provider").await?;

    // Category is admin-managed; seed it directly
    let cat = models::service_category::create(&db, &format!("plumber_{}", Uuid::new_v4()), None).await?;

    // Customer completes the contact profile
    let (status, profile) = call_json(
        &app,
        "PUT",
        "/customer/profile",
        Some(&customer_token),
        Some(json!({"phone": "9876543210", "address": "12 Main St"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["complete"], json!(true));

    // Provider lists the service
    let (status, listing) = call_json(
        &app,
        "POST",
        "/provider/listings",
        Some(&provider_token),
        Some(json!({
            "category_id": cat.id,
            "address": "4 Side Rd",
            "phone": "9998887776",
            "experience": "4-5",
            "price": "750.00"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let listing_id = listing["id"].as_str().unwrap().to_string();
    let provider_id = listing["provider_id"].as_str().unwrap().to_string();

    // Customer finds the provider in the category browse
    let (status, browse) = call_json(
        &app,
        "GET",
        &format!("/customer/categories/{}/providers", cat.name),
        Some(&customer_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert!(browse.as_array().unwrap().iter().any(|e| e["listing_id"] == json!(listing_id)));

    // Book it
    let booking_body = json!({
        "provider_id": provider_id,
        "listing_id": listing_id,
        "schedule_date": "2026-09-14",
        "timing": "10:00 AM - 12:00 PM"
    });
    let (status, created) = call_json(&app, "POST", "/customer/bookings", Some(&customer_token), Some(booking_body.clone())).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["status"], json!("pending"));
    let booking_id = created["booking_id"].as_str().unwrap().to_string();

    // Same slot twice is rejected
    let (status, _) = call_json(&app, "POST", "/customer/bookings", Some(&customer_token), Some(booking_body)).await?;
    assert_eq!(status, StatusCode::CONFLICT);

    // Pay online: provider credited immediately
    let (status, receipt) = call_json(
        &app,
        "POST",
        &format!("/customer/bookings/{}/payment", booking_id),
        Some(&customer_token),
        Some(json!({"method": "online"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["amount"], json!("750.00"));

    // Provider confirms; the earlier payment already credited, so the
    // accumulator must not move again
    let (status, updated) = call_json(
        &app,
        "POST",
        &format!("/provider/bookings/{}/status", booking_id),
        Some(&provider_token),
        Some(json!({"status": "confirmed"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["new_status"], json!("confirmed"));
    assert_eq!(updated["earnings_credited"], json!(true));

    let (status, dash) = call_json(&app, "GET", "/provider/dashboard", Some(&provider_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    let total: Decimal = dash["total_earnings"].as_str().unwrap().parse()?;
    assert_eq!(total, Decimal::new(75000, 2));

    // Backwards transition is rejected
    let (status, _) = call_json(
        &app,
        "POST",
        &format!("/provider/bookings/{}/status", booking_id),
        Some(&provider_token),
        Some(json!({"status": "pending"})),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Complete, then cancellation is rejected
    let (status, _) = call_json(
        &app,
        "POST",
        &format!("/provider/bookings/{}/status", booking_id),
        Some(&provider_token),
        Some(json!({"status": "completed"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call_json(
        &app,
        "POST",
        &format!("/customer/bookings/{}/cancel", booking_id),
        Some(&customer_token),
        None,
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "cancel after completion: {body}");

    // Past list now holds the booking
    let (status, lists) = call_json(&app, "GET", "/customer/bookings", Some(&customer_token), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert!(lists["past"].as_array().unwrap().iter().any(|b| b["id"] == json!(booking_id)));

    models::service_category::hard_delete(&db, cat.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_incomplete_profile_blocks_booking() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, db) = build_app().await?;

    let customer_token = make_account(&app, "customer").await?;
    let provider_token = make_account(&app, "provider").await?;

    let cat = models::service_category::create(&db, &format!("cleaner_{}", Uuid::new_v4()), None).await?;
    let (_, listing) = call_json(
        &app,
        "POST",
        "/provider/listings",
        Some(&provider_token),
        Some(json!({
            "category_id": cat.id,
            "address": "4 Side Rd",
            "phone": "9998887776",
            "experience": "0-1",
            "price": "200.00"
        })),
    )
    .await?;

    // No phone/address on the profile yet
    let (status, body) = call_json(
        &app,
        "POST",
        "/customer/bookings",
        Some(&customer_token),
        Some(json!({
            "provider_id": listing["provider_id"],
            "listing_id": listing["id"],
            "schedule_date": "2026-09-15",
            "timing": "02:00 PM - 04:00 PM"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST, "expected profile gate: {body}");

    models::service_category::hard_delete(&db, cat.id).await?;
    Ok(())
}

#[tokio::test]
async fn test_role_guards() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, _db) = build_app().await?;

    let customer_token = make_account(&app, "customer").await?;

    // Customer token cannot reach provider or admin scopes
    let (status, _) = call_json(&app, "GET", "/provider/bookings", Some(&customer_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call_json(&app, "GET", "/admin/dashboard", Some(&customer_token), None).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_cod_payment_defers_credit() -> anyhow::Result<()> {
    if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
    let (app, db) = build_app().await?;

    let customer_token = make_account(&app, "customer").await?;
    let provider_token = make_account(&app, "provider").await?;
    let cat = models::service_category::create(&db, &format!("tutor_{}", Uuid::new_v4()), None).await?;

    let (_, _) = call_json(
        &app,
        "PUT",
        "/customer/profile",
        Some(&customer_token),
        Some(json!({"phone": "9876501234", "address": "8 Elm St"})),
    )
    .await?;
    let (_, listing) = call_json(
        &app,
        "POST",
        "/provider/listings",
        Some(&provider_token),
        Some(json!({
            "category_id": cat.id,
            "address": "4 Side Rd",
            "phone": "9998887776",
            "experience": "10+",
            "price": "300.00"
        })),
    )
    .await?;

    let (status, created) = call_json(
        &app,
        "POST",
        "/customer/bookings",
        Some(&customer_token),
        Some(json!({
            "provider_id": listing["provider_id"],
            "listing_id": listing["id"],
            "schedule_date": "2026-09-16",
            "timing": "10:00 AM - 12:00 PM"
        })),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let booking_id = created["booking_id"].as_str().unwrap().to_string();

    // Cash on delivery: nothing credited yet
    let (status, receipt) = call_json(
        &app,
        "POST",
        &format!("/customer/bookings/{}/payment", booking_id),
        Some(&customer_token),
        Some(json!({"method": "cod"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["status"], json!("pending"));

    let (_, dash) = call_json(&app, "GET", "/provider/dashboard", Some(&provider_token), None).await?;
    let total: Decimal = dash["total_earnings"].as_str().unwrap().parse()?;
    assert_eq!(total, Decimal::ZERO);

    // Confirmation triggers the one credit
    let (status, updated) = call_json(
        &app,
        "POST",
        &format!("/provider/bookings/{}/status", booking_id),
        Some(&provider_token),
        Some(json!({"status": "confirmed"})),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["earnings_credited"], json!(true));

    let (_, dash) = call_json(&app, "GET", "/provider/dashboard", Some(&provider_token), None).await?;
    let total: Decimal = dash["total_earnings"].as_str().unwrap().parse()?;
    assert_eq!(total, Decimal::new(30000, 2));

    models::service_category::hard_delete(&db, cat.id).await?;
    Ok(())
}
