use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use models::{booking, customer, listing, provider};

use crate::booking_status::{BookingStatus, CURRENT_STATUSES, PAST_STATUSES};
use crate::earnings_service;
use crate::errors::ServiceError;

pub const PAYMENT_ONLINE: &str = "online";
pub const PAYMENT_COD: &str = "cod";

#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingInput {
    pub provider_id: Uuid,
    pub listing_id: Uuid,
    pub schedule_date: NaiveDate,
    pub timing: String,
}

/// Create a booking for the customer behind `customer_user_id`.
///
/// Rejects incomplete profiles, listings not owned by the chosen provider
/// and duplicates of an existing (listing, date, slot) booking.
#[instrument(skip(db, input), fields(customer_user = %customer_user_id))]
pub async fn create_booking(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
    input: CreateBookingInput,
) -> Result<booking::Model, ServiceError> {
    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;

    if !customer.profile_complete() {
        return Err(ServiceError::Validation(
            "please complete your profile (phone and address) before booking a service".into(),
        ));
    }

    let provider = provider::Entity::find_by_id(input.provider_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::Validation("invalid service provider".into()))?;

    let listing = listing::Entity::find_by_id(input.listing_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .filter(|l| l.provider_id == provider.id)
        .ok_or_else(|| ServiceError::Validation("invalid service selection".into()))?;

    if booking::find_duplicate(db, customer.id, provider.id, listing.id, input.schedule_date, &input.timing)
        .await?
        .is_some()
    {
        return Err(ServiceError::Conflict(
            "you have already booked this service for the selected date and time".into(),
        ));
    }

    let created = booking::create(
        db,
        customer.id,
        provider.id,
        listing.id,
        input.schedule_date,
        &input.timing,
        BookingStatus::Pending.as_str(),
    )
    .await?;
    info!(booking_id = %created.id, customer_id = %customer.id, provider_id = %provider.id, "booking_created");
    Ok(created)
}

/// Customer's bookings split into current and past by status.
pub async fn customer_bookings(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
) -> Result<(Vec<booking::Model>, Vec<booking::Model>), ServiceError> {
    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;
    let current = booking::for_customer_in_statuses(db, customer.id, &CURRENT_STATUSES).await?;
    let past = booking::for_customer_in_statuses(db, customer.id, &PAST_STATUSES).await?;
    Ok((current, past))
}

/// Cancel a booking owned by the customer; only allowed before arrival.
#[instrument(skip(db), fields(customer_user = %customer_user_id, booking = %booking_id))]
pub async fn cancel_booking(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
    booking_id: Uuid,
) -> Result<booking::Model, ServiceError> {
    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;

    let found = booking::Entity::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .filter(|b| b.customer_id == customer.id)
        .ok_or_else(|| ServiceError::not_found("booking"))?;

    let status = BookingStatus::parse(&found.status)
        .ok_or_else(|| ServiceError::Db(format!("corrupt booking status: {}", found.status)))?;
    if !status.can_transition_to(BookingStatus::Cancelled) {
        return Err(ServiceError::Validation(
            "cannot cancel completed or already cancelled bookings".into(),
        ));
    }

    let mut am: booking::ActiveModel = found.into();
    am.status = Set(BookingStatus::Cancelled.as_str().to_string());
    let updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(booking_id = %updated.id, "booking_cancelled");
    Ok(updated)
}

/// Provider's bookings, newest first.
pub async fn provider_bookings(
    db: &DatabaseConnection,
    provider_user_id: Uuid,
) -> Result<Vec<booking::Model>, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;
    Ok(booking::for_provider(db, provider.id).await?)
}

/// Provider moves a booking along the lifecycle. Confirming credits the
/// provider's earnings (at most once per booking).
#[instrument(skip(db), fields(provider_user = %provider_user_id, booking = %booking_id, status = %new_status))]
pub async fn update_status(
    db: &DatabaseConnection,
    provider_user_id: Uuid,
    booking_id: Uuid,
    new_status: &str,
) -> Result<booking::Model, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;

    let found = booking::Entity::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .filter(|b| b.provider_id == provider.id)
        .ok_or_else(|| ServiceError::not_found("booking"))?;

    let next = BookingStatus::parse(new_status)
        .ok_or_else(|| ServiceError::Validation(format!("unknown status: {new_status}")))?;
    let current = BookingStatus::parse(&found.status)
        .ok_or_else(|| ServiceError::Db(format!("corrupt booking status: {}", found.status)))?;
    if !current.can_transition_to(next) {
        return Err(ServiceError::Validation(format!(
            "cannot move booking from {current} to {next}"
        )));
    }

    let mut am: booking::ActiveModel = found.into();
    am.status = Set(next.as_str().to_string());
    let mut updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    if next == BookingStatus::Confirmed {
        let credited = earnings_service::credit_booking(db, updated.id).await?;
        if credited {
            // reload to reflect the earnings_credited flag set in the credit txn
            updated = booking::Entity::find_by_id(updated.id)
                .one(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?
                .ok_or_else(|| ServiceError::not_found("booking"))?;
        }
    }

    info!(booking_id = %updated.id, status = %updated.status, "booking_status_updated");
    Ok(updated)
}

pub struct PaymentReceipt {
    pub booking: booking::Model,
    pub amount: Decimal,
}

/// Record the chosen payment method for a customer's booking.
///
/// Cash on delivery keeps everything pending until the provider confirms;
/// online payment credits the provider immediately. Either way the booking
/// stays in `pending` until the provider moves it forward.
#[instrument(skip(db), fields(customer_user = %customer_user_id, booking = %booking_id, method = %method))]
pub async fn record_payment(
    db: &DatabaseConnection,
    customer_user_id: Uuid,
    booking_id: Uuid,
    method: &str,
) -> Result<PaymentReceipt, ServiceError> {
    if method != PAYMENT_ONLINE && method != PAYMENT_COD {
        return Err(ServiceError::Validation("please select a payment method".into()));
    }

    let customer = customer::find_by_user(db, customer_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("customer profile"))?;

    let found = booking::Entity::find_by_id(booking_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .filter(|b| b.customer_id == customer.id)
        .ok_or_else(|| ServiceError::not_found("booking"))?;

    let li = listing::Entity::find_by_id(found.listing_id)
        .one(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("listing"))?;
    let amount = li.price;

    let mut am: booking::ActiveModel = found.into();
    am.payment_method = Set(Some(method.to_string()));
    let mut updated = am.update(db).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    if method == PAYMENT_ONLINE {
        let credited = earnings_service::credit_booking(db, updated.id).await?;
        if credited {
            updated = booking::Entity::find_by_id(updated.id)
                .one(db)
                .await
                .map_err(|e| ServiceError::Db(e.to_string()))?
                .ok_or_else(|| ServiceError::not_found("booking"))?;
        } else {
            warn!(booking_id = %updated.id, "payment received for already credited booking");
        }
        info!(booking_id = %updated.id, %amount, "payment_success");
    } else {
        info!(booking_id = %updated.id, %amount, "cod_selected");
    }

    Ok(PaymentReceipt { booking: updated, amount })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::get_db;
    use models::{provider_earning, service_category, user};

    async fn seed(db: &DatabaseConnection) -> anyhow::Result<(Uuid, Uuid, Uuid, Uuid)> {
        let cu = user::create(db, &format!("bk_cust_{}", Uuid::new_v4()), &format!("bc_{}@example.com", Uuid::new_v4()), user::ROLE_CUSTOMER).await?;
        let c = customer::create(db, cu.id).await?;
        customer::update_contact(db, c.id, Some("9876543210".into()), Some("12 Main St".into())).await?;
        let pu = user::create(db, &format!("bk_prov_{}", Uuid::new_v4()), &format!("bp_{}@example.com", Uuid::new_v4()), user::ROLE_PROVIDER).await?;
        let p = provider::create(db, pu.id).await?;
        let cat = service_category::create(db, &format!("carpenter_{}", Uuid::new_v4()), None).await?;
        let l = listing::create(db, p.id, cat.id, "4 Side Rd", "9998887776", "4-5", Decimal::new(75000, 2)).await?;
        Ok((cu.id, pu.id, p.id, l.id))
    }

    #[tokio::test]
    async fn booking_lifecycle_with_single_credit() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (cu, pu, pid, lid) = seed(&db).await?;

        let date = NaiveDate::from_ymd_opt(2026, 10, 2).unwrap();
        let input = CreateBookingInput { provider_id: pid, listing_id: lid, schedule_date: date, timing: "10:00 AM - 12:00 PM".into() };
        let b = create_booking(&db, cu, input.clone()).await?;
        assert_eq!(b.status, "pending");

        // duplicate rejected
        let dup = create_booking(&db, cu, input).await;
        assert!(matches!(dup, Err(ServiceError::Conflict(_))));

        // online payment credits once
        let receipt = record_payment(&db, cu, b.id, PAYMENT_ONLINE).await?;
        assert!(receipt.booking.earnings_credited);
        assert_eq!(receipt.amount, Decimal::new(75000, 2));

        // provider confirms: no second credit
        let confirmed = update_status(&db, pu, b.id, "confirmed").await?;
        assert_eq!(confirmed.status, "confirmed");
        let earning = provider_earning::get_or_create(&db, pid).await?;
        assert_eq!(earning.total_earnings, Decimal::new(75000, 2));

        // forward to completed, then cancellation is rejected
        update_status(&db, pu, b.id, "completed").await?;
        let cancel = cancel_booking(&db, cu, b.id).await;
        assert!(matches!(cancel, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn incomplete_profile_cannot_book() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;

        let cu = user::create(&db, &format!("bare_{}", Uuid::new_v4()), &format!("bare_{}@example.com", Uuid::new_v4()), user::ROLE_CUSTOMER).await?;
        customer::create(&db, cu.id).await?;
        let (_, _, pid, lid) = seed(&db).await?;

        let input = CreateBookingInput {
            provider_id: pid,
            listing_id: lid,
            schedule_date: NaiveDate::from_ymd_opt(2026, 10, 3).unwrap(),
            timing: "02:00 PM - 04:00 PM".into(),
        };
        let res = create_booking(&db, cu.id, input).await;
        assert!(matches!(res, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn provider_cannot_touch_foreign_booking() -> anyhow::Result<()> {
        if std::env::var("SKIP_DB_TESTS").is_ok() { return Ok(()); }
        let db = get_db().await?;
        let (cu, _pu, pid, lid) = seed(&db).await?;
        let (_, other_pu, _, _) = seed(&db).await?;

        let input = CreateBookingInput {
            provider_id: pid,
            listing_id: lid,
            schedule_date: NaiveDate::from_ymd_opt(2026, 10, 4).unwrap(),
            timing: "10:00 AM - 12:00 PM".into(),
        };
        let b = create_booking(&db, cu, input).await?;

        let res = update_status(&db, other_pu, b.id, "confirmed").await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
