use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use tracing::{info, instrument};
use uuid::Uuid;

use models::{booking, listing, provider, provider_earning};

use crate::errors::ServiceError;

/// Credit a booking's listing price to its provider, at most once.
///
/// Runs read-flag -> increment -> set-flag inside one transaction so the
/// two accrual triggers (provider confirmation, online payment) cannot
/// both credit the same booking. Returns whether a credit happened.
#[instrument(skip(db), fields(booking = %booking_id))]
pub async fn credit_booking(db: &DatabaseConnection, booking_id: Uuid) -> Result<bool, ServiceError> {
    let txn = db.begin().await.map_err(|e| ServiceError::Db(e.to_string()))?;

    let bk = booking::Entity::find_by_id(booking_id)
        .one(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("booking"))?;

    if bk.earnings_credited {
        txn.rollback().await.map_err(|e| ServiceError::Db(e.to_string()))?;
        return Ok(false);
    }

    let li = listing::Entity::find_by_id(bk.listing_id)
        .one(&txn)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?
        .ok_or_else(|| ServiceError::not_found("listing"))?;
    let amount = li.price;

    let provider_id = bk.provider_id;
    provider_earning::add_amount(&txn, provider_id, amount).await?;

    let mut am: booking::ActiveModel = bk.into();
    am.earnings_credited = Set(true);
    am.update(&txn).await.map_err(|e| ServiceError::Db(e.to_string()))?;

    txn.commit().await.map_err(|e| ServiceError::Db(e.to_string()))?;
    info!(booking_id = %booking_id, provider_id = %provider_id, %amount, "earnings_credited");
    Ok(true)
}

/// Running total for the provider behind a user account.
pub async fn provider_total(db: &DatabaseConnection, provider_user_id: Uuid) -> Result<Decimal, ServiceError> {
    let provider = provider::find_by_user(db, provider_user_id)
        .await?
        .ok_or_else(|| ServiceError::not_found("provider profile"))?;
    let earning = provider_earning::get_or_create(db, provider.id).await?;
    Ok(earning.total_earnings)
}

/// Sum of all providers' earnings for the admin dashboard.
pub async fn platform_total(db: &DatabaseConnection) -> Result<Decimal, ServiceError> {
    let rows = provider_earning::Entity::find()
        .all(db)
        .await
        .map_err(|e| ServiceError::Db(e.to_string()))?;
    Ok(rows.into_iter().map(|r| r.total_earnings).sum())
}
