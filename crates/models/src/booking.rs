use sea_orm::{entity::prelude::*, Set, DatabaseConnection, QueryOrder};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::customer;
use crate::listing;
use crate::provider;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub listing_id: Uuid,
    pub schedule_date: Date,
    pub timing: String,
    pub status: String,
    pub payment_method: Option<String>,
    pub earnings_credited: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Customer,
    Provider,
    Listing,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Customer => Entity::belongs_to(customer::Entity).from(Column::CustomerId).to(customer::Column::Id).into(),
            Relation::Provider => Entity::belongs_to(provider::Entity).from(Column::ProviderId).to(provider::Column::Id).into(),
            Relation::Listing => Entity::belongs_to(listing::Entity).from(Column::ListingId).to(listing::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub async fn create(
    db: &DatabaseConnection,
    customer_id: Uuid,
    provider_id: Uuid,
    listing_id: Uuid,
    schedule_date: Date,
    timing: &str,
    status: &str,
) -> Result<Model, errors::ModelError> {
    if timing.trim().is_empty() { return Err(errors::ModelError::Validation("timing required".into())); }
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        customer_id: Set(customer_id),
        provider_id: Set(provider_id),
        listing_id: Set(listing_id),
        schedule_date: Set(schedule_date),
        timing: Set(timing.to_string()),
        status: Set(status.to_string()),
        payment_method: Set(None),
        earnings_credited: Set(false),
        created_at: Set(Utc::now().into()),
    };
    am.insert(db).await.map_err(|e| errors::ModelError::Db(e.to_string()))
}

/// Duplicate guard: same customer, provider, listing, date and slot.
pub async fn find_duplicate(
    db: &DatabaseConnection,
    customer_id: Uuid,
    provider_id: Uuid,
    listing_id: Uuid,
    schedule_date: Date,
    timing: &str,
) -> Result<Option<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .filter(Column::ProviderId.eq(provider_id))
        .filter(Column::ListingId.eq(listing_id))
        .filter(Column::ScheduleDate.eq(schedule_date))
        .filter(Column::Timing.eq(timing))
        .one(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn for_provider(db: &DatabaseConnection, provider_id: Uuid) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::ProviderId.eq(provider_id))
        .order_by_desc(Column::CreatedAt)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}

pub async fn for_customer_in_statuses(
    db: &DatabaseConnection,
    customer_id: Uuid,
    statuses: &[&str],
) -> Result<Vec<Model>, errors::ModelError> {
    Entity::find()
        .filter(Column::CustomerId.eq(customer_id))
        .filter(Column::Status.is_in(statuses.iter().map(|s| ToString::to_string(s))))
        .order_by_desc(Column::ScheduleDate)
        .all(db)
        .await
        .map_err(|e| errors::ModelError::Db(e.to_string()))
}
