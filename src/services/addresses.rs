use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{address, Address, AddressModel, SoftDelete};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateAddressInput {
    #[validate(length(min = 1, max = 100))]
    pub recipient_name: String,
    #[validate(length(min = 1, max = 15))]
    pub phone_number: String,
    #[validate(length(min = 1, max = 255))]
    pub street_address: String,
    #[validate(length(min = 1, max = 100))]
    pub ward: String,
    #[validate(length(min = 1, max = 100))]
    pub district: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    /// Omitted on a user's first address makes it the default
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAddressInput {
    #[validate(length(min = 1, max = 100))]
    pub recipient_name: Option<String>,
    #[validate(length(min = 1, max = 15))]
    pub phone_number: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub street_address: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub ward: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub district: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub city: Option<String>,
    pub is_default: Option<bool>,
}

#[derive(Clone)]
pub struct AddressService {
    db: Arc<DatabaseConnection>,
}

impl AddressService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Default address first, then newest.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<AddressModel>, ServiceError> {
        list_for_user(&*self.db, user_id).await
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        user_id: Uuid,
        input: CreateAddressInput,
    ) -> Result<AddressModel, ServiceError> {
        let txn = self.db.begin().await?;

        let is_default = match input.is_default {
            Some(true) => {
                clear_defaults(&txn, user_id, None).await?;
                true
            }
            Some(false) => false,
            None => {
                Address::find_live()
                    .filter(address::Column::UserId.eq(user_id))
                    .count(&txn)
                    .await?
                    == 0
            }
        };

        let now = Utc::now();
        let model = address::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            recipient_name: Set(input.recipient_name.trim().to_string()),
            phone_number: Set(input.phone_number.trim().to_string()),
            street_address: Set(input.street_address.trim().to_string()),
            ward: Set(input.ward.trim().to_string()),
            district: Set(input.district.trim().to_string()),
            city: Set(input.city.trim().to_string()),
            is_default: Set(is_default),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(%user_id, address_id = %model.id, is_default, "Address created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        user_id: Uuid,
        id: Uuid,
        input: UpdateAddressInput,
    ) -> Result<AddressModel, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = find_owned(&txn, user_id, id).await?;

        if input.is_default == Some(true) {
            clear_defaults(&txn, user_id, Some(id)).await?;
        }

        let mut active: address::ActiveModel = existing.into();
        if let Some(v) = input.recipient_name {
            active.recipient_name = Set(v.trim().to_string());
        }
        if let Some(v) = input.phone_number {
            active.phone_number = Set(v.trim().to_string());
        }
        if let Some(v) = input.street_address {
            active.street_address = Set(v.trim().to_string());
        }
        if let Some(v) = input.ward {
            active.ward = Set(v.trim().to_string());
        }
        if let Some(v) = input.district {
            active.district = Set(v.trim().to_string());
        }
        if let Some(v) = input.city {
            active.city = Set(v.trim().to_string());
        }
        if let Some(is_default) = input.is_default {
            active.is_default = Set(is_default);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&txn).await?;
        txn.commit().await?;

        info!(%user_id, address_id = %id, "Address updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, user_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = find_owned(&*self.db, user_id, id).await?;

        let mut active: address::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(%user_id, address_id = %id, "Address deleted");
        Ok(())
    }
}

pub(crate) async fn list_for_user<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
) -> Result<Vec<AddressModel>, ServiceError> {
    Address::find_live()
        .filter(address::Column::UserId.eq(user_id))
        .order_by_desc(address::Column::IsDefault)
        .order_by_desc(address::Column::CreatedAt)
        .all(conn)
        .await
        .map_err(Into::into)
}

async fn find_owned<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    id: Uuid,
) -> Result<AddressModel, ServiceError> {
    Address::find_live_by_id(id)
        .filter(address::Column::UserId.eq(user_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Address not found"))
}

async fn clear_defaults<C: ConnectionTrait>(
    conn: &C,
    user_id: Uuid,
    keep: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut update = Address::update_many()
        .col_expr(address::Column::IsDefault, Expr::value(false))
        .filter(address::Column::UserId.eq(user_id))
        .filter(address::Column::IsDefault.eq(true));
    if let Some(id) = keep {
        update = update.filter(address::Column::Id.ne(id));
    }
    update.exec(conn).await?;
    Ok(())
}
