use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    product, promotion, promotion_product, DiscountType, Product, Promotion, PromotionModel,
    PromotionProduct, SoftDelete,
};
use crate::errors::ServiceError;
use crate::services::clean_optional;
use crate::services::pagination::{Page, PageParams, PageQuery};
use crate::services::pricing::{check_discount_value, validate_non_negative};
use crate::services::products::find_live_product;
use crate::services::summaries::ProductSummary;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePromotionInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(custom = "validate_non_negative")]
    pub discount_value: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePromotionInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "validate_non_negative")]
    pub discount_value: Option<Decimal>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct PromotionProductsInput {
    #[validate(length(min = 1))]
    pub product_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PromotionListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub is_active: Option<bool>,
}

impl PromotionListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PromotionDetail {
    #[serde(flatten)]
    pub promotion: PromotionModel,
    pub products: Vec<ProductSummary>,
}

/// Running promotions that include `product_id`, newest start first.
pub(crate) async fn running_for_product<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    at: DateTime<Utc>,
) -> Result<Vec<PromotionModel>, DbErr> {
    let promotion_ids: Vec<Uuid> = PromotionProduct::find()
        .filter(promotion_product::Column::ProductId.eq(product_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.promotion_id)
        .collect();
    if promotion_ids.is_empty() {
        return Ok(Vec::new());
    }

    Promotion::find_live()
        .filter(promotion::Column::Id.is_in(promotion_ids))
        .filter(promotion::Column::IsActive.eq(true))
        .filter(promotion::Column::StartDate.lte(at))
        .filter(promotion::Column::EndDate.gte(at))
        .order_by_desc(promotion::Column::StartDate)
        .all(conn)
        .await
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ServiceError> {
    if start >= end {
        return Err(ServiceError::bad_request("Start date must be before end date"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct PromotionService {
    db: Arc<DatabaseConnection>,
}

impl PromotionService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Promotions running right now.
    #[instrument(skip(self))]
    pub async fn list_active(&self) -> Result<Vec<PromotionModel>, ServiceError> {
        let now = Utc::now();
        Promotion::find_live()
            .filter(promotion::Column::IsActive.eq(true))
            .filter(promotion::Column::StartDate.lte(now))
            .filter(promotion::Column::EndDate.gte(now))
            .order_by_desc(promotion::Column::StartDate)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn list_all(
        &self,
        is_active: Option<bool>,
        params: PageParams,
    ) -> Result<Page<PromotionModel>, ServiceError> {
        let mut query = Promotion::find_live();
        if let Some(is_active) = is_active {
            query = query.filter(promotion::Column::IsActive.eq(is_active));
        }

        let paginator = query
            .order_by_desc(promotion::Column::CreatedAt)
            .paginate(&*self.db, params.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page - 1).await?;
        Ok(Page::new(items, total, params))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PromotionDetail, ServiceError> {
        let promotion = find_promotion(&*self.db, id).await?;

        let product_ids: Vec<Uuid> = PromotionProduct::find()
            .filter(promotion_product::Column::PromotionId.eq(id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|link| link.product_id)
            .collect();

        let products = if product_ids.is_empty() {
            Vec::new()
        } else {
            Product::find_live()
                .filter(product::Column::Id.is_in(product_ids))
                .order_by_asc(product::Column::Name)
                .all(&*self.db)
                .await?
                .iter()
                .map(ProductSummary::from)
                .collect()
        };

        Ok(PromotionDetail { promotion, products })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreatePromotionInput) -> Result<PromotionModel, ServiceError> {
        check_window(input.start_date, input.end_date)?;
        check_discount_value(input.discount_type, input.discount_value)?;

        let now = Utc::now();
        let model = promotion::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name.trim().to_string()),
            description: Set(clean_optional(input.description)),
            discount_type: Set(input.discount_type),
            discount_value: Set(input.discount_value),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(promotion_id = %model.id, "Promotion created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePromotionInput,
    ) -> Result<PromotionModel, ServiceError> {
        let existing = find_promotion(&*self.db, id).await?;

        check_window(
            input.start_date.unwrap_or(existing.start_date),
            input.end_date.unwrap_or(existing.end_date),
        )?;
        check_discount_value(
            input.discount_type.unwrap_or(existing.discount_type),
            input.discount_value.unwrap_or(existing.discount_value),
        )?;

        let mut active: promotion::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(clean_optional(Some(description)));
        }
        if let Some(discount_type) = input.discount_type {
            active.discount_type = Set(discount_type);
        }
        if let Some(discount_value) = input.discount_value {
            active.discount_value = Set(discount_value);
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(promotion_id = %id, "Promotion updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = find_promotion(&*self.db, id).await?;

        let mut active: promotion::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(promotion_id = %id, "Promotion deleted");
        Ok(())
    }

    /// Links products, skipping ones already attached.
    #[instrument(skip(self))]
    pub async fn add_products(
        &self,
        id: Uuid,
        input: PromotionProductsInput,
    ) -> Result<PromotionDetail, ServiceError> {
        let mut product_ids = input.product_ids;
        let mut seen = HashSet::new();
        product_ids.retain(|p| seen.insert(*p));

        let txn = self.db.begin().await?;
        find_promotion(&txn, id).await?;

        let found = Product::find_live()
            .filter(product::Column::Id.is_in(product_ids.clone()))
            .count(&txn)
            .await?;
        if found != product_ids.len() as u64 {
            return Err(ServiceError::bad_request("Some products not found"));
        }

        let linked: HashSet<Uuid> = PromotionProduct::find()
            .filter(promotion_product::Column::PromotionId.eq(id))
            .filter(promotion_product::Column::ProductId.is_in(product_ids.clone()))
            .all(&txn)
            .await?
            .into_iter()
            .map(|link| link.product_id)
            .collect();

        let now = Utc::now();
        let rows: Vec<promotion_product::ActiveModel> = product_ids
            .iter()
            .filter(|p| !linked.contains(p))
            .map(|product_id| promotion_product::ActiveModel {
                promotion_id: Set(id),
                product_id: Set(*product_id),
                created_at: Set(now),
            })
            .collect();
        let added = rows.len();
        if !rows.is_empty() {
            PromotionProduct::insert_many(rows).exec(&txn).await?;
        }
        txn.commit().await?;

        info!(promotion_id = %id, added, skipped = linked.len(), "Products added to promotion");
        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_product(&self, id: Uuid, product_id: Uuid) -> Result<(), ServiceError> {
        find_promotion(&*self.db, id).await?;

        let result = PromotionProduct::delete_many()
            .filter(promotion_product::Column::PromotionId.eq(id))
            .filter(promotion_product::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Product not found in promotion"));
        }

        info!(promotion_id = %id, product_id = %product_id, "Product removed from promotion");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn product_promotions(
        &self,
        product_id: Uuid,
    ) -> Result<Vec<PromotionModel>, ServiceError> {
        find_live_product(&*self.db, product_id).await?;
        running_for_product(&*self.db, product_id, Utc::now())
            .await
            .map_err(Into::into)
    }
}

async fn find_promotion<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<PromotionModel, ServiceError> {
    Promotion::find_live_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Promotion not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn window_requires_start_before_end() {
        let now = Utc::now();
        assert!(check_window(now, now + Duration::days(1)).is_ok());
        assert!(check_window(now, now).is_err());
        assert!(check_window(now + Duration::hours(1), now).is_err());
    }
}
