use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    product, product_usage, usage, Product, ProductUsage, SoftDelete, Usage, UsageModel,
};
use crate::errors::ServiceError;
use crate::services::clean_optional;
use crate::services::summaries::ProductSummary;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UsageInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateUsageInput {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UsageDetail {
    #[serde(flatten)]
    pub usage: UsageModel,
    pub products: Vec<ProductSummary>,
}

#[derive(Clone)]
pub struct UsageService {
    db: Arc<DatabaseConnection>,
}

impl UsageService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<UsageModel>, ServiceError> {
        Usage::find_live()
            .order_by_asc(usage::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<UsageDetail, ServiceError> {
        let usage = self.find(id).await?;
        let products = self
            .linked_products(id)
            .await?
            .iter()
            .map(ProductSummary::from)
            .collect();
        Ok(UsageDetail { usage, products })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: UsageInput) -> Result<UsageModel, ServiceError> {
        let name = input.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let now = Utc::now();
        let model = usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(clean_optional(input.description)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(usage_id = %model.id, "Usage created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, input: UpdateUsageInput) -> Result<UsageModel, ServiceError> {
        let existing = self.find(id).await?;

        let mut active: usage::ActiveModel = existing.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            self.ensure_unique_name(&name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(clean_optional(Some(description)));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(usage_id = %id, "Usage updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;

        if !self.linked_products(id).await?.is_empty() {
            return Err(ServiceError::bad_request(
                "Cannot delete usage that is linked to products",
            ));
        }

        let mut active: usage::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(usage_id = %id, "Usage deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<UsageModel, ServiceError> {
        Usage::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Usage not found"))
    }

    async fn linked_products(&self, id: Uuid) -> Result<Vec<product::Model>, ServiceError> {
        let product_ids: Vec<Uuid> = ProductUsage::find()
            .select_only()
            .column(product_usage::Column::ProductId)
            .filter(product_usage::Column::UsageId.eq(id))
            .into_tuple()
            .all(&*self.db)
            .await?;
        if product_ids.is_empty() {
            return Ok(Vec::new());
        }

        Product::find_live()
            .filter(product::Column::Id.is_in(product_ids))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    async fn ensure_unique_name(&self, name: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = Usage::find_live().filter(usage::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(usage::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("Usage name already exists"));
        }
        Ok(())
    }
}
