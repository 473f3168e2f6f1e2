use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{product_variant, size, ProductVariant, Size, SizeModel, SizeType, SoftDelete};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SizeInput {
    #[validate(length(min = 1, max = 10))]
    pub name: String,
    #[serde(rename = "type")]
    pub size_type: SizeType,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateSizeInput {
    #[validate(length(min = 1, max = 10))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub size_type: Option<SizeType>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct SizeFilter {
    /// Restrict to one size family
    #[serde(rename = "type")]
    #[param(rename = "type")]
    pub size_type: Option<SizeType>,
}

#[derive(Clone)]
pub struct SizeService {
    db: Arc<DatabaseConnection>,
}

impl SizeService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: SizeFilter) -> Result<Vec<SizeModel>, ServiceError> {
        let mut query = Size::find_live();
        if let Some(size_type) = filter.size_type {
            query = query.filter(size::Column::SizeType.eq(size_type));
        }
        query
            .order_by_asc(size::Column::SizeType)
            .order_by_asc(size::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<SizeModel, ServiceError> {
        Size::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Size not found"))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: SizeInput) -> Result<SizeModel, ServiceError> {
        let name = input.name.trim().to_string();
        self.ensure_unique(&name, input.size_type, None).await?;

        let now = Utc::now();
        let model = size::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            size_type: Set(input.size_type),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(size_id = %model.id, "Size created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, input: UpdateSizeInput) -> Result<SizeModel, ServiceError> {
        let existing = self.get(id).await?;

        let name = input
            .name
            .map(|n| n.trim().to_string())
            .unwrap_or_else(|| existing.name.clone());
        let size_type = input.size_type.unwrap_or(existing.size_type);
        if name != existing.name || size_type != existing.size_type {
            self.ensure_unique(&name, size_type, Some(id)).await?;
        }

        let mut active: size::ActiveModel = existing.into();
        active.name = Set(name);
        active.size_type = Set(size_type);
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(size_id = %id, "Size updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let in_use = ProductVariant::find_live()
            .filter(product_variant::Column::SizeId.eq(id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::bad_request(
                "Cannot delete size that is in use by product variants",
            ));
        }

        let mut active: size::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(size_id = %id, "Size deleted");
        Ok(())
    }

    async fn ensure_unique(
        &self,
        name: &str,
        size_type: SizeType,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = Size::find_live()
            .filter(size::Column::Name.eq(name))
            .filter(size::Column::SizeType.eq(size_type));
        if let Some(id) = exclude {
            query = query.filter(size::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request(
                "Size with this name and type already exists",
            ));
        }
        Ok(())
    }
}
