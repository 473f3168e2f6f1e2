use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{material, product, Material, MaterialModel, Product, SoftDelete};
use crate::errors::ServiceError;
use crate::services::clean_optional;
use crate::services::summaries::ProductSummary;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MaterialInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaterialInput {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaterialDetail {
    #[serde(flatten)]
    pub material: MaterialModel,
    pub products: Vec<ProductSummary>,
}

#[derive(Clone)]
pub struct MaterialService {
    db: Arc<DatabaseConnection>,
}

impl MaterialService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<MaterialModel>, ServiceError> {
        Material::find_live()
            .order_by_asc(material::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<MaterialDetail, ServiceError> {
        let material = self.find(id).await?;
        let products = Product::find_live()
            .filter(product::Column::MaterialId.eq(id))
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?
            .iter()
            .map(ProductSummary::from)
            .collect();
        Ok(MaterialDetail { material, products })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: MaterialInput) -> Result<MaterialModel, ServiceError> {
        let name = input.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let now = Utc::now();
        let model = material::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            description: Set(clean_optional(input.description)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(material_id = %model.id, "Material created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateMaterialInput,
    ) -> Result<MaterialModel, ServiceError> {
        let existing = self.find(id).await?;

        let mut active: material::ActiveModel = existing.into();
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
        info!(material_id = %id, "Material updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(id).await?;

        let in_use = Product::find_live()
            .filter(product::Column::MaterialId.eq(id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::bad_request(
                "Cannot delete material that is in use by products",
            ));
        }

        let mut active: material::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(material_id = %id, "Material deleted");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<MaterialModel, ServiceError> {
        Material::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Material not found"))
    }

    async fn ensure_unique_name(&self, name: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = Material::find_live().filter(material::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(material::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("Material name already exists"));
        }
        Ok(())
    }
}
