use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    product_image, Color, ColorModel, ProductImage, ProductImageModel, SoftDelete,
};
use crate::errors::ServiceError;
use crate::services::clean_optional;
use crate::services::products::find_live_product;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateImageInput {
    #[validate(url, length(max = 500))]
    pub image_url: String,
    pub color_id: Option<Uuid>,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    pub is_thumbnail: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateImageInput {
    #[validate(url, length(max = 500))]
    pub image_url: Option<String>,
    /// `null` detaches the image from its color
    #[serde(default, deserialize_with = "crate::services::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub color_id: Option<Option<Uuid>>,
    #[validate(length(max = 255))]
    pub alt_text: Option<String>,
    pub is_thumbnail: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ImageOrder {
    pub image_id: Uuid,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReorderImagesInput {
    #[validate(length(min = 1))]
    pub orders: Vec<ImageOrder>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImageView {
    #[serde(flatten)]
    pub image: ProductImageModel,
    pub color: Option<ColorModel>,
}

#[derive(Clone)]
pub struct ProductImageService {
    db: Arc<DatabaseConnection>,
}

impl ProductImageService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, product_id: Uuid) -> Result<Vec<ProductImageModel>, ServiceError> {
        find_live_product(&*self.db, product_id).await?;

        ProductImage::find_live()
            .filter(product_image::Column::ProductId.eq(product_id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_desc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid, id: Uuid) -> Result<ImageView, ServiceError> {
        let image = find_image(&*self.db, product_id, id).await?;
        let color = match image.color_id {
            Some(color_id) => Color::find_by_id(color_id).one(&*self.db).await?,
            None => None,
        };
        Ok(ImageView { image, color })
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        product_id: Uuid,
        input: CreateImageInput,
    ) -> Result<ProductImageModel, ServiceError> {
        find_live_product(&*self.db, product_id).await?;
        if let Some(color_id) = input.color_id {
            ensure_color(&*self.db, color_id).await?;
        }

        let is_thumbnail = input.is_thumbnail.unwrap_or(false);
        let txn = self.db.begin().await?;
        if is_thumbnail {
            clear_thumbnails(&txn, product_id).await?;
        }

        let now = Utc::now();
        let image = product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            color_id: Set(input.color_id),
            image_url: Set(input.image_url),
            alt_text: Set(clean_optional(input.alt_text)),
            is_thumbnail: Set(is_thumbnail),
            sort_order: Set(input.sort_order.unwrap_or(0)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(product_id = %product_id, image_id = %image.id, is_thumbnail, "Product image created");
        Ok(image)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        product_id: Uuid,
        id: Uuid,
        input: UpdateImageInput,
    ) -> Result<ProductImageModel, ServiceError> {
        if let Some(Some(color_id)) = input.color_id {
            ensure_color(&*self.db, color_id).await?;
        }

        let txn = self.db.begin().await?;
        let existing = find_image(&txn, product_id, id).await?;
        if input.is_thumbnail == Some(true) {
            clear_thumbnails(&txn, product_id).await?;
        }

        let mut active: product_image::ActiveModel = existing.into();
        if let Some(image_url) = input.image_url {
            active.image_url = Set(image_url);
        }
        if let Some(color_id) = input.color_id {
            active.color_id = Set(color_id);
        }
        if let Some(alt_text) = input.alt_text {
            active.alt_text = Set(clean_optional(Some(alt_text)));
        }
        if let Some(is_thumbnail) = input.is_thumbnail {
            active.is_thumbnail = Set(is_thumbnail);
        }
        if let Some(sort_order) = input.sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(Utc::now());

        let image = active.update(&txn).await?;
        txn.commit().await?;

        info!(product_id = %product_id, image_id = %id, "Product image updated");
        Ok(image)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = find_image(&*self.db, product_id, id).await?;

        let mut active: product_image::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(product_id = %product_id, image_id = %id, "Product image deleted");
        Ok(())
    }

    /// Makes `id` the only thumbnail of its product.
    #[instrument(skip(self))]
    pub async fn set_thumbnail(
        &self,
        product_id: Uuid,
        id: Uuid,
    ) -> Result<ProductImageModel, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = find_image(&txn, product_id, id).await?;
        clear_thumbnails(&txn, product_id).await?;

        let mut active: product_image::ActiveModel = existing.into();
        active.is_thumbnail = Set(true);
        active.updated_at = Set(Utc::now());
        let image = active.update(&txn).await?;
        txn.commit().await?;

        info!(product_id = %product_id, image_id = %id, "Thumbnail set");
        Ok(image)
    }

    #[instrument(skip(self))]
    pub async fn reorder(
        &self,
        product_id: Uuid,
        input: ReorderImagesInput,
    ) -> Result<Vec<ProductImageModel>, ServiceError> {
        find_live_product(&*self.db, product_id).await?;

        let ids: HashSet<Uuid> = input.orders.iter().map(|o| o.image_id).collect();
        let owned = ProductImage::find_live()
            .filter(product_image::Column::ProductId.eq(product_id))
            .filter(product_image::Column::Id.is_in(ids.iter().copied()))
            .count(&*self.db)
            .await?;
        if owned != ids.len() as u64 {
            warn!(product_id = %product_id, requested = ids.len(), owned, "Reorder rejected");
            return Err(ServiceError::bad_request(
                "Some images do not belong to this product",
            ));
        }

        let txn = self.db.begin().await?;
        let now = Utc::now();
        for order in &input.orders {
            ProductImage::update_many()
                .col_expr(product_image::Column::SortOrder, Expr::value(order.sort_order))
                .col_expr(product_image::Column::UpdatedAt, Expr::value(now))
                .filter(product_image::Column::Id.eq(order.image_id))
                .filter(product_image::Column::ProductId.eq(product_id))
                .exec(&txn)
                .await?;
        }
        txn.commit().await?;

        info!(product_id = %product_id, count = input.orders.len(), "Images reordered");
        self.list(product_id).await
    }
}

async fn find_image<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    id: Uuid,
) -> Result<ProductImageModel, ServiceError> {
    find_live_product(conn, product_id).await?;
    ProductImage::find_live_by_id(id)
        .filter(product_image::Column::ProductId.eq(product_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Image not found"))
}

async fn ensure_color<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), ServiceError> {
    Color::find_live_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("Color not found"))
}

async fn clear_thumbnails<C: ConnectionTrait>(conn: &C, product_id: Uuid) -> Result<(), ServiceError> {
    ProductImage::update_many()
        .col_expr(product_image::Column::IsThumbnail, Expr::value(false))
        .filter(product_image::Column::ProductId.eq(product_id))
        .filter(product_image::Column::IsThumbnail.eq(true))
        .exec(conn)
        .await?;
    Ok(())
}
