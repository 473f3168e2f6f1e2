use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    color, product_variant, size, Color, ColorModel, ProductVariant, ProductVariantModel, Size,
    SizeModel, SoftDelete,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::pricing::validate_non_negative;
use crate::services::products::find_live_product;
use crate::services::summaries::ProductSummary;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateVariantInput {
    pub color_id: Uuid,
    pub size_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    #[validate(url)]
    pub image: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub original_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateVariantInput {
    pub color_id: Option<Uuid>,
    pub size_id: Option<Uuid>,
    #[validate(length(min = 1, max = 50))]
    pub sku: Option<String>,
    #[validate(url)]
    pub image: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub original_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[validate(range(min = 0.0))]
    pub weight: Option<f64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StockOperation {
    Add,
    Subtract,
    #[default]
    Set,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStockInput {
    #[validate(range(min = 0))]
    pub quantity: i32,
    pub operation: Option<StockOperation>,
}

/// Variant with its color and size resolved.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VariantView {
    #[serde(flatten)]
    pub variant: ProductVariantModel,
    pub color: Option<ColorModel>,
    pub size: Option<SizeModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSummary>,
}

async fn find_variant<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    id: Uuid,
) -> Result<ProductVariantModel, ServiceError> {
    ProductVariant::find_live_by_id(id)
        .filter(product_variant::Column::ProductId.eq(product_id))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Variant not found"))
}

/// Loads colors and sizes for `variants` in two queries.
pub(crate) async fn with_options<C: ConnectionTrait>(
    conn: &C,
    variants: Vec<ProductVariantModel>,
) -> Result<Vec<VariantView>, ServiceError> {
    if variants.is_empty() {
        return Ok(Vec::new());
    }

    let color_ids: Vec<Uuid> = variants.iter().map(|v| v.color_id).collect();
    let size_ids: Vec<Uuid> = variants.iter().map(|v| v.size_id).collect();

    let colors: HashMap<Uuid, ColorModel> = Color::find()
        .filter(color::Column::Id.is_in(color_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let sizes: HashMap<Uuid, SizeModel> = Size::find()
        .filter(size::Column::Id.is_in(size_ids))
        .all(conn)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();

    Ok(variants
        .into_iter()
        .map(|variant| VariantView {
            color: colors.get(&variant.color_id).cloned(),
            size: sizes.get(&variant.size_id).cloned(),
            product: None,
            variant,
        })
        .collect())
}

#[derive(Clone)]
pub struct ProductVariantService {
    db: Arc<DatabaseConnection>,
    events: EventSender,
}

impl ProductVariantService {
    pub fn new(db: Arc<DatabaseConnection>, events: EventSender) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, product_id: Uuid) -> Result<Vec<VariantView>, ServiceError> {
        find_live_product(&*self.db, product_id).await?;

        let variants = ProductVariant::find_live()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .order_by_desc(product_variant::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        with_options(&*self.db, variants).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, product_id: Uuid, id: Uuid) -> Result<VariantView, ServiceError> {
        let product = find_live_product(&*self.db, product_id).await?;
        let variant = find_variant(&*self.db, product_id, id).await?;

        let mut view = with_options(&*self.db, vec![variant])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Variant not found"))?;
        view.product = Some(ProductSummary::from(&product));
        Ok(view)
    }

    #[instrument(skip(self))]
    pub async fn create(
        &self,
        product_id: Uuid,
        input: CreateVariantInput,
    ) -> Result<VariantView, ServiceError> {
        find_live_product(&*self.db, product_id).await?;
        self.ensure_color(input.color_id).await?;
        self.ensure_size(input.size_id).await?;
        self.ensure_unique_combination(product_id, input.color_id, input.size_id, None)
            .await?;
        let sku = input.sku.trim().to_string();
        self.ensure_unique_sku(&sku, None).await?;

        let now = Utc::now();
        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product_id),
            color_id: Set(input.color_id),
            size_id: Set(input.size_id),
            sku: Set(sku),
            image: Set(input.image),
            original_price: Set(input.original_price),
            price: Set(input.price),
            stock_quantity: Set(input.stock_quantity.unwrap_or(0)),
            weight: Set(input.weight),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(product_id = %product_id, variant_id = %variant.id, sku = %variant.sku, "Variant created");
        self.view(variant).await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        product_id: Uuid,
        id: Uuid,
        input: UpdateVariantInput,
    ) -> Result<VariantView, ServiceError> {
        let existing = self.find(product_id, id).await?;

        if let Some(color_id) = input.color_id {
            self.ensure_color(color_id).await?;
        }
        if let Some(size_id) = input.size_id {
            self.ensure_size(size_id).await?;
        }
        let color_id = input.color_id.unwrap_or(existing.color_id);
        let size_id = input.size_id.unwrap_or(existing.size_id);
        if color_id != existing.color_id || size_id != existing.size_id {
            self.ensure_unique_combination(product_id, color_id, size_id, Some(id))
                .await?;
        }

        let sku = input.sku.map(|s| s.trim().to_string());
        if let Some(sku) = sku.as_deref() {
            if sku != existing.sku {
                self.ensure_unique_sku(sku, Some(id)).await?;
            }
        }

        let mut active: product_variant::ActiveModel = existing.into();
        active.color_id = Set(color_id);
        active.size_id = Set(size_id);
        if let Some(sku) = sku {
            active.sku = Set(sku);
        }
        if let Some(image) = input.image {
            active.image = Set(Some(image));
        }
        if let Some(original_price) = input.original_price {
            active.original_price = Set(Some(original_price));
        }
        if let Some(price) = input.price {
            active.price = Set(Some(price));
        }
        if let Some(stock_quantity) = input.stock_quantity {
            active.stock_quantity = Set(stock_quantity);
        }
        if let Some(weight) = input.weight {
            active.weight = Set(Some(weight));
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let variant = active.update(&*self.db).await?;
        info!(product_id = %product_id, variant_id = %id, "Variant updated");
        self.view(variant).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, product_id: Uuid, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.find(product_id, id).await?;

        let mut active: product_variant::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(product_id = %product_id, variant_id = %id, "Variant deleted");
        Ok(())
    }

    /// Adjusts stock with a single conditional `UPDATE`, so concurrent
    /// subtractions can never drive the quantity below zero.
    #[instrument(skip(self))]
    pub async fn update_stock(
        &self,
        product_id: Uuid,
        id: Uuid,
        input: UpdateStockInput,
    ) -> Result<VariantView, ServiceError> {
        let operation = input.operation.unwrap_or_default();
        let quantity = input.quantity;

        let txn = self.db.begin().await?;
        find_live_product(&txn, product_id).await?;
        let before = find_variant(&txn, product_id, id).await?;

        let stock = product_variant::Column::StockQuantity;
        let new_value = match operation {
            StockOperation::Add => Expr::col(stock).add(quantity),
            StockOperation::Subtract => Expr::col(stock).sub(quantity),
            StockOperation::Set => Expr::value(quantity),
        };

        let mut update = ProductVariant::update_many()
            .col_expr(stock, new_value)
            .col_expr(product_variant::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(product_variant::Column::Id.eq(id))
            .filter(product_variant::Column::DeletedAt.is_null());
        match operation {
            StockOperation::Subtract => update = update.filter(stock.gte(quantity)),
            StockOperation::Add => update = update.filter(stock.lte(i32::MAX - quantity)),
            StockOperation::Set => {}
        }

        let result = update.exec(&txn).await?;
        if result.rows_affected == 0 {
            warn!(variant_id = %id, quantity, ?operation, "Stock update rejected");
            return Err(match operation {
                StockOperation::Add => ServiceError::bad_request("Stock quantity exceeds the maximum"),
                _ => ServiceError::bad_request("Insufficient stock"),
            });
        }

        let after = ProductVariant::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Variant not found"))?;
        txn.commit().await?;

        info!(
            variant_id = %id,
            old_quantity = before.stock_quantity,
            new_quantity = after.stock_quantity,
            ?operation,
            "Variant stock updated"
        );
        self.events.send_or_log(Event::VariantStockChanged {
            product_id,
            variant_id: id,
            old_quantity: before.stock_quantity,
            new_quantity: after.stock_quantity,
        });

        self.view(after).await
    }

    async fn view(&self, variant: ProductVariantModel) -> Result<VariantView, ServiceError> {
        with_options(&*self.db, vec![variant])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::not_found("Variant not found"))
    }

    /// Variant lookup that also requires the parent product to be live.
    async fn find(&self, product_id: Uuid, id: Uuid) -> Result<ProductVariantModel, ServiceError> {
        find_live_product(&*self.db, product_id).await?;
        find_variant(&*self.db, product_id, id).await
    }

    async fn ensure_color(&self, id: Uuid) -> Result<(), ServiceError> {
        Color::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Color not found"))
    }

    async fn ensure_size(&self, id: Uuid) -> Result<(), ServiceError> {
        Size::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("Size not found"))
    }

    async fn ensure_unique_combination(
        &self,
        product_id: Uuid,
        color_id: Uuid,
        size_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<(), ServiceError> {
        let mut query = ProductVariant::find_live()
            .filter(product_variant::Column::ProductId.eq(product_id))
            .filter(product_variant::Column::ColorId.eq(color_id))
            .filter(product_variant::Column::SizeId.eq(size_id));
        if let Some(id) = exclude {
            query = query.filter(product_variant::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request(
                "Variant with this color and size already exists",
            ));
        }
        Ok(())
    }

    async fn ensure_unique_sku(&self, sku: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = ProductVariant::find_live().filter(product_variant::Column::Sku.eq(sku));
        if let Some(id) = exclude {
            query = query.filter(product_variant::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("SKU already exists"));
        }
        Ok(())
    }
}
