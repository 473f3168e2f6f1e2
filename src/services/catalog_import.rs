//! Bulk catalog loader used by the `import-catalog` binary.
//!
//! Input files hold JSON arrays of scraped products. Each product is written
//! in its own transaction so one bad record never aborts the whole run.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, PaginatorTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::entities::{
    category, color, product, product_image, product_variant, size, AgeGroup, Category,
    CategoryModel, Color, ColorModel, Product, ProductGender, ProductImage, ProductModel,
    ProductVariant, Size, SizeModel, SizeType, SoftDelete,
};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct ImportProduct {
    pub name: String,
    pub description: Option<String>,
    pub base_price: Decimal,
    pub gender: Option<ProductGender>,
    pub age_group: Option<AgeGroup>,
    pub category: ImportCategory,
    #[serde(default)]
    pub variants: Vec<ImportVariant>,
    #[serde(default)]
    pub images: Vec<ImportImage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportCategory {
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportVariant {
    pub sku: String,
    pub price: Option<Decimal>,
    pub stock_quantity: Option<i32>,
    pub image: Option<String>,
    pub color: ImportColor,
    pub size: ImportSize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportColor {
    pub name: String,
    pub hex_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportSize {
    pub name: String,
    #[serde(rename = "type")]
    pub size_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportImage {
    pub image_url: String,
    #[serde(default)]
    pub is_thumbnail: bool,
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub files: usize,
    pub products_created: usize,
    pub products_reused: usize,
    pub products_failed: usize,
    pub variants_created: usize,
    pub variants_skipped: usize,
    pub images_created: usize,
}

impl ImportSummary {
    fn absorb(&mut self, outcome: ProductOutcome) {
        if outcome.created {
            self.products_created += 1;
        } else {
            self.products_reused += 1;
        }
        self.variants_created += outcome.variants_created;
        self.variants_skipped += outcome.variants_skipped;
        self.images_created += outcome.images_created;
    }
}

#[derive(Debug, Default)]
struct ProductOutcome {
    created: bool,
    variants_created: usize,
    variants_skipped: usize,
    images_created: usize,
}

/// Maps the scraper's size families onto ours. "Standard" and a missing
/// type both mean clothing.
pub fn parse_size_type(raw: Option<&str>) -> Option<SizeType> {
    match raw.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("standard") | Some("clothing") => Some(SizeType::Clothing),
        Some("footwear") => Some(SizeType::Footwear),
        Some("accessory") => Some(SizeType::Accessory),
        Some(_) => None,
    }
}

#[derive(Clone)]
pub struct CatalogImporter {
    db: Arc<DatabaseConnection>,
}

impl CatalogImporter {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Imports every `*.json` file in `dir`, in file-name order.
    #[instrument(skip(self))]
    pub async fn import_dir(&self, dir: &Path) -> Result<ImportSummary, ServiceError> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| {
            ServiceError::bad_request(format!("Cannot read data directory {}: {e}", dir.display()))
        })?;

        let mut files: Vec<PathBuf> = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| ServiceError::InternalError(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                files.push(path);
            }
        }
        files.sort();

        let mut summary = ImportSummary::default();
        for file in files {
            info!(file = %file.display(), "Processing file");
            let raw = match tokio::fs::read(&file).await {
                Ok(raw) => raw,
                Err(e) => {
                    error!(file = %file.display(), error = %e, "Cannot read file");
                    continue;
                }
            };
            let products: Vec<ImportProduct> = match serde_json::from_slice(&raw) {
                Ok(products) => products,
                Err(e) => {
                    error!(file = %file.display(), error = %e, "Invalid product file");
                    continue;
                }
            };
            summary.files += 1;
            self.import_products(&products, &mut summary).await;
        }

        info!(?summary, "Import completed");
        Ok(summary)
    }

    pub async fn import_products(&self, products: &[ImportProduct], summary: &mut ImportSummary) {
        for record in products {
            match self.import_product(record).await {
                Ok(outcome) => summary.absorb(outcome),
                Err(e) => {
                    summary.products_failed += 1;
                    error!(product = %record.name, error = %e, "Product import failed, rolled back");
                }
            }
        }
    }

    async fn import_product(&self, record: &ImportProduct) -> Result<ProductOutcome, ServiceError> {
        let txn = self.db.begin().await?;
        let mut outcome = ProductOutcome::default();

        let product = match Product::find_live()
            .filter(product::Column::Name.eq(record.name.trim()))
            .one(&txn)
            .await?
        {
            Some(existing) => existing,
            None => {
                let category = find_or_create_category(&txn, &record.category).await?;
                outcome.created = true;
                create_product(&txn, record, category.id).await?
            }
        };

        for variant in &record.variants {
            let sku = variant.sku.trim();
            let exists = ProductVariant::find_live()
                .filter(product_variant::Column::Sku.eq(sku))
                .one(&txn)
                .await?
                .is_some();
            if exists {
                outcome.variants_skipped += 1;
                continue;
            }

            let color = find_or_create_color(&txn, &variant.color).await?;
            let size = find_or_create_size(&txn, &variant.size).await?;
            let now = Utc::now();
            product_variant::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                color_id: Set(color.id),
                size_id: Set(size.id),
                sku: Set(sku.to_string()),
                image: Set(variant.image.clone()),
                original_price: Set(None),
                price: Set(variant.price),
                stock_quantity: Set(variant.stock_quantity.unwrap_or(0).max(0)),
                weight: Set(None),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
                deleted_at: Set(None),
            }
            .insert(&txn)
            .await?;
            outcome.variants_created += 1;
        }

        let existing_images = ProductImage::find_live()
            .filter(product_image::Column::ProductId.eq(product.id))
            .count(&txn)
            .await?;
        if existing_images == 0 {
            for (position, image) in record.images.iter().enumerate() {
                let now = Utc::now();
                product_image::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    product_id: Set(product.id),
                    color_id: Set(None),
                    image_url: Set(image.image_url.clone()),
                    alt_text: Set(None),
                    is_thumbnail: Set(image.is_thumbnail),
                    sort_order: Set(position as i32),
                    created_at: Set(now),
                    updated_at: Set(now),
                    deleted_at: Set(None),
                }
                .insert(&txn)
                .await?;
                outcome.images_created += 1;
            }
        }

        txn.commit().await?;
        Ok(outcome)
    }
}

async fn find_or_create_category(
    txn: &DatabaseTransaction,
    input: &ImportCategory,
) -> Result<CategoryModel, ServiceError> {
    let slug = input.slug.trim();
    if let Some(existing) = Category::find_live()
        .filter(category::Column::Slug.eq(slug))
        .one(txn)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = category::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        slug: Set(slug.to_string()),
        parent_id: Set(None),
        image: Set(input.image.clone().filter(|i| !i.is_empty())),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;
    info!(category = %created.name, "Created category");
    Ok(created)
}

async fn create_product(
    txn: &DatabaseTransaction,
    record: &ImportProduct,
    category_id: Uuid,
) -> Result<ProductModel, ServiceError> {
    let now = Utc::now();
    let created = product::ActiveModel {
        id: Set(Uuid::new_v4()),
        category_id: Set(category_id),
        material_id: Set(None),
        name: Set(record.name.trim().to_string()),
        description: Set(record.description.clone()),
        base_price: Set(record.base_price),
        gender: Set(record.gender.unwrap_or(ProductGender::Unisex)),
        age_group: Set(record.age_group.unwrap_or(AgeGroup::Adult)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;
    info!(product = %created.name, "Created product");
    Ok(created)
}

async fn find_or_create_color(
    txn: &DatabaseTransaction,
    input: &ImportColor,
) -> Result<ColorModel, ServiceError> {
    let name = input.name.trim();
    if let Some(existing) = Color::find_live()
        .filter(color::Column::Name.eq(name))
        .one(txn)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = color::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        hex_code: Set(input.hex_code.clone().filter(|h| !h.trim().is_empty())),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;
    info!(color = %created.name, "Created color");
    Ok(created)
}

async fn find_or_create_size(
    txn: &DatabaseTransaction,
    input: &ImportSize,
) -> Result<SizeModel, ServiceError> {
    let name = input.name.trim();
    let size_type = parse_size_type(input.size_type.as_deref()).ok_or_else(|| {
        warn!(size = %name, raw_type = ?input.size_type, "Unknown size type");
        ServiceError::bad_request(format!("Unknown size type for size {name}"))
    })?;

    if let Some(existing) = Size::find_live()
        .filter(size::Column::Name.eq(name))
        .filter(size::Column::SizeType.eq(size_type))
        .one(txn)
        .await?
    {
        return Ok(existing);
    }

    let now = Utc::now();
    let created = size::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        size_type: Set(size_type),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(txn)
    .await?;
    info!(size = %created.name, "Created size");
    Ok(created)
}
