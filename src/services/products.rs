use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    category, material, product, product_image, product_usage, product_variant, usage, AgeGroup,
    Category, Material, Product, ProductGender, ProductImage, ProductImageModel, ProductModel,
    ProductUsage, ProductVariant, SoftDelete, Usage, UsageModel,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::pagination::{Page, PageParams, PageQuery};
use crate::services::pricing::validate_non_negative;
use crate::services::product_variants::{with_options, VariantView};
use crate::services::summaries::{CategorySummary, MaterialSummary};
use crate::services::clean_optional;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProductSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    Name,
    BasePrice,
}

impl ProductSortField {
    fn column(self) -> product::Column {
        match self {
            Self::CreatedAt => product::Column::CreatedAt,
            Self::UpdatedAt => product::Column::UpdatedAt,
            Self::Name => product::Column::Name,
            Self::BasePrice => product::Column::BasePrice,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub enum SortOrder {
    #[serde(rename = "ASC", alias = "asc")]
    Asc,
    #[default]
    #[serde(rename = "DESC", alias = "desc")]
    Desc,
}

/// Catalog listing filters. Pagination fields sit inline because
/// flattened structs do not survive query-string decoding of numbers.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Substring match on the product name
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub material_id: Option<Uuid>,
    pub gender: Option<ProductGender>,
    pub age_group: Option<AgeGroup>,
    #[param(value_type = Option<String>)]
    pub min_price: Option<Decimal>,
    #[param(value_type = Option<String>)]
    pub max_price: Option<Decimal>,
    pub sort_by: Option<ProductSortField>,
    pub sort_order: Option<SortOrder>,
}

impl ProductQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub base_price: Decimal,
    pub category_id: Uuid,
    pub material_id: Option<Uuid>,
    pub gender: Option<ProductGender>,
    pub age_group: Option<AgeGroup>,
    pub usage_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProductInput {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_non_negative")]
    pub base_price: Option<Decimal>,
    pub category_id: Option<Uuid>,
    /// `null` clears the material
    #[serde(default, deserialize_with = "crate::services::double_option")]
    #[schema(value_type = Option<Uuid>)]
    pub material_id: Option<Option<Uuid>>,
    pub gender: Option<ProductGender>,
    pub age_group: Option<AgeGroup>,
    /// Replaces every usage link when present
    pub usage_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductListItem {
    #[serde(flatten)]
    pub product: ProductModel,
    pub category: Option<CategorySummary>,
    pub material: Option<MaterialSummary>,
    pub images: Vec<ProductImageModel>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: ProductModel,
    pub category: Option<CategorySummary>,
    pub material: Option<MaterialSummary>,
    pub images: Vec<ProductImageModel>,
    pub variants: Vec<VariantView>,
    pub usages: Vec<UsageModel>,
}

#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    events: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, events: EventSender) -> Self {
        Self { db, events }
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ProductQuery,
        params: PageParams,
    ) -> Result<Page<ProductListItem>, ServiceError> {
        let mut query = Product::find_live();

        if let Some(name) = filter.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            query = query.filter(product::Column::Name.contains(name));
        }
        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }
        if let Some(material_id) = filter.material_id {
            query = query.filter(product::Column::MaterialId.eq(material_id));
        }
        if let Some(gender) = filter.gender {
            query = query.filter(product::Column::Gender.eq(gender));
        }
        if let Some(age_group) = filter.age_group {
            query = query.filter(product::Column::AgeGroup.eq(age_group));
        }
        if let Some(min_price) = filter.min_price {
            query = query.filter(product::Column::BasePrice.gte(min_price));
        }
        if let Some(max_price) = filter.max_price {
            query = query.filter(product::Column::BasePrice.lte(max_price));
        }

        let sort_column = filter.sort_by.unwrap_or_default().column();
        query = match filter.sort_order.unwrap_or_default() {
            SortOrder::Asc => query.order_by_asc(sort_column),
            SortOrder::Desc => query.order_by_desc(sort_column),
        };

        let paginator = query.paginate(&*self.db, params.limit);
        let total = paginator.num_items().await?;
        let products = paginator.fetch_page(params.page - 1).await?;

        let items = self.list_items(products).await?;
        Ok(Page::new(items, total, params))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = find_live_product(&*self.db, id).await?;

        let category = Category::find_by_id(product.category_id)
            .one(&*self.db)
            .await?
            .map(|c| CategorySummary::from(&c));
        let material = match product.material_id {
            Some(material_id) => Material::find_by_id(material_id)
                .one(&*self.db)
                .await?
                .map(|m| MaterialSummary::from(&m)),
            None => None,
        };

        let images = ProductImage::find_live()
            .filter(product_image::Column::ProductId.eq(id))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_desc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let variants = ProductVariant::find_live()
            .filter(product_variant::Column::ProductId.eq(id))
            .order_by_desc(product_variant::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let variants = with_options(&*self.db, variants).await?;

        let usages = linked_usages(&*self.db, id).await?;

        Ok(ProductDetail {
            product,
            category,
            material,
            images,
            variants,
            usages,
        })
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateProductInput) -> Result<ProductDetail, ServiceError> {
        let txn = self.db.begin().await?;

        ensure_category(&txn, input.category_id).await?;
        if let Some(material_id) = input.material_id {
            ensure_material(&txn, material_id).await?;
        }
        let usage_ids = match input.usage_ids {
            Some(ids) => resolve_usage_ids(&txn, ids).await?,
            None => Vec::new(),
        };

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            category_id: Set(input.category_id),
            material_id: Set(input.material_id),
            name: Set(input.name.trim().to_string()),
            description: Set(clean_optional(input.description)),
            base_price: Set(input.base_price),
            gender: Set(input.gender.unwrap_or(ProductGender::Unisex)),
            age_group: Set(input.age_group.unwrap_or(AgeGroup::Adult)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&txn)
        .await?;

        link_usages(&txn, product.id, &usage_ids).await?;
        txn.commit().await?;

        info!(product_id = %product.id, usages = usage_ids.len(), "Product created");
        self.events.send_or_log(Event::ProductCreated(product.id));

        self.get(product.id).await
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductDetail, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = find_live_product(&txn, id).await?;

        if let Some(category_id) = input.category_id {
            ensure_category(&txn, category_id).await?;
        }
        if let Some(Some(material_id)) = input.material_id {
            ensure_material(&txn, material_id).await?;
        }
        let usage_ids = match input.usage_ids {
            Some(ids) => Some(resolve_usage_ids(&txn, ids).await?),
            None => None,
        };

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = input.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = input.description {
            active.description = Set(clean_optional(Some(description)));
        }
        if let Some(base_price) = input.base_price {
            active.base_price = Set(base_price);
        }
        if let Some(category_id) = input.category_id {
            active.category_id = Set(category_id);
        }
        if let Some(material_id) = input.material_id {
            active.material_id = Set(material_id);
        }
        if let Some(gender) = input.gender {
            active.gender = Set(gender);
        }
        if let Some(age_group) = input.age_group {
            active.age_group = Set(age_group);
        }
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        if let Some(usage_ids) = &usage_ids {
            ProductUsage::delete_many()
                .filter(product_usage::Column::ProductId.eq(id))
                .exec(&txn)
                .await?;
            link_usages(&txn, id, usage_ids).await?;
        }
        txn.commit().await?;

        info!(product_id = %id, usages_replaced = usage_ids.is_some(), "Product updated");
        self.get(id).await
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = find_live_product(&*self.db, id).await?;

        let mut active: product::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(product_id = %id, "Product deleted");
        self.events.send_or_log(Event::ProductDeleted(id));
        Ok(())
    }

    async fn list_items(
        &self,
        products: Vec<ProductModel>,
    ) -> Result<Vec<ProductListItem>, ServiceError> {
        if products.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids: HashSet<Uuid> = products.iter().map(|p| p.category_id).collect();
        let material_ids: HashSet<Uuid> = products.iter().filter_map(|p| p.material_id).collect();
        let product_ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();

        let categories: HashMap<Uuid, CategorySummary> = Category::find()
            .filter(category::Column::Id.is_in(category_ids))
            .all(&*self.db)
            .await?
            .iter()
            .map(|c| (c.id, CategorySummary::from(c)))
            .collect();

        let materials: HashMap<Uuid, MaterialSummary> = if material_ids.is_empty() {
            HashMap::new()
        } else {
            Material::find()
                .filter(material::Column::Id.is_in(material_ids))
                .all(&*self.db)
                .await?
                .iter()
                .map(|m| (m.id, MaterialSummary::from(m)))
                .collect()
        };

        let mut images: HashMap<Uuid, Vec<ProductImageModel>> = HashMap::new();
        for image in ProductImage::find_live()
            .filter(product_image::Column::ProductId.is_in(product_ids))
            .order_by_asc(product_image::Column::SortOrder)
            .order_by_desc(product_image::Column::CreatedAt)
            .all(&*self.db)
            .await?
        {
            images.entry(image.product_id).or_default().push(image);
        }

        Ok(products
            .into_iter()
            .map(|product| ProductListItem {
                category: categories.get(&product.category_id).cloned(),
                material: product.material_id.and_then(|m| materials.get(&m).cloned()),
                images: images.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

pub(crate) async fn find_live_product<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<ProductModel, ServiceError> {
    Product::find_live_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Product not found"))
}

async fn ensure_category<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), ServiceError> {
    Category::find_live_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("Category not found"))
}

async fn ensure_material<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<(), ServiceError> {
    Material::find_live_by_id(id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| ServiceError::not_found("Material not found"))
}

/// Deduplicates `ids` and checks every one names a live usage.
async fn resolve_usage_ids<C: ConnectionTrait>(
    conn: &C,
    mut ids: Vec<Uuid>,
) -> Result<Vec<Uuid>, ServiceError> {
    let mut seen = HashSet::new();
    ids.retain(|id| seen.insert(*id));
    if ids.is_empty() {
        return Ok(ids);
    }

    let found = Usage::find_live()
        .filter(usage::Column::Id.is_in(ids.clone()))
        .count(conn)
        .await?;
    if found != ids.len() as u64 {
        return Err(ServiceError::bad_request("Some usages not found"));
    }
    Ok(ids)
}

async fn link_usages<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
    usage_ids: &[Uuid],
) -> Result<(), ServiceError> {
    if usage_ids.is_empty() {
        return Ok(());
    }
    let now = Utc::now();
    let rows = usage_ids.iter().map(|usage_id| product_usage::ActiveModel {
        product_id: Set(product_id),
        usage_id: Set(*usage_id),
        created_at: Set(now),
    });
    ProductUsage::insert_many(rows).exec(conn).await?;
    Ok(())
}

async fn linked_usages<C: ConnectionTrait>(
    conn: &C,
    product_id: Uuid,
) -> Result<Vec<UsageModel>, ServiceError> {
    let usage_ids: Vec<Uuid> = ProductUsage::find()
        .filter(product_usage::Column::ProductId.eq(product_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|link| link.usage_id)
        .collect();
    if usage_ids.is_empty() {
        return Ok(Vec::new());
    }

    Usage::find_live()
        .filter(usage::Column::Id.is_in(usage_ids))
        .order_by_asc(usage::Column::Name)
        .all(conn)
        .await
        .map_err(Into::into)
}
