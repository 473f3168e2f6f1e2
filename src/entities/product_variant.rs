use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SoftDelete;

/// One purchasable (color, size) combination of a product.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "product_variants")]
#[schema(as = ProductVariant)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub color_id: Uuid,
    pub size_id: Uuid,
    pub sku: String,
    pub image: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub original_price: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub price: Option<Decimal>,
    pub stock_quantity: i32,
    #[sea_orm(column_type = "Double", nullable)]
    pub weight: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::color::Entity",
        from = "Column::ColorId",
        to = "super::color::Column::Id"
    )]
    Color,
    #[sea_orm(
        belongs_to = "super::size::Entity",
        from = "Column::SizeId",
        to = "super::size::Column::Id"
    )]
    Size,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::color::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Color.def()
    }
}

impl Related<super::size::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Size.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    fn deleted_at_column() -> Column {
        Column::DeletedAt
    }
}
