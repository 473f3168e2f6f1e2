use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{coupon::DiscountType, SoftDelete};

/// Time-boxed discount attached to a set of products.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "promotions")]
#[schema(as = Promotion)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub discount_value: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::promotion_product::Entity")]
    PromotionProducts,
}

impl Related<super::promotion_product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PromotionProducts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    fn deleted_at_column() -> Column {
        Column::DeletedAt
    }
}

impl Model {
    /// Active flag set and `at` inside the inclusive date window.
    pub fn is_running_at(&self, at: DateTime<Utc>) -> bool {
        self.is_active && self.start_date <= at && at <= self.end_date
    }
}
