use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SoftDelete;

/// Redeemable discount code. `code` is stored upper-cased.
///
/// `usage_limit` and `per_user_limit` treat zero as unlimited.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "coupons")]
#[schema(as = Coupon)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub code: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub discount_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))")]
    pub min_order_value: Decimal,
    #[sea_orm(column_type = "Decimal(Some((15, 2)))", nullable)]
    pub max_discount_amount: Option<Decimal>,
    pub usage_limit: i32,
    pub usage_count: i32,
    pub per_user_limit: i32,
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
    #[sea_orm(has_many = "super::coupon_usage::Entity")]
    CouponUsages,
}

impl Related<super::coupon_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CouponUsages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl SoftDelete for Entity {
    fn deleted_at_column() -> Column {
        Column::DeletedAt
    }
}

/// How a coupon or promotion discount value is interpreted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    #[sea_orm(string_value = "percentage")]
    Percentage,
    #[sea_orm(string_value = "fixed_amount")]
    FixedAmount,
}
