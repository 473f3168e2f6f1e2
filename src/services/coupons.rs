use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::sea_query::{Condition, Expr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{
    coupon, coupon_usage, user, Coupon, CouponModel, CouponUsage, CouponUsageModel, DiscountType,
    SoftDelete, User,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::clean_optional;
use crate::services::pagination::{Page, PageParams, PageQuery};
use crate::services::pricing::{check_discount_value, compute_discount, round_money, validate_non_negative};
use crate::services::summaries::UserSummary;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ValidateCouponInput {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    #[validate(custom = "validate_non_negative")]
    pub order_value: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ApplyCouponInput {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub order_id: Option<Uuid>,
    #[validate(custom = "validate_non_negative")]
    pub order_value: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCouponInput {
    #[validate(length(min = 1, max = 50))]
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    #[validate(custom = "validate_non_negative")]
    pub discount_value: Decimal,
    #[validate(custom = "validate_non_negative")]
    pub min_order_value: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub max_discount_amount: Option<Decimal>,
    /// Zero means unlimited
    #[validate(range(min = 0))]
    pub usage_limit: Option<i32>,
    /// Zero means unlimited
    #[validate(range(min = 0))]
    pub per_user_limit: Option<i32>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCouponInput {
    #[validate(length(min = 1, max = 50))]
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "validate_non_negative")]
    pub discount_value: Option<Decimal>,
    #[validate(custom = "validate_non_negative")]
    pub min_order_value: Option<Decimal>,
    /// `null` removes the cap
    #[serde(default, deserialize_with = "crate::services::double_option")]
    #[schema(value_type = Option<String>)]
    pub max_discount_amount: Option<Option<Decimal>>,
    #[validate(range(min = 0))]
    pub usage_limit: Option<i32>,
    #[validate(range(min = 0))]
    pub per_user_limit: Option<i32>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CouponListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the code
    pub code: Option<String>,
}

impl CouponListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CouponSummary {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
}

impl From<&CouponModel> for CouponSummary {
    fn from(c: &CouponModel) -> Self {
        Self {
            id: c.id,
            code: c.code.clone(),
            description: c.description.clone(),
            discount_type: c.discount_type,
            discount_value: c.discount_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CouponValidation {
    pub valid: bool,
    pub coupon: CouponSummary,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CouponApplication {
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CouponUsageView {
    #[serde(flatten)]
    pub usage: CouponUsageModel,
    pub user: Option<UserSummary>,
}

/// Date and global-limit checks that need no database access.
fn check_redeemable(coupon: &CouponModel, now: DateTime<Utc>) -> Result<(), ServiceError> {
    if !coupon.is_active {
        return Err(ServiceError::bad_request("Coupon is not active"));
    }
    if now < coupon.start_date {
        return Err(ServiceError::bad_request("Coupon is not yet active"));
    }
    if now > coupon.end_date {
        return Err(ServiceError::bad_request("Coupon has expired"));
    }
    if coupon.usage_limit > 0 && coupon.usage_count >= coupon.usage_limit {
        return Err(ServiceError::bad_request("Coupon usage limit reached"));
    }
    Ok(())
}

fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Runs every redemption rule and prices the discount.
async fn evaluate<C: ConnectionTrait>(
    conn: &C,
    code: &str,
    order_value: Decimal,
    user_id: Option<Uuid>,
) -> Result<(CouponModel, Decimal), ServiceError> {
    let coupon = Coupon::find_live()
        .filter(coupon::Column::Code.eq(normalize_code(code)))
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("Coupon not found"))?;

    check_redeemable(&coupon, Utc::now())?;

    if let Some(user_id) = user_id {
        if coupon.per_user_limit > 0 {
            let used = CouponUsage::find()
                .filter(coupon_usage::Column::CouponId.eq(coupon.id))
                .filter(coupon_usage::Column::UserId.eq(user_id))
                .count(conn)
                .await?;
            if used >= coupon.per_user_limit as u64 {
                return Err(ServiceError::bad_request(
                    "You have reached the usage limit for this coupon",
                ));
            }
        }
    }

    if order_value < coupon.min_order_value {
        return Err(ServiceError::bad_request(format!(
            "Minimum order value is {}",
            coupon.min_order_value
        )));
    }

    let discount = compute_discount(
        coupon.discount_type,
        coupon.discount_value,
        order_value,
        coupon.max_discount_amount,
    );
    Ok((coupon, discount))
}

#[derive(Clone)]
pub struct CouponService {
    db: Arc<DatabaseConnection>,
    events: EventSender,
}

impl CouponService {
    pub fn new(db: Arc<DatabaseConnection>, events: EventSender) -> Self {
        Self { db, events }
    }

    /// Checks a code against an order without redeeming it.
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        input: ValidateCouponInput,
        user_id: Option<Uuid>,
    ) -> Result<CouponValidation, ServiceError> {
        let (coupon, discount_amount) =
            evaluate(&*self.db, &input.code, input.order_value, user_id).await?;

        Ok(CouponValidation {
            valid: true,
            coupon: CouponSummary::from(&coupon),
            discount_amount,
            final_amount: round_money(input.order_value - discount_amount),
        })
    }

    /// Redeems a code. The usage counter is bumped with a conditional
    /// `UPDATE` so two concurrent redemptions cannot overshoot the limit.
    #[instrument(skip(self))]
    pub async fn apply(
        &self,
        input: ApplyCouponInput,
        user_id: Uuid,
    ) -> Result<CouponApplication, ServiceError> {
        let txn = self.db.begin().await?;
        let (coupon, discount_amount) =
            evaluate(&txn, &input.code, input.order_value, Some(user_id)).await?;

        let bumped = Coupon::update_many()
            .col_expr(
                coupon::Column::UsageCount,
                Expr::col(coupon::Column::UsageCount).add(1),
            )
            .col_expr(coupon::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(coupon::Column::Id.eq(coupon.id))
            .filter(
                Condition::any()
                    .add(coupon::Column::UsageLimit.eq(0))
                    .add(
                        Expr::col(coupon::Column::UsageCount)
                            .lt(Expr::col(coupon::Column::UsageLimit)),
                    ),
            )
            .exec(&txn)
            .await?;
        if bumped.rows_affected == 0 {
            warn!(coupon_id = %coupon.id, "Coupon limit reached during redemption");
            return Err(ServiceError::bad_request("Coupon usage limit reached"));
        }

        coupon_usage::ActiveModel {
            id: Set(Uuid::new_v4()),
            coupon_id: Set(coupon.id),
            user_id: Set(user_id),
            order_id: Set(input.order_id),
            discount_amount: Set(discount_amount),
            used_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        info!(coupon_id = %coupon.id, %user_id, %discount_amount, "Coupon applied");
        self.events.send_or_log(Event::CouponApplied {
            coupon_id: coupon.id,
            user_id,
            order_id: input.order_id,
            discount_amount,
        });

        Ok(CouponApplication {
            discount_amount,
            final_amount: round_money(input.order_value - discount_amount),
            message: "Coupon applied successfully".to_string(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        is_active: Option<bool>,
        code: Option<String>,
        params: PageParams,
    ) -> Result<Page<CouponModel>, ServiceError> {
        let mut query = Coupon::find_live();
        if let Some(is_active) = is_active {
            query = query.filter(coupon::Column::IsActive.eq(is_active));
        }
        if let Some(code) = code.as_deref().map(normalize_code).filter(|c| !c.is_empty()) {
            query = query.filter(coupon::Column::Code.contains(&code));
        }

        let paginator = query
            .order_by_desc(coupon::Column::CreatedAt)
            .paginate(&*self.db, params.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page - 1).await?;
        Ok(Page::new(items, total, params))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<CouponModel, ServiceError> {
        Coupon::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Coupon not found"))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateCouponInput) -> Result<CouponModel, ServiceError> {
        let code = normalize_code(&input.code);
        self.ensure_unique_code(&code, None).await?;
        check_window(input.start_date, input.end_date)?;
        check_discount_value(input.discount_type, input.discount_value)?;

        let now = Utc::now();
        let model = coupon::ActiveModel {
            id: Set(Uuid::new_v4()),
            code: Set(code),
            description: Set(clean_optional(input.description)),
            discount_type: Set(input.discount_type),
            discount_value: Set(input.discount_value),
            min_order_value: Set(input.min_order_value.unwrap_or(Decimal::ZERO)),
            max_discount_amount: Set(input.max_discount_amount),
            usage_limit: Set(input.usage_limit.unwrap_or(0)),
            usage_count: Set(0),
            per_user_limit: Set(input.per_user_limit.unwrap_or(1)),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            is_active: Set(input.is_active.unwrap_or(true)),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(coupon_id = %model.id, code = %model.code, "Coupon created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, input: UpdateCouponInput) -> Result<CouponModel, ServiceError> {
        let existing = self.get(id).await?;

        let code = input.code.as_deref().map(normalize_code);
        if let Some(code) = code.as_deref() {
            if code != existing.code {
                self.ensure_unique_code(code, Some(id)).await?;
            }
        }
        check_window(
            input.start_date.unwrap_or(existing.start_date),
            input.end_date.unwrap_or(existing.end_date),
        )?;
        check_discount_value(
            input.discount_type.unwrap_or(existing.discount_type),
            input.discount_value.unwrap_or(existing.discount_value),
        )?;

        let mut active: coupon::ActiveModel = existing.into();
        if let Some(code) = code {
            active.code = Set(code);
        }
        if let Some(description) = input.description {
            active.description = Set(clean_optional(Some(description)));
        }
        if let Some(discount_type) = input.discount_type {
            active.discount_type = Set(discount_type);
        }
        if let Some(discount_value) = input.discount_value {
            active.discount_value = Set(discount_value);
        }
        if let Some(min_order_value) = input.min_order_value {
            active.min_order_value = Set(min_order_value);
        }
        if let Some(max_discount_amount) = input.max_discount_amount {
            active.max_discount_amount = Set(max_discount_amount);
        }
        if let Some(usage_limit) = input.usage_limit {
            active.usage_limit = Set(usage_limit);
        }
        if let Some(per_user_limit) = input.per_user_limit {
            active.per_user_limit = Set(per_user_limit);
        }
        if let Some(start_date) = input.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = input.end_date {
            active.end_date = Set(end_date);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(coupon_id = %id, "Coupon updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let mut active: coupon::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(coupon_id = %id, "Coupon deleted");
        Ok(())
    }

    /// Redemption history, newest first.
    #[instrument(skip(self))]
    pub async fn usages(&self, id: Uuid, params: PageParams) -> Result<Page<CouponUsageView>, ServiceError> {
        self.get(id).await?;

        let paginator = CouponUsage::find()
            .filter(coupon_usage::Column::CouponId.eq(id))
            .order_by_desc(coupon_usage::Column::UsedAt)
            .paginate(&*self.db, params.limit);
        let total = paginator.num_items().await?;
        let usages = paginator.fetch_page(params.page - 1).await?;

        let user_ids: Vec<Uuid> = usages.iter().map(|u| u.user_id).collect();
        let users: HashMap<Uuid, UserSummary> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            User::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(&*self.db)
                .await?
                .iter()
                .map(|u| (u.id, UserSummary::from(u)))
                .collect()
        };

        let items = usages
            .into_iter()
            .map(|usage| CouponUsageView {
                user: users.get(&usage.user_id).cloned(),
                usage,
            })
            .collect();
        Ok(Page::new(items, total, params))
    }

    async fn ensure_unique_code(&self, code: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = Coupon::find_live().filter(coupon::Column::Code.eq(code));
        if let Some(id) = exclude {
            query = query.filter(coupon::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("Coupon code already exists"));
        }
        Ok(())
    }
}

fn check_window(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), ServiceError> {
    if start >= end {
        return Err(ServiceError::bad_request("Start date must be before end date"));
    }
    Ok(())
}
