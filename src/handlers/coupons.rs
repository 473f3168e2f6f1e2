use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{get, post},
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::CouponModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, message_response, success_response,
    updated_response, validate_input,
};
use crate::services::coupons::{
    ApplyCouponInput, CouponApplication, CouponListQuery, CouponUsageView, CouponValidation,
    CreateCouponInput, UpdateCouponInput, ValidateCouponInput,
};
use crate::services::{Page, PageQuery};
use crate::AppState;

/// Storefront coupon endpoints. Validation works anonymously; per-user
/// limits are only checked when a token is presented.
pub fn coupon_routes() -> Router<AppState> {
    let anonymous = Router::new()
        .route("/validate", post(validate_coupon))
        .with_optional_auth();
    let signed_in = Router::new()
        .route("/apply", post(apply_coupon))
        .with_auth();

    anonymous.merge(signed_in)
}

/// Coupon management. Mounted under `/admin`, which applies the role gate.
pub fn admin_coupon_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_coupons).post(create_coupon))
        .route(
            "/:id",
            get(get_coupon)
                .put(update_coupon)
                .patch(update_coupon)
                .delete(delete_coupon),
        )
        .route("/:id/usages", get(coupon_usages))
}

#[utoipa::path(
    post,
    path = "/api/v1/coupons/validate",
    request_body = ValidateCouponInput,
    responses(
        (status = 200, description = "Coupon is redeemable for this order", body = crate::ApiResponse<CouponValidation>),
        (status = 400, description = "Coupon cannot be used", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invalid coupon code", body = crate::errors::ErrorResponse)
    ),
    tag = "Coupons"
)]
pub async fn validate_coupon(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    Json(payload): Json<ValidateCouponInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let validation = state
        .services
        .coupons
        .validate(payload, user.map(|u| u.user_id))
        .await
        .map_err(map_service_error)?;

    Ok(message_response(validation, "Coupon is valid"))
}

#[utoipa::path(
    post,
    path = "/api/v1/coupons/apply",
    request_body = ApplyCouponInput,
    responses(
        (status = 200, description = "Coupon redeemed", body = crate::ApiResponse<CouponApplication>),
        (status = 400, description = "Coupon cannot be used", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Coupons"
)]
pub async fn apply_coupon(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ApplyCouponInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let application = state
        .services
        .coupons
        .apply(payload, user.user_id)
        .await
        .map_err(map_service_error)?;
    let message = application.message.clone();

    Ok(message_response(application, message))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons",
    params(CouponListQuery),
    responses(
        (status = 200, description = "Coupons, newest first", body = crate::ApiResponse<Page<CouponModel>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_coupons(
    State(state): State<AppState>,
    Query(query): Query<CouponListQuery>,
) -> Result<Response, ApiError> {
    let params = state.page_params(query.page_query());
    let page = state
        .services
        .coupons
        .list(query.is_active, query.code, params)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon", body = crate::ApiResponse<CouponModel>),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let coupon = state
        .services
        .coupons
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(coupon))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/coupons",
    request_body = CreateCouponInput,
    responses(
        (status = 201, description = "Coupon created", body = crate::ApiResponse<CouponModel>),
        (status = 400, description = "Duplicate code or invalid discount", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(payload): Json<CreateCouponInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let coupon = state
        .services
        .coupons
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(coupon, "Coupon"))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    request_body = UpdateCouponInput,
    responses(
        (status = 200, description = "Coupon updated", body = crate::ApiResponse<CouponModel>),
        (status = 400, description = "Duplicate code or invalid discount", body = crate::errors::ErrorResponse),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCouponInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let coupon = state
        .services
        .coupons
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(coupon, "Coupon"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/coupons/{id}",
    params(("id" = Uuid, Path, description = "Coupon ID")),
    responses(
        (status = 200, description = "Coupon deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .coupons
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Coupon"))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/coupons/{id}/usages",
    params(
        ("id" = Uuid, Path, description = "Coupon ID"),
        ("page" = Option<u64>, Query, description = "Page number, 1-based"),
        ("limit" = Option<u64>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Redemptions, newest first", body = crate::ApiResponse<Page<CouponUsageView>>),
        (status = 404, description = "Coupon not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn coupon_usages(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<PageQuery>,
) -> Result<Response, ApiError> {
    let params = state.page_params(query);
    let usages = state
        .services
        .coupons
        .usages(id, params)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(usages))
}
