use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{delete, get, post},
    Router,
};
use uuid::Uuid;

use crate::entities::PromotionModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    ack_response, created_response, deleted_response, map_service_error, message_response,
    success_response, updated_response, validate_input,
};
use crate::services::promotions::{
    CreatePromotionInput, PromotionDetail, PromotionListQuery, PromotionProductsInput,
    UpdatePromotionInput,
};
use crate::services::Page;
use crate::AppState;

/// Public view of promotions running right now.
pub fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active_promotions))
        .route("/:id", get(get_promotion))
}

/// Promotion management. Mounted under `/admin`, which applies the role gate.
pub fn admin_promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all_promotions).post(create_promotion))
        .route(
            "/:id",
            get(get_promotion)
                .put(update_promotion)
                .patch(update_promotion)
                .delete(delete_promotion),
        )
        .route("/:id/products", post(add_promotion_products))
        .route("/:id/products/:product_id", delete(remove_promotion_product))
}

#[utoipa::path(
    get,
    path = "/api/v1/promotions",
    responses(
        (status = 200, description = "Promotions running now", body = crate::ApiResponse<Vec<PromotionModel>>)
    ),
    tag = "Promotions"
)]
pub async fn list_active_promotions(State(state): State<AppState>) -> Result<Response, ApiError> {
    let promotions = state
        .services
        .promotions
        .list_active()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(promotions))
}

#[utoipa::path(
    get,
    path = "/api/v1/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Promotion with its products", body = crate::ApiResponse<PromotionDetail>),
        (status = 404, description = "Promotion not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Promotions"
)]
pub async fn get_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let promotion = state
        .services
        .promotions
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(promotion))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/promotions",
    params(PromotionListQuery),
    responses(
        (status = 200, description = "All promotions, newest first", body = crate::ApiResponse<Page<PromotionModel>>),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_promotions(
    State(state): State<AppState>,
    Query(query): Query<PromotionListQuery>,
) -> Result<Response, ApiError> {
    let params = state.page_params(query.page_query());
    let page = state
        .services
        .promotions
        .list_all(query.is_active, params)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

#[utoipa::path(
    post,
    path = "/api/v1/admin/promotions",
    request_body = CreatePromotionInput,
    responses(
        (status = 201, description = "Promotion created", body = crate::ApiResponse<PromotionModel>),
        (status = 400, description = "Invalid dates or discount", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn create_promotion(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromotionInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let promotion = state
        .services
        .promotions
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(promotion, "Promotion"))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    request_body = UpdatePromotionInput,
    responses(
        (status = 200, description = "Promotion updated", body = crate::ApiResponse<PromotionModel>),
        (status = 400, description = "Invalid dates or discount", body = crate::errors::ErrorResponse),
        (status = 404, description = "Promotion not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePromotionInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let promotion = state
        .services
        .promotions
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(promotion, "Promotion"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/promotions/{id}",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    responses(
        (status = 200, description = "Promotion deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Promotion not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn delete_promotion(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .promotions
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Promotion"))
}

/// Link products to a promotion; already linked products are skipped
#[utoipa::path(
    post,
    path = "/api/v1/admin/promotions/{id}/products",
    params(("id" = Uuid, Path, description = "Promotion ID")),
    request_body = PromotionProductsInput,
    responses(
        (status = 200, description = "Products linked", body = crate::ApiResponse<PromotionDetail>),
        (status = 404, description = "Promotion or product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn add_promotion_products(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PromotionProductsInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let promotion = state
        .services
        .promotions
        .add_products(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(message_response(promotion, "Products added to promotion"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/admin/promotions/{id}/products/{product_id}",
    params(
        ("id" = Uuid, Path, description = "Promotion ID"),
        ("product_id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Product unlinked", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Product is not part of the promotion", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn remove_promotion_product(
    State(state): State<AppState>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    state
        .services
        .promotions
        .remove_product(id, product_id)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response("Product removed from promotion"))
}
