use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::CATALOG_EDITORS;
use crate::services::product_variants::{
    CreateVariantInput, UpdateStockInput, UpdateVariantInput, VariantView,
};
use crate::AppState;

/// Routes relative to the products router; `:id` is the product.
pub fn variant_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/:id/variants", post(create_variant))
        .route(
            "/:id/variants/:variant_id",
            patch(update_variant).delete(delete_variant),
        )
        .route("/:id/variants/:variant_id/stock", patch(update_stock))
        .with_roles(CATALOG_EDITORS);

    Router::new()
        .route("/:id/variants", get(list_variants))
        .route("/:id/variants/:variant_id", get(get_variant))
        .merge(editors)
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Variants with color and size", body = crate::ApiResponse<Vec<VariantView>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let variants = state
        .services
        .variants
        .list(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(variants))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variants/{variant_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID")
    ),
    responses(
        (status = 200, description = "Variant", body = crate::ApiResponse<VariantView>),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Variants"
)]
pub async fn get_variant(
    State(state): State<AppState>,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let variant = state
        .services
        .variants
        .get(product_id, variant_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(variant))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateVariantInput,
    responses(
        (status = 201, description = "Variant created", body = crate::ApiResponse<VariantView>),
        (status = 400, description = "Duplicate SKU or color/size combination", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product, color or size not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Variants"
)]
pub async fn create_variant(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateVariantInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let variant = state
        .services
        .variants
        .create(product_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(variant, "Product variant"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}/variants/{variant_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = UpdateVariantInput,
    responses(
        (status = 200, description = "Variant updated", body = crate::ApiResponse<VariantView>),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Variants"
)]
pub async fn update_variant(
    State(state): State<AppState>,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateVariantInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let variant = state
        .services
        .variants
        .update(product_id, variant_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(variant, "Product variant"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}/variants/{variant_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID")
    ),
    responses(
        (status = 200, description = "Variant deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Variants"
)]
pub async fn delete_variant(
    State(state): State<AppState>,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    state
        .services
        .variants
        .delete(product_id, variant_id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Product variant"))
}

/// Add to, subtract from or overwrite the stock level
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}/variants/{variant_id}/stock",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("variant_id" = Uuid, Path, description = "Variant ID")
    ),
    request_body = UpdateStockInput,
    responses(
        (status = 200, description = "Stock updated", body = crate::ApiResponse<VariantView>),
        (status = 400, description = "Insufficient stock", body = crate::errors::ErrorResponse),
        (status = 404, description = "Variant not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Variants"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Path((product_id, variant_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateStockInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let variant = state
        .services
        .variants
        .update_stock(product_id, variant_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(variant, "Stock"))
}
