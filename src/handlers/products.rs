use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::PromotionModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{product_images, product_variants, CATALOG_EDITORS};
use crate::services::products::{
    CreateProductInput, ProductDetail, ProductListItem, ProductQuery, UpdateProductInput,
};
use crate::services::Page;
use crate::AppState;

/// Creates the router for product endpoints, including the nested variant
/// and image collections.
pub fn product_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_product))
        .route("/:id", patch(update_product).delete(delete_product))
        .with_roles(CATALOG_EDITORS);

    Router::new()
        .route("/", get(list_products))
        .route("/:id", get(get_product))
        .route("/:id/promotions", get(product_promotions))
        .merge(editors)
        .merge(product_variants::variant_routes())
        .merge(product_images::image_routes())
}

/// List products with filters, sorting and pagination
#[utoipa::path(
    get,
    path = "/api/v1/products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products page", body = crate::ApiResponse<Page<ProductListItem>>),
        (status = 400, description = "Invalid query", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Response, ApiError> {
    let params = state.page_params(query.page_query());
    let page = state
        .services
        .products
        .list(query, params)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

/// Get a product with its category, material, images, variants and usages
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product retrieved", body = crate::ApiResponse<ProductDetail>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let product = state
        .services
        .products
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(product))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/v1/products",
    request_body = CreateProductInput,
    responses(
        (status = 201, description = "Product created", body = crate::ApiResponse<ProductDetail>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category or material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(product, "Product"))
}

/// Update a product
#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = UpdateProductInput,
    responses(
        (status = 200, description = "Product updated", body = crate::ApiResponse<ProductDetail>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let product = state
        .services
        .products
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(product, "Product"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Product deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .products
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Product"))
}

/// Promotions currently running for a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/promotions",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Running promotions", body = crate::ApiResponse<Vec<PromotionModel>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Products"
)]
pub async fn product_promotions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let promotions = state
        .services
        .promotions
        .product_promotions(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(promotions))
}
