use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, patch, post, put},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::ProductImageModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, message_response, success_response,
    updated_response, validate_input,
};
use crate::handlers::CATALOG_EDITORS;
use crate::services::product_images::{
    CreateImageInput, ImageView, ReorderImagesInput, UpdateImageInput,
};
use crate::AppState;

/// Routes relative to the products router; `:id` is the product.
pub fn image_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/:id/images", post(create_image))
        .route("/:id/images/reorder", put(reorder_images))
        .route(
            "/:id/images/:image_id",
            patch(update_image).delete(delete_image),
        )
        .route("/:id/images/:image_id/thumbnail", patch(set_thumbnail))
        .with_roles(CATALOG_EDITORS);

    Router::new()
        .route("/:id/images", get(list_images))
        .route("/:id/images/:image_id", get(get_image))
        .merge(editors)
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product ID")),
    responses(
        (status = 200, description = "Images in display order", body = crate::ApiResponse<Vec<ProductImageModel>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let images = state
        .services
        .images
        .list(product_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(images))
}

#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image with its color", body = crate::ApiResponse<ImageView>),
        (status = 404, description = "Image not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Product Images"
)]
pub async fn get_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let image = state
        .services
        .images
        .get(product_id, image_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(image))
}

#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/images",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = CreateImageInput,
    responses(
        (status = 201, description = "Image created", body = crate::ApiResponse<ProductImageModel>),
        (status = 404, description = "Product or color not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn create_image(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<CreateImageInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let image = state
        .services
        .images
        .create(product_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(image, "Product image"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    request_body = UpdateImageInput,
    responses(
        (status = 200, description = "Image updated", body = crate::ApiResponse<ProductImageModel>),
        (status = 404, description = "Image not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn update_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateImageInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let image = state
        .services
        .images
        .update(product_id, image_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(image, "Product image"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/products/{id}/images/{image_id}",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Image deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Image not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn delete_image(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    state
        .services
        .images
        .delete(product_id, image_id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Product image"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/products/{id}/images/{image_id}/thumbnail",
    params(
        ("id" = Uuid, Path, description = "Product ID"),
        ("image_id" = Uuid, Path, description = "Image ID")
    ),
    responses(
        (status = 200, description = "Thumbnail set", body = crate::ApiResponse<ProductImageModel>),
        (status = 404, description = "Image not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn set_thumbnail(
    State(state): State<AppState>,
    Path((product_id, image_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let image = state
        .services
        .images
        .set_thumbnail(product_id, image_id)
        .await
        .map_err(map_service_error)?;

    Ok(message_response(image, "Thumbnail set successfully"))
}

#[utoipa::path(
    put,
    path = "/api/v1/products/{id}/images/reorder",
    params(("id" = Uuid, Path, description = "Product ID")),
    request_body = ReorderImagesInput,
    responses(
        (status = 200, description = "Images reordered", body = crate::ApiResponse<Vec<ProductImageModel>>),
        (status = 400, description = "Some images do not belong to this product", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Product Images"
)]
pub async fn reorder_images(
    State(state): State<AppState>,
    Path(product_id): Path<Uuid>,
    Json(payload): Json<ReorderImagesInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let images = state
        .services
        .images
        .reorder(product_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(message_response(images, "Images reordered successfully"))
}
