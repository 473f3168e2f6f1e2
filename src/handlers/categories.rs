use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::CategoryModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{ADMIN_ONLY, CATALOG_EDITORS};
use crate::services::categories::{CategoryDetail, CreateCategoryInput, UpdateCategoryInput};
use crate::AppState;

pub fn category_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_category))
        .route("/:id", patch(update_category))
        .with_roles(CATALOG_EDITORS);
    let admins = Router::new()
        .route("/:id", delete(delete_category))
        .with_roles(ADMIN_ONLY);

    Router::new()
        .route("/", get(category_tree))
        .route("/:id", get(get_category))
        .merge(editors)
        .merge(admins)
}

/// Category tree with nested `children`
#[utoipa::path(
    get,
    path = "/api/v1/categories",
    responses(
        (status = 200, description = "Root categories with nested children", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Categories"
)]
pub async fn category_tree(State(state): State<AppState>) -> Result<Response, ApiError> {
    let tree = state
        .services
        .categories
        .tree()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(tree))
}

#[utoipa::path(
    get,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category with parent, children and products", body = crate::ApiResponse<CategoryDetail>),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let category = state
        .services
        .categories
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(category))
}

#[utoipa::path(
    post,
    path = "/api/v1/categories",
    request_body = CreateCategoryInput,
    responses(
        (status = 201, description = "Category created", body = crate::ApiResponse<CategoryModel>),
        (status = 400, description = "Invalid payload or duplicate slug", body = crate::errors::ErrorResponse),
        (status = 404, description = "Parent category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(category, "Category"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    request_body = UpdateCategoryInput,
    responses(
        (status = 200, description = "Category updated", body = crate::ApiResponse<CategoryModel>),
        (status = 400, description = "Invalid parent or duplicate slug", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .categories
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(category, "Category"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/categories/{id}",
    params(("id" = Uuid, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Category still has subcategories or products", body = crate::errors::ErrorResponse),
        (status = 404, description = "Category not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .categories
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Category"))
}
