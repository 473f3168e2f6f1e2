use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::SizeModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{ADMIN_ONLY, CATALOG_EDITORS};
use crate::services::sizes::{SizeFilter, SizeInput, UpdateSizeInput};
use crate::AppState;

pub fn size_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_size))
        .route("/:id", patch(update_size))
        .with_roles(CATALOG_EDITORS);
    let admins = Router::new()
        .route("/:id", delete(delete_size))
        .with_roles(ADMIN_ONLY);

    Router::new()
        .route("/", get(list_sizes))
        .route("/:id", get(get_size))
        .merge(editors)
        .merge(admins)
}

#[utoipa::path(
    get,
    path = "/api/v1/sizes",
    params(SizeFilter),
    responses(
        (status = 200, description = "Sizes ordered by type then name", body = crate::ApiResponse<Vec<SizeModel>>)
    ),
    tag = "Sizes"
)]
pub async fn list_sizes(
    State(state): State<AppState>,
    Query(filter): Query<SizeFilter>,
) -> Result<Response, ApiError> {
    let sizes = state
        .services
        .sizes
        .list(filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(sizes))
}

#[utoipa::path(
    get,
    path = "/api/v1/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Size", body = crate::ApiResponse<SizeModel>),
        (status = 404, description = "Size not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Sizes"
)]
pub async fn get_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let size = state
        .services
        .sizes
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(size))
}

#[utoipa::path(
    post,
    path = "/api/v1/sizes",
    request_body = SizeInput,
    responses(
        (status = 201, description = "Size created", body = crate::ApiResponse<SizeModel>),
        (status = 400, description = "Invalid payload or duplicate size", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn create_size(
    State(state): State<AppState>,
    Json(payload): Json<SizeInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let size = state
        .services
        .sizes
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(size, "Size"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    request_body = UpdateSizeInput,
    responses(
        (status = 200, description = "Size updated", body = crate::ApiResponse<SizeModel>),
        (status = 404, description = "Size not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn update_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSizeInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let size = state
        .services
        .sizes
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(size, "Size"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/sizes/{id}",
    params(("id" = Uuid, Path, description = "Size ID")),
    responses(
        (status = 200, description = "Size deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Size is used by variants", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Sizes"
)]
pub async fn delete_size(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .sizes
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Size"))
}
