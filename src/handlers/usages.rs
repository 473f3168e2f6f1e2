use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::UsageModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{ADMIN_ONLY, CATALOG_EDITORS};
use crate::services::usages::{UpdateUsageInput, UsageDetail, UsageInput};
use crate::AppState;

pub fn usage_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_usage))
        .route("/:id", patch(update_usage))
        .with_roles(CATALOG_EDITORS);
    let admins = Router::new()
        .route("/:id", delete(delete_usage))
        .with_roles(ADMIN_ONLY);

    Router::new()
        .route("/", get(list_usages))
        .route("/:id", get(get_usage))
        .merge(editors)
        .merge(admins)
}

#[utoipa::path(
    get,
    path = "/api/v1/usages",
    responses(
        (status = 200, description = "Usages ordered by name", body = crate::ApiResponse<Vec<UsageModel>>)
    ),
    tag = "Usages"
)]
pub async fn list_usages(State(state): State<AppState>) -> Result<Response, ApiError> {
    let usages = state
        .services
        .usages
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(usages))
}

#[utoipa::path(
    get,
    path = "/api/v1/usages/{id}",
    params(("id" = Uuid, Path, description = "Usage ID")),
    responses(
        (status = 200, description = "Usage with linked products", body = crate::ApiResponse<UsageDetail>),
        (status = 404, description = "Usage not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Usages"
)]
pub async fn get_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let usage = state
        .services
        .usages
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(usage))
}

#[utoipa::path(
    post,
    path = "/api/v1/usages",
    request_body = UsageInput,
    responses(
        (status = 201, description = "Usage created", body = crate::ApiResponse<UsageModel>),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Usages"
)]
pub async fn create_usage(
    State(state): State<AppState>,
    Json(payload): Json<UsageInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let usage = state
        .services
        .usages
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(usage, "Usage"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/usages/{id}",
    params(("id" = Uuid, Path, description = "Usage ID")),
    request_body = UpdateUsageInput,
    responses(
        (status = 200, description = "Usage updated", body = crate::ApiResponse<UsageModel>),
        (status = 404, description = "Usage not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Usages"
)]
pub async fn update_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUsageInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let usage = state
        .services
        .usages
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(usage, "Usage"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/usages/{id}",
    params(("id" = Uuid, Path, description = "Usage ID")),
    responses(
        (status = 200, description = "Usage deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Usage is linked to products", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Usages"
)]
pub async fn delete_usage(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .usages
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Usage"))
}
