use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::ColorModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{ADMIN_ONLY, CATALOG_EDITORS};
use crate::services::colors::{ColorInput, UpdateColorInput};
use crate::AppState;

pub fn color_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_color))
        .route("/:id", patch(update_color))
        .with_roles(CATALOG_EDITORS);
    let admins = Router::new()
        .route("/:id", delete(delete_color))
        .with_roles(ADMIN_ONLY);

    Router::new()
        .route("/", get(list_colors))
        .route("/:id", get(get_color))
        .merge(editors)
        .merge(admins)
}

#[utoipa::path(
    get,
    path = "/api/v1/colors",
    responses(
        (status = 200, description = "Colors ordered by name", body = crate::ApiResponse<Vec<ColorModel>>)
    ),
    tag = "Colors"
)]
pub async fn list_colors(State(state): State<AppState>) -> Result<Response, ApiError> {
    let colors = state
        .services
        .colors
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(colors))
}

#[utoipa::path(
    get,
    path = "/api/v1/colors/{id}",
    params(("id" = Uuid, Path, description = "Color ID")),
    responses(
        (status = 200, description = "Color", body = crate::ApiResponse<ColorModel>),
        (status = 404, description = "Color not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Colors"
)]
pub async fn get_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let color = state
        .services
        .colors
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(color))
}

#[utoipa::path(
    post,
    path = "/api/v1/colors",
    request_body = ColorInput,
    responses(
        (status = 201, description = "Color created", body = crate::ApiResponse<ColorModel>),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn create_color(
    State(state): State<AppState>,
    Json(payload): Json<ColorInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let color = state
        .services
        .colors
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(color, "Color"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/colors/{id}",
    params(("id" = Uuid, Path, description = "Color ID")),
    request_body = UpdateColorInput,
    responses(
        (status = 200, description = "Color updated", body = crate::ApiResponse<ColorModel>),
        (status = 404, description = "Color not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn update_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateColorInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let color = state
        .services
        .colors
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(color, "Color"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/colors/{id}",
    params(("id" = Uuid, Path, description = "Color ID")),
    responses(
        (status = 200, description = "Color deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Color is used by variants", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Colors"
)]
pub async fn delete_color(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .colors
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Color"))
}
