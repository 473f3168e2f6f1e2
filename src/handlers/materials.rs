use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use uuid::Uuid;

use crate::auth::AuthRouterExt;
use crate::entities::MaterialModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::handlers::{ADMIN_ONLY, CATALOG_EDITORS};
use crate::services::materials::{MaterialDetail, MaterialInput, UpdateMaterialInput};
use crate::AppState;

pub fn material_routes() -> Router<AppState> {
    let editors = Router::new()
        .route("/", post(create_material))
        .route("/:id", patch(update_material))
        .with_roles(CATALOG_EDITORS);
    let admins = Router::new()
        .route("/:id", delete(delete_material))
        .with_roles(ADMIN_ONLY);

    Router::new()
        .route("/", get(list_materials))
        .route("/:id", get(get_material))
        .merge(editors)
        .merge(admins)
}

#[utoipa::path(
    get,
    path = "/api/v1/materials",
    responses(
        (status = 200, description = "Materials ordered by name", body = crate::ApiResponse<Vec<MaterialModel>>)
    ),
    tag = "Materials"
)]
pub async fn list_materials(State(state): State<AppState>) -> Result<Response, ApiError> {
    let materials = state
        .services
        .materials
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(materials))
}

#[utoipa::path(
    get,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material with its products", body = crate::ApiResponse<MaterialDetail>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let material = state
        .services
        .materials
        .get(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(material))
}

#[utoipa::path(
    post,
    path = "/api/v1/materials",
    request_body = MaterialInput,
    responses(
        (status = 201, description = "Material created", body = crate::ApiResponse<MaterialModel>),
        (status = 400, description = "Invalid payload or duplicate name", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<MaterialInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let material = state
        .services
        .materials
        .create(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(material, "Material"))
}

#[utoipa::path(
    patch,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = UpdateMaterialInput,
    responses(
        (status = 200, description = "Material updated", body = crate::ApiResponse<MaterialModel>),
        (status = 404, description = "Material not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMaterialInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let material = state
        .services
        .materials
        .update(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(material, "Material"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Material is used by products", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .materials
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Material"))
}
