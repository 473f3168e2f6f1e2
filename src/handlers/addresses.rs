use axum::{
    extract::{Json, Path, State},
    response::Response,
    routing::{get, put},
    Router,
};
use uuid::Uuid;

use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::AddressModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    created_response, deleted_response, map_service_error, success_response, updated_response,
    validate_input,
};
use crate::services::addresses::{CreateAddressInput, UpdateAddressInput};
use crate::AppState;

/// Address book of the calling user.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_addresses).post(create_address))
        .route("/:id", put(update_address).delete(delete_address))
        .with_auth()
}

#[utoipa::path(
    get,
    path = "/api/v1/addresses",
    responses(
        (status = 200, description = "Addresses, default first", body = crate::ApiResponse<Vec<AddressModel>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn list_addresses(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let addresses = state
        .services
        .addresses
        .list(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(addresses))
}

#[utoipa::path(
    post,
    path = "/api/v1/addresses",
    request_body = CreateAddressInput,
    responses(
        (status = 201, description = "Address created", body = crate::ApiResponse<AddressModel>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn create_address(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAddressInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let address = state
        .services
        .addresses
        .create(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(address, "Address"))
}

#[utoipa::path(
    put,
    path = "/api/v1/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    request_body = UpdateAddressInput,
    responses(
        (status = 200, description = "Address updated", body = crate::ApiResponse<AddressModel>),
        (status = 404, description = "Address not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn update_address(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAddressInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let address = state
        .services
        .addresses
        .update(user.user_id, id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(address, "Address"))
}

#[utoipa::path(
    delete,
    path = "/api/v1/addresses/{id}",
    params(("id" = Uuid, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted", body = crate::ApiResponse<serde_json::Value>),
        (status = 404, description = "Address not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Addresses"
)]
pub async fn delete_address(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    state
        .services
        .addresses
        .delete(user.user_id, id)
        .await
        .map_err(map_service_error)?;

    Ok(deleted_response("Address"))
}
