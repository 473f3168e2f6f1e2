use axum::{
    extract::{Json, Path, Query, State},
    response::Response,
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::entities::UserModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    map_service_error, success_response, updated_response, validate_input,
};
use crate::services::admin_users::{AdminUpdateUserInput, AdminUserDetail, UserListQuery};
use crate::services::Page;
use crate::AppState;

/// Mounted under `/admin/users`; the admin role gate is applied by the caller.
pub fn admin_user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/:id", get(get_user).put(update_user))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users page", body = crate::ApiResponse<Page<UserModel>>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 403, description = "Forbidden", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Response, ApiError> {
    let params = state.page_params(query.page_query());
    let page = state
        .services
        .admin_users
        .list_users(query, params)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User with addresses", body = crate::ApiResponse<AdminUserDetail>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let user = state
        .services
        .admin_users
        .get_user(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(user))
}

#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = AdminUpdateUserInput,
    responses(
        (status = 200, description = "User updated", body = crate::ApiResponse<UserModel>),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdminUpdateUserInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .admin_users
        .update_user(id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(user, "User"))
}
