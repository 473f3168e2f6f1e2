use axum::{
    extract::{Json, State},
    response::Response,
    routing::{get, post},
    Router,
};

use crate::auth::{AuthRouterExt, AuthUser};
use crate::entities::UserModel;
use crate::errors::ApiError;
use crate::handlers::common::{
    ack_response, map_service_error, success_response, updated_response, validate_input,
};
use crate::services::users::{UpdateProfileInput, VerifyEmailInput};
use crate::AppState;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).patch(update_profile))
        .route("/send-verification-otp", post(send_verification_otp))
        .route("/verify-email", post(verify_email))
        .with_auth()
}

#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "Current user", body = crate::ApiResponse<UserModel>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse),
        (status = 404, description = "User not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_profile(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let profile = state
        .services
        .users
        .get_profile(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(profile))
}

#[utoipa::path(
    patch,
    path = "/api/v1/users/profile",
    request_body = UpdateProfileInput,
    responses(
        (status = 200, description = "Profile updated", body = crate::ApiResponse<UserModel>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Phone number already in use", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_profile(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let profile = state
        .services
        .users
        .update_profile(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(updated_response(profile, "Profile"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/send-verification-otp",
    responses(
        (status = 200, description = "Verification code sent", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Email is already verified", body = crate::errors::ErrorResponse),
        (status = 500, description = "Failed to send verification email", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn send_verification_otp(
    user: AuthUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    state
        .services
        .users
        .send_verification_otp(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response("Verification code sent to your email"))
}

#[utoipa::path(
    post,
    path = "/api/v1/users/verify-email",
    request_body = VerifyEmailInput,
    responses(
        (status = 200, description = "Email verified", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid or expired code", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn verify_email(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let message = state
        .services
        .users
        .verify_email(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response(message))
}
