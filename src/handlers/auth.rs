use axum::{
    extract::{Json, State},
    response::Response,
    routing::post,
    Router,
};

use crate::auth::{AuthRouterExt, AuthUser};
use crate::errors::ApiError;
use crate::handlers::common::{
    ack_response, created_response, map_service_error, message_response, validate_input,
};
use crate::services::accounts::{
    ChangePasswordInput, ForgotPasswordInput, LoginInput, LoginResponse, RegisterInput,
    ResetPasswordInput, FORGOT_PASSWORD_MESSAGE,
};
use crate::AppState;

/// Creates the router for account endpoints
pub fn auth_routes() -> Router<AppState> {
    let authenticated = Router::new()
        .route("/change-password", post(change_password))
        .with_auth();

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .merge(authenticated)
}

/// Register a customer account
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    request_body = RegisterInput,
    responses(
        (status = 201, description = "User registered", body = crate::ApiResponse<crate::entities::UserModel>),
        (status = 400, description = "Invalid payload", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email or phone already in use", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let user = state
        .services
        .accounts
        .register(payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(user, "User"))
}

/// Exchange credentials for an access token
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginInput,
    responses(
        (status = 200, description = "Logged in", body = crate::ApiResponse<LoginResponse>),
        (status = 401, description = "Invalid email or password", body = crate::errors::ErrorResponse),
        (status = 403, description = "Account is not active", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    let session = state
        .services
        .accounts
        .login(payload)
        .await
        .map_err(map_service_error)?;

    Ok(message_response(session, "Login successful"))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/change-password",
    request_body = ChangePasswordInput,
    responses(
        (status = 200, description = "Password changed", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Current password is incorrect", body = crate::errors::ErrorResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .accounts
        .change_password(user.user_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response("Password changed successfully"))
}

/// Request a password reset link. The answer is identical whether or not
/// the account exists.
#[utoipa::path(
    post,
    path = "/api/v1/auth/forgot-password",
    request_body = ForgotPasswordInput,
    responses(
        (status = 200, description = "Reset link sent when the account exists", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Auth"
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .accounts
        .forgot_password(payload)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response(FORGOT_PASSWORD_MESSAGE))
}

#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password",
    request_body = ResetPasswordInput,
    responses(
        (status = 200, description = "Password reset", body = crate::ApiResponse<serde_json::Value>),
        (status = 400, description = "Invalid or expired reset token", body = crate::errors::ErrorResponse)
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordInput>,
) -> Result<Response, ApiError> {
    validate_input(&payload)?;

    state
        .services
        .accounts
        .reset_password(payload)
        .await
        .map_err(map_service_error)?;

    Ok(ack_response("Password has been reset successfully"))
}
