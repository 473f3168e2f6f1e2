use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use validator::Validate;

use crate::errors::{ApiError, ServiceError};
use crate::ApiResponse;

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiResponse::success(data))).into_response()
}

/// Success response carrying a human-readable message next to the data
pub fn message_response<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::with_message(data, message))).into_response()
}

/// 200 with only a message
pub fn ack_response(message: impl Into<String>) -> Response {
    (StatusCode::OK, Json(ApiResponse::<()>::message(message))).into_response()
}

/// Standard created response: `"<resource> created successfully"`
pub fn created_response<T: Serialize>(data: T, resource: &str) -> Response {
    (
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            data,
            format!("{resource} created successfully"),
        )),
    )
        .into_response()
}

pub fn updated_response<T: Serialize>(data: T, resource: &str) -> Response {
    message_response(data, format!("{resource} updated successfully"))
}

pub fn deleted_response(resource: &str) -> Response {
    ack_response(format!("{resource} deleted successfully"))
}

/// Validate request input
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ApiError> {
    input
        .validate()
        .map_err(|e| ApiError::ValidationError(e.to_string()))
}

/// Map service errors to API errors
pub fn map_service_error(err: ServiceError) -> ApiError {
    ApiError::ServiceError(err)
}
