use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::{DbErr, SqlErr};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

fn current_request_id() -> Option<String> {
    crate::tracing::current_request_id().map(|rid| rid.as_str().to_string())
}

/// Error envelope returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "success": false,
    "error": "Not Found",
    "message": "Coupon not found",
    "request_id": "0b6c2f1e-5d43-4f59-9a51-7d1e4a0c8a11",
    "timestamp": "2025-03-01T10:30:00+00:00"
}))]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// HTTP status category (e.g., "Not Found", "Bad Request")
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human-readable error description
    #[schema(example = "Coupon not found")]
    pub message: String,
    /// Additional error details, such as field validation output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Request identifier echoed from `x-request-id`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339 timestamp when the error was produced
    pub timestamp: String,
}

impl ErrorResponse {
    fn new(status: StatusCode, message: String, details: Option<String>) -> Self {
        Self {
            success: false,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details,
            request_id: current_request_id(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Hash error: {0}")]
    HashError(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

/// Unique index violations surface as `Conflict`; they only get this far when
/// a concurrent writer slipped past the service-level duplicate check.
impl From<DbErr> for ServiceError {
    fn from(err: DbErr) -> Self {
        Self::from_db(err.sql_err(), err)
    }
}

impl ServiceError {
    fn from_db(sql_err: Option<SqlErr>, err: DbErr) -> Self {
        match sql_err {
            Some(SqlErr::UniqueConstraintViolation(detail)) => {
                tracing::warn!(%detail, "unique constraint violated");
                ServiceError::Conflict("Resource already exists".to_string())
            }
            _ => ServiceError::DatabaseError(err),
        }
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Shorthand for the `NotFound` variant.
    pub fn not_found(message: impl Into<String>) -> Self {
        ServiceError::NotFound(message.into())
    }

    /// Shorthand for the `BadRequest` variant.
    pub fn bad_request(message: impl Into<String>) -> Self {
        ServiceError::BadRequest(message.into())
    }

    /// Returns the HTTP status code for this error.
    /// This is the single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::BadRequest(_) | Self::InvalidOperation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::DatabaseError(_)
            | Self::HashError(_)
            | Self::InternalError(_)
            | Self::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Database error".to_string(),
            Self::HashError(_) | Self::Other(_) => "Internal server error".to_string(),
            Self::NotFound(msg)
            | Self::ValidationError(msg)
            | Self::BadRequest(msg)
            | Self::InvalidOperation(msg)
            | Self::Unauthorized(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg)
            | Self::InternalError(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let err = ErrorResponse::new(status, self.response_message(), None);
        (status, Json(err)).into_response()
    }
}

/// API Error type for HTTP responses
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::ServiceError(service_error) => service_error.into_response(),
            ApiError::ValidationError(details) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ErrorResponse::new(
                    status,
                    format!("Validation failed: {}", details),
                    Some(details),
                );
                (status, Json(body)).into_response()
            }
            ApiError::Unauthorized => {
                let status = StatusCode::UNAUTHORIZED;
                let body = ErrorResponse::new(status, "Authentication required".to_string(), None);
                (status, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn service_error_response_includes_request_id() {
        let response =
            crate::tracing::scope_request_id(crate::tracing::RequestId::new("req-123"), async {
                ServiceError::NotFound("Coupon not found".into()).into_response()
            })
            .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Coupon not found");
        assert!(!payload.success);
    }

    #[test]
    fn unique_violations_become_conflicts() {
        let err = ServiceError::from_db(
            Some(SqlErr::UniqueConstraintViolation("colors.name".into())),
            DbErr::Custom("UNIQUE constraint failed: colors.name".into()),
        );
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        assert_eq!(err.response_message(), "Resource already exists");

        let err = ServiceError::from(DbErr::Custom("connection reset".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn api_validation_error_carries_details() {
        let response = ApiError::ValidationError("name: length".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let payload: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(payload.message, "Validation failed: name: length");
        assert_eq!(payload.details.as_deref(), Some("name: length"));
    }

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("boom".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn service_error_response_message_hides_internal_details() {
        assert_eq!(
            ServiceError::HashError("salt".into()).response_message(),
            "Internal server error"
        );
        assert_eq!(
            ServiceError::DatabaseError(DbErr::Custom("secret".into())).response_message(),
            "Database error"
        );
        assert_eq!(
            ServiceError::Conflict("Email already in use".into()).response_message(),
            "Email already in use"
        );
    }
}
