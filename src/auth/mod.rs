/*!
 * # Authentication and Authorization
 *
 * Stateless HS256 bearer tokens carrying the user id and role. Routers opt in
 * through [`AuthRouterExt`]; handlers read the caller with the [`AuthUser`]
 * extractor (or `Option<AuthUser>` behind [`optional_auth_middleware`]).
 */

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::entities::UserRole;

pub mod password;

pub use password::{hash_password, verify_password};

/// Claim structure for access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,    // user id
    pub role: UserRole, // role at issue time
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Authenticated caller extracted from the bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
    pub token_id: String,
}

impl AuthUser {
    pub fn has_role(&self, role: UserRole) -> bool {
        self.role == role
    }

    pub fn has_any_role(&self, roles: &[UserRole]) -> bool {
        roles.contains(&self.role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(UserRole::Admin)
    }
}

/// Authentication configuration
#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub access_token_expiration: Duration,
}

impl AuthConfig {
    pub fn new(jwt_secret: String, access_token_expiration: Duration) -> Self {
        Self {
            jwt_secret,
            access_token_expiration,
        }
    }
}

impl From<&crate::config::AppConfig> for AuthConfig {
    fn from(cfg: &crate::config::AppConfig) -> Self {
        Self::new(
            cfg.jwt_secret.clone(),
            Duration::from_secs(cfg.jwt_expiration_secs),
        )
    }
}

/// Signed access token returned by login
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Issues and validates access tokens
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Signs a token for `user_id` acting as `role`.
    pub fn generate_token(&self, user_id: Uuid, role: UserRole) -> Result<AccessToken, AuthError> {
        let now = Utc::now();
        let exp = now
            + ChronoDuration::from_std(self.config.access_token_expiration)
                .map_err(|_| AuthError::InternalError("Invalid token duration".to_string()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenCreation(e.to_string()))?;

        Ok(AccessToken {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_expiration.as_secs() as i64,
        })
    }

    /// Validate a token and extract the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }

    /// Resolves the caller from an `Authorization: Bearer` header map.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = self.validate_token(token)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(AuthUser {
            user_id,
            role: claims.role,
            token_id: claims.jti,
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication error types
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authentication")]
    MissingAuth,

    #[error("Missing token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingAuth | Self::MissingToken | Self::InvalidToken | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::InsufficientPermissions => StatusCode::FORBIDDEN,
            Self::TokenCreation(_) | Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (error_code, error_message) = match &self {
            Self::MissingAuth => ("AUTH_MISSING", "User not authenticated".to_string()),
            Self::MissingToken => (
                "AUTH_MISSING_TOKEN",
                "Access denied. No token provided.".to_string(),
            ),
            Self::InvalidToken => ("AUTH_INVALID_TOKEN", "Invalid token".to_string()),
            Self::TokenExpired => ("AUTH_TOKEN_EXPIRED", "Token has expired".to_string()),
            Self::InsufficientPermissions => (
                "AUTH_INSUFFICIENT_PERMISSIONS",
                "Access denied. You do not have permission to perform this action.".to_string(),
            ),
            Self::TokenCreation(_) => (
                "AUTH_TOKEN_CREATION_FAILED",
                "Failed to issue token".to_string(),
            ),
            Self::InternalError(_) => ("AUTH_INTERNAL_ERROR", "Internal server error".to_string()),
        };

        let body = Json(serde_json::json!({
            "error": {
                "code": error_code,
                "message": error_message,
            }
        }));

        (self.status_code(), body).into_response()
    }
}

impl From<AuthError> for crate::errors::ServiceError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::TokenCreation(msg) | AuthError::InternalError(msg) => {
                crate::errors::ServiceError::InternalError(msg)
            }
            AuthError::InsufficientPermissions => {
                crate::errors::ServiceError::Forbidden(err.to_string())
            }
            other => crate::errors::ServiceError::Unauthorized(other.to_string()),
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuth)
    }
}

/// Makes the auth service reachable from request extensions.
pub async fn inject_auth_service(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Response {
    request.extensions_mut().insert(auth_service);
    next.run(request).await
}

fn auth_service_from(request: &Request) -> Result<Arc<AuthService>, AuthError> {
    request
        .extensions()
        .get::<Arc<AuthService>>()
        .cloned()
        .ok_or_else(|| AuthError::InternalError("Authentication service not available".into()))
}

/// Rejects requests without a valid bearer token and records the caller.
pub async fn auth_middleware(mut request: Request, next: Next) -> Response {
    let auth_service = match auth_service_from(&request) {
        Ok(service) => service,
        Err(e) => return e.into_response(),
    };

    match auth_service.authenticate(request.headers()) {
        Ok(user) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}

/// Records the caller when a valid bearer token is present; anonymous otherwise.
pub async fn optional_auth_middleware(mut request: Request, next: Next) -> Response {
    if let Ok(auth_service) = auth_service_from(&request) {
        match auth_service.authenticate(request.headers()) {
            Ok(user) => {
                request.extensions_mut().insert(user);
            }
            Err(AuthError::MissingToken) => {}
            Err(e) => debug!(error = %e, "Ignoring unusable bearer token"),
        }
    }
    next.run(request).await
}

/// Role middleware to check the caller holds one of `allowed` roles
pub async fn roles_middleware(
    State(allowed): State<Arc<[UserRole]>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or(AuthError::MissingAuth)?;

    if !user.has_any_role(&allowed) {
        debug!(user_id = %user.user_id, role = %user.role, "Role not allowed");
        return Err(AuthError::InsufficientPermissions);
    }

    Ok(next.run(request).await)
}

/// Extension methods for Router to add auth middleware
pub trait AuthRouterExt {
    fn with_auth(self) -> Self;
    fn with_optional_auth(self) -> Self;
    fn with_roles(self, roles: &[UserRole]) -> Self;
}

impl<S> AuthRouterExt for axum::Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(auth_middleware))
    }

    fn with_optional_auth(self) -> Self {
        self.layer(axum::middleware::from_fn(optional_auth_middleware))
    }

    fn with_roles(self, roles: &[UserRole]) -> Self {
        let allowed: Arc<[UserRole]> = roles.into();
        self.layer(axum::middleware::from_fn_with_state(
            allowed,
            roles_middleware,
        ))
        .with_auth()
    }
}
