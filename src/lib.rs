//! Storefront API library
//!
//! REST backend for a fashion storefront: catalog, variants, promotions,
//! coupons, addresses and user accounts.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod middleware_helpers;
pub mod openapi;
pub mod services;
pub mod tracing;

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;
use http::HeaderValue;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
};
use utoipa::ToSchema;

use crate::auth::{AuthConfig, AuthRouterExt, AuthService};
use crate::handlers::ADMIN_ONLY;
use crate::services::mailer::Mailer;
use crate::services::pagination::{PageParams, PageQuery};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<AuthService>,
    pub services: handlers::AppServices,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
        mailer: Arc<dyn Mailer>,
    ) -> Self {
        let auth = Arc::new(AuthService::new(AuthConfig::from(&config)));
        let services = handlers::AppServices::new(
            db.clone(),
            event_sender.clone(),
            auth.clone(),
            mailer,
            &config,
        );

        Self {
            db,
            config,
            event_sender,
            auth,
            services,
            started_at: Instant::now(),
        }
    }

    /// Resolves raw `page` / `limit` against the configured page sizes.
    pub fn page_params(&self, query: PageQuery) -> PageParams {
        query.resolve(self.config.default_page_size, self.config.max_page_size)
    }
}

// Common response wrappers
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
}

#[derive(Serialize, ToSchema)]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: String,
}

impl ResponseMeta {
    fn capture() -> Self {
        Self {
            request_id: crate::tracing::current_request_id().map(|rid| rid.as_str().to_string()),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            meta: Some(ResponseMeta::capture()),
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    /// Success envelope without a payload
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
            meta: Some(ResponseMeta::capture()),
        }
    }
}


/// Every resource router, mounted under `/api/v1`.
pub fn api_v1_routes() -> Router<AppState> {
    let admin = Router::new()
        .nest("/users", handlers::admin_users::admin_user_routes())
        .nest("/promotions", handlers::promotions::admin_promotion_routes())
        .nest("/coupons", handlers::coupons::admin_coupon_routes())
        .with_roles(ADMIN_ONLY);

    Router::new()
        .nest("/auth", handlers::auth::auth_routes())
        .nest("/users", handlers::users::user_routes())
        .nest("/addresses", handlers::addresses::address_routes())
        .nest("/categories", handlers::categories::category_routes())
        .nest("/colors", handlers::colors::color_routes())
        .nest("/sizes", handlers::sizes::size_routes())
        .nest("/materials", handlers::materials::material_routes())
        .nest("/usages", handlers::usages::usage_routes())
        .nest("/products", handlers::products::product_routes())
        .nest("/promotions", handlers::promotions::promotion_routes())
        .nest("/coupons", handlers::coupons::coupon_routes())
        .nest("/admin", admin)
}

/// CORS policy derived from configuration. Without explicit origins the
/// policy is permissive only where configuration allows it.
pub fn cors_layer(cfg: &config::AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = cfg
        .cors_origins()
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    if !origins.is_empty() {
        let layer = CorsLayer::new().allow_origin(origins);
        if cfg.cors_allow_credentials {
            // Wildcards are rejected by tower-http once credentials are allowed.
            layer
                .allow_methods([
                    http::Method::GET,
                    http::Method::POST,
                    http::Method::PUT,
                    http::Method::PATCH,
                    http::Method::DELETE,
                ])
                .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
                .allow_credentials(true)
        } else {
            layer.allow_methods(Any).allow_headers(Any)
        }
    } else if cfg.should_allow_permissive_cors() {
        ::tracing::info!(
            "Using permissive CORS because explicit origins were not configured ({})",
            if cfg.is_development() {
                "development environment"
            } else {
                "explicit override enabled"
            }
        );
        CorsLayer::permissive()
    } else {
        ::tracing::warn!("No CORS origins configured; cross-origin requests will be refused");
        CorsLayer::new()
    }
}

/// Full application: health, versioned API and Swagger UI, wrapped in the
/// shared middleware stack.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let auth_service = state.auth.clone();

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_ui())
        .layer(crate::tracing::configure_http_tracing())
        .layer(CompressionLayer::new())
        .layer(cors)
        .layer(axum::middleware::from_fn_with_state(
            auth_service,
            auth::inject_auth_service,
        ))
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match db::check_connection(&state.db).await {
        Ok(()) => "healthy",
        Err(e) => {
            ::tracing::warn!(error = %e, "Health check could not reach the database");
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "message": "Server is healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "checks": { "database": database },
    }))
}
