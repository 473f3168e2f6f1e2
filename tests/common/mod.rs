#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{self, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use storefront_api::{
    auth::hash_password,
    build_router,
    config::AppConfig,
    db,
    entities::{user, TierLevel, User, UserModel, UserRole, UserStatus},
    errors::ServiceError,
    events::{self, EventSender},
    services::mailer::{Mailer, OutgoingMail},
    AppState,
};

pub const TEST_JWT_SECRET: &str = "t3st-Signing-Key_for+integration#runs!";
pub const TEST_PASSWORD: &str = "Sup3rSecret!pass";

/// Captures outgoing mail so tests can read reset tokens and OTP codes.
/// Delivery can be switched off to exercise failure paths.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }

    pub fn last_to(&self, email: &str) -> Option<OutgoingMail> {
        self.sent().into_iter().rev().find(|m| m.to == email)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), ServiceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(ServiceError::InternalError(format!(
                "mail relay refused message to {}",
                mail.to
            )));
        }
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

/// A seeded account and a bearer token minted for it.
#[derive(Clone)]
pub struct TestUser {
    pub user: UserModel,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> Uuid {
        self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }
}

/// Full application on a throwaway SQLite file, with one account per role.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
    pub customer: TestUser,
    pub staff: TestUser,
    pub admin: TestUser,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("temp dir for test database");
        let db_path = db_dir.path().join("storefront_test.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "development".to_string(),
        );
        cfg.db_max_connections = 4;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(Arc::new(pool), cfg, event_sender, mailer.clone());
        let router = build_router(state.clone());

        let customer = seed_user(&state, "customer@example.com", UserRole::Customer).await;
        let staff = seed_user(&state, "staff@example.com", UserRole::Staff).await;
        let admin = seed_user(&state, "admin@example.com", UserRole::Admin).await;

        Self {
            router,
            state,
            mailer,
            customer,
            staff,
            admin,
            _db_dir: db_dir,
            _event_task: event_task,
        }
    }

    /// Inserts another account with [`TEST_PASSWORD`].
    pub async fn create_user(&self, email: &str, role: UserRole) -> TestUser {
        seed_user(&self.state, email, role).await
    }

    /// Send a request against the router with an optional bearer token.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header("authorization", format!("Bearer {}", tok));
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Sends a request and decodes the JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let response = self.request(method, uri, body, token).await;
        let status = response.status();
        (status, response_json(response).await)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, token).await
    }

    pub async fn post(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), token).await
    }

    pub async fn put(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), token).await
    }

    pub async fn patch(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body), token).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, token).await
    }

    pub fn admin_token(&self) -> &str {
        &self.admin.token
    }

    pub fn staff_token(&self) -> &str {
        &self.staff.token
    }

    pub fn customer_token(&self) -> &str {
        &self.customer.token
    }

    /// Reads the account straight from the database.
    pub async fn load_user(&self, id: Uuid) -> UserModel {
        User::find_by_id(id)
            .one(&*self.state.db)
            .await
            .expect("load user")
            .expect("user exists")
    }

    /// Creates a category as admin and returns its id.
    pub async fn seed_category(&self, name: &str, slug: &str, parent_id: Option<&str>) -> String {
        let mut body = serde_json::json!({ "name": name, "slug": slug });
        if let Some(parent) = parent_id {
            body["parent_id"] = Value::String(parent.to_string());
        }
        let (status, json) = self
            .post("/api/v1/categories", body, Some(self.admin_token()))
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed category: {json}");
        id_of(&json)
    }

    pub async fn seed_color(&self, name: &str, hex: &str) -> String {
        let (status, json) = self
            .post(
                "/api/v1/colors",
                serde_json::json!({ "name": name, "hex_code": hex }),
                Some(self.admin_token()),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed color: {json}");
        id_of(&json)
    }

    pub async fn seed_size(&self, name: &str, size_type: &str) -> String {
        let (status, json) = self
            .post(
                "/api/v1/sizes",
                serde_json::json!({ "name": name, "type": size_type }),
                Some(self.admin_token()),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed size: {json}");
        id_of(&json)
    }

    /// Creates a product in a fresh category and returns its id.
    pub async fn seed_product(&self, name: &str, base_price: &str) -> String {
        let slug = format!("cat-{}", Uuid::new_v4().simple());
        let category_id = self.seed_category(&format!("Category {name}"), &slug, None).await;
        let (status, json) = self
            .post(
                "/api/v1/products",
                serde_json::json!({
                    "name": name,
                    "base_price": base_price,
                    "category_id": category_id,
                    "gender": "UNISEX",
                    "age_group": "ADULT"
                }),
                Some(self.admin_token()),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "seed product: {json}");
        id_of(&json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

async fn seed_user(state: &AppState, email: &str, role: UserRole) -> TestUser {
    let now = Utc::now();
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        phone_number: Set(None),
        password_hash: Set(Some(hash_password(TEST_PASSWORD).expect("hash test password"))),
        auth_provider: Set("local".to_string()),
        first_name: Set(Some("Test".to_string())),
        last_name: Set(Some(format!("{role}"))),
        avatar_url: Set(None),
        gender: Set(None),
        date_of_birth: Set(None),
        preferences: Set(None),
        loyalty_points: Set(0),
        tier_level: Set(TierLevel::Bronze),
        role: Set(role),
        status: Set(UserStatus::Active),
        is_email_verified: Set(false),
        last_login_at: Set(None),
        reset_password_token_hash: Set(None),
        reset_password_expires: Set(None),
        email_verification_token: Set(None),
        email_verification_expires: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&*state.db)
    .await
    .expect("seed test user");

    let token = state
        .auth
        .generate_token(user.id, user.role)
        .expect("mint test token")
        .access_token;

    TestUser { user, token }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap_or_else(|_| {
        Value::String(String::from_utf8_lossy(&bytes).into_owned())
    })
}

/// `data.id` of an envelope.
pub fn id_of(envelope: &Value) -> String {
    envelope["data"]["id"]
        .as_str()
        .unwrap_or_else(|| panic!("envelope without data.id: {envelope}"))
        .to_string()
}

/// Reads a decimal that may be serialized as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("not a decimal: {other}"),
    }
}
