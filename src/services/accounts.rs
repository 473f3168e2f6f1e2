use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::{generate_reset_token, sha256_hex};
use crate::auth::{hash_password, verify_password, AuthService};
use crate::entities::{user, SoftDelete, TierLevel, User, UserGender, UserModel, UserRole, UserStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::{clean_optional, trimmed};
use crate::services::mailer::{Mailer, OutgoingMail};
use crate::services::users::{ensure_phone_available, find_live_user};

pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists for that email, a password reset link has been sent";

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 128))]
    pub password: String,
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(min = 8, max = 15))]
    pub phone_number: Option<String>,
    pub gender: Option<UserGender>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordInput {
    #[serde(deserialize_with = "trimmed")]
    #[validate(email)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: UserModel,
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration, login and password lifecycle.
#[derive(Clone)]
pub struct AccountService {
    db: Arc<DatabaseConnection>,
    auth: Arc<AuthService>,
    mailer: Arc<dyn Mailer>,
    events: EventSender,
    frontend_url: String,
    reset_ttl: Duration,
}

impl AccountService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        auth: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
        events: EventSender,
        frontend_url: String,
        reset_ttl: Duration,
    ) -> Self {
        Self {
            db,
            auth,
            mailer,
            events,
            frontend_url,
            reset_ttl,
        }
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserModel, ServiceError> {
        let email = normalize_email(&input.email);
        if self.find_by_email(&email).await?.is_some() {
            return Err(ServiceError::Conflict("Email already in use".to_string()));
        }
        let phone_number = clean_optional(input.phone_number);
        if let Some(phone) = phone_number.as_deref() {
            ensure_phone_available(&*self.db, phone, None).await?;
        }

        let password_hash = hash_password(&input.password)?;
        let now = Utc::now();
        let user = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            phone_number: Set(phone_number),
            password_hash: Set(Some(password_hash)),
            auth_provider: Set("local".to_string()),
            first_name: Set(clean_optional(input.first_name)),
            last_name: Set(clean_optional(input.last_name)),
            avatar_url: Set(None),
            gender: Set(input.gender),
            date_of_birth: Set(input.date_of_birth),
            preferences: Set(None),
            loyalty_points: Set(0),
            tier_level: Set(TierLevel::Bronze),
            role: Set(UserRole::Customer),
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
        .insert(&*self.db)
        .await?;

        info!(user_id = %user.id, "User registered");
        self.events.send_or_log(Event::UserRegistered(user.id));
        Ok(user)
    }

    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<LoginResponse, ServiceError> {
        let invalid = || ServiceError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .find_by_email(&normalize_email(&input.email))
            .await?
            .ok_or_else(invalid)?;
        let hash = user.password_hash.as_deref().ok_or_else(invalid)?;
        if !verify_password(&input.password, hash) {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(invalid());
        }
        if !user.is_active() {
            return Err(ServiceError::Forbidden("User account is not active".to_string()));
        }

        let token = self.auth.generate_token(user.id, user.role)?;

        let mut active: user::ActiveModel = user.into();
        active.last_login_at = Set(Some(Utc::now()));
        let user = active.update(&*self.db).await?;

        info!(user_id = %user.id, "User logged in");
        Ok(LoginResponse {
            user,
            token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
        })
    }

    #[instrument(skip(self, input))]
    pub async fn change_password(
        &self,
        user_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), ServiceError> {
        let user = find_live_user(&*self.db, user_id).await?;

        let current_ok = user
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(&input.current_password, hash));
        if !current_ok {
            return Err(ServiceError::bad_request("Current password is incorrect"));
        }
        if input.current_password == input.new_password {
            return Err(ServiceError::bad_request(
                "New password must be different from the current password",
            ));
        }

        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(Some(hash_password(&input.new_password)?));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        info!(%user_id, "Password changed");
        Ok(())
    }

    /// Issues a reset link when the account exists and is active.
    /// Unknown and inactive accounts also return `Ok`.
    #[instrument(skip(self, input))]
    pub async fn forgot_password(&self, input: ForgotPasswordInput) -> Result<(), ServiceError> {
        let Some(user) = self.find_by_email(&normalize_email(&input.email)).await? else {
            return Ok(());
        };
        if !user.is_active() {
            return Ok(());
        }

        let token = generate_reset_token();
        let expires_at = Utc::now() + self.reset_ttl;
        let user_id = user.id;
        let email = user.email.clone();

        let mut active: user::ActiveModel = user.into();
        active.reset_password_token_hash = Set(Some(sha256_hex(&token)));
        active.reset_password_expires = Set(Some(expires_at));
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        let link = format!(
            "{}/reset-password?token={}",
            self.frontend_url.trim_end_matches('/'),
            token
        );
        let mail = OutgoingMail {
            to: email,
            subject: "Reset your password".to_string(),
            body: format!(
                "Use the link below to choose a new password. It expires at {}.\n\n{}",
                expires_at.to_rfc3339(),
                link
            ),
        };
        if let Err(e) = self.mailer.send(mail).await {
            warn!(%user_id, error = %e, "Password reset email failed");
        }

        info!(%user_id, "Password reset requested");
        self.events
            .send_or_log(Event::PasswordResetRequested { user_id, expires_at });
        Ok(())
    }

    #[instrument(skip(self, input))]
    pub async fn reset_password(&self, input: ResetPasswordInput) -> Result<(), ServiceError> {
        let invalid = || ServiceError::bad_request("Invalid or expired reset token");

        let user = User::find_live()
            .filter(user::Column::ResetPasswordTokenHash.eq(sha256_hex(input.token.trim())))
            .one(&*self.db)
            .await?
            .ok_or_else(invalid)?;
        let still_valid = user
            .reset_password_expires
            .is_some_and(|expires| expires > Utc::now());
        if !still_valid {
            return Err(invalid());
        }

        let user_id = user.id;
        let mut active: user::ActiveModel = user.into();
        active.password_hash = Set(Some(hash_password(&input.new_password)?));
        active.reset_password_token_hash = Set(None);
        active.reset_password_expires = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        info!(%user_id, "Password reset completed");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, ServiceError> {
        User::find_live()
            .filter(user::Column::Email.eq(email))
            .one(&*self.db)
            .await
            .map_err(Into::into)
    }
}
