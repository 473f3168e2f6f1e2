use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, QueryFilter, Set,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::generate_otp;
use crate::entities::{user, SoftDelete, User, UserGender, UserModel};
use crate::errors::ServiceError;
use crate::services::clean_optional;
use crate::services::mailer::{Mailer, OutgoingMail};

pub const ALREADY_VERIFIED: &str = "Email is already verified";
pub const VERIFIED: &str = "Email verified successfully";

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 50))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub last_name: Option<String>,
    #[validate(length(min = 8, max = 15))]
    pub phone_number: Option<String>,
    pub gender: Option<UserGender>,
    pub date_of_birth: Option<NaiveDate>,
    #[validate(url)]
    pub avatar_url: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub preferences: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyEmailInput {
    #[validate(length(equal = 6))]
    pub otp: String,
}

pub(crate) async fn find_live_user<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> Result<UserModel, ServiceError> {
    User::find_live_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("User not found"))
}

/// Fails with 409 when another live account already holds `phone`.
pub(crate) async fn ensure_phone_available<C: ConnectionTrait>(
    conn: &C,
    phone: &str,
    exclude: Option<Uuid>,
) -> Result<(), ServiceError> {
    let mut query = User::find_live().filter(user::Column::PhoneNumber.eq(phone));
    if let Some(id) = exclude {
        query = query.filter(user::Column::Id.ne(id));
    }
    if query.one(conn).await?.is_some() {
        return Err(ServiceError::Conflict("Phone number already in use".to_string()));
    }
    Ok(())
}

/// Self-service profile and email verification.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    mailer: Arc<dyn Mailer>,
    verification_ttl: Duration,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, mailer: Arc<dyn Mailer>, verification_ttl: Duration) -> Self {
        Self {
            db,
            mailer,
            verification_ttl,
        }
    }

    #[instrument(skip(self))]
    pub async fn get_profile(&self, user_id: Uuid) -> Result<UserModel, ServiceError> {
        find_live_user(&*self.db, user_id).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        input: UpdateProfileInput,
    ) -> Result<UserModel, ServiceError> {
        let existing = find_live_user(&*self.db, user_id).await?;

        let phone_number = input.phone_number.map(|p| p.trim().to_string());
        if let Some(phone) = phone_number.as_deref() {
            if existing.phone_number.as_deref() != Some(phone) {
                ensure_phone_available(&*self.db, phone, Some(user_id)).await?;
            }
        }

        let mut active: user::ActiveModel = existing.into();
        if let Some(first_name) = input.first_name {
            active.first_name = Set(clean_optional(Some(first_name)));
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(clean_optional(Some(last_name)));
        }
        if let Some(phone) = phone_number {
            active.phone_number = Set(Some(phone));
        }
        if let Some(gender) = input.gender {
            active.gender = Set(Some(gender));
        }
        if let Some(date_of_birth) = input.date_of_birth {
            active.date_of_birth = Set(Some(date_of_birth));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(Some(avatar_url));
        }
        if let Some(preferences) = input.preferences {
            active.preferences = Set(Some(preferences));
        }
        active.updated_at = Set(Utc::now());

        let user = active.update(&*self.db).await?;
        info!(%user_id, "Profile updated");
        Ok(user)
    }

    /// Stores a fresh six-digit code and mails it. A delivery failure
    /// clears the stored code again.
    #[instrument(skip(self))]
    pub async fn send_verification_otp(&self, user_id: Uuid) -> Result<(), ServiceError> {
        let user = find_live_user(&*self.db, user_id).await?;
        if user.is_email_verified {
            return Err(ServiceError::bad_request(ALREADY_VERIFIED));
        }

        let otp = generate_otp();
        let expires_at = Utc::now() + self.verification_ttl;
        let email = user.email.clone();

        let mut active: user::ActiveModel = user.into();
        active.email_verification_token = Set(Some(otp.clone()));
        active.email_verification_expires = Set(Some(expires_at));
        let user = active.update(&*self.db).await?;

        let mail = OutgoingMail {
            to: email,
            subject: "Your verification code".to_string(),
            body: format!(
                "Your verification code is {otp}. It expires in {} minutes.",
                self.verification_ttl.num_minutes()
            ),
        };
        if let Err(e) = self.mailer.send(mail).await {
            error!(%user_id, error = %e, "Verification email failed");
            let mut active: user::ActiveModel = user.into();
            active.email_verification_token = Set(None);
            active.email_verification_expires = Set(None);
            active.update(&*self.db).await?;
            return Err(ServiceError::InternalError(
                "Failed to send verification email".to_string(),
            ));
        }

        info!(%user_id, "Verification code sent");
        Ok(())
    }

    /// Returns the message to show the caller.
    #[instrument(skip(self, input))]
    pub async fn verify_email(
        &self,
        user_id: Uuid,
        input: VerifyEmailInput,
    ) -> Result<&'static str, ServiceError> {
        let user = find_live_user(&*self.db, user_id).await?;
        if user.is_email_verified {
            return Ok(ALREADY_VERIFIED);
        }

        if user.email_verification_token.as_deref() != Some(input.otp.trim()) {
            warn!(%user_id, "Verification code mismatch");
            return Err(ServiceError::bad_request("Invalid verification code"));
        }
        let expired = user
            .email_verification_expires
            .map_or(true, |expires| expires < Utc::now());
        if expired {
            return Err(ServiceError::bad_request("Verification code has expired"));
        }

        let mut active: user::ActiveModel = user.into();
        active.is_email_verified = Set(true);
        active.email_verification_token = Set(None);
        active.email_verification_expires = Set(None);
        active.updated_at = Set(Utc::now());
        active.update(&*self.db).await?;

        info!(%user_id, "Email verified");
        Ok(VERIFIED)
    }
}
