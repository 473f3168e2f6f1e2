use std::sync::Arc;

use chrono::Utc;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::entities::{user, AddressModel, SoftDelete, User, UserModel, UserRole, UserStatus};
use crate::errors::ServiceError;
use crate::services::addresses::list_for_user;
use crate::services::pagination::{Page, PageParams, PageQuery};
use crate::services::users::find_live_user;

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    /// Matches email, names or phone number
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

impl UserListQuery {
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page: self.page,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct AdminUpdateUserInput {
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminUserDetail {
    #[serde(flatten)]
    pub user: UserModel,
    pub addresses: Vec<AddressModel>,
}

/// Back-office account management.
#[derive(Clone)]
pub struct AdminUserService {
    db: Arc<DatabaseConnection>,
}

impl AdminUserService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Without a role filter, admin accounts are left out.
    #[instrument(skip(self))]
    pub async fn list_users(
        &self,
        filter: UserListQuery,
        params: PageParams,
    ) -> Result<Page<UserModel>, ServiceError> {
        let mut query = User::find_live();

        query = match filter.role {
            Some(role) => query.filter(user::Column::Role.eq(role)),
            None => query.filter(user::Column::Role.ne(UserRole::Admin)),
        };
        if let Some(status) = filter.status {
            query = query.filter(user::Column::Status.eq(status));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            query = query.filter(
                Condition::any()
                    .add(user::Column::Email.contains(search))
                    .add(user::Column::FirstName.contains(search))
                    .add(user::Column::LastName.contains(search))
                    .add(user::Column::PhoneNumber.contains(search)),
            );
        }

        let paginator = query
            .order_by_desc(user::Column::CreatedAt)
            .paginate(&*self.db, params.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(params.page - 1).await?;
        Ok(Page::new(items, total, params))
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: Uuid) -> Result<AdminUserDetail, ServiceError> {
        let user = find_live_user(&*self.db, id).await?;
        let addresses = list_for_user(&*self.db, id).await?;
        Ok(AdminUserDetail { user, addresses })
    }

    #[instrument(skip(self))]
    pub async fn update_user(
        &self,
        id: Uuid,
        input: AdminUpdateUserInput,
    ) -> Result<UserModel, ServiceError> {
        let existing = find_live_user(&*self.db, id).await?;

        let mut active: user::ActiveModel = existing.into();
        if let Some(role) = input.role {
            active.role = Set(role);
        }
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());

        let user = active.update(&*self.db).await?;
        info!(user_id = %id, role = %user.role, status = ?user.status, "User updated by admin");
        Ok(user)
    }
}
