pub mod addresses;
pub mod admin_users;
pub mod auth;
pub mod categories;
pub mod colors;
pub mod common;
pub mod coupons;
pub mod materials;
pub mod product_images;
pub mod product_variants;
pub mod products;
pub mod promotions;
pub mod sizes;
pub mod usages;
pub mod users;

use std::sync::Arc;

use chrono::Duration;

use crate::auth::AuthService;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::entities::UserRole;
use crate::events::EventSender;
use crate::services::{
    accounts::AccountService, addresses::AddressService, admin_users::AdminUserService,
    categories::CategoryService, colors::ColorService, coupons::CouponService,
    mailer::Mailer, materials::MaterialService, product_images::ProductImageService,
    product_variants::ProductVariantService, products::ProductService,
    promotions::PromotionService, sizes::SizeService, usages::UsageService, users::UserService,
};

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Roles allowed to create and edit catalog entries.
pub(crate) const CATALOG_EDITORS: &[UserRole] = &[UserRole::Admin, UserRole::Staff];
pub(crate) const ADMIN_ONLY: &[UserRole] = &[UserRole::Admin];

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub accounts: Arc<AccountService>,
    pub users: Arc<UserService>,
    pub admin_users: Arc<AdminUserService>,
    pub addresses: Arc<AddressService>,
    pub categories: Arc<CategoryService>,
    pub colors: Arc<ColorService>,
    pub sizes: Arc<SizeService>,
    pub materials: Arc<MaterialService>,
    pub usages: Arc<UsageService>,
    pub products: Arc<ProductService>,
    pub variants: Arc<ProductVariantService>,
    pub images: Arc<ProductImageService>,
    pub promotions: Arc<PromotionService>,
    pub coupons: Arc<CouponService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        auth_service: Arc<AuthService>,
        mailer: Arc<dyn Mailer>,
        config: &AppConfig,
    ) -> Self {
        let reset_ttl = Duration::seconds(config.password_reset_ttl_secs as i64);
        let verification_ttl = Duration::seconds(config.verification_code_ttl_secs as i64);

        Self {
            accounts: Arc::new(AccountService::new(
                db_pool.clone(),
                auth_service,
                mailer.clone(),
                event_sender.clone(),
                config.frontend_url.clone(),
                reset_ttl,
            )),
            users: Arc::new(UserService::new(db_pool.clone(), mailer, verification_ttl)),
            admin_users: Arc::new(AdminUserService::new(db_pool.clone())),
            addresses: Arc::new(AddressService::new(db_pool.clone())),
            categories: Arc::new(CategoryService::new(db_pool.clone())),
            colors: Arc::new(ColorService::new(db_pool.clone())),
            sizes: Arc::new(SizeService::new(db_pool.clone())),
            materials: Arc::new(MaterialService::new(db_pool.clone())),
            usages: Arc::new(UsageService::new(db_pool.clone())),
            products: Arc::new(ProductService::new(db_pool.clone(), event_sender.clone())),
            variants: Arc::new(ProductVariantService::new(
                db_pool.clone(),
                event_sender.clone(),
            )),
            images: Arc::new(ProductImageService::new(db_pool.clone())),
            promotions: Arc::new(PromotionService::new(db_pool.clone())),
            coupons: Arc::new(CouponService::new(db_pool, event_sender)),
        }
    }
}
