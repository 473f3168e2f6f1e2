//! Storefront entities.
//!
//! Every domain table except the two join tables is soft-deletable; reads go
//! through [`SoftDelete::find_live`] so rows with `deleted_at` set never leak.

use sea_orm::{ColumnTrait, EntityTrait, PrimaryKeyTrait, QueryFilter, Select};
use uuid::Uuid;

pub mod address;
pub mod category;
pub mod color;
pub mod coupon;
pub mod coupon_usage;
pub mod material;
pub mod product;
pub mod product_image;
pub mod product_usage;
pub mod product_variant;
pub mod promotion;
pub mod promotion_product;
pub mod size;
pub mod usage;
pub mod user;

pub use address::{Entity as Address, Model as AddressModel};
pub use category::{Entity as Category, Model as CategoryModel};
pub use color::{Entity as Color, Model as ColorModel};
pub use coupon::{DiscountType, Entity as Coupon, Model as CouponModel};
pub use coupon_usage::{Entity as CouponUsage, Model as CouponUsageModel};
pub use material::{Entity as Material, Model as MaterialModel};
pub use product::{AgeGroup, Entity as Product, Model as ProductModel, ProductGender};
pub use product_image::{Entity as ProductImage, Model as ProductImageModel};
pub use product_usage::Entity as ProductUsage;
pub use product_variant::{Entity as ProductVariant, Model as ProductVariantModel};
pub use promotion::{Entity as Promotion, Model as PromotionModel};
pub use promotion_product::Entity as PromotionProduct;
pub use size::{Entity as Size, Model as SizeModel, SizeType};
pub use usage::{Entity as Usage, Model as UsageModel};
pub use user::{Entity as User, Model as UserModel, TierLevel, UserGender, UserRole, UserStatus};

/// Query helpers for tables carrying a nullable `deleted_at` marker.
pub trait SoftDelete: EntityTrait {
    fn deleted_at_column() -> Self::Column;

    /// `SELECT ... WHERE deleted_at IS NULL`
    fn find_live() -> Select<Self> {
        Self::find().filter(Self::deleted_at_column().is_null())
    }

    fn find_live_by_id(id: Uuid) -> Select<Self>
    where
        <Self::PrimaryKey as PrimaryKeyTrait>::ValueType: From<Uuid>,
    {
        Self::find_by_id(id).filter(Self::deleted_at_column().is_null())
    }
}
