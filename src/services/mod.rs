//! Business logic. Each service owns a shared connection pool and returns
//! plain models or projections; HTTP concerns stay in `handlers`.

pub mod accounts;
pub mod addresses;
pub mod admin_users;
pub mod catalog_import;
pub mod categories;
pub mod colors;
pub mod coupons;
pub mod mailer;
pub mod materials;
pub mod pagination;
pub mod pricing;
pub mod product_images;
pub mod product_variants;
pub mod products;
pub mod promotions;
pub mod sizes;
pub mod summaries;
pub mod usages;
pub mod users;

use serde::{Deserialize, Deserializer};

pub use pagination::{Page, PageParams, PageQuery};

/// Distinguishes an absent field (`None`) from an explicit `null` (`Some(None)`).
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trims surrounding whitespace before field validation runs.
pub fn trimmed<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.trim().to_string())
}

/// Trims and drops empty strings.
pub(crate) fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
