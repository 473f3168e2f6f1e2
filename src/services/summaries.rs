//! Small projections of related rows embedded in detail responses.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::{
    AgeGroup, CategoryModel, MaterialModel, ProductGender, ProductModel, UserModel,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<&CategoryModel> for CategorySummary {
    fn from(c: &CategoryModel) -> Self {
        Self {
            id: c.id,
            name: c.name.clone(),
            slug: c.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MaterialSummary {
    pub id: Uuid,
    pub name: String,
}

impl From<&MaterialModel> for MaterialSummary {
    fn from(m: &MaterialModel) -> Self {
        Self {
            id: m.id,
            name: m.name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProductSummary {
    pub id: Uuid,
    pub name: String,
    pub base_price: Decimal,
    pub gender: ProductGender,
    pub age_group: AgeGroup,
}

impl From<&ProductModel> for ProductSummary {
    fn from(p: &ProductModel) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            base_price: p.base_price,
            gender: p.gender,
            age_group: p.age_group,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<&UserModel> for UserSummary {
    fn from(u: &UserModel) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}
