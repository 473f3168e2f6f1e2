use std::sync::Arc;

use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::entities::{color, product_variant, Color, ColorModel, ProductVariant, SoftDelete};
use crate::errors::ServiceError;

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("hex color pattern compiles")
});

/// `#RGB` or `#RRGGBB`.
pub fn validate_hex_color(value: &str) -> Result<(), ValidationError> {
    if HEX_COLOR.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("hex_color");
        err.message = Some("Hex code must look like #RGB or #RRGGBB".into());
        Err(err)
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ColorInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(max = 7), custom = "validate_hex_color")]
    pub hex_code: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateColorInput {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(max = 7), custom = "validate_hex_color")]
    pub hex_code: Option<String>,
}

#[derive(Clone)]
pub struct ColorService {
    db: Arc<DatabaseConnection>,
}

impl ColorService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<ColorModel>, ServiceError> {
        Color::find_live()
            .order_by_asc(color::Column::Name)
            .all(&*self.db)
            .await
            .map_err(Into::into)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ColorModel, ServiceError> {
        Color::find_live_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("Color not found"))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, input: ColorInput) -> Result<ColorModel, ServiceError> {
        let name = input.name.trim().to_string();
        self.ensure_unique_name(&name, None).await?;

        let now = Utc::now();
        let model = color::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
            hex_code: Set(input.hex_code),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&*self.db)
        .await?;

        info!(color_id = %model.id, "Color created");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: Uuid, input: UpdateColorInput) -> Result<ColorModel, ServiceError> {
        let existing = self.get(id).await?;

        let mut active: color::ActiveModel = existing.into();
        if let Some(name) = input.name {
            let name = name.trim().to_string();
            self.ensure_unique_name(&name, Some(id)).await?;
            active.name = Set(name);
        }
        if let Some(hex_code) = input.hex_code {
            active.hex_code = Set(Some(hex_code));
        }
        active.updated_at = Set(Utc::now());

        let model = active.update(&*self.db).await?;
        info!(color_id = %id, "Color updated");
        Ok(model)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let in_use = ProductVariant::find_live()
            .filter(product_variant::Column::ColorId.eq(id))
            .count(&*self.db)
            .await?;
        if in_use > 0 {
            return Err(ServiceError::bad_request(
                "Cannot delete color that is in use by product variants",
            ));
        }

        let mut active: color::ActiveModel = existing.into();
        let now = Utc::now();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&*self.db).await?;

        info!(color_id = %id, "Color deleted");
        Ok(())
    }

    async fn ensure_unique_name(&self, name: &str, exclude: Option<Uuid>) -> Result<(), ServiceError> {
        let mut query = Color::find_live().filter(color::Column::Name.eq(name));
        if let Some(id) = exclude {
            query = query.filter(color::Column::Id.ne(id));
        }
        if query.one(&*self.db).await?.is_some() {
            return Err(ServiceError::bad_request("Color name already exists"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("#fff", true)]
    #[case("#A1B2C3", true)]
    #[case("#a1b2c3", true)]
    #[case("fff", false)]
    #[case("#ffff", false)]
    #[case("#GGGGGG", false)]
    #[case("#1234567", false)]
    fn hex_color_validation(#[case] value: &str, #[case] ok: bool) {
        assert_eq!(validate_hex_color(value).is_ok(), ok);
    }

    #[test]
    fn color_input_rejects_bad_hex() {
        let input = ColorInput {
            name: "Navy".into(),
            hex_code: Some("navy".into()),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("hex_code"));
    }
}
