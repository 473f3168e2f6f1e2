use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = r#"
# Storefront API

Catalog, promotions, coupons and customer accounts for a fashion storefront.

## Authentication

Protected endpoints expect a JWT obtained from `POST /api/v1/auth/login`:

```
Authorization: Bearer <your-jwt-token>
```

Catalog reads are public. Catalog writes need the `ADMIN` or `STAFF` role and
everything under `/api/v1/admin` needs `ADMIN`.

## Envelope

Successful responses are wrapped as
`{"success": true, "data": ..., "message": ..., "meta": {"request_id", "timestamp"}}`.
Failures use the error envelope:

```json
{
  "success": false,
  "error": "Bad Request",
  "message": "Validation failed: ...",
  "timestamp": "2025-01-01T00:00:00Z"
}
```

## Pagination

Paginated lists accept `page` (default 1) and `limit` (default 10, capped by
the server) and return `{items, total, page, limit, total_pages}`.
        "#,
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Auth", description = "Registration, login and password recovery"),
        (name = "Users", description = "Profile and email verification of the caller"),
        (name = "Addresses", description = "Address book of the caller"),
        (name = "Categories", description = "Category tree"),
        (name = "Colors", description = "Color catalog"),
        (name = "Sizes", description = "Size catalog"),
        (name = "Materials", description = "Material catalog"),
        (name = "Usages", description = "Usage tags for products"),
        (name = "Products", description = "Products and their listings"),
        (name = "Product Variants", description = "Color and size variants with stock"),
        (name = "Product Images", description = "Product gallery"),
        (name = "Promotions", description = "Running promotions"),
        (name = "Coupons", description = "Coupon validation and redemption"),
        (name = "Admin", description = "Administrative endpoints")
    ),
    paths(
        // Auth
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::change_password,
        crate::handlers::auth::forgot_password,
        crate::handlers::auth::reset_password,

        // Users
        crate::handlers::users::get_profile,
        crate::handlers::users::update_profile,
        crate::handlers::users::send_verification_otp,
        crate::handlers::users::verify_email,

        // Addresses
        crate::handlers::addresses::list_addresses,
        crate::handlers::addresses::create_address,
        crate::handlers::addresses::update_address,
        crate::handlers::addresses::delete_address,

        // Catalog
        crate::handlers::categories::category_tree,
        crate::handlers::categories::get_category,
        crate::handlers::categories::create_category,
        crate::handlers::categories::update_category,
        crate::handlers::categories::delete_category,
        crate::handlers::colors::list_colors,
        crate::handlers::colors::get_color,
        crate::handlers::colors::create_color,
        crate::handlers::colors::update_color,
        crate::handlers::colors::delete_color,
        crate::handlers::sizes::list_sizes,
        crate::handlers::sizes::get_size,
        crate::handlers::sizes::create_size,
        crate::handlers::sizes::update_size,
        crate::handlers::sizes::delete_size,
        crate::handlers::materials::list_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::create_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,
        crate::handlers::usages::list_usages,
        crate::handlers::usages::get_usage,
        crate::handlers::usages::create_usage,
        crate::handlers::usages::update_usage,
        crate::handlers::usages::delete_usage,

        // Products
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::products::product_promotions,
        crate::handlers::product_variants::list_variants,
        crate::handlers::product_variants::get_variant,
        crate::handlers::product_variants::create_variant,
        crate::handlers::product_variants::update_variant,
        crate::handlers::product_variants::delete_variant,
        crate::handlers::product_variants::update_stock,
        crate::handlers::product_images::list_images,
        crate::handlers::product_images::get_image,
        crate::handlers::product_images::create_image,
        crate::handlers::product_images::update_image,
        crate::handlers::product_images::delete_image,
        crate::handlers::product_images::set_thumbnail,
        crate::handlers::product_images::reorder_images,

        // Promotions
        crate::handlers::promotions::list_active_promotions,
        crate::handlers::promotions::get_promotion,
        crate::handlers::promotions::list_all_promotions,
        crate::handlers::promotions::create_promotion,
        crate::handlers::promotions::update_promotion,
        crate::handlers::promotions::delete_promotion,
        crate::handlers::promotions::add_promotion_products,
        crate::handlers::promotions::remove_promotion_product,

        // Coupons
        crate::handlers::coupons::validate_coupon,
        crate::handlers::coupons::apply_coupon,
        crate::handlers::coupons::list_coupons,
        crate::handlers::coupons::get_coupon,
        crate::handlers::coupons::create_coupon,
        crate::handlers::coupons::update_coupon,
        crate::handlers::coupons::delete_coupon,
        crate::handlers::coupons::coupon_usages,

        // Admin users
        crate::handlers::admin_users::list_users,
        crate::handlers::admin_users::get_user,
        crate::handlers::admin_users::update_user,
    ),
    components(
        schemas(
            crate::ApiResponse<serde_json::Value>,
            crate::ResponseMeta,
            crate::auth::AccessToken,
            crate::errors::ErrorResponse
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDocV1;

/// Registers the `bearer_auth` scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
