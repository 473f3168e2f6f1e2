//! Colors, sizes, materials and usages.

mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp};
use rstest::rstest;
use serde_json::json;

#[tokio::test]
async fn color_lifecycle() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/colors",
            json!({"name": "Navy", "hex_code": "#000080"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Color created successfully");
    let id = id_of(&body);

    let (status, body) = app
        .patch(
            &format!("/api/v1/colors/{id}"),
            json!({"hex_code": "#001"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["hex_code"], "#001");
    assert_eq!(body["data"]["name"], "Navy");

    let (status, body) = app.get("/api/v1/colors", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // Staff may edit but only admins delete.
    let (status, _) = app
        .delete(&format!("/api/v1/colors/{id}"), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .delete(&format!("/api/v1/colors/{id}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Color deleted successfully");

    let (status, body) = app.get(&format!("/api/v1/colors/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Color not found");
}

#[tokio::test]
async fn duplicate_color_names_are_rejected() {
    let app = TestApp::new().await;
    app.seed_color("Red", "#FF0000").await;

    let (status, body) = app
        .post(
            "/api/v1/colors",
            json!({"name": "Red", "hex_code": "#EE0000"}),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Color name already exists");
}

#[rstest]
#[case("FF0000")]
#[case("#FF00")]
#[case("#XYZXYZ")]
#[tokio::test]
async fn malformed_hex_codes_fail_validation(#[case] hex: &str) {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/colors",
            json!({"name": "Odd", "hex_code": hex}),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Validation failed"));
}

#[tokio::test]
async fn colors_used_by_variants_cannot_be_deleted() {
    let app = TestApp::new().await;
    let color = app.seed_color("Black", "#000000").await;
    let size = app.seed_size("M", "clothing").await;
    let product = app.seed_product("Tee", "19.99").await;

    let (status, body) = app
        .post(
            &format!("/api/v1/products/{product}/variants"),
            json!({
                "color_id": color,
                "size_id": size,
                "sku": "TEE-BLK-M",
                "price": "19.99",
                "stock_quantity": 5
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app
        .delete(&format!("/api/v1/colors/{color}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot delete color that is in use by product variants"
    );

    let (status, body) = app
        .delete(&format!("/api/v1/sizes/{size}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Cannot delete size that is in use by product variants"
    );
}

#[tokio::test]
async fn sizes_are_unique_per_type_and_filterable() {
    let app = TestApp::new().await;
    app.seed_size("M", "clothing").await;
    app.seed_size("M", "accessory").await;
    app.seed_size("42", "footwear").await;

    let (status, body) = app
        .post(
            "/api/v1/sizes",
            json!({"name": "M", "type": "clothing"}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Size with this name and type already exists");

    let (status, body) = app.get("/api/v1/sizes?type=footwear", None).await;
    assert_eq!(status, StatusCode::OK);
    let sizes = body["data"].as_array().unwrap();
    assert_eq!(sizes.len(), 1);
    assert_eq!(sizes[0]["name"], "42");
    assert_eq!(sizes[0]["type"], "footwear");

    let (_, body) = app.get("/api/v1/sizes", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn material_detail_lists_its_products() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/materials",
            json!({"name": "Cotton", "description": "Breathable"}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let material = id_of(&body);

    let category = app.seed_category("Shirts", "shirts", None).await;
    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Oxford Shirt",
                "base_price": "45.00",
                "category_id": category,
                "material_id": material,
                "gender": "MALE",
                "age_group": "ADULT"
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app.get(&format!("/api/v1/materials/{material}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Cotton");
    assert_eq!(body["data"]["products"][0]["name"], "Oxford Shirt");

    let (status, body) = app
        .delete(&format!("/api/v1/materials/{material}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete material that is in use by products");
}

#[tokio::test]
async fn usages_linked_to_products_are_protected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/usages",
            json!({"name": "Running"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let usage = id_of(&body);

    let category = app.seed_category("Shoes", "shoes", None).await;
    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Trail Runner",
                "base_price": "120",
                "category_id": category,
                "gender": "UNISEX",
                "age_group": "ADULT",
                "usage_ids": [usage]
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let (status, body) = app.get(&format!("/api/v1/usages/{usage}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"][0]["name"], "Trail Runner");

    let (status, body) = app
        .delete(&format!("/api/v1/usages/{usage}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete usage that is linked to products");
}

#[tokio::test]
async fn unique_index_violation_maps_to_conflict() {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};
    use storefront_api::{entities::color, errors::ServiceError};
    use uuid::Uuid;

    let app = TestApp::new().await;
    app.seed_color("Teal", "#008080").await;

    // Bypasses the service check, as a concurrent writer would.
    let now = Utc::now();
    let err = color::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set("Teal".to_string()),
        hex_code: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(&*app.state.db)
    .await
    .unwrap_err();

    let err = ServiceError::from(err);
    assert_matches!(err, ServiceError::Conflict(ref msg) if msg == "Resource already exists");
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
}
