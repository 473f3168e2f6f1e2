mod common;

use axum::http::StatusCode;
use common::{decimal, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

async fn create_product(app: &TestApp, body: Value) -> String {
    let (status, json) = app
        .post("/api/v1/products", body, Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create product: {json}");
    id_of(&json)
}

#[tokio::test]
async fn create_returns_full_detail() {
    let app = TestApp::new().await;
    let category = app.seed_category("Dresses", "dresses", None).await;

    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "  Summer Dress ",
                "description": "Light linen",
                "base_price": "59.50",
                "category_id": category,
                "gender": "FEMALE",
                "age_group": "ADULT"
            }),
            Some(app.staff_token()),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product created successfully");
    let data = &body["data"];
    assert_eq!(data["name"], "Summer Dress");
    assert_eq!(decimal(&data["base_price"]), dec!(59.50));
    assert_eq!(data["gender"], "FEMALE");
    assert_eq!(data["category"]["slug"], "dresses");
    assert!(data["variants"].as_array().unwrap().is_empty());
    assert!(data["images"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn missing_references_are_reported() {
    let app = TestApp::new().await;
    let category = app.seed_category("Bags", "bags", None).await;

    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Tote",
                "base_price": "30",
                "category_id": "0b9f3a3e-8d0e-4f0f-9c55-2a9a5c6b7d10"
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Category not found");

    let (status, body) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Tote",
                "base_price": "30",
                "category_id": category,
                "usage_ids": ["0b9f3a3e-8d0e-4f0f-9c55-2a9a5c6b7d10"]
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Some usages not found");
}

#[tokio::test]
async fn negative_prices_fail_validation() {
    let app = TestApp::new().await;
    let category = app.seed_category("Hats", "hats", None).await;

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({"name": "Cap", "base_price": "-1", "category_id": category}),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_filters_sorts_and_paginates() {
    let app = TestApp::new().await;
    let tops = app.seed_category("Tops", "tops", None).await;
    let bottoms = app.seed_category("Bottoms", "bottoms", None).await;

    for (name, price, category, gender) in [
        ("Basic Tee", "15", &tops, "UNISEX"),
        ("Silk Blouse", "80", &tops, "FEMALE"),
        ("Chino", "55", &bottoms, "MALE"),
        ("Jeans", "65", &bottoms, "UNISEX"),
    ] {
        create_product(
            &app,
            json!({
                "name": name,
                "base_price": price,
                "category_id": category,
                "gender": gender,
                "age_group": "ADULT"
            }),
        )
        .await;
    }

    let (status, body) = app
        .get(&format!("/api/v1/products?category_id={tops}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);

    let (_, body) = app
        .get("/api/v1/products?min_price=50&max_price=70&sort_by=base_price&sort_order=ASC", None)
        .await;
    let names: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Chino", "Jeans"]);

    let (_, body) = app.get("/api/v1/products?gender=FEMALE", None).await;
    assert_eq!(body["data"]["items"][0]["name"], "Silk Blouse");
    assert_eq!(body["data"]["items"][0]["category"]["slug"], "tops");

    let (_, body) = app.get("/api/v1/products?name=blouse", None).await;
    assert_eq!(body["data"]["total"], 1);

    let (_, body) = app
        .get("/api/v1/products?sort_by=name&sort_order=asc&limit=3&page=2", None)
        .await;
    assert_eq!(body["data"]["total"], 4);
    assert_eq!(body["data"]["page"], 2);
    assert_eq!(body["data"]["total_pages"], 2);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["name"], "Silk Blouse");
}

#[tokio::test]
async fn update_replaces_usages_and_clears_material() {
    let app = TestApp::new().await;
    let category = app.seed_category("Sport", "sport", None).await;

    let (_, body) = app
        .post("/api/v1/materials", json!({"name": "Polyester"}), Some(app.admin_token()))
        .await;
    let material = id_of(&body);
    let (_, body) = app
        .post("/api/v1/usages", json!({"name": "Gym"}), Some(app.admin_token()))
        .await;
    let gym = id_of(&body);
    let (_, body) = app
        .post("/api/v1/usages", json!({"name": "Yoga"}), Some(app.admin_token()))
        .await;
    let yoga = id_of(&body);

    let product = create_product(
        &app,
        json!({
            "name": "Leggings",
            "base_price": "40",
            "category_id": category,
            "material_id": material,
            "usage_ids": [gym, gym]
        }),
    )
    .await;

    let (_, body) = app.get(&format!("/api/v1/products/{product}"), None).await;
    assert_eq!(body["data"]["usages"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["material"]["name"], "Polyester");

    let (status, body) = app
        .patch(
            &format!("/api/v1/products/{product}"),
            json!({"material_id": null, "usage_ids": [yoga], "base_price": "35.5"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product updated successfully");
    assert!(body["data"]["material"].is_null());
    assert_eq!(body["data"]["usages"][0]["name"], "Yoga");
    assert_eq!(decimal(&body["data"]["base_price"]), dec!(35.5));
}

#[tokio::test]
async fn deleted_products_are_hidden() {
    let app = TestApp::new().await;
    let product = app.seed_product("Scarf", "12").await;

    let (status, _) = app
        .delete(&format!("/api/v1/products/{product}"), Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .delete(&format!("/api/v1/products/{product}"), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, body) = app.get(&format!("/api/v1/products/{product}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (_, body) = app.get("/api/v1/products", None).await;
    assert_eq!(body["data"]["total"], 0);
}

#[tokio::test]
async fn variants_enforce_unique_combinations_and_skus() {
    let app = TestApp::new().await;
    let product = app.seed_product("Hoodie", "49").await;
    let red = app.seed_color("Red", "#FF0000").await;
    let blue = app.seed_color("Blue", "#0000FF").await;
    let m = app.seed_size("M", "clothing").await;
    let uri = format!("/api/v1/products/{product}/variants");

    let (status, body) = app
        .post(
            &uri,
            json!({"color_id": red, "size_id": m, "sku": "HOOD-RED-M", "price": "49", "stock_quantity": 3}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Product variant created successfully");
    assert_eq!(body["data"]["color"]["name"], "Red");
    assert_eq!(body["data"]["size"]["name"], "M");

    let (status, body) = app
        .post(
            &uri,
            json!({"color_id": red, "size_id": m, "sku": "HOOD-RED-M-2"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Variant with this color and size already exists");

    let (status, body) = app
        .post(
            &uri,
            json!({"color_id": blue, "size_id": m, "sku": "HOOD-RED-M"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "SKU already exists");

    let (status, body) = app
        .post(
            &uri,
            json!({"color_id": blue, "size_id": m, "sku": "HOOD-BLU-M"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["stock_quantity"], 0);
    assert_eq!(body["data"]["is_active"], true);

    let (_, body) = app.get(&uri, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (_, body) = app.get(&format!("/api/v1/products/{product}"), None).await;
    assert_eq!(body["data"]["variants"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn variant_detail_carries_the_product() {
    let app = TestApp::new().await;
    let product = app.seed_product("Beanie", "18").await;
    let other = app.seed_product("Mittens", "14").await;
    let color = app.seed_color("Grey", "#808080").await;
    let size = app.seed_size("One Size", "accessory").await;

    let (_, body) = app
        .post(
            &format!("/api/v1/products/{product}/variants"),
            json!({"color_id": color, "size_id": size, "sku": "BEANIE-GRY"}),
            Some(app.admin_token()),
        )
        .await;
    let variant = id_of(&body);

    let (status, body) = app
        .get(&format!("/api/v1/products/{product}/variants/{variant}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["product"]["name"], "Beanie");

    // A variant is only reachable through its own product.
    let (status, body) = app
        .get(&format!("/api/v1/products/{other}/variants/{variant}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Variant not found");
}

#[tokio::test]
async fn stock_operations_never_go_negative() {
    let app = TestApp::new().await;
    let product = app.seed_product("Socks", "5").await;
    let color = app.seed_color("White", "#FFFFFF").await;
    let size = app.seed_size("L", "clothing").await;

    let (_, body) = app
        .post(
            &format!("/api/v1/products/{product}/variants"),
            json!({"color_id": color, "size_id": size, "sku": "SOCK-WHT-L", "stock_quantity": 10}),
            Some(app.admin_token()),
        )
        .await;
    let variant = id_of(&body);
    let stock_uri = format!("/api/v1/products/{product}/variants/{variant}/stock");

    let (status, body) = app
        .patch(&stock_uri, json!({"quantity": 5, "operation": "add"}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock updated successfully");
    assert_eq!(body["data"]["stock_quantity"], 15);

    let (_, body) = app
        .patch(&stock_uri, json!({"quantity": 4, "operation": "subtract"}), Some(app.staff_token()))
        .await;
    assert_eq!(body["data"]["stock_quantity"], 11);

    let (status, body) = app
        .patch(&stock_uri, json!({"quantity": 12, "operation": "subtract"}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient stock");

    // Operation defaults to set.
    let (_, body) = app
        .patch(&stock_uri, json!({"quantity": 2}), Some(app.staff_token()))
        .await;
    assert_eq!(body["data"]["stock_quantity"], 2);

    let (status, _) = app
        .patch(&stock_uri, json!({"quantity": -3}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = app
        .patch(
            &stock_uri,
            json!({"quantity": i32::MAX, "operation": "add"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["message"], "Stock quantity exceeds the maximum");

    let (_, body) = app.get(&format!("/api/v1/products/{product}/variants/{variant}"), None).await;
    assert_eq!(body["data"]["stock_quantity"], 2);
}

#[tokio::test]
async fn variants_of_deleted_products_are_frozen() {
    let app = TestApp::new().await;
    let product = app.seed_product("Scarf", "30").await;
    let color = app.seed_color("Grey", "#808080").await;
    let size = app.seed_size("OS", "accessory").await;
    let uri = format!("/api/v1/products/{product}/variants");

    let (_, created) = app
        .post(
            &uri,
            json!({"color_id": color, "size_id": size, "sku": "SCARF-GRY-OS", "stock_quantity": 4}),
            Some(app.admin_token()),
        )
        .await;
    let variant = id_of(&created);

    let (status, _) = app
        .delete(&format!("/api/v1/products/{product}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .patch(
            &format!("{uri}/{variant}/stock"),
            json!({"quantity": 1, "operation": "subtract"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, body) = app
        .patch(&format!("{uri}/{variant}"), json!({"price": "10"}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, _) = app
        .delete(&format!("{uri}/{variant}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_variants_free_their_sku() {
    let app = TestApp::new().await;
    let product = app.seed_product("Belt", "25").await;
    let color = app.seed_color("Brown", "#8B4513").await;
    let size = app.seed_size("90", "accessory").await;
    let uri = format!("/api/v1/products/{product}/variants");
    let body = json!({"color_id": color, "size_id": size, "sku": "BELT-BRN-90"});

    let (_, created) = app.post(&uri, body.clone(), Some(app.admin_token())).await;
    let variant = id_of(&created);

    let (status, deleted) = app
        .delete(&format!("{uri}/{variant}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["message"], "Product variant deleted successfully");

    let (status, _) = app.post(&uri, body, Some(app.admin_token())).await;
    assert_eq!(status, StatusCode::CREATED);
}
