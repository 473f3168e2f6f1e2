mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{decimal, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};

fn promotion_body(name: &str, starts_in_days: i64, ends_in_days: i64) -> Value {
    let now = Utc::now();
    json!({
        "name": name,
        "discount_type": "percentage",
        "discount_value": "15",
        "start_date": (now + Duration::days(starts_in_days)).to_rfc3339(),
        "end_date": (now + Duration::days(ends_in_days)).to_rfc3339()
    })
}

async fn create_promotion(app: &TestApp, body: Value) -> String {
    let (status, json) = app
        .post("/api/v1/admin/promotions", body, Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create promotion: {json}");
    id_of(&json)
}

#[tokio::test]
async fn public_listing_only_shows_running_promotions() {
    let app = TestApp::new().await;
    let running = create_promotion(&app, promotion_body("Autumn Sale", -1, 7)).await;
    create_promotion(&app, promotion_body("Winter Sale", 30, 60)).await;
    create_promotion(&app, promotion_body("Past Sale", -30, -10)).await;
    let mut paused = promotion_body("Paused Sale", -1, 7);
    paused["is_active"] = json!(false);
    create_promotion(&app, paused).await;

    let (status, body) = app.get("/api/v1/promotions", None).await;
    assert_eq!(status, StatusCode::OK);
    let promotions = body["data"].as_array().unwrap();
    assert_eq!(promotions.len(), 1);
    assert_eq!(promotions[0]["id"], running.as_str());
    assert_eq!(decimal(&promotions[0]["discount_value"]), dec!(15));

    let (status, body) = app.get("/api/v1/admin/promotions", Some(app.admin_token())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 4);

    let (_, body) = app
        .get("/api/v1/admin/promotions?is_active=false", Some(app.admin_token()))
        .await;
    assert_eq!(body["data"]["total"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Paused Sale");
}

#[tokio::test]
async fn windows_and_discounts_are_checked() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/admin/promotions",
            promotion_body("Backwards", 5, 1),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Start date must be before end date");

    let mut too_much = promotion_body("Too generous", 0, 3);
    too_much["discount_value"] = json!("150");
    let (status, body) = app
        .post("/api/v1/admin/promotions", too_much, Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Percentage discount cannot exceed 100");

    let id = create_promotion(&app, promotion_body("Editable", 0, 3)).await;
    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/promotions/{id}"),
            json!({"end_date": (Utc::now() - Duration::days(10)).to_rfc3339()}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Start date must be before end date");

    let (status, body) = app
        .put(
            &format!("/api/v1/admin/promotions/{id}"),
            json!({"discount_type": "fixed_amount", "discount_value": "150"}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Promotion updated successfully");
    assert_eq!(body["data"]["discount_type"], "fixed_amount");
}

#[tokio::test]
async fn products_can_be_linked_and_unlinked() {
    let app = TestApp::new().await;
    let promotion = create_promotion(&app, promotion_body("Bundle", -1, 5)).await;
    let coat = app.seed_product("Coat", "150").await;
    let hat = app.seed_product("Hat", "20").await;
    let uri = format!("/api/v1/admin/promotions/{promotion}/products");

    let (status, body) = app
        .post(&uri, json!({"product_ids": [coat, hat, coat]}), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Products added to promotion");
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);

    // Re-adding is harmless.
    let (status, body) = app
        .post(&uri, json!({"product_ids": [hat]}), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"].as_array().unwrap().len(), 2);

    let (_, body) = app.get(&format!("/api/v1/products/{coat}/promotions"), None).await;
    assert_eq!(body["data"][0]["name"], "Bundle");

    let (status, body) = app
        .delete(&format!("{uri}/{coat}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product removed from promotion");

    let (status, body) = app
        .delete(&format!("{uri}/{coat}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found in promotion");

    let (_, body) = app.get(&format!("/api/v1/promotions/{promotion}"), None).await;
    assert_eq!(body["data"]["products"][0]["name"], "Hat");

    let (status, body) = app
        .post(
            &uri,
            json!({"product_ids": ["3a4b0f0e-1111-4c2d-8e9f-000000000001"]}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Some products not found");
}

#[tokio::test]
async fn deleted_promotions_disappear() {
    let app = TestApp::new().await;
    let id = create_promotion(&app, promotion_body("Flash", -1, 1)).await;

    let (status, body) = app
        .delete(&format!("/api/v1/admin/promotions/{id}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Promotion deleted successfully");

    let (status, body) = app.get(&format!("/api/v1/promotions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Promotion not found");

    let (_, body) = app.get("/api/v1/promotions", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}
