mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{decimal, id_of, TestApp};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use storefront_api::entities::UserRole;

fn coupon_body(code: &str) -> Value {
    let now = Utc::now();
    json!({
        "code": code,
        "description": "Welcome offer",
        "discount_type": "percentage",
        "discount_value": "20",
        "max_discount_amount": "30",
        "min_order_value": "50",
        "start_date": (now - Duration::days(1)).to_rfc3339(),
        "end_date": (now + Duration::days(30)).to_rfc3339()
    })
}

async fn create_coupon(app: &TestApp, body: Value) -> String {
    let (status, json) = app
        .post("/api/v1/admin/coupons", body, Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::CREATED, "create coupon: {json}");
    id_of(&json)
}

#[tokio::test]
async fn codes_are_normalized_and_unique() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/v1/admin/coupons", coupon_body(" welcome20 "), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["code"], "WELCOME20");
    assert_eq!(body["data"]["usage_count"], 0);
    assert_eq!(body["data"]["per_user_limit"], 1);

    let (status, body) = app
        .post("/api/v1/admin/coupons", coupon_body("Welcome20"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Coupon code already exists");

    let (_, body) = app
        .get("/api/v1/admin/coupons?code=come", Some(app.admin_token()))
        .await;
    assert_eq!(body["data"]["total"], 1);
}

#[tokio::test]
async fn validate_prices_the_discount_anonymously() {
    let app = TestApp::new().await;
    create_coupon(&app, coupon_body("SAVE20")).await;

    let (status, body) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "save20", "order_value": "100"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon is valid");
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["coupon"]["code"], "SAVE20");
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(20));
    assert_eq!(decimal(&body["data"]["final_amount"]), dec!(80));

    // The percentage is capped by max_discount_amount.
    let (_, body) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "SAVE20", "order_value": "400"}),
            None,
        )
        .await;
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(30));
    assert_eq!(decimal(&body["data"]["final_amount"]), dec!(370));

    let (status, body) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "SAVE20", "order_value": "10"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("Minimum order value is"));

    let (status, body) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "NOPE", "order_value": "100"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Coupon not found");
}

#[tokio::test]
async fn coupon_dates_and_status_gate_redemption() {
    let app = TestApp::new().await;
    let now = Utc::now();

    let mut future = coupon_body("LATER");
    future["start_date"] = json!((now + Duration::days(2)).to_rfc3339());
    future["end_date"] = json!((now + Duration::days(5)).to_rfc3339());
    create_coupon(&app, future).await;

    let mut expired = coupon_body("GONE");
    expired["start_date"] = json!((now - Duration::days(10)).to_rfc3339());
    expired["end_date"] = json!((now - Duration::days(1)).to_rfc3339());
    create_coupon(&app, expired).await;

    let mut disabled = coupon_body("OFF");
    disabled["is_active"] = json!(false);
    create_coupon(&app, disabled).await;

    for (code, message) in [
        ("LATER", "Coupon is not yet active"),
        ("GONE", "Coupon has expired"),
        ("OFF", "Coupon is not active"),
    ] {
        let (status, body) = app
            .post(
                "/api/v1/coupons/validate",
                json!({"code": code, "order_value": "100"}),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{code}");
        assert_eq!(body["message"], message, "{code}");
    }
}

#[tokio::test]
async fn apply_requires_a_session_and_respects_limits() {
    let app = TestApp::new().await;
    let mut body = coupon_body("ONCE");
    body["usage_limit"] = json!(2);
    body["per_user_limit"] = json!(1);
    body["discount_type"] = json!("fixed_amount");
    body["discount_value"] = json!("15");
    let coupon = create_coupon(&app, body).await;
    let apply = json!({"code": "ONCE", "order_value": "60"});

    let (status, _) = app.post("/api/v1/coupons/apply", apply.clone(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .post("/api/v1/coupons/apply", apply.clone(), Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon applied successfully");
    assert_eq!(decimal(&body["data"]["discount_amount"]), dec!(15));
    assert_eq!(decimal(&body["data"]["final_amount"]), dec!(45));

    // Same shopper again: per-user limit.
    let (status, body) = app
        .post("/api/v1/coupons/apply", apply.clone(), Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "You have reached the usage limit for this coupon");

    // Validation with a token sees the per-user limit too.
    let (status, _) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "ONCE", "order_value": "60"}),
            Some(app.customer_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let second = app.create_user("second@example.com", UserRole::Customer).await;
    let (status, _) = app
        .post("/api/v1/coupons/apply", apply.clone(), Some(&second.token))
        .await;
    assert_eq!(status, StatusCode::OK);

    let third = app.create_user("third@example.com", UserRole::Customer).await;
    let (status, body) = app
        .post("/api/v1/coupons/apply", apply, Some(&third.token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Coupon usage limit reached");

    let (_, body) = app
        .get(&format!("/api/v1/admin/coupons/{coupon}"), Some(app.admin_token()))
        .await;
    assert_eq!(body["data"]["usage_count"], 2);

    let (status, body) = app
        .get(&format!("/api/v1/admin/coupons/{coupon}/usages"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 2);
    let emails: Vec<&str> = body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["user"]["email"].as_str().unwrap())
        .collect();
    assert!(emails.contains(&"customer@example.com"));
    assert!(emails.contains(&"second@example.com"));
}

#[tokio::test]
async fn admin_can_update_and_delete_coupons() {
    let app = TestApp::new().await;
    let id = create_coupon(&app, coupon_body("EDIT")).await;

    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/coupons/{id}"),
            json!({"max_discount_amount": null, "code": "edited"}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon updated successfully");
    assert_eq!(body["data"]["code"], "EDITED");
    assert!(body["data"]["max_discount_amount"].is_null());

    let (status, body) = app
        .patch(
            &format!("/api/v1/admin/coupons/{id}"),
            json!({"discount_value": "101"}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Percentage discount cannot exceed 100");

    let (status, body) = app
        .delete(&format!("/api/v1/admin/coupons/{id}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Coupon deleted successfully");

    let (status, _) = app
        .post(
            "/api/v1/coupons/validate",
            json!({"code": "EDITED", "order_value": "100"}),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
