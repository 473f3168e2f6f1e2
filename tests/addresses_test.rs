mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp};
use serde_json::{json, Value};

fn address(recipient: &str) -> Value {
    json!({
        "recipient_name": recipient,
        "phone_number": "0901234567",
        "street_address": "12 Nguyen Hue",
        "ward": "Ben Nghe",
        "district": "District 1",
        "city": "Ho Chi Minh City"
    })
}

#[tokio::test]
async fn first_address_becomes_default() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post("/api/v1/addresses", address("Home"), Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Address created successfully");
    assert_eq!(body["data"]["is_default"], true);

    let (_, body) = app
        .post("/api/v1/addresses", address("Office"), Some(app.customer_token()))
        .await;
    assert_eq!(body["data"]["is_default"], false);
}

#[tokio::test]
async fn making_an_address_default_demotes_the_others() {
    let app = TestApp::new().await;
    let (_, body) = app
        .post("/api/v1/addresses", address("Home"), Some(app.customer_token()))
        .await;
    let home = id_of(&body);
    let (_, body) = app
        .post("/api/v1/addresses", address("Office"), Some(app.customer_token()))
        .await;
    let office = id_of(&body);

    let (status, body) = app
        .put(
            &format!("/api/v1/addresses/{office}"),
            json!({"is_default": true, "city": "Hanoi"}),
            Some(app.customer_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["city"], "Hanoi");

    let (status, body) = app.get("/api/v1/addresses", Some(app.customer_token())).await;
    assert_eq!(status, StatusCode::OK);
    let list = body["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], office.as_str());
    assert_eq!(list[0]["is_default"], true);
    assert_eq!(list[1]["id"], home.as_str());
    assert_eq!(list[1]["is_default"], false);
}

#[tokio::test]
async fn addresses_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let (_, body) = app
        .post("/api/v1/addresses", address("Home"), Some(app.customer_token()))
        .await;
    let id = id_of(&body);

    let (_, body) = app.get("/api/v1/addresses", Some(app.staff_token())).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, body) = app
        .put(
            &format!("/api/v1/addresses/{id}"),
            json!({"city": "Da Nang"}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Address not found");

    let (status, _) = app
        .delete(&format!("/api/v1/addresses/{id}"), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app
        .delete(&format!("/api/v1/addresses/{id}"), Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Address deleted successfully");
}

#[tokio::test]
async fn addresses_need_a_session_and_complete_fields() {
    let app = TestApp::new().await;

    let (status, _) = app.get("/api/v1/addresses", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut incomplete = address("Home");
    incomplete["city"] = json!("");
    let (status, _) = app
        .post("/api/v1/addresses", incomplete, Some(app.customer_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
