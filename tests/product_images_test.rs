mod common;

use axum::http::StatusCode;
use common::{id_of, TestApp};
use serde_json::{json, Value};

async fn add_image(app: &TestApp, product: &str, body: Value) -> String {
    let (status, json) = app
        .post(
            &format!("/api/v1/products/{product}/images"),
            body,
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "add image: {json}");
    id_of(&json)
}

fn thumbnails(images: &Value) -> Vec<String> {
    images
        .as_array()
        .unwrap()
        .iter()
        .filter(|i| i["is_thumbnail"] == true)
        .map(|i| i["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn only_one_thumbnail_per_product() {
    let app = TestApp::new().await;
    let product = app.seed_product("Parka", "199").await;

    let first = add_image(
        &app,
        &product,
        json!({"image_url": "https://cdn.example.com/parka-1.jpg", "is_thumbnail": true}),
    )
    .await;
    let second = add_image(
        &app,
        &product,
        json!({"image_url": "https://cdn.example.com/parka-2.jpg", "is_thumbnail": true}),
    )
    .await;

    let (_, body) = app
        .get(&format!("/api/v1/products/{product}/images"), None)
        .await;
    assert_eq!(thumbnails(&body["data"]), [second.clone()]);

    let (status, body) = app
        .patch(
            &format!("/api/v1/products/{product}/images/{first}/thumbnail"),
            json!({}),
            Some(app.staff_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Thumbnail set successfully");
    assert_eq!(body["data"]["is_thumbnail"], true);

    let (_, body) = app
        .get(&format!("/api/v1/products/{product}/images"), None)
        .await;
    assert_eq!(thumbnails(&body["data"]), [first]);
}

#[tokio::test]
async fn reorder_changes_listing_order() {
    let app = TestApp::new().await;
    let product = app.seed_product("Boots", "140").await;
    let a = add_image(
        &app,
        &product,
        json!({"image_url": "https://cdn.example.com/a.jpg", "sort_order": 0}),
    )
    .await;
    let b = add_image(
        &app,
        &product,
        json!({"image_url": "https://cdn.example.com/b.jpg", "sort_order": 1}),
    )
    .await;

    let (status, body) = app
        .put(
            &format!("/api/v1/products/{product}/images/reorder"),
            json!({"orders": [{"image_id": a, "sort_order": 5}, {"image_id": b, "sort_order": 2}]}),
            Some(app.staff_token()),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Images reordered successfully");
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [b.as_str(), a.as_str()]);
}

#[tokio::test]
async fn reorder_rejects_foreign_images() {
    let app = TestApp::new().await;
    let product = app.seed_product("Gloves", "22").await;
    let other = app.seed_product("Cap", "15").await;
    let foreign = add_image(
        &app,
        &other,
        json!({"image_url": "https://cdn.example.com/cap.jpg"}),
    )
    .await;

    let (status, body) = app
        .put(
            &format!("/api/v1/products/{product}/images/reorder"),
            json!({"orders": [{"image_id": foreign, "sort_order": 1}]}),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Some images do not belong to this product");
}

#[tokio::test]
async fn image_detail_resolves_color_and_can_detach_it() {
    let app = TestApp::new().await;
    let product = app.seed_product("Sneaker", "95").await;
    let color = app.seed_color("Olive", "#808000").await;
    let image = add_image(
        &app,
        &product,
        json!({
            "image_url": "https://cdn.example.com/sneaker-olive.jpg",
            "color_id": color,
            "alt_text": "Olive sneaker"
        }),
    )
    .await;
    let uri = format!("/api/v1/products/{product}/images/{image}");

    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["color"]["name"], "Olive");
    assert_eq!(body["data"]["alt_text"], "Olive sneaker");

    let (status, body) = app
        .patch(&uri, json!({"color_id": null}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product image updated successfully");
    assert!(body["data"]["color_id"].is_null());

    let (status, _) = app.delete(&uri, Some(app.staff_token())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Image not found");
}

#[tokio::test]
async fn image_urls_must_be_valid() {
    let app = TestApp::new().await;
    let product = app.seed_product("Vest", "30").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/products/{product}/images"),
            json!({"image_url": "not a url"}),
            Some(app.staff_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn images_of_deleted_products_are_frozen() {
    let app = TestApp::new().await;
    let product = app.seed_product("Cap", "15").await;
    let image = add_image(
        &app,
        &product,
        json!({"image_url": "https://cdn.example.com/cap.jpg"}),
    )
    .await;

    let (status, _) = app
        .delete(&format!("/api/v1/products/{product}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);

    let image_uri = format!("/api/v1/products/{product}/images/{image}");
    let (status, body) = app
        .patch(&format!("{image_uri}/thumbnail"), json!({}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Product not found");

    let (status, _) = app
        .patch(&image_uri, json!({"alt_text": "Cap"}), Some(app.staff_token()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&image_uri, Some(app.staff_token())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
