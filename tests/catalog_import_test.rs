mod common;

use std::fs;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;
use storefront_api::services::catalog_import::{CatalogImporter, ImportSummary};

fn write_json(dir: &std::path::Path, name: &str, value: serde_json::Value) {
    fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

#[tokio::test]
async fn imports_directory_and_is_idempotent() {
    let app = TestApp::new().await;
    let data = tempfile::tempdir().unwrap();

    write_json(
        data.path(),
        "01_shirts.json",
        json!([
            {
                "name": "Linen Shirt",
                "description": "Breathable",
                "base_price": 349000,
                "gender": "MALE",
                "age_group": "ADULT",
                "category": {"name": "Shirts", "slug": "shirts", "image": ""},
                "variants": [
                    {"sku": "LIN-WHT-M", "price": 349000, "stock_quantity": 12,
                     "color": {"name": "White", "hex_code": "#FFFFFF"},
                     "size": {"name": "M", "type": "Standard"}},
                    {"sku": "LIN-WHT-L", "stock_quantity": -4,
                     "color": {"name": "White"},
                     "size": {"name": "L"}}
                ],
                "images": [
                    {"image_url": "https://cdn.example.com/linen-1.jpg", "is_thumbnail": true},
                    {"image_url": "https://cdn.example.com/linen-2.jpg"}
                ]
            },
            {
                "name": "Mystery Hat",
                "base_price": 99000,
                "category": {"name": "Hats", "slug": "hats"},
                "variants": [
                    {"sku": "HAT-1", "color": {"name": "Black"}, "size": {"name": "One", "type": "headwear"}}
                ]
            }
        ]),
    );
    write_json(
        data.path(),
        "02_repeat.json",
        json!([
            {
                "name": "Linen Shirt",
                "base_price": 349000,
                "category": {"name": "Shirts", "slug": "shirts"},
                "variants": [
                    {"sku": "LIN-WHT-M", "color": {"name": "White"}, "size": {"name": "M"}},
                    {"sku": "LIN-BLU-M", "color": {"name": "Blue"}, "size": {"name": "M", "type": "clothing"}}
                ],
                "images": [{"image_url": "https://cdn.example.com/other.jpg"}]
            }
        ]),
    );
    fs::write(data.path().join("03_broken.json"), b"{ not json").unwrap();
    fs::write(data.path().join("README.txt"), b"ignored").unwrap();

    let importer = CatalogImporter::new(app.state.db.clone());
    let summary = importer.import_dir(data.path()).await.unwrap();

    assert_eq!(
        summary,
        ImportSummary {
            files: 2,
            products_created: 1,
            products_reused: 1,
            products_failed: 1,
            variants_created: 3,
            variants_skipped: 1,
            images_created: 2,
        }
    );

    let (_, body) = app.get("/api/v1/products?name=Linen", None).await;
    assert_eq!(body["data"]["total"], 1);
    let product = body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let (status, body) = app.get(&format!("/api/v1/products/{product}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category"]["slug"], "shirts");
    assert_eq!(body["data"]["variants"].as_array().unwrap().len(), 3);
    assert_eq!(body["data"]["images"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["images"][0]["is_thumbnail"], true);

    let clamped = body["data"]["variants"]
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["sku"] == "LIN-WHT-L")
        .unwrap();
    assert_eq!(clamped["stock_quantity"], 0);

    // The failed record left nothing behind.
    let (_, body) = app.get("/api/v1/products?name=Mystery", None).await;
    assert_eq!(body["data"]["total"], 0);
    let (_, body) = app.get("/api/v1/colors", None).await;
    let colors: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert!(!colors.contains(&"Black"));

    let again = importer.import_dir(data.path()).await.unwrap();
    assert_eq!(again.products_created, 0);
    assert_eq!(again.variants_created, 0);
    assert_eq!(again.images_created, 0);
}

#[tokio::test]
async fn missing_directory_is_an_error() {
    let app = TestApp::new().await;
    let importer = CatalogImporter::new(app.state.db.clone());

    let result = importer
        .import_dir(std::path::Path::new("/definitely/not/here"))
        .await;

    assert!(result.is_err());
}
