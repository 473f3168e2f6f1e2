mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn tree_nests_subcategories_under_roots() {
    let app = TestApp::new().await;
    let men = app.seed_category("Men", "men", None).await;
    let women = app.seed_category("Women", "women", None).await;
    let shirts = app.seed_category("Shirts", "men-shirts", Some(&men)).await;
    app.seed_category("Dress Shirts", "men-dress-shirts", Some(&shirts)).await;

    let (status, body) = app.get("/api/v1/categories", None).await;

    assert_eq!(status, StatusCode::OK);
    let roots = body["data"].as_array().unwrap();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0]["name"], "Men");
    assert_eq!(roots[1]["id"], women.as_str());
    assert_eq!(roots[1]["children"].as_array().unwrap().len(), 0);
    let shirts_node = &roots[0]["children"][0];
    assert_eq!(shirts_node["slug"], "men-shirts");
    assert_eq!(shirts_node["children"][0]["name"], "Dress Shirts");
}

#[tokio::test]
async fn detail_includes_parent_children_and_products() {
    let app = TestApp::new().await;
    let root = app.seed_category("Kids", "kids", None).await;
    let child = app.seed_category("Toddlers", "kids-toddlers", Some(&root)).await;

    let (status, body) = app.get(&format!("/api/v1/categories/{child}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parent"]["slug"], "kids");
    assert!(body["data"]["products"].as_array().unwrap().is_empty());

    let (_, body) = app.get(&format!("/api/v1/categories/{root}"), None).await;
    assert_eq!(body["data"]["children"][0]["id"], child.as_str());
    assert!(body["data"]["parent"].is_null());
}

#[tokio::test]
async fn slugs_must_be_unique() {
    let app = TestApp::new().await;
    app.seed_category("Sale", "sale", None).await;

    let (status, body) = app
        .post(
            "/api/v1/categories",
            json!({"name": "Sale again", "slug": "sale"}),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category slug already exists");
}

#[tokio::test]
async fn unknown_parent_is_not_found() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/v1/categories",
            json!({
                "name": "Orphan",
                "slug": "orphan",
                "parent_id": "6f1c1a86-2f57-4b7a-9a0e-5d9b0d0f1a11"
            }),
            Some(app.admin_token()),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Parent category not found");
}

#[tokio::test]
async fn moves_that_would_create_cycles_are_rejected() {
    let app = TestApp::new().await;
    let top = app.seed_category("Top", "top", None).await;
    let middle = app.seed_category("Middle", "middle", Some(&top)).await;
    let bottom = app.seed_category("Bottom", "bottom", Some(&middle)).await;

    let (status, body) = app
        .patch(
            &format!("/api/v1/categories/{top}"),
            json!({"parent_id": top}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Category cannot be its own parent");

    let (status, body) = app
        .patch(
            &format!("/api/v1/categories/{top}"),
            json!({"parent_id": bottom}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Category cannot be moved under its own descendant"
    );

    // Explicit null detaches.
    let (status, body) = app
        .patch(
            &format!("/api/v1/categories/{bottom}"),
            json!({"parent_id": null}),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["parent_id"].is_null());
}

#[tokio::test]
async fn delete_guards_children_and_products() {
    let app = TestApp::new().await;
    let parent = app.seed_category("Outerwear", "outerwear", None).await;
    let child = app.seed_category("Jackets", "jackets", Some(&parent)).await;

    let (status, body) = app
        .delete(&format!("/api/v1/categories/{parent}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete category with subcategories");

    let (status, _) = app
        .post(
            "/api/v1/products",
            json!({
                "name": "Rain Jacket",
                "base_price": "89.90",
                "category_id": child,
                "gender": "UNISEX",
                "age_group": "ADULT"
            }),
            Some(app.admin_token()),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .delete(&format!("/api/v1/categories/{child}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot delete category with products");
}

#[tokio::test]
async fn deleted_categories_vanish_from_the_tree() {
    let app = TestApp::new().await;
    let id = app.seed_category("Seasonal", "seasonal", None).await;

    let (status, body) = app
        .delete(&format!("/api/v1/categories/{id}"), Some(app.admin_token()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Category deleted successfully");

    let (_, body) = app.get("/api/v1/categories", None).await;
    assert!(body["data"].as_array().unwrap().is_empty());

    // The slug is free again once the old row is soft-deleted.
    app.seed_category("Seasonal", "seasonal", None).await;
}
