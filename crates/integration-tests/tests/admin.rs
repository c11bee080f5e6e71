//! Admin back-office endpoints.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use ddf_integration_tests::{TestApp, TestResponse, address};
use serde_json::json;

const BOUNDARY: &str = "ddf-test-boundary";

fn product_payload(slug: &str) -> serde_json::Value {
    json!({
        "name": "Salted Pistachios",
        "slug": slug,
        "description": "Roasted and lightly salted.",
        "categoryId": "nuts",
        "variants": [
            {"weight": "250g", "price": 399, "stock": 20},
            {"id": "pista-1kg", "weight": "1kg", "price": 1450, "stock": 4}
        ],
        "featured": true
    })
}

async fn upload(app: &TestApp, token: &str, field: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> TestResponse {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/admin/upload")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    app.send(request).await
}

#[tokio::test]
async fn test_admin_requires_admin_role() {
    let app = TestApp::new();
    let customer = app.customer("shopper@example.com").await;

    let anonymous = app.get("/api/admin/orders", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.error(), "Not authenticated");

    let forbidden = app.get("/api/admin/orders", Some(&customer)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);
    assert_eq!(forbidden.error(), "Unauthorized");

    let garbage = app
        .post("/api/admin/products", Some("garbage"), product_payload("x"))
        .await;
    assert_eq!(garbage.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let incomplete = app
        .post(
            "/api/admin/products",
            Some(&admin),
            json!({"name": "Nameless", "slug": "nameless"}),
        )
        .await;
    assert_eq!(incomplete.status, StatusCode::BAD_REQUEST);
    assert_eq!(incomplete.error(), "Missing required fields");

    let created = app
        .post("/api/admin/products", Some(&admin), product_payload("pistachios"))
        .await;
    assert_eq!(created.status, StatusCode::OK, "{:?}", created.body);
    let product = &created.body["product"];
    let id = product["id"].as_str().unwrap().to_string();
    assert!(!product["variants"][0]["id"].as_str().unwrap().is_empty());
    assert_eq!(product["variants"][1]["id"], "pista-1kg");

    let taken = app
        .post("/api/admin/products", Some(&admin), product_payload("pistachios"))
        .await;
    assert_eq!(taken.status, StatusCode::CONFLICT);

    let updated = app
        .put(
            "/api/admin/products",
            Some(&admin),
            json!({"id": id, "name": "Roasted Pistachios", "featured": false}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["product"]["name"], "Roasted Pistachios");
    assert_eq!(updated.body["product"]["slug"], "pistachios");
    assert_eq!(updated.body["product"]["featured"], false);

    let no_id = app
        .put("/api/admin/products", Some(&admin), json!({"name": "x"}))
        .await;
    assert_eq!(no_id.status, StatusCode::BAD_REQUEST);
    assert_eq!(no_id.error(), "Product ID is required");

    let unknown = app
        .put("/api/admin/products", Some(&admin), json!({"id": "ghost"}))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error(), "Product not found");

    let deleted = app
        .delete(&format!("/api/admin/products?id={id}"), Some(&admin))
        .await;
    assert_eq!(deleted.body, json!({"success": true}));
    let gone = app.get("/api/products/pistachios", None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let again = app
        .delete(&format!("/api/admin/products?id={id}"), Some(&admin))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let missing = app.delete("/api/admin/products", Some(&admin)).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "Product ID is required");
}

#[tokio::test]
async fn test_category_lifecycle() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let invalid = app
        .post("/api/admin/categories", Some(&admin), json!({"name": "Seeds"}))
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.error(), "Name and slug are required");

    let second = app
        .post(
            "/api/admin/categories",
            Some(&admin),
            json!({"name": "Seeds", "slug": "seeds", "displayOrder": 2}),
        )
        .await;
    let first = app
        .post(
            "/api/admin/categories",
            Some(&admin),
            json!({"name": "Nuts", "slug": "nuts", "displayOrder": 1}),
        )
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let nuts_id = first.body["category"]["id"].as_str().unwrap().to_string();
    let seeds_id = second.body["category"]["id"].as_str().unwrap().to_string();

    app.product("almonds", &nuts_id, 450, 10).await;
    app.product("walnuts", &nuts_id, 700, 10).await;

    let listed = app.get("/api/categories", None).await;
    let categories = listed.body["categories"].as_array().unwrap();
    assert_eq!(categories[0]["slug"], "nuts");
    assert_eq!(categories[0]["productCount"], 2);
    assert_eq!(categories[1]["productCount"], 0);

    let renamed = app
        .put(
            "/api/admin/categories",
            Some(&admin),
            json!({"id": seeds_id, "name": "Healthy Seeds"}),
        )
        .await;
    assert_eq!(renamed.body["category"]["name"], "Healthy Seeds");
    assert_eq!(renamed.body["category"]["slug"], "seeds");

    let unknown = app
        .put("/api/admin/categories", Some(&admin), json!({"id": "ghost"}))
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error(), "Category not found");

    let deleted = app
        .delete(&format!("/api/admin/categories?id={nuts_id}"), Some(&admin))
        .await;
    assert_eq!(deleted.body, json!({"success": true}));

    // Products keep their dangling category reference.
    let almonds = app.get("/api/products/almonds", None).await;
    assert_eq!(almonds.body["product"]["categoryId"], nuts_id.as_str());
}

#[tokio::test]
async fn test_order_status_management() {
    let app = TestApp::new();
    let admin = app.admin().await;
    let customer = app.customer("orders@example.com").await;
    let raisins = app.product("raisins", "dried-fruit", 300, 10).await;

    app.post(
        "/api/cart",
        Some(&customer),
        json!({"productId": raisins.id, "variantId": raisins.variants[0].id}),
    )
    .await;
    let placed = app
        .post(
            "/api/checkout",
            Some(&customer),
            json!({"shippingAddress": address()}),
        )
        .await;
    let order_id = placed.body["order"]["id"].as_str().unwrap().to_string();

    let all = app.get("/api/admin/orders", Some(&admin)).await;
    assert_eq!(all.body["orders"].as_array().unwrap().len(), 1);

    let shipped = app
        .put(
            "/api/admin/orders",
            Some(&admin),
            json!({"id": order_id, "status": "shipped"}),
        )
        .await;
    assert_eq!(shipped.status, StatusCode::OK);
    assert_eq!(shipped.body["order"]["status"], "shipped");

    // Any status can be set from any other.
    let back = app
        .put(
            "/api/admin/orders",
            Some(&admin),
            json!({"id": order_id, "status": "pending"}),
        )
        .await;
    assert_eq!(back.body["order"]["status"], "pending");

    let invalid = app
        .put(
            "/api/admin/orders",
            Some(&admin),
            json!({"id": order_id, "status": "lost"}),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let incomplete = app
        .put("/api/admin/orders", Some(&admin), json!({"id": order_id}))
        .await;
    assert_eq!(incomplete.error(), "Order ID and status are required");

    let unknown = app
        .put(
            "/api/admin/orders",
            Some(&admin),
            json!({"id": "ghost", "status": "shipped"}),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
    assert_eq!(unknown.error(), "Order not found");
}

#[tokio::test]
async fn test_image_upload() {
    let app = TestApp::new();
    let admin = app.admin().await;

    let saved = upload(&app, &admin, "image", "Cashew Pack.PNG", "image/png", b"\x89PNG fake").await;
    assert_eq!(saved.status, StatusCode::OK, "{:?}", saved.body);
    let url = saved.body["imageUrl"].as_str().unwrap();
    assert!(url.starts_with("/images/products/"));
    assert!(url.ends_with(".png"));

    let file_name = url.rsplit('/').next().unwrap();
    let on_disk = app
        .root()
        .join("public")
        .join("images")
        .join("products")
        .join(file_name);
    assert_eq!(std::fs::read(on_disk).unwrap(), b"\x89PNG fake");

    let served = app.get(url, None).await;
    assert_eq!(served.status, StatusCode::OK);

    let wrong_type = upload(&app, &admin, "image", "notes.txt", "text/plain", b"hi").await;
    assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        wrong_type.error(),
        "Only PNG, JPEG, and WebP images are allowed"
    );

    let wrong_field = upload(&app, &admin, "file", "a.png", "image/png", b"x").await;
    assert_eq!(wrong_field.status, StatusCode::BAD_REQUEST);
    assert_eq!(wrong_field.error(), "No image file provided");
}
