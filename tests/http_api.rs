//! Router-level tests for requests that are answered before any query runs:
//! health, authentication, authorisation and input validation.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{admin_token, body_json, build_test_app, customer_token, get, get_auth, lazy_pool, post_json, put_json, send};
use serde_json::json;

fn app() -> axum::Router {
    build_test_app(lazy_pool())
}

fn checkout_body() -> serde_json::Value {
    json!({
        "customer_name": "Rahim Uddin",
        "phone": "01712345678",
        "address": "Station Road",
        "district": "Gaibandha",
        "delivery_method": "gaibandha",
        "items": [{ "product_id": 1, "quantity": 2 }]
    })
}

// ---------------------------------------------------------------------------
// Health and routing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok() {
    let response = get(app(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "abrar-shop");
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let response = get(app(), "/api/v1/does-not-exist").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Authentication and authorisation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn admin_routes_require_a_token() {
    for uri in ["/api/v1/admin/products", "/api/v1/admin/brands", "/api/v1/admin/orders"] {
        let response = get(app(), uri).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNAUTHORIZED");
    }
}

#[tokio::test]
async fn admin_routes_reject_customers() {
    let response = get_auth(app(), "/api/v1/admin/categories", &customer_token()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let response = get_auth(app(), "/api/v1/account", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_requires_sign_in() {
    let response = get(app(), "/api/v1/account/orders").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reviews_require_sign_in() {
    let response = post_json(app(), "/api/v1/products/tee/reviews", json!({ "rating": 5 }), None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn checkout_rejects_a_bad_token_instead_of_going_guest() {
    let response = post_json(app(), "/api/v1/checkout", checkout_body(), Some("broken")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn checkout_validation_is_field_level() {
    let mut body = checkout_body();
    body["phone"] = json!("12345");
    body["items"] = json!([]);

    let response = post_json(app(), "/api/v1/checkout", body, None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["fields"]["phone"].is_array());
    assert_eq!(body["fields"]["items"][0], "Your cart is empty");
}

#[tokio::test]
async fn checkout_rejects_unknown_delivery_zone() {
    let mut body = checkout_body();
    body["delivery_method"] = json!("express");
    let response = post_json(app(), "/api/v1/checkout", body, None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn search_requires_a_query() {
    let response = get(app(), "/api/v1/search?q=%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_brand_form_is_validated() {
    let token = admin_token();
    let response = post_json(app(), "/api/v1/admin/brands", json!({ "name": "" }), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["fields"]["name"][0], "Name is required");
}

#[tokio::test]
async fn admin_product_form_is_validated() {
    let token = admin_token();
    let body = json!({
        "sku": "1001",
        "name": "Cotton Panjabi",
        "price": 199.0,
        "stock": -1
    });
    let response = post_json(app(), "/api/v1/admin/products", body, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["stock"].is_array());
}

#[tokio::test]
async fn admin_order_list_rejects_unknown_status() {
    let response = get_auth(app(), "/api/v1/admin/orders?status=lost", &admin_token()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn profile_phone_is_validated() {
    let token = customer_token();
    let response = put_json(app(), "/api/v1/account", json!({ "phone": "555" }), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["fields"]["phone"].is_array());
}

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn upload_without_media_host_is_a_gateway_error() {
    let boundary = "shop-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"tee.png\"\r\n\
         Content-Type: image/png\r\n\r\n\
         PNGDATA\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(body_json(response).await["code"], "EXTERNAL_ERROR");
}

#[tokio::test]
async fn upload_rejects_non_images() {
    let boundary = "shop-boundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         hello\r\n\
         --{boundary}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/admin/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = send(app(), request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
