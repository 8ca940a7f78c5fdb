use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{test, web, App};
use serde_json::{json, Value};
use uuid::Uuid;

use order_fulfillment::api::{self, AppState};
use order_fulfillment::metrics::Metrics;
use order_fulfillment::service::FulfillmentService;
use order_fulfillment::store::{MemoryCatalog, MemoryStore, Product};

// ============================================================================
// Boundary Layer Tests
// ============================================================================
//
// Exercise the HTTP surface over the in-memory store: delegation, status
// code mapping, and the verification stub.
//
// ============================================================================

fn product(id: i64) -> Product {
    Product {
        id,
        name: format!("Product {id}"),
        price: 40 + id,
        quantity: 50,
        shelf: "A".to_string(),
        bin: format!("Bin-{}", id % 5 + 1),
        category: "Fruits".to_string(),
    }
}

fn state() -> AppState {
    let store = Arc::new(MemoryStore::new());
    let catalog = Arc::new(MemoryCatalog::new(vec![product(7)]));
    let metrics = Arc::new(Metrics::new().unwrap());
    AppState {
        service: Arc::new(FulfillmentService::new(store, catalog, metrics.clone())),
        metrics,
    }
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state()))
                .configure(api::configure),
        )
        .await
    };
}

macro_rules! post {
    ($app:expr, $uri:expr) => {
        test::call_service(&$app, test::TestRequest::post().uri(&$uri).to_request()).await
    };
    ($app:expr, $uri:expr, $body:expr) => {
        test::call_service(
            &$app,
            test::TestRequest::post()
                .uri(&$uri)
                .set_json($body)
                .to_request(),
        )
        .await
    };
}

/// Place an order for product 7 and return the response body.
macro_rules! place {
    ($app:expr) => {{
        let resp = post!($app, "/orders", json!({"product_id": 7}));
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        body
    }};
}

#[actix_web::test]
async fn test_lifecycle_over_http() {
    let app = app!();

    let order = place!(app);
    let id = order["id"].as_str().unwrap().to_string();
    let otp = order["otp"].as_str().unwrap().to_string();
    assert_eq!(order["status"], "Pending");
    assert!(order["qr_token"].is_null());

    let resp = post!(app, format!("/orders/{id}/pick"));
    assert_eq!(resp.status(), StatusCode::OK);
    let picked: Value = test::read_body_json(resp).await;
    assert_eq!(picked["status"], "Picked");

    let resp = post!(app, format!("/orders/{id}/pack"));
    assert_eq!(resp.status(), StatusCode::OK);
    let receipt: Value = test::read_body_json(resp).await;
    assert_eq!(receipt["order"]["status"], "Packed");
    assert_eq!(
        receipt["order"]["qr_token"].as_str().unwrap(),
        format!("ORDER:{id}")
    );
    assert_eq!(
        receipt["artifact"].as_str().unwrap(),
        format!("qr/order_{id}.png")
    );

    let resp = post!(
        app,
        format!("/orders/{id}/delivery-contact"),
        json!({"name": "A", "phone": "555"})
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = post!(
        app,
        format!("/orders/{id}/confirm-delivery"),
        json!({"otp": otp})
    );
    assert_eq!(resp.status(), StatusCode::OK);
    let delivered: Value = test::read_body_json(resp).await;
    assert_eq!(delivered["status"], "Delivered");
}

#[actix_web::test]
async fn test_unknown_product_is_404() {
    let app = app!();
    let resp = post!(app, "/orders", json!({"product_id": 999}));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "product_not_found");
}

#[actix_web::test]
async fn test_unknown_order_is_404() {
    let app = app!();
    let resp = post!(app, format!("/orders/{}/pick", Uuid::new_v4()));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "order_not_found");
}

#[actix_web::test]
async fn test_illegal_transition_is_409() {
    let app = app!();
    let order = place!(app);
    let id = order["id"].as_str().unwrap().to_string();

    // Packing an order that has not been picked yet.
    let resp = post!(app, format!("/orders/{id}/pack"));
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "illegal_transition");
}

#[actix_web::test]
async fn test_wrong_otp_is_403_and_missing_contact_is_422() {
    let app = app!();
    let order = place!(app);
    let id = order["id"].as_str().unwrap().to_string();
    let otp = order["otp"].as_str().unwrap().to_string();

    post!(app, format!("/orders/{id}/pick"));
    post!(app, format!("/orders/{id}/pack"));

    // Confirmation before any contact is recorded.
    let resp = post!(
        app,
        format!("/orders/{id}/confirm-delivery"),
        json!({"otp": otp})
    );
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation");

    let resp = post!(
        app,
        format!("/orders/{id}/delivery-contact"),
        json!({"name": "A", "phone": "555"})
    );
    assert_eq!(resp.status(), StatusCode::OK);

    let wrong = if otp == "11111" { "22222" } else { "11111" };
    let resp = post!(
        app,
        format!("/orders/{id}/confirm-delivery"),
        json!({"otp": wrong})
    );
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "otp_mismatch");

    // The rejection left the order in Packed.
    let req = test::TestRequest::get()
        .uri(&format!("/orders/{id}"))
        .to_request();
    let current: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(current["status"], "Packed");
}

#[actix_web::test]
async fn test_queue_filter_and_bad_filter() {
    let app = app!();
    let order = place!(app);
    let id = order["id"].as_str().unwrap().to_string();
    post!(app, format!("/orders/{id}/pick"));

    let req = test::TestRequest::get()
        .uri("/orders?status=Picked")
        .to_request();
    let rows: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(rows.as_array().unwrap().len(), 1);
    assert_eq!(rows[0]["order"]["id"].as_str().unwrap(), id);
    assert_eq!(rows[0]["product"]["name"], "Product 7");

    let req = test::TestRequest::get()
        .uri("/orders?status=Cancelled")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_verify_package_stub() {
    let app = app!();
    let order = place!(app);
    let id = order["id"].as_str().unwrap().to_string();

    // Not packed yet: nothing to verify against.
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{id}/verify-package"))
        .set_payload("fake-png-bytes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    post!(app, format!("/orders/{id}/pick"));
    post!(app, format!("/orders/{id}/pack"));

    // Empty upload is rejected.
    let resp = post!(app, format!("/orders/{id}/verify-package"));
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Any non-empty payload passes the presence check.
    let req = test::TestRequest::post()
        .uri(&format!("/orders/{id}/verify-package"))
        .set_payload("fake-png-bytes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["verified"], true);
}

#[actix_web::test]
async fn test_products_health_and_metrics() {
    let app = app!();

    let req = test::TestRequest::get().uri("/products").to_request();
    let products: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(products.as_array().unwrap().len(), 1);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    place!(app);
    let resp =
        test::call_service(&app, test::TestRequest::get().uri("/metrics").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_placed_total"));
}
