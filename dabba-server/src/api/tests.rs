use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use super::build_app;
use crate::core::config::DEV_PAYMENT_SECRET;
use crate::core::{Config, ServerState};
use crate::db::KitchenStorage;
use crate::notify::LogNotifier;
use crate::payment::{MockGateway, sign_payment};

struct TestApp {
    app: Router,
    state: ServerState,
}

impl TestApp {
    fn new() -> Self {
        let config = Config::for_development(std::env::temp_dir());
        let storage = KitchenStorage::open_in_memory().unwrap();
        let state = ServerState::with_services(
            config,
            storage,
            Arc::new(MockGateway::new()),
            Arc::new(LogNotifier),
        );
        Self {
            app: build_app(state.clone()),
            state,
        }
    }

    fn token(&self, id: &str, role: &str) -> String {
        self.state
            .jwt_service()
            .generate_token(id, &format!("User {id}"), role, "9123456780")
            .unwrap()
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Vendor with settings and one menu item; returns (vendor token, item id)
    async fn seed_vendor(&self) -> (String, String) {
        let vendor = self.token("vendor-1", "vendor");
        let (status, _) = self
            .call(Method::GET, "/api/vendor/settings", Some(&vendor), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let (status, item) = self
            .call(
                Method::POST,
                "/api/vendor/menu",
                Some(&vendor),
                Some(json!({
                    "name": "Thali",
                    "description": "Dal, sabzi, rice, two rotis",
                    "price": 120.0,
                    "category": "lunch"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        (vendor, item["id"].as_str().unwrap().to_string())
    }
}

fn next_monday() -> NaiveDate {
    let mut date = Utc::now()
        .with_timezone(&chrono_tz::Asia::Kolkata)
        .date_naive()
        .checked_add_days(Days::new(1))
        .unwrap();
    while date.weekday() != Weekday::Mon {
        date = date.checked_add_days(Days::new(1)).unwrap();
    }
    date
}

#[tokio::test]
async fn test_health_is_public() {
    let t = TestApp::new();
    let (status, body) = t.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_route_requires_token() {
    let t = TestApp::new();
    let (status, body) = t.call(Method::GET, "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1001);

    let (status, body) = t
        .call(Method::GET, "/api/cart", Some("not-a-jwt"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1004);
}

#[tokio::test]
async fn test_menu_and_slots_are_public() {
    let t = TestApp::new();
    let (_, item_id) = t.seed_vendor().await;

    let (status, menu) = t.call(Method::GET, "/api/menu", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(menu.as_array().unwrap().len(), 1);

    let (status, item) = t
        .call(Method::GET, &format!("/api/menu/{item_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["name"], "Thali");

    let uri = format!("/api/pickup-slots?vendor_id=vendor-1&date={}", next_monday());
    let (status, slots) = t.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    let slots = slots.as_array().unwrap();
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0]["time_slot"], "10:00 - 11:00");
    assert_eq!(slots[0]["remaining_capacity"], 10);
}

#[tokio::test]
async fn test_pickup_slots_requires_query() {
    let t = TestApp::new();
    let (status, body) = t
        .call(Method::GET, "/api/pickup-slots?vendor_id=vendor-1", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 2);
}

#[tokio::test]
async fn test_unknown_menu_item_uses_error_envelope() {
    let t = TestApp::new();
    let (status, body) = t.call(Method::GET, "/api/menu/missing", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 6001);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_cart_flow() {
    let t = TestApp::new();
    let (_, item_id) = t.seed_vendor().await;
    let customer = t.token("cust-1", "customer");

    let (status, cart) = t
        .call(
            Method::POST,
            "/api/cart/add",
            Some(&customer),
            Some(json!({ "menu_item_id": item_id, "quantity": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 2);
    assert_eq!(cart["total_amount"], 240.0);

    let (status, cart) = t.call(Method::GET, "/api/cart", Some(&customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 1);

    let (status, body) = t
        .call(
            Method::PUT,
            "/api/cart/update",
            Some(&customer),
            Some(json!({ "menu_item_id": "other", "quantity": 1 })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 4006);
}

#[tokio::test]
async fn test_customer_cannot_use_vendor_console() {
    let t = TestApp::new();
    let customer = t.token("cust-1", "customer");
    let (status, body) = t
        .call(Method::GET, "/api/vendor/dashboard", Some(&customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 2002);
}

#[tokio::test]
async fn test_online_order_flow() {
    let t = TestApp::new();
    let (vendor, item_id) = t.seed_vendor().await;
    let customer = t.token("cust-1", "customer");

    t.call(
        Method::POST,
        "/api/cart/add",
        Some(&customer),
        Some(json!({ "menu_item_id": item_id })),
    )
    .await;

    let (status, placed) = t
        .call(
            Method::POST,
            "/api/orders/create",
            Some(&customer),
            Some(json!({
                "pickup_details": {
                    "date": next_monday().to_string(),
                    "time_slot": "12:00 - 13:00"
                },
                "payment_method": "online"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let order_id = placed["order"]["id"].as_str().unwrap().to_string();
    let provider_order_id = placed["payment_order"]["id"].as_str().unwrap().to_string();
    assert_eq!(placed["order"]["status"], "pending");
    // 120 + 20 packaging + 5% tax on 120
    assert_eq!(placed["order"]["pricing"]["total"], 146.0);
    assert_eq!(placed["payment_order"]["amount"], 14600);

    let signature = sign_payment(DEV_PAYMENT_SECRET, &provider_order_id, "pay_1");
    let (status, order) = t
        .call(
            Method::POST,
            "/api/orders/verify-payment",
            Some(&customer),
            Some(json!({
                "order_id": order_id,
                "provider_payment_id": "pay_1",
                "provider_order_id": provider_order_id,
                "provider_signature": signature
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "confirmed");
    assert_eq!(order["payment_details"]["status"], "completed");

    let (status, queue) = t
        .call(
            Method::GET,
            "/api/vendor/orders?status=confirmed",
            Some(&vendor),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue["total_count"], 1);

    let (status, order) = t
        .call(
            Method::PUT,
            &format!("/api/vendor/orders/{order_id}/status"),
            Some(&vendor),
            Some(json!({ "status": "preparing" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "preparing");

    // Customers cannot cancel once the kitchen started
    let (status, body) = t
        .call(
            Method::POST,
            &format!("/api/orders/{order_id}/cancel"),
            Some(&customer),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], 4002);
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let t = TestApp::new();
    let (_, item_id) = t.seed_vendor().await;
    let customer = t.token("cust-1", "customer");

    t.call(
        Method::POST,
        "/api/cart/add",
        Some(&customer),
        Some(json!({ "menu_item_id": item_id })),
    )
    .await;
    let (_, placed) = t
        .call(
            Method::POST,
            "/api/orders/create",
            Some(&customer),
            Some(json!({
                "pickup_details": {
                    "date": next_monday().to_string(),
                    "time_slot": "10:00 - 11:00"
                }
            })),
        )
        .await;

    let (status, body) = t
        .call(
            Method::POST,
            "/api/orders/verify-payment",
            Some(&customer),
            Some(json!({
                "order_id": placed["order"]["id"],
                "provider_payment_id": "pay_1",
                "provider_order_id": placed["payment_order"]["id"],
                "provider_signature": "00ff"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5002);
}

#[tokio::test]
async fn test_vendor_dashboard_counts_menu() {
    let t = TestApp::new();
    let (vendor, _) = t.seed_vendor().await;
    let (status, dashboard) = t
        .call(Method::GET, "/api/vendor/dashboard", Some(&vendor), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["stats"]["total_menu_items"], 1);
    assert_eq!(dashboard["stats"]["total_orders"], 0);
}

#[tokio::test]
async fn test_vendor_orders_far_page_is_empty() {
    let t = TestApp::new();
    let (vendor, item_id) = t.seed_vendor().await;
    let customer = t.token("cust-1", "customer");

    t.call(
        Method::POST,
        "/api/cart/add",
        Some(&customer),
        Some(json!({ "menu_item_id": item_id })),
    )
    .await;
    let (status, _) = t
        .call(
            Method::POST,
            "/api/orders/create",
            Some(&customer),
            Some(json!({
                "pickup_details": {
                    "date": next_monday().to_string(),
                    "time_slot": "10:00 - 11:00"
                },
                "payment_method": "cash"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/vendor/orders?page={}&limit=100", usize::MAX);
    let (status, page) = t.call(Method::GET, &uri, Some(&vendor), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["count"], 0);
    assert_eq!(page["total_count"], 1);
}
