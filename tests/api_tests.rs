use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

use ev_rental_ops::{
    config::Config,
    db::seed,
    routes,
    services::{FixedClock, RentalService},
    AppState,
};

fn app() -> Router {
    let today = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
    let rental = RentalService::new(seed::demo_store(), Arc::new(FixedClock(today)), 7);
    routes::create_router(AppState::new(rental, Config::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(body.to_string())).unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn money(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn customer(name: &str, phone: &str) -> Value {
    json!({
        "name": name,
        "phone": phone,
        "address": "1 Mission St, San Francisco",
        "aadhar_number": "111122223333",
        "pan_number": "ABCDE1234F",
        "bank_details": {
            "account_name": name,
            "account_number": "000111222",
            "bank_name": "City Bank",
            "ifsc_code": "CITI0000001"
        }
    })
}

fn booking(customer_id: i64, vehicle_id: i64, cash: i64) -> Value {
    json!({
        "customer_id": customer_id,
        "vehicle_id": vehicle_id,
        "battery_id": 2,
        "city_id": 1,
        "start_date": "2024-08-01",
        "end_date": "2024-08-04",
        "cash_collected": cash,
    })
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let (status, body) = send(&app, "GET", "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_return_then_rebook_vehicle() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/bookings/1/return", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "returned");
    assert_eq!(money(&body["refund_request"]["amount"]), Decimal::from(100));

    let (status, created) = send(&app, "POST", "/api/customers", Some(customer("Asha", "999-000-1111"))).await;
    assert_eq!(status, StatusCode::OK);
    let customer_id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/api/bookings", Some(booking(customer_id, 102, 1750))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(money(&body["total_rent"]), Decimal::from(750));
    assert_eq!(money(&body["amount_collected"]), Decimal::from(1750));
    assert_eq!(body["status"], "Active");
    assert_eq!(body["mode_of_payment"], "Cash");

    let (_, vehicles) = send(&app, "GET", "/api/vehicles", None).await;
    let vehicle = vehicles
        .as_array()
        .unwrap()
        .iter()
        .find(|v| v["id"] == 102)
        .unwrap();
    assert_eq!(vehicle["status"], "Rented");
    assert_eq!(vehicle["battery_id"], 2);
}

#[tokio::test]
async fn test_booking_rejections() {
    let app = app();
    let (_, created) = send(&app, "POST", "/api/customers", Some(customer("Ravi", "888-000-1111"))).await;
    let customer_id = created["id"].as_i64().unwrap();

    let (status, body) = send(&app, "POST", "/api/bookings", Some(booking(customer_id, 101, 1700))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = send(&app, "POST", "/api/bookings", Some(booking(customer_id, 102, 1750))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");

    let (status, _) = send(&app, "GET", "/api/bookings/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bookings) = send(&app, "GET", "/api/bookings", None).await;
    assert_eq!(bookings.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalid_customer_is_rejected() {
    let app = app();
    let mut payload = customer("Short Id", "777-000-1111");
    payload["aadhar_number"] = json!("1234");

    let (status, body) = send(&app, "POST", "/api/customers", Some(payload)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unconfirmed_excess_fine_is_rejected() {
    let app = app();
    let payload = json!({ "checklist": { "Seat": true }, "settlement_confirmed": false });

    let (status, _) = send(&app, "POST", "/api/bookings/1/return", Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, view) = send(&app, "GET", "/api/bookings/1", None).await;
    assert_eq!(view["status"], "Active");
}

#[tokio::test]
async fn test_refund_processed_once() {
    let app = app();
    send(&app, "POST", "/api/bookings/1/return", Some(json!({}))).await;

    let (_, requests) = send(&app, "GET", "/api/refund-requests", None).await;
    let request_id = requests[0]["id"].as_i64().unwrap();
    assert_eq!(requests[0]["status"], "Pending");

    let uri = format!("/api/refund-requests/{}/process", request_id);
    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "processed");
    assert_eq!(money(&body["booking"]["amount_collected"]), Decimal::from(50));

    let (status, body) = send(&app, "POST", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "already_processed");

    let (_, view) = send(&app, "GET", "/api/bookings/1", None).await;
    assert_eq!(money(&view["amount_collected"]), Decimal::from(50));
}

#[tokio::test]
async fn test_available_batteries_by_purpose() {
    let app = app();

    let (_, bookable) = send(&app, "GET", "/api/batteries/available", None).await;
    let ids: Vec<i64> = bookable.as_array().unwrap().iter().map(|b| b["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);

    let (_, swappable) = send(&app, "GET", "/api/batteries/available?purpose=swap", None).await;
    assert_eq!(swappable.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_city_dashboard_and_report() {
    let app = app();

    let (status, dashboard) = send(&app, "GET", "/api/cities/1/dashboard", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["active_rentals"], 1);
    assert_eq!(dashboard["available_vehicles"], 2);

    let (status, report) = send(&app, "GET", "/api/reports?from=2024-07-01&to=2024-07-31", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_bookings"], 1);
    assert_eq!(money(&report["security_collected"]), Decimal::from(100));

    let (status, _) = send(&app, "GET", "/api/cities/42/dashboard", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_payment_is_a_bad_request() {
    let app = app();
    let (_, created) = send(&app, "POST", "/api/customers", Some(customer("Nia", "555-000-1111"))).await;
    let customer_id = created["id"].as_i64().unwrap();

    let mut payload = booking(customer_id, 101, 0);
    payload["cash_collected"] = json!(Decimal::MAX.to_string());
    payload["online_collected"] = json!(Decimal::MAX.to_string());

    let (status, body) = send(&app, "POST", "/api/bookings", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}
