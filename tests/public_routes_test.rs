mod common;

use std::sync::Arc;

use actix_web::test;
use chrono::NaiveDate;
use serde_json::json;
use serial_test::serial;

use common::{create_app, test_clients, TestAvailability, TestBookings, TestCatalog, TestMailer, TestPayments, TestPromo};
use tourbook_api::services::AppClients;

#[actix_rt::test]
#[serial]
async fn test_health_check() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}

#[actix_rt::test]
#[serial]
async fn test_tours_catalog_is_served() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::get().uri("/api/tours").to_request();
    let tours: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tours.as_array().unwrap().len(), 2);

    let req = test::TestRequest::get().uri("/api/tours/tour_tiered").to_request();
    let tour: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(tour["slot_types"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
#[serial]
async fn test_unknown_tour_is_not_found() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::get().uri("/api/tours/tour_ghost").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_fully_booked_ignores_inactive_weekdays() {
    // 2026-08-10 is a Monday (active, fully booked); 08-11 is a
    // Tuesday the tour does not run; 08-12 is an open Wednesday.
    let clients = AppClients {
        catalog: Arc::new(TestCatalog),
        availability: Arc::new(TestAvailability {
            remaining: 8,
            booked_dates: vec![NaiveDate::from_ymd_opt(2026, 8, 10).unwrap()],
        }),
        promo: Arc::new(TestPromo),
        bookings: TestBookings::new(),
        payments: Arc::new(TestPayments),
        mailer: Some(Arc::new(TestMailer)),
    };
    let app = test::init_service(create_app(clients)).await;

    let req = test::TestRequest::post()
        .uri("/api/availability/fully-booked")
        .set_json(&json!({
            "tour_id": "tour_flat",
            "dates": ["2026-08-10", "2026-08-11", "2026-08-12"],
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["fully_booked"], json!(["2026-08-10"]));
}

#[actix_rt::test]
#[serial]
async fn test_remaining_slots_query() {
    let app = test::init_service(create_app(test_clients(5, TestBookings::new()))).await;

    let req = test::TestRequest::post()
        .uri("/api/availability/remaining")
        .set_json(&json!({
            "tour_id": "tour_flat",
            "date": "2026-08-10",
            "time": "09:00",
        }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["remaining_slots"], 5);
}

#[actix_rt::test]
#[serial]
async fn test_promo_validation_success_and_failure() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::post()
        .uri("/api/promo/validate")
        .set_json(&json!({ "code": "SUMMER", "total_amount": 180.0 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["promo"]["discount_amount"], 30.0);
    assert_eq!(body["total"], 150.0);

    // An invalid code degrades to no discount, still a 200.
    let req = test::TestRequest::post()
        .uri("/api/promo/validate")
        .set_json(&json!({ "code": "BOGUS", "total_amount": 180.0 }))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["discount_amount"], 0.0);
    assert_eq!(body["total"], 180.0);
}

#[actix_rt::test]
#[serial]
async fn test_admin_scope_requires_a_token() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::post()
        .uri("/api/admin/wizard")
        .set_json(&json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
