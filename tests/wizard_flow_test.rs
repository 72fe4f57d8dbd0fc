mod common;

use actix_web::test;
use serde_json::json;
use serial_test::serial;

use common::{create_app, test_clients, TestBookings};

async fn create_session<S>(app: &S, body: serde_json::Value) -> (String, serde_json::Value)
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri("/api/wizard")
        .set_json(&body)
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(app, req).await;
    let session_id = body["session_id"].as_str().unwrap().to_string();
    (session_id, body["state"].clone())
}

async fn post_command<S>(
    app: &S,
    session_id: &str,
    command: &str,
    body: serde_json::Value,
) -> serde_json::Value
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/{}", session_id, command))
        .set_json(&body)
        .to_request();
    test::call_and_read_body_json(app, req).await
}

#[actix_rt::test]
#[serial]
async fn test_guided_flow_reaches_completion() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let (session_id, state) = create_session(&app, json!({})).await;
    assert_eq!(state["step"], "select_tour");

    let body = post_command(&app, &session_id, "tour", json!({ "tour_id": "tour_flat" })).await;
    assert_eq!(body["state"]["tour"]["id"], "tour_flat");

    let body = post_command(&app, &session_id, "advance", json!({})).await;
    assert_eq!(body["state"]["step"], "select_date_time");

    post_command(&app, &session_id, "date", json!({ "date": "2026-08-10" })).await;
    let body = post_command(&app, &session_id, "time", json!({ "time": "09:00" })).await;
    assert_eq!(body["state"]["remaining_slots"], 8);

    post_command(&app, &session_id, "party-size", json!({ "size": 3 })).await;

    let body = post_command(&app, &session_id, "advance", json!({})).await;
    assert_eq!(body["state"]["step"], "review_and_pay");

    post_command(
        &app,
        &session_id,
        "customer",
        json!({
            "first_name": "Ava",
            "last_name": "Reed",
            "email": "ava@example.com",
            "phone": "(303) 555-1234",
        }),
    )
    .await;
    post_command(&app, &session_id, "payment-method", json!({ "method": "card" })).await;

    let body = post_command(
        &app,
        &session_id,
        "submit",
        json!({ "payment_intent_id": "pi_ok" }),
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["booking_id"], "bk_1");
    assert_eq!(body["reference_number"], "TB-1001");
    assert_eq!(body["payment_id"], "pi_ok");
    assert_eq!(body["email_sent"], true);
    assert_eq!(body["state"]["step"], "complete");
}

#[actix_rt::test]
#[serial]
async fn test_prefilled_session_short_circuits_to_review() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let (_, state) = create_session(
        &app,
        json!({
            "tour_id": "tour_flat",
            "date": "2026-08-10",
            "time": "09:00",
        }),
    )
    .await;

    assert_eq!(state["step"], "review_and_pay");
    // The advisory capacity was fetched up front.
    assert_eq!(state["remaining_slots"], 8);
}

#[actix_rt::test]
#[serial]
async fn test_retreat_at_the_entry_step_requests_close() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let (session_id, _) = create_session(&app, json!({})).await;
    let body = post_command(&app, &session_id, "retreat", json!({})).await;

    assert_eq!(body["close_requested"], true);
    assert_eq!(body["needs_confirmation"], false);

    // Closing deletes the session.
    let req = test::TestRequest::delete()
        .uri(&format!("/api/wizard/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let req = test::TestRequest::get()
        .uri(&format!("/api/wizard/{}", session_id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}

#[actix_rt::test]
#[serial]
async fn test_time_outside_the_weekly_schedule_is_rejected() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let (session_id, _) =
        create_session(&app, json!({ "tour_id": "tour_flat", "date": "2026-08-10" })).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/time", session_id))
        .set_json(&json!({ "time": "23:00" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);
}

#[actix_rt::test]
#[serial]
async fn test_fully_booked_time_freezes_party_size() {
    let app = test::init_service(create_app(test_clients(0, TestBookings::new()))).await;

    let (session_id, _) =
        create_session(&app, json!({ "tour_id": "tour_flat", "date": "2026-08-10" })).await;

    let body = post_command(&app, &session_id, "time", json!({ "time": "14:00" })).await;
    assert_eq!(body["state"]["remaining_slots"], 0);
    assert_eq!(body["state"]["number_of_people"], 0);

    // The increase is a no-op, not an error.
    let body = post_command(&app, &session_id, "party-size/increase", json!({})).await;
    assert_eq!(body["state"]["number_of_people"], 0);
}

#[actix_rt::test]
#[serial]
async fn test_validation_failures_are_grouped() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let (session_id, _) = create_session(
        &app,
        json!({
            "tour_id": "tour_flat",
            "date": "2026-08-10",
            "time": "09:00",
        }),
    )
    .await;

    // No customer, no payment method.
    let req = test::TestRequest::post()
        .uri(&format!("/api/wizard/{}/submit", session_id))
        .set_json(&json!({ "payment_intent_id": "pi_ok" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 422);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
    assert!(!body["validation"]["personal_info"].as_array().unwrap().is_empty());
    assert!(!body["validation"]["payment"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
#[serial]
async fn test_unknown_session_is_not_found() {
    let app = test::init_service(create_app(test_clients(8, TestBookings::new()))).await;

    let req = test::TestRequest::get()
        .uri("/api/wizard/00000000-0000-0000-0000-000000000000")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
}
