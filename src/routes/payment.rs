use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::routes::ErrorResponse;
use crate::services::AppClients;
use crate::sessions::WizardSessions;

#[derive(Debug, Deserialize)]
pub struct PaymentIntentInput {
    pub session_id: Uuid,
}

/// Initialize the provider's pending charge for a wizard session,
/// ahead of the review step. The amount always comes from the
/// session's chargeable total (authoritative discount only), in minor
/// currency units.
pub async fn create_payment_intent(
    clients: web::Data<AppClients>,
    sessions: web::Data<WizardSessions>,
    input: web::Json<PaymentIntentInput>,
) -> impl Responder {
    let input = input.into_inner();

    let details = sessions.with(input.session_id, |controller| {
        let state = controller.snapshot();
        let metadata = vec![
            ("wizard_session".to_string(), input.session_id.to_string()),
            (
                "tour_id".to_string(),
                state.tour.as_ref().map(|t| t.id.clone()).unwrap_or_default(),
            ),
            ("party_size".to_string(), state.party_size().to_string()),
        ];
        (state.chargeable_total(), state.customer.clone(), metadata)
    });

    let Some((total, customer, metadata)) = details else {
        return HttpResponse::NotFound()
            .json(ErrorResponse::new("not_found", "Wizard session not found"));
    };

    let amount_minor = (total * 100.0).round() as i64;
    if amount_minor <= 0 {
        return HttpResponse::BadRequest()
            .json(ErrorResponse::new("nothing_to_charge", "The booking total is zero"));
    }

    match clients
        .payments
        .create_payment_intent(amount_minor, &customer, metadata)
        .await
    {
        Ok(handle) => HttpResponse::Ok().json(json!({
            "payment_intent_id": handle.id,
            "client_secret": handle.client_secret,
            "amount": amount_minor,
        })),
        Err(err) => {
            eprintln!("Error creating payment intent: {:?}", err);
            HttpResponse::BadGateway().json(ErrorResponse::new(
                "payment_intent_failed",
                format!("Failed to create payment intent: {}", err),
            ))
        }
    }
}
