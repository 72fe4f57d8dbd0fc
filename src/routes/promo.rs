use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::models::promo::PromoOutcome;
use crate::services::AppClients;

#[derive(Debug, Deserialize)]
pub struct ValidatePromoInput {
    pub code: String,
    pub total_amount: f64,
}

/// Stateless promo check. Failures come back as a non-blocking notice
/// with a zero discount, never as an error status — a bad code must
/// not break checkout.
pub async fn validate_promo(
    clients: web::Data<AppClients>,
    input: web::Json<ValidatePromoInput>,
) -> impl Responder {
    let input = input.into_inner();

    match clients.promo.reconcile(&input.code, input.total_amount).await {
        PromoOutcome::Applied { promo, subtotal, total } => HttpResponse::Ok().json(json!({
            "success": true,
            "promo": {
                "code": promo.code,
                "promo_id": promo.promo_id,
                "discount_amount": promo.discount_amount,
            },
            "subtotal": subtotal,
            "total": total,
        })),
        PromoOutcome::Cleared { subtotal, message } => HttpResponse::Ok().json(json!({
            "success": false,
            "message": message,
            "subtotal": subtotal,
            "discount_amount": 0.0,
            "total": subtotal,
        })),
    }
}
