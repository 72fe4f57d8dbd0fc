use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::models::promo::{
    AppliedPromo, PromoOutcome, PromoValidationRequest, PromoValidationResponse,
};
use crate::services::pricing_service::PricingService;

/// Reconciles a promo code against the trusted remote validator. The
/// server's discount and total are the only ones ever applied; locally
/// computed discounts are display-only and overwritten by the response.
#[async_trait]
pub trait PromoClient: Send + Sync {
    /// Must be called again whenever the subtotal or the code changes.
    /// Never fails outward: every error path degrades to `Cleared`
    /// (discount zero, total equal to the unmodified subtotal) so a bad
    /// promo never blocks checkout.
    async fn reconcile(&self, code: &str, subtotal: f64) -> PromoOutcome;
}

pub struct HttpPromoClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl HttpPromoClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn cleared(subtotal: f64, message: impl Into<String>) -> PromoOutcome {
        PromoOutcome::Cleared {
            subtotal,
            message: message.into(),
        }
    }
}

#[async_trait]
impl PromoClient for HttpPromoClient {
    async fn reconcile(&self, code: &str, subtotal: f64) -> PromoOutcome {
        let url = self.config.endpoint("rpc/validate-promo");
        let request = PromoValidationRequest {
            code: code.to_string(),
            total_amount: subtotal,
        };

        let response = match self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                eprintln!("Promo validation request failed: {:?}", err);
                return Self::cleared(subtotal, "Promo validation is unavailable right now");
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            eprintln!("Promo validator returned {}: {}", status, body);
            return Self::cleared(subtotal, "This promo code could not be applied");
        }

        let parsed = match response.json::<PromoValidationResponse>().await {
            Ok(parsed) => parsed,
            Err(err) => {
                eprintln!("Promo validator response was malformed: {:?}", err);
                return Self::cleared(subtotal, "This promo code could not be applied");
            }
        };

        match (parsed.success, parsed.promo) {
            (true, Some(payload)) => {
                let promo = AppliedPromo {
                    code: code.to_string(),
                    promo_id: payload.promo_id,
                    discount_amount: payload.discount_amount,
                };
                let total = payload
                    .final_amount
                    .unwrap_or_else(|| PricingService::total(subtotal, promo.discount_amount));
                PromoOutcome::Applied { promo, subtotal, total }
            }
            _ => Self::cleared(
                subtotal,
                parsed
                    .message
                    .unwrap_or_else(|| "This promo code is not valid".to_string()),
            ),
        }
    }
}
