use serde::Deserialize;

use async_trait::async_trait;

use crate::config::StripeConfig;
use crate::models::customer::CustomerInformation;
use crate::services::payment::interface::{
    ConfirmedPayment, PaymentError, PaymentIntentHandle, PaymentOperations,
};

pub struct StripeProvider {
    client: stripe::Client,
    secret_key: String,
    http: reqwest::Client,
}

impl StripeProvider {
    pub fn new(config: StripeConfig) -> Self {
        Self {
            client: stripe::Client::new(config.secret_key.clone()),
            secret_key: config.secret_key,
            http: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StripeIntentBody {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl PaymentOperations for StripeProvider {
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        customer: &CustomerInformation,
        metadata: Vec<(String, String)>,
    ) -> Result<PaymentIntentHandle, PaymentError> {
        let mut create_intent = stripe::CreatePaymentIntent::new(amount_minor, stripe::Currency::USD);
        if !customer.email.trim().is_empty() {
            create_intent.receipt_email = Some(customer.email.as_str());
        }
        create_intent.metadata = Some(metadata.into_iter().collect());

        match stripe::PaymentIntent::create(&self.client, create_intent).await {
            Ok(intent) => Ok(PaymentIntentHandle {
                id: intent.id.to_string(),
                client_secret: intent.client_secret,
            }),
            Err(e) => {
                eprintln!("Error creating payment intent: {:?}", e);
                Err(PaymentError::Provider(format!(
                    "Failed to create payment intent: {}",
                    e
                )))
            }
        }
    }

    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<ConfirmedPayment, PaymentError> {
        if !payment_intent_id.starts_with("pi_") {
            return Err(PaymentError::InvalidId(payment_intent_id.to_string()));
        }

        let url = format!(
            "https://api.stripe.com/v1/payment_intents/{}/confirm",
            payment_intent_id
        );

        let res = match self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .send()
            .await
        {
            Ok(res) => res,
            Err(err) => {
                eprintln!("Request error confirming payment intent: {:?}", err);
                return Err(PaymentError::InternalServerError);
            }
        };

        let status = res.status();
        let body = match res.text().await {
            Ok(body) => body,
            Err(err) => {
                eprintln!("Failed to read confirm response body: {:?}", err);
                return Err(PaymentError::InternalServerError);
            }
        };

        if !status.is_success() {
            let message = serde_json::from_str::<StripeErrorBody>(&body)
                .ok()
                .and_then(|e| e.error.message)
                .unwrap_or_else(|| format!("Payment confirmation failed ({})", status));
            eprintln!("Stripe confirm error: {}", body);
            return Err(PaymentError::Provider(message));
        }

        let intent = serde_json::from_str::<StripeIntentBody>(&body)
            .map_err(|_| PaymentError::InternalServerError)?;

        if intent.status != "succeeded" && intent.status != "requires_capture" {
            return Err(PaymentError::Provider(format!(
                "Payment intent is not confirmed. Current status: {}",
                intent.status
            )));
        }

        Ok(ConfirmedPayment {
            payment_id: intent.id,
            status: intent.status,
        })
    }
}
