use async_trait::async_trait;

use crate::models::customer::CustomerInformation;

#[derive(Debug)]
pub enum PaymentError {
    InvalidId(String),
    Provider(String),
    InternalServerError,
}

impl std::fmt::Display for PaymentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentError::InvalidId(id) => write!(f, "Invalid payment intent id: {}", id),
            PaymentError::Provider(msg) => write!(f, "{}", msg),
            PaymentError::InternalServerError => write!(f, "Payment provider request failed"),
        }
    }
}

impl std::error::Error for PaymentError {}

/// A pending charge created ahead of the review step. The client
/// secret goes to the front end; the id is confirmed server-side after
/// the booking record exists.
#[derive(Debug, Clone)]
pub struct PaymentIntentHandle {
    pub id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfirmedPayment {
    pub payment_id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentOperations: Send + Sync {
    /// Create a pending intent. Amount is in minor currency units;
    /// metadata carries the booking linkage the provider's webhook
    /// path reads back.
    async fn create_payment_intent(
        &self,
        amount_minor: i64,
        customer: &CustomerInformation,
        metadata: Vec<(String, String)>,
    ) -> Result<PaymentIntentHandle, PaymentError>;

    /// Confirm an already-initialized intent. Provider errors are
    /// surfaced verbatim and never retried automatically.
    async fn confirm_payment_intent(
        &self,
        payment_intent_id: &str,
    ) -> Result<ConfirmedPayment, PaymentError>;
}
