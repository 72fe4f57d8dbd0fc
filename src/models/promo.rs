use serde::{Deserialize, Serialize};

/// A server-confirmed discount. This is the only promo value allowed to
/// gate payment; locally estimated discounts are display-only.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct AppliedPromo {
    pub code: String,
    pub promo_id: Option<String>,
    pub discount_amount: f64,
}

/// Two-phase promo state: `estimate` is whatever the UI last showed,
/// `applied` is the last successful validator response. Any validation
/// failure clears `applied`.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct PromoState {
    pub code: Option<String>,
    pub estimate: Option<f64>,
    pub applied: Option<AppliedPromo>,
}

impl PromoState {
    pub fn authoritative_discount(&self) -> f64 {
        self.applied.as_ref().map(|p| p.discount_amount).unwrap_or(0.0)
    }
}

/// Result of one reconciliation round trip. Failures fold into
/// `Cleared` so checkout degrades to "no discount" instead of blocking.
#[derive(Debug, Clone, PartialEq)]
pub enum PromoOutcome {
    Applied {
        promo: AppliedPromo,
        subtotal: f64,
        total: f64,
    },
    Cleared {
        subtotal: f64,
        message: String,
    },
}

// Wire shapes for the hosted validator.

#[derive(Debug, Serialize)]
pub struct PromoValidationRequest {
    pub code: String,
    pub total_amount: f64,
}

#[derive(Debug, Deserialize)]
pub struct PromoValidationResponse {
    pub success: bool,
    #[serde(default)]
    pub promo: Option<PromoPayload>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PromoPayload {
    #[serde(default)]
    pub promo_id: Option<String>,
    pub discount_amount: f64,
    #[serde(default)]
    pub final_amount: Option<f64>,
}
