use std::env;

use url::Url;

/// Hosted backend the booking RPCs (availability, promo validation,
/// booking creation, catalog reads) are issued against.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: String,
}

impl BackendConfig {
    pub fn from_env() -> Self {
        let base_url = env::var("BOOKING_BACKEND_URL").expect("BOOKING_BACKEND_URL must be set");
        Url::parse(&base_url).expect("BOOKING_BACKEND_URL must be a valid URL");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: env::var("BOOKING_BACKEND_API_KEY").unwrap_or_default(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
}

impl StripeConfig {
    pub fn from_env() -> Self {
        Self {
            secret_key: env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
        }
    }
}

/// Confirmation email settings. Absent config disables the mailer;
/// bookings and payments never depend on it.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub api_key: String,
    pub from_email: String,
    pub manage_base_url: String,
}

impl EmailConfig {
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("SENDGRID_API_KEY").ok()?;
        let from_email = env::var("BOOKING_FROM_EMAIL").ok()?;
        let manage_base_url = env::var("MANAGE_BOOKING_BASE_URL")
            .unwrap_or_else(|_| "https://bookings.example.com/manage".to_string());

        Some(Self {
            api_key,
            from_email,
            manage_base_url: manage_base_url.trim_end_matches('/').to_string(),
        })
    }
}
