use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

use crate::config::EmailConfig;
use crate::models::bookings::BookingEmailEcho;

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridEmail {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridPersonalization {
    pub to: Vec<SendGridEmail>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGridRequest {
    pub personalizations: Vec<SendGridPersonalization>,
    pub from: SendGridEmail,
    pub subject: String,
    pub content: Vec<SendGridContent>,
}

#[derive(Debug)]
pub enum EmailError {
    EnvironmentError(String),
    RequestError(String),
    ApiError(String),
}

impl std::fmt::Display for EmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmailError::EnvironmentError(err) => write!(f, "Environment error: {}", err),
            EmailError::RequestError(err) => write!(f, "Request error: {}", err),
            EmailError::ApiError(err) => write!(f, "API error: {}", err),
        }
    }
}

impl std::error::Error for EmailError {}

/// Sends the post-payment confirmation email. Dispatch failures are
/// reported to the caller as a secondary notice; they never affect the
/// booking or payment that already succeeded.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, echo: &BookingEmailEcho) -> Result<(), EmailError>;
}

pub struct EmailService {
    api_key: String,
    from_email: String,
    manage_base_url: String,
    client: reqwest::Client,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            api_key: config.api_key,
            from_email: config.from_email,
            manage_base_url: config.manage_base_url,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, EmailError> {
        let config = EmailConfig::from_env().ok_or_else(|| {
            EmailError::EnvironmentError(
                "SENDGRID_API_KEY and BOOKING_FROM_EMAIL must be set".to_string(),
            )
        })?;
        Ok(Self::new(config))
    }

    /// Self-service link for the customer to view or change the
    /// booking. The token is opaque; the backend resolves it.
    fn manage_link(&self, reference_number: &str, customer_email: &str) -> String {
        let nonce: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(12)
            .map(char::from)
            .collect();

        let token =
            URL_SAFE_NO_PAD.encode(format!("{}:{}:{}", reference_number, customer_email, nonce));
        format!("{}/{}", self.manage_base_url, token)
    }

    fn confirmation_body(&self, echo: &BookingEmailEcho) -> String {
        let manage_link = self.manage_link(&echo.reference_number, &echo.customer_email);
        format!(
            "Hi {},\n\n\
             Your booking is confirmed!\n\n\
             Reference: {}\n\
             Tour: {}\n\
             Date: {} at {}\n\
             Party size: {}\n\
             Subtotal: ${:.2}\n\
             Total paid: ${:.2}\n\n\
             Manage your booking: {}\n\n\
             We look forward to seeing you!",
            echo.customer_name,
            echo.reference_number,
            echo.tour_name,
            echo.date,
            echo.time,
            echo.number_of_people,
            echo.subtotal,
            echo.total,
            manage_link
        )
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        content: &str,
    ) -> Result<(), EmailError> {
        let url = "https://api.sendgrid.com/v3/mail/send";

        let request = SendGridRequest {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridEmail {
                    email: to_email.to_string(),
                }],
            }],
            from: SendGridEmail {
                email: self.from_email.clone(),
            },
            subject: subject.to_string(),
            content: vec![SendGridContent {
                content_type: "text/plain".to_string(),
                value: content.to_string(),
            }],
        };

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| EmailError::RequestError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            Err(EmailError::ApiError(format!(
                "Status: {}, Body: {}",
                status, body
            )))
        }
    }
}

#[async_trait]
impl ConfirmationMailer for EmailService {
    async fn send_confirmation(&self, echo: &BookingEmailEcho) -> Result<(), EmailError> {
        let subject = format!("Booking confirmed - {}", echo.reference_number);
        let body = self.confirmation_body(echo);
        self.send_email(&echo.customer_email, &subject, &body).await
    }
}
